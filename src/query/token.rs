use std::fmt;

/// Symbolic comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `==`
    Exact,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Exact => "==",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean operators joining search clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    And,
    Or,
    Not,
    Prox,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BooleanOp::And => "and",
            BooleanOp::Or => "or",
            BooleanOp::Not => "not",
            BooleanOp::Prox => "prox",
        })
    }
}

/// Discriminant of a token, used for pattern matching in the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ParenOpen,
    ParenClose,
    Slash,
    CompareOp,
    BooleanOp,
    Relation,
    Term,
    SortBy,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::ParenOpen => "'('",
            TokenKind::ParenClose => "')'",
            TokenKind::Slash => "'/'",
            TokenKind::CompareOp => "comparison",
            TokenKind::BooleanOp => "boolean operator",
            TokenKind::Relation => "relation",
            TokenKind::Term => "term",
            TokenKind::SortBy => "sortby",
            TokenKind::EndOfInput => "end of input",
        })
    }
}

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenData {
    ParenOpen,
    ParenClose,
    Slash,
    CompareOp(CompareOp),
    /// Boolean keyword, with the word as written
    BooleanOp { op: BooleanOp, word: String },
    /// Relation keyword, lowercased
    Relation(String),
    /// Search term. `raw` is the surface text (quotes and escapes included),
    /// `value` has the surrounding quotes removed; `\x` escape pairs are
    /// kept so wildcard masking survives to rendering.
    Term {
        raw: String,
        value: String,
        quoted: bool,
    },
    /// `sortby`, with the word as written
    SortBy(String),
    EndOfInput,
}

/// A token and the character offset it started at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub data: TokenData,
    pub offset: usize,
}

impl Token {
    pub fn new(data: TokenData, offset: usize) -> Self {
        Self { data, offset }
    }

    pub fn kind(&self) -> TokenKind {
        match self.data {
            TokenData::ParenOpen => TokenKind::ParenOpen,
            TokenData::ParenClose => TokenKind::ParenClose,
            TokenData::Slash => TokenKind::Slash,
            TokenData::CompareOp(_) => TokenKind::CompareOp,
            TokenData::BooleanOp { .. } => TokenKind::BooleanOp,
            TokenData::Relation(_) => TokenKind::Relation,
            TokenData::Term { .. } => TokenKind::Term,
            TokenData::SortBy(_) => TokenKind::SortBy,
            TokenData::EndOfInput => TokenKind::EndOfInput,
        }
    }

    /// Surface text of the token as it appeared in the query
    pub fn text(&self) -> String {
        match &self.data {
            TokenData::ParenOpen => "(".to_string(),
            TokenData::ParenClose => ")".to_string(),
            TokenData::Slash => "/".to_string(),
            TokenData::CompareOp(op) => op.symbol().to_string(),
            TokenData::BooleanOp { word, .. } => word.clone(),
            TokenData::Relation(name) => name.clone(),
            TokenData::Term { raw, .. } => raw.clone(),
            TokenData::SortBy(word) => word.clone(),
            TokenData::EndOfInput => String::new(),
        }
    }

    /// Term value for term tokens
    pub fn term_value(&self) -> Option<&str> {
        match &self.data {
            TokenData::Term { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Human-readable description for error messages
    pub fn describe(&self) -> String {
        match &self.data {
            TokenData::EndOfInput => "end of input".to_string(),
            _ => format!("{} '{}'", self.kind(), self.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_text() {
        let token = Token::new(
            TokenData::Term {
                raw: "\"a b\"".to_string(),
                value: "a b".to_string(),
                quoted: true,
            },
            4,
        );
        assert_eq!(token.kind(), TokenKind::Term);
        assert_eq!(token.text(), "\"a b\"");
        assert_eq!(token.term_value(), Some("a b"));
    }

    #[test]
    fn test_describe() {
        let token = Token::new(TokenData::CompareOp(CompareOp::Ge), 0);
        assert_eq!(token.describe(), "comparison '>='");
        assert_eq!(Token::new(TokenData::EndOfInput, 9).describe(), "end of input");
    }
}
