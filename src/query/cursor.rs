use crate::query::token::{Token, TokenKind};

/// Read cursor over an immutable token array
///
/// The array always ends with `EndOfInput`; reads past the end keep
/// returning that final token.
#[derive(Debug)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            tokens.last().map(|t| t.kind()) == Some(TokenKind::EndOfInput),
            "token stream must end with EndOfInput"
        );
        Self { tokens, pos: 0 }
    }

    /// Token at the cursor
    pub fn peek(&self) -> &'a Token {
        self.peek_at(0)
    }

    /// Token `n` positions ahead of the cursor
    pub fn peek_at(&self, n: usize) -> &'a Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind()
    }

    /// Consume and return the token at the cursor
    pub fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it has the given kind
    pub fn accept(&mut self, kind: TokenKind) -> Option<&'a Token> {
        if self.peek_kind() == kind {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Atomically consume a fixed sequence of token kinds.
    ///
    /// Either every kind in `pattern` matches the upcoming tokens and the
    /// cursor moves past all of them, or nothing is consumed.
    pub fn take(&mut self, pattern: &[TokenKind]) -> Option<&'a [Token]> {
        let end = self.pos + pattern.len();
        if end > self.tokens.len() {
            return None;
        }

        let window = &self.tokens[self.pos..end];
        let matched = window
            .iter()
            .zip(pattern)
            .all(|(token, kind)| token.kind() == *kind);

        if matched {
            self.pos = end.min(self.tokens.len().saturating_sub(1));
            Some(window)
        } else {
            None
        }
    }

    /// True when the pattern matches the upcoming tokens, without consuming
    pub fn looking_at(&self, pattern: &[TokenKind]) -> bool {
        pattern
            .iter()
            .enumerate()
            .all(|(i, kind)| self.pos + i < self.tokens.len() && self.peek_at(i).kind() == *kind)
    }

    pub fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::EndOfInput
    }
}
