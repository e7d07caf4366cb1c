//! Recursive descent parser for CQL
//!
//! # Grammar
//!
//! ```text
//! cql          := query [sortby sort_key+] EOF
//! query        := boolean_term (BOOLEAN_OP modifiers boolean_term)*
//! boolean_term := '(' query ')' | search_clause
//! search_clause:= [TERM (COMPARE_OP | RELATION) modifiers] TERM
//! modifiers    := ('/' TERM [COMPARE_OP TERM])*
//! sort_key     := TERM modifiers
//! ```
//!
//! Boolean operators share one precedence level and associate to the left.
//! Only `prox` may carry modifiers.

use crate::catalog::escape::decode;
use crate::error::{BibqError, Result};
use crate::query::ast::{CqlQuery, Modifier, Node, Relation, SearchClause, SortKey, SortSpec};
use crate::query::cursor::TokenCursor;
use crate::query::token::{BooleanOp, Token, TokenData, TokenKind};
use crate::query::tokenizer::Tokenizer;

/// Parenthesis nesting beyond this is rejected instead of recursing further
const MAX_DEPTH: usize = 256;

/// Parse a CQL string with the English keyword table
pub fn parse_cql(input: &str) -> Result<CqlQuery> {
    CqlParser::default().parse(input)
}

/// Tokenizer + parser pair
#[derive(Debug, Clone, Default)]
pub struct CqlParser {
    tokenizer: Tokenizer,
}

impl CqlParser {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn parse(&self, input: &str) -> Result<CqlQuery> {
        let tokens = self.tokenizer.tokenize(input)?;
        parse_tokens(&tokens)
    }
}

/// Parse an already tokenized query
pub fn parse_tokens(tokens: &[Token]) -> Result<CqlQuery> {
    if tokens.is_empty() {
        return Err(BibqError::syntax(0, "empty token stream"));
    }
    let mut parser = Parser {
        cursor: TokenCursor::new(tokens),
        depth: 0,
    };
    parser.parse()
}

struct Parser<'a> {
    cursor: TokenCursor<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> Result<CqlQuery> {
        if self.cursor.at_end() {
            return Err(BibqError::syntax(self.cursor.peek().offset, "empty query"));
        }

        let root = self.parse_query()?;

        let sort = if self.cursor.accept(TokenKind::SortBy).is_some() {
            Some(self.parse_sort()?)
        } else {
            None
        };

        if !self.cursor.at_end() {
            return Err(unexpected(self.cursor.peek(), "end of query"));
        }

        Ok(CqlQuery { root, sort })
    }

    fn parse_query(&mut self) -> Result<Node> {
        let mut left = self.parse_boolean_term()?;

        while let TokenData::BooleanOp { op, .. } = &self.cursor.peek().data {
            let op = *op;
            self.cursor.advance();

            let modifiers = if op == BooleanOp::Prox {
                self.parse_modifiers()?
            } else {
                if let Some(slash) = self.cursor.accept(TokenKind::Slash) {
                    return Err(BibqError::syntax(
                        slash.offset,
                        format!("modifiers are not allowed on '{}'", op),
                    ));
                }
                Vec::new()
            };

            let right = self.parse_boolean_term()?;
            left = Node::Boolean {
                op,
                modifiers,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_boolean_term(&mut self) -> Result<Node> {
        let Some(open) = self.cursor.accept(TokenKind::ParenOpen) else {
            return self.parse_search_clause();
        };

        if self.depth >= MAX_DEPTH {
            return Err(BibqError::syntax(open.offset, "query nested too deeply"));
        }

        self.depth += 1;
        let node = self.parse_query()?;
        self.depth -= 1;

        if self.cursor.accept(TokenKind::ParenClose).is_none() {
            return Err(unexpected(self.cursor.peek(), "')'"));
        }
        Ok(node)
    }

    fn parse_search_clause(&mut self) -> Result<Node> {
        let offset = self.cursor.peek().offset;

        let qualified = self
            .cursor
            .take(&[TokenKind::Term, TokenKind::CompareOp])
            .or_else(|| self.cursor.take(&[TokenKind::Term, TokenKind::Relation]));

        let Some(pair) = qualified else {
            let term = self.parse_term(false)?;
            return Ok(Node::Search(SearchClause::implicit(term, offset)));
        };

        let index = name_of(&pair[0]);
        let relation = match &pair[1].data {
            TokenData::CompareOp(op) => Relation::Compare(*op),
            TokenData::Relation(name) => Relation::Named(name.clone()),
            _ => return Err(unexpected(&pair[1], "relation")),
        };
        let modifiers = self.parse_modifiers()?;
        let term = self.parse_term(true)?;

        Ok(Node::Search(SearchClause {
            index: Some(index),
            relation,
            modifiers,
            term,
            offset,
        }))
    }

    /// Search term. After an explicit relation, keyword-looking words are
    /// taken literally.
    fn parse_term(&mut self, after_relation: bool) -> Result<String> {
        let token = self.cursor.peek();
        match token.kind() {
            TokenKind::Term => {
                self.cursor.advance();
                Ok(token.term_value().unwrap_or_default().to_string())
            }
            TokenKind::BooleanOp | TokenKind::Relation | TokenKind::SortBy if after_relation => {
                self.cursor.advance();
                Ok(token.text())
            }
            _ if after_relation => Err(unexpected(token, "search term after relation")),
            _ => Err(unexpected(token, "search term")),
        }
    }

    fn parse_modifiers(&mut self) -> Result<Vec<Modifier>> {
        let mut modifiers = Vec::new();

        while self.cursor.accept(TokenKind::Slash).is_some() {
            let name = self.cursor.peek();
            if name.kind() != TokenKind::Term {
                return Err(unexpected(name, "modifier name after '/'"));
            }
            self.cursor.advance();

            let comparison = match self.cursor.peek().data {
                TokenData::CompareOp(op) => {
                    self.cursor.advance();
                    let value = self.cursor.peek();
                    if value.kind() != TokenKind::Term {
                        return Err(unexpected(value, "modifier value"));
                    }
                    self.cursor.advance();
                    Some((op, value.term_value().unwrap_or_default().to_string()))
                }
                _ => None,
            };

            modifiers.push(Modifier {
                name: name_of(name),
                comparison,
                offset: name.offset,
            });
        }

        Ok(modifiers)
    }

    fn parse_sort(&mut self) -> Result<SortSpec> {
        let mut keys = Vec::new();

        while let Some(index) = self.cursor.accept(TokenKind::Term) {
            let modifiers = self.parse_modifiers()?;
            keys.push(SortKey {
                index: name_of(&index),
                modifiers,
            });
        }

        if keys.is_empty() {
            return Err(unexpected(self.cursor.peek(), "sort key after 'sortby'"));
        }
        Ok(SortSpec { keys })
    }
}

/// Index, sort key or modifier name with escape pairs resolved
fn name_of(token: &Token) -> String {
    decode(token.term_value().unwrap_or_default())
}

fn unexpected(token: &Token, expected: &str) -> BibqError {
    BibqError::syntax(
        token.offset,
        format!("expected {}, found {}", expected, token.describe()),
    )
}
