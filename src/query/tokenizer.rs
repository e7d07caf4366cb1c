//! CQL tokenizer
//!
//! Single left-to-right scan over the query's code points. Offsets reported
//! in tokens and errors are character (not byte) positions.

use crate::error::{BibqError, Result};
use crate::query::keywords::{BooleanKeywords, RelationKeywords};
use crate::query::token::{CompareOp, Token, TokenData};

const SORTBY: &str = "sortby";

/// Tokenizer configured with a boolean keyword table and relation keywords
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    booleans: BooleanKeywords,
    relations: RelationKeywords,
}

impl Tokenizer {
    pub fn new(booleans: BooleanKeywords, relations: RelationKeywords) -> Self {
        Self {
            booleans,
            relations,
        }
    }

    pub fn booleans(&self) -> &BooleanKeywords {
        &self.booleans
    }

    /// Scan the full query into tokens, ending with `EndOfInput`
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>> {
        let mut scanner = Scanner::new(input);
        let mut tokens = Vec::new();

        loop {
            scanner.skip_whitespace();
            let start = scanner.pos;

            let Some(ch) = scanner.next_char() else {
                tokens.push(Token::new(TokenData::EndOfInput, start));
                break;
            };

            let data = match ch {
                '(' => TokenData::ParenOpen,
                ')' => TokenData::ParenClose,
                '/' => TokenData::Slash,
                '=' => TokenData::CompareOp(scanner.compare_op('=')),
                '<' => TokenData::CompareOp(scanner.compare_op('<')),
                '>' => TokenData::CompareOp(scanner.compare_op('>')),
                '"' | '\'' => scanner.read_quoted(ch, start)?,
                _ => {
                    scanner.push_back();
                    let run = scanner.read_run()?;
                    self.classify(run)
                }
            };

            tokens.push(Token::new(data, start));
        }

        Ok(tokens)
    }

    fn classify(&self, run: String) -> TokenData {
        if run.to_lowercase() == SORTBY {
            return TokenData::SortBy(run);
        }
        if let Some(op) = self.booleans.lookup(&run) {
            return TokenData::BooleanOp { op, word: run };
        }
        if self.relations.contains(&run) {
            return TokenData::Relation(run.to_lowercase());
        }
        TokenData::Term {
            raw: run.clone(),
            value: run,
            quoted: false,
        }
    }
}

/// Tokenize with the English keyword table and default relations
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Tokenizer::default().tokenize(input)
}

/// Character cursor with one character of pushback
struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn push_back(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.next_char() {
            if !ch.is_whitespace() {
                self.push_back();
                break;
            }
        }
    }

    /// Resolve a comparison starting with `first`, consuming a second
    /// character only when it forms a two-character operator
    fn compare_op(&mut self, first: char) -> CompareOp {
        let second = self.next_char();
        let op = match (first, second) {
            ('=', Some('=')) => Some(CompareOp::Exact),
            ('<', Some('=')) => Some(CompareOp::Le),
            ('<', Some('>')) => Some(CompareOp::Ne),
            ('>', Some('=')) => Some(CompareOp::Ge),
            _ => None,
        };

        match op {
            Some(op) => op,
            None => {
                if second.is_some() {
                    self.push_back();
                }
                match first {
                    '<' => CompareOp::Lt,
                    '>' => CompareOp::Gt,
                    _ => CompareOp::Eq,
                }
            }
        }
    }

    fn read_quoted(&mut self, quote: char, start: usize) -> Result<TokenData> {
        let mut raw = String::from(quote);
        let mut value = String::new();

        loop {
            let at = self.pos;
            match self.next_char() {
                None => {
                    return Err(BibqError::scan(start, "unterminated quoted term"));
                }
                Some('\\') => {
                    let Some(escaped) = self.next_char() else {
                        return Err(BibqError::scan(at, "dangling backslash"));
                    };
                    for out in [&mut raw, &mut value] {
                        out.push('\\');
                        out.push(escaped);
                    }
                }
                Some(ch) if ch == quote => {
                    raw.push(ch);
                    break;
                }
                Some(ch) => {
                    raw.push(ch);
                    value.push(ch);
                }
            }
        }

        Ok(TokenData::Term {
            raw,
            value,
            quoted: true,
        })
    }

    fn read_run(&mut self) -> Result<String> {
        let mut run = String::new();

        while let Some(ch) = self.next_char() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '=' | '<' | '>' | '/') {
                self.push_back();
                break;
            }
            run.push(ch);
            if ch == '\\' {
                let at = self.pos - 1;
                let Some(escaped) = self.next_char() else {
                    return Err(BibqError::scan(at, "dangling backslash"));
                };
                run.push(escaped);
            }
        }

        Ok(run)
    }
}
