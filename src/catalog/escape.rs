//! Value escaping for the engine's Lucene-style query grammar
//!
//! Term values arrive with CQL escape pairs intact (`\*`, `\"`). A CQL escape
//! always yields the literal character; an unescaped `*` or `?` is a wildcard
//! under masked escaping.

use crate::catalog::field::Escaping;

/// Characters with meaning in the engine's query grammar
const SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/',
];

fn is_special(ch: char) -> bool {
    SPECIAL.contains(&ch) || ch.is_whitespace()
}

fn push_literal(out: &mut String, ch: char) {
    if is_special(ch) {
        out.push('\\');
    }
    out.push(ch);
}

/// Escape a single term for use as `field:<term>`
pub fn escape_term(value: &str, escaping: Escaping) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => push_literal(&mut out, escaped),
                None => push_literal(&mut out, '\\'),
            },
            '*' | '?' if escaping == Escaping::Masked => out.push(ch),
            _ => push_literal(&mut out, ch),
        }
    }

    out
}

/// Escape a value for use inside a quoted phrase
pub fn escape_phrase(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for ch in decode(value).chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Strip CQL escape backslashes
pub fn decode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push(chars.next().unwrap_or('\\')),
            _ => out.push(ch),
        }
    }
    out
}

/// True if the value contains an unescaped `*` or `?`
pub fn has_wildcard(value: &str) -> bool {
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

/// Split on unescaped whitespace, keeping escape pairs inside words
pub fn split_words(value: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            current.push(ch);
            if let Some(escaped) = chars.next() {
                current.push(escaped);
            }
        } else if ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
