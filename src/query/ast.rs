//! Abstract syntax tree produced by the CQL parser

use crate::query::token::{BooleanOp, CompareOp};
use std::fmt;

/// Parsed CQL query: a boolean tree plus optional sort keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqlQuery {
    pub root: Node,
    pub sort: Option<SortSpec>,
}

/// Query AST node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Binary boolean combination. Only `Prox` carries modifiers.
    Boolean {
        op: BooleanOp,
        modifiers: Vec<Modifier>,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `[index relation[/modifiers]] term`
    Search(SearchClause),
}

/// A single search clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchClause {
    /// Explicit index; `None` means the catalog's default index
    pub index: Option<String>,
    pub relation: Relation,
    pub modifiers: Vec<Modifier>,
    /// Term value, quotes removed, escape pairs kept
    pub term: String,
    /// Character offset where the clause started
    pub offset: usize,
}

/// Relation between index and term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Compare(CompareOp),
    /// Named relation keyword, lowercased (`any`, `all`, `adj`, ...)
    Named(String),
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Compare(op) => write!(f, "{}", op),
            Relation::Named(name) => f.write_str(name),
        }
    }
}

/// Slash modifier: `/name` or `/name<op>value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub name: String,
    pub comparison: Option<(CompareOp, String)>,
    pub offset: usize,
}

impl Modifier {
    pub fn value(&self) -> Option<&str> {
        self.comparison.as_ref().map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comparison {
            Some((op, value)) => write!(f, "{}{}{}", self.name, op, value),
            None => f.write_str(&self.name),
        }
    }
}

/// `sortby` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub index: String,
    pub modifiers: Vec<Modifier>,
}

impl SearchClause {
    /// Bare term matched against the default index
    pub fn implicit(term: impl Into<String>, offset: usize) -> Self {
        Self {
            index: None,
            relation: Relation::Compare(CompareOp::Eq),
            modifiers: Vec::new(),
            term: term.into(),
            offset,
        }
    }
}

impl Node {
    pub fn boolean(op: BooleanOp, left: Node, right: Node) -> Self {
        Node::Boolean {
            op,
            modifiers: Vec::new(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Visit every search clause, left to right
    pub fn clauses(&self) -> Vec<&SearchClause> {
        let mut out = Vec::new();
        self.collect_clauses(&mut out);
        out
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<&'a SearchClause>) {
        match self {
            Node::Search(clause) => out.push(clause),
            Node::Boolean { left, right, .. } => {
                left.collect_clauses(out);
                right.collect_clauses(out);
            }
        }
    }
}

fn write_modifiers(f: &mut fmt::Formatter<'_>, modifiers: &[Modifier]) -> fmt::Result {
    for modifier in modifiers {
        write!(f, "/{}", modifier)?;
    }
    Ok(())
}

fn write_term(f: &mut fmt::Formatter<'_>, term: &str) -> fmt::Result {
    // Escape pairs are kept in the value, so only bare quotes need masking
    let mut out = String::with_capacity(term.len() + 2);
    let mut chars = term.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    write!(f, "\"{}\"", out)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Search(clause) => {
                if let Some(index) = &clause.index {
                    write!(f, "{} {}", index, clause.relation)?;
                    write_modifiers(f, &clause.modifiers)?;
                    f.write_str(" ")?;
                }
                write_term(f, &clause.term)
            }
            Node::Boolean {
                op,
                modifiers,
                left,
                right,
            } => {
                write!(f, "({} {}", left, op)?;
                write_modifiers(f, modifiers)?;
                write!(f, " {})", right)
            }
        }
    }
}

impl fmt::Display for CqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        if let Some(sort) = &self.sort {
            f.write_str(" sortby")?;
            for key in &sort.keys {
                write!(f, " {}", key.index)?;
                write_modifiers(f, &key.modifiers)?;
            }
        }
        Ok(())
    }
}
