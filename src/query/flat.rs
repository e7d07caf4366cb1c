//! Flattened boolean query model
//!
//! `And` and `Or` are n-ary and never directly contain a child of their own
//! kind: the constructors splice same-kind children into the parent. Leaf
//! values are kept unescaped; escaping happens once, at render time.

use crate::catalog::Escaping;

/// Engine-ready boolean query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatQuery {
    /// Matches every document
    All,
    And(Vec<FlatQuery>),
    Or(Vec<FlatQuery>),
    Not(Box<FlatQuery>),
    Leaf(Leaf),
}

/// Field match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Engine field name
    pub field: String,
    pub escaping: Escaping,
    pub value: LeafValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafValue {
    /// Single term, wildcards allowed under masked escaping
    Term(String),
    /// Words in sequence
    Phrase(String),
    /// Words within `slop` positions of each other
    Proximity { words: String, slop: u32 },
    Range { lower: Bound, upper: Bound },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Unbounded,
    Inclusive(String),
    Exclusive(String),
}

impl Leaf {
    pub fn term(field: &str, escaping: Escaping, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            escaping,
            value: LeafValue::Term(value.into()),
        }
    }

    pub fn phrase(field: &str, escaping: Escaping, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            escaping,
            value: LeafValue::Phrase(value.into()),
        }
    }

    pub fn range(field: &str, escaping: Escaping, lower: Bound, upper: Bound) -> Self {
        Self {
            field: field.to_string(),
            escaping,
            value: LeafValue::Range { lower, upper },
        }
    }
}

impl From<Leaf> for FlatQuery {
    fn from(leaf: Leaf) -> Self {
        FlatQuery::Leaf(leaf)
    }
}

impl FlatQuery {
    /// Conjunction; same-kind children are spliced, one child collapses to
    /// itself and no children means `All`
    pub fn and(children: impl IntoIterator<Item = FlatQuery>) -> FlatQuery {
        let mut operands = Vec::new();
        for child in children {
            match child {
                FlatQuery::And(grand) => operands.extend(grand),
                other => operands.push(other),
            }
        }
        match operands.len() {
            0 => FlatQuery::All,
            1 => operands.remove(0),
            _ => FlatQuery::And(operands),
        }
    }

    /// Disjunction; same-kind children are spliced, one child collapses to
    /// itself and no children means nothing matches
    pub fn or(children: impl IntoIterator<Item = FlatQuery>) -> FlatQuery {
        let mut operands = Vec::new();
        for child in children {
            match child {
                FlatQuery::Or(grand) => operands.extend(grand),
                other => operands.push(other),
            }
        }
        match operands.len() {
            0 => FlatQuery::none(),
            1 => operands.remove(0),
            _ => FlatQuery::Or(operands),
        }
    }

    /// Negation; double negation cancels out
    pub fn not(inner: FlatQuery) -> FlatQuery {
        match inner {
            FlatQuery::Not(inner) => *inner,
            other => FlatQuery::Not(Box::new(other)),
        }
    }

    /// Matches no document
    pub fn none() -> FlatQuery {
        FlatQuery::Not(Box::new(FlatQuery::All))
    }

    /// True if no `And`/`Or` directly contains a child of the same kind
    pub fn is_flat(&self) -> bool {
        match self {
            FlatQuery::All | FlatQuery::Leaf(_) => true,
            FlatQuery::Not(inner) => inner.is_flat(),
            FlatQuery::And(children) => children
                .iter()
                .all(|c| !matches!(c, FlatQuery::And(_)) && c.is_flat()),
            FlatQuery::Or(children) => children
                .iter()
                .all(|c| !matches!(c, FlatQuery::Or(_)) && c.is_flat()),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            FlatQuery::All | FlatQuery::Leaf(_) => 1,
            FlatQuery::Not(inner) => 1 + inner.depth(),
            FlatQuery::And(children) | FlatQuery::Or(children) => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            FlatQuery::All => 0,
            FlatQuery::Leaf(_) => 1,
            FlatQuery::Not(inner) => inner.leaf_count(),
            FlatQuery::And(children) | FlatQuery::Or(children) => {
                children.iter().map(|c| c.leaf_count()).sum()
            }
        }
    }
}
