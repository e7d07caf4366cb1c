//! Serialize a `FlatQuery` into the engine's Lucene-style query syntax
//!
//! Groups are parenthesized only where operators mix: an `Or` inside an
//! `And`, an `And` inside an `Or`, and any group under `NOT`. Negations that
//! would otherwise be purely negative are anchored with `*:*`.

use crate::catalog::Escaping;
use crate::catalog::escape::{escape_phrase, escape_term};
use crate::query::flat::{Bound, FlatQuery, Leaf, LeafValue};

const MATCH_ALL: &str = "*:*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Top,
    And,
    Or,
    Not,
}

/// Render a query to its engine string form
pub fn render(query: &FlatQuery) -> String {
    let mut out = String::new();
    render_node(query, Context::Top, &mut out);
    out
}

fn render_node(node: &FlatQuery, ctx: Context, out: &mut String) {
    match node {
        FlatQuery::All => out.push_str(MATCH_ALL),
        FlatQuery::Leaf(leaf) => render_leaf(leaf, out),
        FlatQuery::And(children) => {
            let grouped = matches!(ctx, Context::Or | Context::Not);
            if grouped {
                out.push('(');
            }
            if children.iter().all(|c| matches!(c, FlatQuery::Not(_))) {
                out.push_str(MATCH_ALL);
                out.push_str(" AND ");
            }
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push_str(" AND ");
                }
                render_node(child, Context::And, out);
            }
            if grouped {
                out.push(')');
            }
        }
        FlatQuery::Or(children) => {
            let grouped = matches!(ctx, Context::And | Context::Not);
            if grouped {
                out.push('(');
            }
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push_str(" OR ");
                }
                render_node(child, Context::Or, out);
            }
            if grouped {
                out.push(')');
            }
        }
        FlatQuery::Not(inner) => match ctx {
            Context::And => {
                out.push_str("NOT ");
                render_node(inner, Context::Not, out);
            }
            Context::Top => {
                out.push_str(MATCH_ALL);
                out.push_str(" NOT ");
                render_node(inner, Context::Not, out);
            }
            Context::Or | Context::Not => {
                out.push('(');
                out.push_str(MATCH_ALL);
                out.push_str(" NOT ");
                render_node(inner, Context::Not, out);
                out.push(')');
            }
        },
    }
}

fn render_leaf(leaf: &Leaf, out: &mut String) {
    out.push_str(&leaf.field);
    out.push(':');

    match &leaf.value {
        LeafValue::Term(value) => out.push_str(&escape_term(value, leaf.escaping)),
        LeafValue::Phrase(value) => {
            out.push('"');
            out.push_str(&escape_phrase(value));
            out.push('"');
        }
        LeafValue::Proximity { words, slop } => {
            out.push('"');
            out.push_str(&escape_phrase(words));
            out.push_str("\"~");
            out.push_str(&slop.to_string());
        }
        LeafValue::Range { lower, upper } => {
            out.push(match lower {
                Bound::Exclusive(_) => '{',
                _ => '[',
            });
            render_bound(lower, out);
            out.push_str(" TO ");
            render_bound(upper, out);
            out.push(match upper {
                Bound::Exclusive(_) => '}',
                _ => ']',
            });
        }
    }
}

fn render_bound(bound: &Bound, out: &mut String) {
    match bound {
        Bound::Unbounded => out.push('*'),
        Bound::Inclusive(v) | Bound::Exclusive(v) => {
            out.push_str(&escape_term(v, Escaping::Literal))
        }
    }
}
