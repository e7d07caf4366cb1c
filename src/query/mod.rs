pub mod ast;
pub mod compiler;
pub mod cursor;
pub mod flat;
pub mod keywords;
pub mod parser;
pub mod render;
pub mod token;
pub mod tokenizer;

pub use ast::{CqlQuery, Modifier, Node, Relation, SearchClause, SortKey, SortSpec};
pub use compiler::{CompiledQuery, QueryCompiler, QueryKind, SortField, compile};
pub use flat::{Bound, FlatQuery, Leaf, LeafValue};
pub use keywords::{BooleanKeywords, KeywordConfig, RelationKeywords};
pub use parser::{CqlParser, parse_cql};
pub use render::render;
pub use token::{BooleanOp, CompareOp, Token, TokenData, TokenKind};
pub use tokenizer::{Tokenizer, tokenize};
