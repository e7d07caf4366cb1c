//! Keyword tables injected into the tokenizer
//!
//! Boolean operators can be localized: a table maps any number of words onto
//! the four CQL boolean operators. New locales are new tables, not new code.

use crate::query::token::BooleanOp;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Relation keywords recognized by default
pub const DEFAULT_RELATIONS: &[&str] = &["adj", "all", "any", "within", "encloses", "exact"];

/// Word → boolean operator table (lowercase keys)
#[derive(Debug, Clone)]
pub struct BooleanKeywords {
    words: FxHashMap<String, BooleanOp>,
}

impl BooleanKeywords {
    /// Empty table; only useful as a base for `with_synonym`
    pub fn empty() -> Self {
        Self {
            words: FxHashMap::default(),
        }
    }

    /// `and`, `or`, `not`, `prox`
    pub fn english() -> Self {
        Self::empty()
            .with_synonym("and", BooleanOp::And)
            .with_synonym("or", BooleanOp::Or)
            .with_synonym("not", BooleanOp::Not)
            .with_synonym("prox", BooleanOp::Prox)
    }

    /// English keywords plus Danish synonyms
    pub fn danish() -> Self {
        Self::english()
            .with_synonym("og", BooleanOp::And)
            .with_synonym("eller", BooleanOp::Or)
            .with_synonym("ikke", BooleanOp::Not)
            .with_synonym("nær", BooleanOp::Prox)
    }

    /// Look up a locale table by its short name
    pub fn for_locale(locale: &str) -> Option<Self> {
        match locale.to_lowercase().as_str() {
            "en" | "eng" | "english" => Some(Self::english()),
            "da" | "dan" | "danish" => Some(Self::danish()),
            _ => None,
        }
    }

    pub fn with_synonym(mut self, word: &str, op: BooleanOp) -> Self {
        self.words.insert(word.to_lowercase(), op);
        self
    }

    /// Case-insensitive lookup
    pub fn lookup(&self, word: &str) -> Option<BooleanOp> {
        self.words.get(&word.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for BooleanKeywords {
    fn default() -> Self {
        Self::english()
    }
}

/// Set of relation keywords (lowercase)
#[derive(Debug, Clone)]
pub struct RelationKeywords {
    names: FxHashSet<String>,
}

impl RelationKeywords {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.names.contains(&word.to_lowercase())
    }
}

impl Default for RelationKeywords {
    fn default() -> Self {
        Self::new(DEFAULT_RELATIONS)
    }
}

/// Serialized form of the keyword configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Base locale table (`en` or `da`)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Extra boolean synonyms: word → `and` | `or` | `not` | `prox`
    #[serde(default)]
    pub synonyms: Vec<(String, String)>,

    /// Relation keywords; defaults to the CQL set
    #[serde(default = "default_relations")]
    pub relations: Vec<String>,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_relations() -> Vec<String> {
    DEFAULT_RELATIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            synonyms: Vec::new(),
            relations: default_relations(),
        }
    }
}

impl KeywordConfig {
    /// Build the boolean table; unknown locales or operator names yield None
    pub fn boolean_keywords(&self) -> Option<BooleanKeywords> {
        let mut table = BooleanKeywords::for_locale(&self.locale)?;
        for (word, op) in &self.synonyms {
            let op = match op.to_lowercase().as_str() {
                "and" => BooleanOp::And,
                "or" => BooleanOp::Or,
                "not" => BooleanOp::Not,
                "prox" => BooleanOp::Prox,
                _ => return None,
            };
            table = table.with_synonym(word, op);
        }
        Some(table)
    }

    pub fn relation_keywords(&self) -> RelationKeywords {
        RelationKeywords::new(&self.relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_lookup_is_case_insensitive() {
        let table = BooleanKeywords::english();
        assert_eq!(table.lookup("AND"), Some(BooleanOp::And));
        assert_eq!(table.lookup("Prox"), Some(BooleanOp::Prox));
        assert_eq!(table.lookup("og"), None);
    }

    #[test]
    fn test_danish_synonyms() {
        let table = BooleanKeywords::danish();
        assert_eq!(table.lookup("og"), Some(BooleanOp::And));
        assert_eq!(table.lookup("ELLER"), Some(BooleanOp::Or));
        assert_eq!(table.lookup("ikke"), Some(BooleanOp::Not));
        assert_eq!(table.lookup("and"), Some(BooleanOp::And));
    }

    #[test]
    fn test_custom_synonym() {
        let table = BooleanKeywords::english().with_synonym("und", BooleanOp::And);
        assert_eq!(table.lookup("UND"), Some(BooleanOp::And));
    }

    #[test]
    fn test_relations() {
        let relations = RelationKeywords::default();
        assert!(relations.contains("ANY"));
        assert!(relations.contains("within"));
        assert!(!relations.contains("title"));
    }

    #[test]
    fn test_keyword_config() {
        let config = KeywordConfig {
            locale: "da".to_string(),
            synonyms: vec![("samt".to_string(), "and".to_string())],
            relations: vec!["any".to_string()],
        };
        let table = config.boolean_keywords().unwrap();
        assert_eq!(table.lookup("samt"), Some(BooleanOp::And));
        assert!(config.relation_keywords().contains("any"));
        assert!(!config.relation_keywords().contains("all"));

        let bad = KeywordConfig {
            locale: "xx".to_string(),
            ..KeywordConfig::default()
        };
        assert!(bad.boolean_keywords().is_none());
    }
}
