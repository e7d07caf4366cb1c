use serde::{Deserialize, Serialize};

/// Value type of an engine field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Tokenized full text
    #[default]
    Text,
    /// Untokenized string (identifiers, codes)
    String,
    Numeric,
    Date,
}

/// How term values are escaped when rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Escaping {
    /// Unescaped `*` and `?` stay wildcards; everything else is escaped
    #[default]
    Masked,
    /// Every engine metacharacter is escaped
    Literal,
}

/// Whether a field may appear in searches, relation lookups or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldUsage {
    #[default]
    Search,
    Relation,
    Both,
}

impl FieldUsage {
    pub fn allows_search(&self) -> bool {
        matches!(self, FieldUsage::Search | FieldUsage::Both)
    }

    pub fn allows_relation(&self) -> bool {
        matches!(self, FieldUsage::Relation | FieldUsage::Both)
    }
}

/// Engine metadata for one logical index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Engine field name
    pub field: String,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub multi_valued: bool,
    #[serde(default)]
    pub escaping: Escaping,
    #[serde(default)]
    pub usage: FieldUsage,
}

impl FieldSpec {
    pub fn text(field: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::Text,
            multi_valued: true,
            escaping: Escaping::Masked,
            usage: FieldUsage::Search,
        }
    }

    pub fn string(field: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::String,
            multi_valued: false,
            escaping: Escaping::Literal,
            usage: FieldUsage::Search,
        }
    }

    pub fn numeric(field: &str) -> Self {
        Self {
            field_type: FieldType::Numeric,
            ..Self::string(field)
        }
    }

    pub fn date(field: &str) -> Self {
        Self {
            field_type: FieldType::Date,
            ..Self::string(field)
        }
    }

    pub fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }

    pub fn with_usage(mut self, usage: FieldUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Tokenized fields split multi-word terms into words
    pub fn is_tokenized(&self) -> bool {
        self.field_type == FieldType::Text
    }
}
