//! Field catalog
//!
//! Static mapping from CQL index names (`dc.title`, `rec.id`, ...) to engine
//! field metadata. Index names are case-insensitive. A name missing from the
//! catalog is always an error, never silently defaulted.

pub mod escape;
pub mod field;

pub use field::{Escaping, FieldSpec, FieldType, FieldUsage};

use crate::error::{BibqError, CompileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index used by bare terms unless configured otherwise
pub const DEFAULT_INDEX: &str = "cql.serverchoice";

/// Index holding the collection identifier that profiles filter on
pub const COLLECTION_INDEX: &str = "rec.collectionidentifier";

/// Serialized catalog as it appears in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_index")]
    pub default_index: String,
    #[serde(default = "collection_index")]
    pub collection_index: String,
    pub fields: BTreeMap<String, FieldSpec>,
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

fn collection_index() -> String {
    COLLECTION_INDEX.to_string()
}

/// Immutable index → field lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    default_index: String,
    collection_index: String,
    fields: BTreeMap<String, FieldSpec>,
}

impl FieldCatalog {
    /// Build a catalog; the default and collection indexes must be present
    pub fn new(
        default_index: &str,
        collection_index: &str,
        fields: impl IntoIterator<Item = (String, FieldSpec)>,
    ) -> Result<Self> {
        let mut normalized = BTreeMap::new();
        for (name, spec) in fields {
            let key = name.to_lowercase();
            if normalized.insert(key, spec).is_some() {
                return Err(BibqError::Config(format!(
                    "index '{}' is defined more than once (names are case-insensitive)",
                    name
                )));
            }
        }

        let catalog = Self {
            default_index: default_index.to_lowercase(),
            collection_index: collection_index.to_lowercase(),
            fields: normalized,
        };

        for required in [&catalog.default_index, &catalog.collection_index] {
            if !catalog.fields.contains_key(required) {
                return Err(BibqError::Config(format!(
                    "catalog does not define index '{}'",
                    required
                )));
            }
        }

        Ok(catalog)
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(
            &config.default_index,
            &config.collection_index,
            config.fields.clone(),
        )
    }

    pub fn to_config(&self) -> CatalogConfig {
        CatalogConfig {
            default_index: self.default_index.clone(),
            collection_index: self.collection_index.clone(),
            fields: self.fields.clone(),
        }
    }

    /// Look up an index by name
    pub fn lookup(&self, index: &str) -> std::result::Result<&FieldSpec, CompileError> {
        self.fields
            .get(&index.to_lowercase())
            .ok_or_else(|| CompileError::UndefinedField(index.to_string()))
    }

    /// Resolve an optional index, falling back to the default index
    pub fn resolve(&self, index: Option<&str>) -> std::result::Result<&FieldSpec, CompileError> {
        self.lookup(index.unwrap_or(&self.default_index))
    }

    pub fn default_index(&self) -> &str {
        &self.default_index
    }

    pub fn collection_index(&self) -> &str {
        &self.collection_index
    }

    pub fn collection_field(&self) -> &FieldSpec {
        // Presence is checked in `new`
        &self.fields[&self.collection_index]
    }

    pub fn contains(&self, index: &str) -> bool {
        self.fields.contains_key(&index.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for FieldCatalog {
    /// Small bibliographic catalog covering the common Dublin Core indexes
    fn default() -> Self {
        let fields = [
            (DEFAULT_INDEX, FieldSpec::text("term.default")),
            ("dc.title", FieldSpec::text("term.title")),
            ("title", FieldSpec::text("term.title")),
            ("dc.creator", FieldSpec::text("term.creator")),
            ("author", FieldSpec::text("term.creator")),
            ("dc.subject", FieldSpec::text("term.subject")),
            ("subject", FieldSpec::text("term.subject")),
            ("dc.description", FieldSpec::text("term.description")),
            ("dc.language", FieldSpec::string("term.language").multi_valued()),
            ("dc.type", FieldSpec::string("term.type").multi_valued()),
            ("dc.identifier", FieldSpec::string("term.identifier").multi_valued()),
            ("dc.date", FieldSpec::date("term.date")),
            ("year", FieldSpec::numeric("term.year")),
            ("rec.id", FieldSpec::string("rec.id").with_usage(FieldUsage::Both)),
            (
                COLLECTION_INDEX,
                FieldSpec::string("rec.collectionIdentifier")
                    .multi_valued()
                    .with_usage(FieldUsage::Both),
            ),
            (
                "rec.workid",
                FieldSpec::string("rec.workId").with_usage(FieldUsage::Both),
            ),
            (
                "rec.unitid",
                FieldSpec::string("rec.unitId").with_usage(FieldUsage::Both),
            ),
            (
                "rel.type",
                FieldSpec::string("rel.type")
                    .multi_valued()
                    .with_usage(FieldUsage::Relation),
            ),
            (
                "rel.target",
                FieldSpec::string("rel.target")
                    .multi_valued()
                    .with_usage(FieldUsage::Relation),
            ),
        ];

        Self {
            default_index: DEFAULT_INDEX.to_string(),
            collection_index: COLLECTION_INDEX.to_string(),
            fields: fields
                .into_iter()
                .map(|(name, spec)| (name.to_string(), spec))
                .collect(),
        }
    }
}
