//! Access profiles
//!
//! A profile restricts which collections a search may see and which
//! relation labels are visible per collection. Filters are compiled once per
//! profile into `FlatQuery` fragments against the catalog's collection field,
//! then shared read-only through the `Profiles` registry.

use crate::catalog::FieldCatalog;
use crate::error::{BibqError, Result};
use crate::query::compiler::QueryKind;
use crate::query::flat::{FlatQuery, Leaf};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// One source (collection) declared by a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Collection identifier, e.g. `870970-basis`
    pub collection: String,
    #[serde(default)]
    pub searchable: bool,
    /// Relation labels this source may be reached through
    #[serde(default)]
    pub relations: Vec<String>,
}

/// Upstream profile definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<SourceMetadata>,
}

impl SourceMetadata {
    pub fn searchable(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            searchable: true,
            relations: Vec::new(),
        }
    }

    pub fn with_relations<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.extend(labels.into_iter().map(Into::into));
        self
    }
}

/// Compiled, immutable access profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    search_filter: FlatQuery,
    relation_filter: FlatQuery,
    relation_allow: BTreeMap<String, BTreeSet<String>>,
    /// Collections visible to relation lookups; `None` when unrestricted
    visible: Option<BTreeSet<String>>,
}

impl Profile {
    /// Compile a profile definition against the catalog's collection field
    pub fn compile(metadata: &ProfileMetadata, catalog: &FieldCatalog) -> Self {
        let mut searchable = BTreeSet::new();
        let mut visible = BTreeSet::new();
        let mut relation_allow: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for source in &metadata.sources {
            if source.searchable {
                searchable.insert(source.collection.clone());
                visible.insert(source.collection.clone());
            }
            if !source.relations.is_empty() {
                visible.insert(source.collection.clone());
                relation_allow
                    .entry(source.collection.clone())
                    .or_default()
                    .extend(source.relations.iter().cloned());
            }
        }

        let search_filter = collection_filter(catalog, &searchable);
        let relation_filter = collection_filter(catalog, &visible);

        debug!(
            profile = %metadata.name,
            searchable = searchable.len(),
            visible = visible.len(),
            "compiled profile filters"
        );

        Self {
            name: metadata.name.clone(),
            search_filter,
            relation_filter,
            relation_allow,
            visible: Some(visible),
        }
    }

    /// Profile without restrictions; both filters match everything
    pub fn unrestricted() -> Self {
        Self {
            name: "unrestricted".to_string(),
            search_filter: FlatQuery::All,
            relation_filter: FlatQuery::All,
            relation_allow: BTreeMap::new(),
            visible: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn search_filter(&self) -> &FlatQuery {
        &self.search_filter
    }

    pub fn relation_filter(&self) -> &FlatQuery {
        &self.relation_filter
    }

    /// Filter fused into a query of the given kind
    pub fn filter_for(&self, kind: QueryKind) -> &FlatQuery {
        match kind {
            QueryKind::Search => &self.search_filter,
            QueryKind::Relation => &self.relation_filter,
        }
    }

    /// True only if `label` was declared for `source` in this profile
    pub fn has_relation(&self, source: &str, label: &str) -> bool {
        self.relation_allow
            .get(source)
            .is_some_and(|labels| labels.contains(label))
    }

    pub fn relation_allow(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.relation_allow
    }

    /// Collections visible through the relation filter, sorted.
    /// `None` for an unrestricted profile.
    pub fn relation_sources(&self) -> Option<&BTreeSet<String>> {
        self.visible.as_ref()
    }

    /// True if a hit from any of `collections` passes the relation filter
    pub fn admits<S: AsRef<str>>(&self, collections: &[S]) -> bool {
        match &self.visible {
            None => true,
            Some(visible) => collections.iter().any(|c| visible.contains(c.as_ref())),
        }
    }
}

fn collection_filter(catalog: &FieldCatalog, sources: &BTreeSet<String>) -> FlatQuery {
    let spec = catalog.collection_field();
    FlatQuery::or(
        sources
            .iter()
            .map(|source| FlatQuery::from(Leaf::term(&spec.field, spec.escaping, source.as_str()))),
    )
}

/// Registry of compiled profiles keyed by name
#[derive(Debug, Clone, Default)]
pub struct Profiles {
    profiles: BTreeMap<String, Arc<Profile>>,
}

impl Profiles {
    /// Compile every profile in a metadata snapshot
    pub fn from_metadata(metadata: &[ProfileMetadata], catalog: &FieldCatalog) -> Result<Self> {
        let mut profiles = BTreeMap::new();
        for entry in metadata {
            let profile = Arc::new(Profile::compile(entry, catalog));
            if profiles.insert(entry.name.clone(), profile).is_some() {
                return Err(BibqError::Config(format!(
                    "profile '{}' is defined more than once",
                    entry.name
                )));
            }
        }

        info!(count = profiles.len(), "built profile registry");
        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Result<Arc<Profile>> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| BibqError::UnknownProfile(name.to_string()))
    }

    /// Profile names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::render::render;

    fn metadata() -> Vec<ProfileMetadata> {
        vec![
            ProfileMetadata {
                name: "opac".to_string(),
                sources: vec![
                    SourceMetadata::searchable("870970-basis"),
                    SourceMetadata::searchable("150013-palle"),
                    SourceMetadata {
                        collection: "870971-avis".to_string(),
                        searchable: false,
                        relations: vec!["isPartOf".to_string()],
                    },
                ],
            },
            ProfileMetadata {
                name: "empty".to_string(),
                sources: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_search_filter_sorted() {
        let profiles = Profiles::from_metadata(&metadata(), &FieldCatalog::default()).unwrap();
        let opac = profiles.get("opac").unwrap();
        assert_eq!(
            render(opac.search_filter()),
            "rec.collectionIdentifier:150013\\-palle OR rec.collectionIdentifier:870970\\-basis"
        );
    }

    #[test]
    fn test_relation_filter_includes_relation_sources() {
        let profiles = Profiles::from_metadata(&metadata(), &FieldCatalog::default()).unwrap();
        let opac = profiles.get("opac").unwrap();
        assert_eq!(opac.relation_filter().leaf_count(), 3);
        let visible: Vec<_> = opac.relation_sources().unwrap().iter().cloned().collect();
        assert_eq!(visible, vec!["150013-palle", "870970-basis", "870971-avis"]);
    }

    #[test]
    fn test_has_relation_defaults_to_false() {
        let profiles = Profiles::from_metadata(&metadata(), &FieldCatalog::default()).unwrap();
        let opac = profiles.get("opac").unwrap();
        assert!(opac.has_relation("870971-avis", "isPartOf"));
        assert!(!opac.has_relation("870971-avis", "hasReview"));
        assert!(!opac.has_relation("870970-basis", "isPartOf"));

        let empty = profiles.get("empty").unwrap();
        assert!(!empty.has_relation("870971-avis", "isPartOf"));
    }

    #[test]
    fn test_profile_without_sources_matches_nothing() {
        let profile = Profile::compile(&metadata()[1], &FieldCatalog::default());
        assert_eq!(profile.search_filter(), &FlatQuery::none());
        assert!(!profile.admits(&["870970-basis"]));
    }

    #[test]
    fn test_unrestricted() {
        let profile = Profile::unrestricted();
        assert_eq!(profile.search_filter(), &FlatQuery::All);
        assert_eq!(profile.filter_for(QueryKind::Relation), &FlatQuery::All);
        assert!(profile.admits::<&str>(&[]));
        assert!(profile.relation_sources().is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let profiles = Profiles::from_metadata(&metadata(), &FieldCatalog::default()).unwrap();
        assert_eq!(profiles.names(), vec!["empty", "opac"]);
        assert!(matches!(
            profiles.get("nope"),
            Err(BibqError::UnknownProfile(ref name)) if name == "nope"
        ));
    }

    #[test]
    fn test_duplicate_profile_rejected() {
        let mut meta = metadata();
        meta.push(meta[0].clone());
        let err = Profiles::from_metadata(&meta, &FieldCatalog::default()).unwrap_err();
        assert!(matches!(err, BibqError::Config(_)));
    }

    #[test]
    fn test_metadata_deserialize() {
        let json = r#"{"name": "p", "sources": [{"collection": "a", "searchable": true},
                       {"collection": "b", "relations": ["hasCover"]}]}"#;
        let meta: ProfileMetadata = serde_json::from_str(json).unwrap();
        assert!(!meta.sources[1].searchable);
        assert_eq!(meta.sources[1].relations, vec!["hasCover"]);
    }
}
