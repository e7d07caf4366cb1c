//! Index engine boundary
//!
//! The engine is an opaque ranking oracle: it takes a rendered query plus a
//! page window and returns flat hits in rank order. Each hit names the work,
//! unit and manifestation it belongs to and the collections it was found in.

pub mod memory;
#[cfg(feature = "http")]
pub mod solr;

pub use memory::MemoryEngine;
#[cfg(feature = "http")]
pub use solr::SolrEngine;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One page request against the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    /// Rendered engine query
    pub query: String,
    /// Engine sort parameter
    pub sort: Option<String>,
    pub offset: usize,
    pub rows: usize,
    pub tracking: TrackingId,
}

/// Hits for one request, in rank order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnginePage {
    pub hits: Vec<Hit>,
    /// Total number of matching hits reported by the engine
    pub total: usize,
}

/// Flat ranked hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub work_id: String,
    pub unit_id: String,
    pub manifestation_id: String,
    #[serde(default)]
    pub collections: Vec<String>,
}

impl Hit {
    pub fn new(work_id: &str, unit_id: &str, manifestation_id: &str) -> Self {
        Self {
            work_id: work_id.to_string(),
            unit_id: unit_id.to_string(),
            manifestation_id: manifestation_id.to_string(),
            collections: Vec::new(),
        }
    }

    pub fn in_collection(mut self, collection: &str) -> Self {
        self.collections.push(collection.to_string());
        self
    }
}

/// Search backend
pub trait IndexEngine {
    fn search(&self, request: &EngineRequest) -> Result<EnginePage>;
}

impl<T: IndexEngine + ?Sized> IndexEngine for &T {
    fn search(&self, request: &EngineRequest) -> Result<EnginePage> {
        (**self).search(request)
    }
}

impl<T: IndexEngine + ?Sized> IndexEngine for Box<T> {
    fn search(&self, request: &EngineRequest) -> Result<EnginePage> {
        (**self).search(request)
    }
}

/// Request tracking token: a caller-supplied base plus a sequence number that
/// grows with every round trip. Renders as `base:seq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackingId {
    base: String,
    seq: u64,
}

impl TrackingId {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            seq: 0,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The token for the following round trip
    pub fn next(&self) -> Self {
        Self {
            base: self.base.clone(),
            seq: self.seq + 1,
        }
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.base, self.seq)
    }
}

/// Engine field names holding the hierarchy keys of a hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitFields {
    pub work: String,
    pub unit: String,
    pub manifestation: String,
    pub collection: String,
}

impl Default for HitFields {
    fn default() -> Self {
        Self {
            work: "rec.workId".to_string(),
            unit: "rec.unitId".to_string(),
            manifestation: "rec.manifestationId".to_string(),
            collection: "rec.collectionIdentifier".to_string(),
        }
    }
}

/// Connection settings for the HTTP engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub core: String,
    pub timeout_ms: u64,
    pub fields: HitFields,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8983/solr".to_string(),
            core: "bibdk".to_string(),
            timeout_ms: 5000,
            fields: HitFields::default(),
        }
    }
}
