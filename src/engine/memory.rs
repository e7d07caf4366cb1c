//! In-memory engine over a fixed ranked hit list
//!
//! The query string is not interpreted; every request pages through the same
//! hits. Requests are recorded so callers can inspect the round trips made.

use crate::engine::{EnginePage, EngineRequest, Hit, IndexEngine};
use crate::error::{BibqError, Result};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryEngine {
    hits: Vec<Hit>,
    requests: Mutex<Vec<EngineRequest>>,
    /// Fail every request after this many have succeeded
    fail_after: Option<usize>,
}

impl MemoryEngine {
    pub fn new(hits: Vec<Hit>) -> Self {
        Self {
            hits,
            requests: Mutex::new(Vec::new()),
            fail_after: None,
        }
    }

    /// Load a JSON array of hits
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let hits: Vec<Hit> = serde_json::from_str(&content)?;
        Ok(Self::new(hits))
    }

    /// Make the engine fail once `successes` requests have been served
    pub fn failing_after(mut self, successes: usize) -> Self {
        self.fail_after = Some(successes);
        self
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Requests served so far, in order
    pub fn requests(&self) -> Vec<EngineRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl IndexEngine for MemoryEngine {
    fn search(&self, request: &EngineRequest) -> Result<EnginePage> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|_| BibqError::Engine("request log poisoned".to_string()))?;

        if self.fail_after.is_some_and(|limit| requests.len() >= limit) {
            return Err(BibqError::Engine(format!(
                "engine unavailable (tracking {})",
                request.tracking
            )));
        }
        requests.push(request.clone());

        let start = request.offset.min(self.hits.len());
        let end = start.saturating_add(request.rows).min(self.hits.len());
        Ok(EnginePage {
            hits: self.hits[start..end].to_vec(),
            total: self.hits.len(),
        })
    }
}
