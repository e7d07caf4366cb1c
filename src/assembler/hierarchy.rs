//! Work → unit → manifestation grouping of ranked hits

use crate::engine::Hit;
use crate::error::{BibqError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

/// Accumulated grouping of the hits seen during one assembly.
///
/// Works and units keep first-seen rank order; a repeated id is ignored.
/// A unit belongs to the work it was first seen under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultHierarchy {
    works: Vec<String>,
    seen_works: FxHashSet<String>,
    units: FxHashMap<String, Vec<String>>,
    unit_work: FxHashMap<String, String>,
    manifestations: FxHashMap<String, BTreeSet<String>>,
}

impl ResultHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one hit in; returns true if it introduced a new work
    pub fn insert(&mut self, hit: &Hit) -> bool {
        let new_work = self.seen_works.insert(hit.work_id.clone());
        if new_work {
            self.works.push(hit.work_id.clone());
            self.units.entry(hit.work_id.clone()).or_default();
        }

        if !self.unit_work.contains_key(&hit.unit_id) {
            self.unit_work
                .insert(hit.unit_id.clone(), hit.work_id.clone());
            self.units
                .entry(hit.work_id.clone())
                .or_default()
                .push(hit.unit_id.clone());
        }

        self.manifestations
            .entry(hit.unit_id.clone())
            .or_default()
            .insert(hit.manifestation_id.clone());

        new_work
    }

    /// All works in rank order
    pub fn works(&self) -> &[String] {
        &self.works
    }

    pub fn work_count(&self) -> usize {
        self.works.len()
    }

    pub fn contains_work(&self, work_id: &str) -> bool {
        self.seen_works.contains(work_id)
    }

    /// Units of a work in first-seen order; empty when every unit seen with
    /// it was already claimed by an earlier work
    pub fn units_for_work(&self, work_id: &str) -> Result<&[String]> {
        self.units
            .get(work_id)
            .map(Vec::as_slice)
            .ok_or_else(|| BibqError::not_found("work", work_id))
    }

    pub fn manifestations_for_unit(&self, unit_id: &str) -> Result<&BTreeSet<String>> {
        self.manifestations
            .get(unit_id)
            .ok_or_else(|| BibqError::not_found("unit", unit_id))
    }

    pub fn work_of_unit(&self, unit_id: &str) -> Result<&str> {
        self.unit_work
            .get(unit_id)
            .map(String::as_str)
            .ok_or_else(|| BibqError::not_found("unit", unit_id))
    }
}
