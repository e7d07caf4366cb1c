//! Result assembly
//!
//! The engine returns flat hits at manifestation or unit granularity. The
//! assembler pages through them in growing batches, grouping hits into works
//! until enough distinct works are known to serve the requested page. How
//! many hits that takes is unknown up front, since one work may own many
//! hits.

pub mod batch;
pub mod hierarchy;

pub use batch::PagingConfig;
pub use hierarchy::ResultHierarchy;

use crate::engine::{EngineRequest, IndexEngine, TrackingId};
use crate::error::Result;
use crate::profile::Profile;
use crate::query::compiler::CompiledQuery;
use tracing::debug;

/// Requested window of works
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based position of the first work
    pub start: usize,
    pub page_size: usize,
    /// Fold in hits outside the profile's visible collections
    pub all_objects: bool,
}

impl PageRequest {
    pub fn new(start: usize, page_size: usize) -> Self {
        Self {
            start,
            page_size,
            all_objects: true,
        }
    }

    pub fn with_all_objects(mut self, all_objects: bool) -> Self {
        self.all_objects = all_objects;
        self
    }

    /// Number of distinct works needed to serve the page
    pub fn target(&self) -> usize {
        self.start.saturating_add(self.page_size).saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub round_trips: usize,
    pub hits_seen: usize,
    pub hits_skipped: usize,
}

/// Outcome of one `fetch_works` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    /// Work ids of the requested page, in rank order
    pub works: Vec<String>,
    pub hierarchy: ResultHierarchy,
    pub stats: AssemblyStats,
}

/// Pages a compiled query through an engine and groups the hits
#[derive(Debug)]
pub struct ResultAssembler<E> {
    engine: E,
    paging: PagingConfig,
}

impl<E: IndexEngine> ResultAssembler<E> {
    pub fn new(engine: E, paging: PagingConfig) -> Self {
        Self { engine, paging }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Fetch the works at `[start, start + page_size)` (1-based).
    ///
    /// Any engine failure aborts the whole call. Pages past the end of the
    /// result set come back empty.
    pub fn fetch_works(
        &self,
        query: &CompiledQuery,
        profile: &Profile,
        page: PageRequest,
        tracking: TrackingId,
    ) -> Result<Assembly> {
        let mut assembly = Assembly::default();
        if page.start == 0 || page.page_size == 0 {
            return Ok(assembly);
        }

        let target = page.target();
        let rendered = query.render();
        let sort = query.render_sort();
        let mut tracking = tracking;
        let mut offset = 0;
        let mut rows = self.paging.first_batch(target);

        loop {
            let request = EngineRequest {
                query: rendered.clone(),
                sort: sort.clone(),
                offset,
                rows,
                tracking: tracking.clone(),
            };
            let result = self.engine.search(&request)?;
            assembly.stats.round_trips += 1;
            tracking = tracking.next();

            let received = result.hits.len();
            for hit in &result.hits {
                assembly.stats.hits_seen += 1;
                if !page.all_objects && !profile.admits(&hit.collections) {
                    assembly.stats.hits_skipped += 1;
                    debug!(work = %hit.work_id, manifestation = %hit.manifestation_id, "skipping hit outside profile");
                    continue;
                }
                assembly.hierarchy.insert(hit);
            }
            offset += received;

            let found = assembly.hierarchy.work_count();
            debug!(
                tracking = %request.tracking,
                offset = request.offset,
                rows,
                received,
                total = result.total,
                works = found,
                "engine round trip"
            );

            if found >= target || received == 0 || received < rows || offset >= result.total {
                break;
            }

            let next = self.paging.next_batch(rows, target - found, offset, found);
            if next != rows {
                debug!(from = rows, to = next, "growing batch");
            }
            rows = next;
        }

        let works = assembly.hierarchy.works();
        let first = page.start - 1;
        if first < works.len() {
            let last = first.saturating_add(page.page_size).min(works.len());
            assembly.works = works[first..last].to_vec();
        }
        Ok(assembly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldCatalog;
    use crate::engine::{EnginePage, Hit, MemoryEngine};
    use crate::error::BibqError;
    use crate::profile::{ProfileMetadata, SourceMetadata};
    use crate::query::{compile, parse_cql};

    fn query() -> CompiledQuery {
        let catalog = FieldCatalog::default();
        compile(&parse_cql("harry").unwrap(), &catalog, &Profile::unrestricted()).unwrap()
    }

    fn scenario_hits() -> Vec<Hit> {
        vec![
            Hit::new("W1", "U1", "M1"),
            Hit::new("W1", "U2", "M2"),
            Hit::new("W2", "U3", "M3"),
            Hit::new("W3", "U4", "M4"),
        ]
    }

    fn fetch(engine: &MemoryEngine, page: PageRequest) -> Assembly {
        ResultAssembler::new(engine, PagingConfig::default())
            .fetch_works(&query(), &Profile::unrestricted(), page, TrackingId::new("t"))
            .unwrap()
    }

    #[test]
    fn test_first_page_groups_duplicates() {
        let engine = MemoryEngine::new(scenario_hits());
        let assembly = fetch(&engine, PageRequest::new(1, 2));

        assert_eq!(assembly.works, vec!["W1", "W2"]);
        assert_eq!(assembly.hierarchy.units_for_work("W1").unwrap(), ["U1", "U2"]);
        assert_eq!(assembly.stats.round_trips, 2);

        let requests = engine.requests();
        assert_eq!(requests[0].rows, 2);
        assert_eq!(requests[1].offset, 2);
        assert_eq!(requests[1].tracking.to_string(), "t:1");
    }

    #[test]
    fn test_second_page() {
        let engine = MemoryEngine::new(scenario_hits());
        let assembly = fetch(&engine, PageRequest::new(3, 2));
        assert_eq!(assembly.works, vec!["W3"]);
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let engine = MemoryEngine::new(scenario_hits());
        let assembly = fetch(&engine, PageRequest::new(10, 5));
        assert!(assembly.works.is_empty());
        assert_eq!(assembly.hierarchy.work_count(), 3);

        let none = fetch(&engine, PageRequest::new(1, 0));
        assert!(none.works.is_empty());
        assert_eq!(none.stats.round_trips, 0);
    }

    #[test]
    fn test_huge_start_is_empty() {
        let engine = MemoryEngine::new(scenario_hits());
        assert_eq!(PageRequest::new(usize::MAX, 2).target(), usize::MAX - 1);
        let assembly = fetch(&engine, PageRequest::new(usize::MAX, 2));
        assert!(assembly.works.is_empty());
        assert_eq!(assembly.hierarchy.work_count(), 3);
    }

    #[test]
    fn test_work_reached_only_through_claimed_unit() {
        let hits = vec![
            Hit::new("W1", "U1", "M1"),
            Hit::new("W2", "U1", "M2"),
            Hit::new("W3", "U3", "M3"),
        ];
        let engine = MemoryEngine::new(hits);
        let assembly = fetch(&engine, PageRequest::new(1, 3));
        assert_eq!(assembly.works, vec!["W1", "W2", "W3"]);
        assert!(assembly.hierarchy.units_for_work("W2").unwrap().is_empty());
        assert_eq!(assembly.hierarchy.units_for_work("W1").unwrap(), ["U1"]);
    }

    #[test]
    fn test_empty_result() {
        let engine = MemoryEngine::new(Vec::new());
        let assembly = fetch(&engine, PageRequest::new(1, 10));
        assert!(assembly.works.is_empty());
        assert_eq!(assembly.stats.round_trips, 1);
    }

    #[test]
    fn test_engine_failure_aborts() {
        let engine = MemoryEngine::new(scenario_hits()).failing_after(1);
        let err = ResultAssembler::new(&engine, PagingConfig::default())
            .fetch_works(
                &query(),
                &Profile::unrestricted(),
                PageRequest::new(1, 3),
                TrackingId::new("t"),
            )
            .unwrap_err();
        assert!(matches!(err, BibqError::Engine(_)));
    }

    #[test]
    fn test_all_objects_false_skips_foreign_hits() {
        let hits = vec![
            Hit::new("W1", "U1", "M1").in_collection("other"),
            Hit::new("W2", "U2", "M2").in_collection("mine"),
            Hit::new("W3", "U3", "M3").in_collection("mine"),
        ];
        let engine = MemoryEngine::new(hits);
        let profile = Profile::compile(
            &ProfileMetadata {
                name: "p".to_string(),
                sources: vec![SourceMetadata::searchable("mine")],
            },
            &FieldCatalog::default(),
        );
        let assembler = ResultAssembler::new(&engine, PagingConfig::default());

        let filtered = assembler
            .fetch_works(
                &query(),
                &profile,
                PageRequest::new(1, 2).with_all_objects(false),
                TrackingId::new("t"),
            )
            .unwrap();
        assert_eq!(filtered.works, vec!["W2", "W3"]);
        assert_eq!(filtered.stats.hits_skipped, 1);

        let all = assembler
            .fetch_works(&query(), &profile, PageRequest::new(1, 2), TrackingId::new("t"))
            .unwrap();
        assert_eq!(all.works, vec!["W1", "W2"]);
    }

    /// Engine that keeps returning full pages past its reported total
    struct Bottomless;

    impl IndexEngine for Bottomless {
        fn search(&self, request: &EngineRequest) -> Result<EnginePage> {
            let hits = (0..request.rows)
                .map(|i| Hit::new("W1", &format!("U{}", request.offset + i), "M"))
                .collect();
            Ok(EnginePage { hits, total: 50 })
        }
    }

    #[test]
    fn test_stops_at_reported_total() {
        let assembler = ResultAssembler::new(Bottomless, PagingConfig::default());
        let assembly = assembler
            .fetch_works(
                &query(),
                &Profile::unrestricted(),
                PageRequest::new(1, 5),
                TrackingId::new("t"),
            )
            .unwrap();
        assert_eq!(assembly.works, vec!["W1"]);
        assert!(assembly.stats.hits_seen >= 50);
    }
}
