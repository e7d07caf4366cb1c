use serde::{Deserialize, Serialize};

/// Batch sizing for incremental engine fetches.
///
/// Batches never shrink. Each later batch is sized from the hits-per-work
/// ratio observed so far, growing by at most `growth_cap` per round trip and
/// never past `max_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub max_rows: usize,
    pub growth_cap: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            max_rows: 1000,
            growth_cap: 4,
        }
    }
}

impl PagingConfig {
    pub fn first_batch(&self, target: usize) -> usize {
        target.clamp(1, self.max_rows.max(1))
    }

    /// Size of the next batch.
    ///
    /// `remaining` works are still missing after `hits_fetched` hits yielded
    /// `works_found` distinct works.
    pub fn next_batch(
        &self,
        previous: usize,
        remaining: usize,
        hits_fetched: usize,
        works_found: usize,
    ) -> usize {
        let cap = previous.saturating_mul(self.growth_cap.max(1));
        let estimate = if works_found == 0 {
            cap
        } else {
            remaining.saturating_mul(hits_fetched).div_ceil(works_found)
        };

        estimate.max(previous).min(cap).min(self.max_rows.max(previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_batch_clamped() {
        let paging = PagingConfig::default();
        assert_eq!(paging.first_batch(10), 10);
        assert_eq!(paging.first_batch(0), 1);
        assert_eq!(paging.first_batch(5000), 1000);
    }

    #[test]
    fn test_grows_with_duplication() {
        let paging = PagingConfig::default();
        // 20 hits gave 5 works, 5 more needed: 4 hits per work
        assert_eq!(paging.next_batch(20, 5, 20, 5), 20);
        // 20 hits gave 2 works, 8 more needed
        assert_eq!(paging.next_batch(20, 8, 20, 2), 80);
    }

    #[test]
    fn test_never_shrinks() {
        let paging = PagingConfig::default();
        assert_eq!(paging.next_batch(50, 1, 50, 49), 50);
    }

    #[test]
    fn test_caps() {
        let paging = PagingConfig {
            max_rows: 100,
            growth_cap: 2,
        };
        assert_eq!(paging.next_batch(10, 100, 10, 1), 20);
        assert_eq!(paging.next_batch(10, 100, 10, 0), 20);
        assert_eq!(paging.next_batch(80, 100, 80, 1), 100);
    }
}
