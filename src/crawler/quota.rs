use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Control signal raised when a quota ceiling is reached
///
/// Not a fault: the orchestrator treats it as the cue for an ordered
/// transition to the final state, keeping everything already gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaExceeded;

impl fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("request quota exceeded")
    }
}

/// Bounds total requests and pages-per-query; owns inter-request pacing
///
/// Two independent counters: a hard per-run request ceiling consumed by
/// every transport attempt, and a per-query page ceiling consumed by
/// search-page expansion. Pacing draws a uniform random delay from the
/// configured range before each permitted request beyond the first.
#[derive(Debug)]
pub struct QuotaGovernor {
    max_requests: u32,
    requests_used: u32,
    pages_per_query: u32,
    pages_by_query: HashMap<String, u32>,
    delay_min_ms: u64,
    delay_max_ms: u64,
}

impl QuotaGovernor {
    pub fn new(max_requests: u32, pages_per_query: u32, delay_min_ms: u64, delay_max_ms: u64) -> Self {
        Self {
            max_requests,
            requests_used: 0,
            pages_per_query,
            pages_by_query: HashMap::new(),
            delay_min_ms,
            delay_max_ms,
        }
    }

    /// Claims one unit of the per-run request budget
    pub fn try_acquire(&mut self) -> Result<(), QuotaExceeded> {
        if self.requests_used >= self.max_requests {
            return Err(QuotaExceeded);
        }
        self.requests_used += 1;
        Ok(())
    }

    /// Claims one search page for `query` against the per-query ceiling
    ///
    /// Independent of the request budget: a page grant does not consume
    /// a request (the fetch attempts underneath it do).
    pub fn try_acquire_page(&mut self, query: &str) -> Result<(), QuotaExceeded> {
        let used = self.pages_by_query.entry(query.to_string()).or_insert(0);
        if *used >= self.pages_per_query {
            return Err(QuotaExceeded);
        }
        *used += 1;
        Ok(())
    }

    /// Whether the per-run ceiling has been reached
    pub fn exhausted(&self) -> bool {
        self.requests_used >= self.max_requests
    }

    pub fn requests_used(&self) -> u32 {
        self.requests_used
    }

    /// Suspends for the randomized inter-request delay
    ///
    /// No delay before the very first request of the run. The draw
    /// happens before the await so the RNG handle never crosses it.
    pub async fn pace(&self) {
        if self.requests_used == 0 {
            return;
        }
        let delay_ms = if self.delay_max_ms > self.delay_min_ms {
            rand::thread_rng().gen_range(self.delay_min_ms..=self.delay_max_ms)
        } else {
            self.delay_min_ms
        };
        tracing::trace!(delay_ms, "pacing before next request");
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_is_exact() {
        let mut governor = QuotaGovernor::new(5, 3, 0, 0);

        for _ in 0..5 {
            assert!(governor.try_acquire().is_ok());
        }
        assert_eq!(governor.try_acquire(), Err(QuotaExceeded));
        assert_eq!(governor.requests_used(), 5);
        assert!(governor.exhausted());
    }

    #[test]
    fn test_ceiling_independent_of_query_distribution() {
        // The run ceiling binds regardless of how requests spread over
        // queries: 3 pages across two queries plus detail fetches.
        let mut governor = QuotaGovernor::new(4, 10, 0, 0);

        governor.try_acquire_page("L4").unwrap();
        governor.try_acquire().unwrap();
        governor.try_acquire_page("M1").unwrap();
        governor.try_acquire().unwrap();
        governor.try_acquire().unwrap();
        governor.try_acquire().unwrap();

        assert_eq!(governor.try_acquire(), Err(QuotaExceeded));
        // Page grants are still available; only requests ran out
        assert!(governor.try_acquire_page("L4").is_ok());
    }

    #[test]
    fn test_pages_per_query_tracked_separately() {
        let mut governor = QuotaGovernor::new(100, 2, 0, 0);

        assert!(governor.try_acquire_page("L4").is_ok());
        assert!(governor.try_acquire_page("L4").is_ok());
        assert_eq!(governor.try_acquire_page("L4"), Err(QuotaExceeded));

        // A different query has its own page budget
        assert!(governor.try_acquire_page("M1").is_ok());
    }

    #[tokio::test]
    async fn test_no_pacing_before_first_request() {
        let governor = QuotaGovernor::new(10, 3, 60_000, 60_000);

        // Would sleep for a minute if the first-request exemption broke
        tokio::time::timeout(Duration::from_millis(100), governor.pace())
            .await
            .expect("first pace() must return immediately");
    }

    #[tokio::test]
    async fn test_pacing_sleeps_within_range() {
        tokio::time::pause();

        let mut governor = QuotaGovernor::new(10, 3, 50, 100);
        governor.try_acquire().unwrap();

        let start = tokio::time::Instant::now();
        governor.pace().await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed <= Duration::from_millis(101));
    }

    #[tokio::test]
    async fn test_degenerate_range_uses_min() {
        tokio::time::pause();

        let mut governor = QuotaGovernor::new(10, 3, 70, 70);
        governor.try_acquire().unwrap();

        let start = tokio::time::Instant::now();
        governor.pace().await;

        assert!(start.elapsed() >= Duration::from_millis(70));
    }
}
