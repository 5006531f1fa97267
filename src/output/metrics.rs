use std::collections::HashMap;
use std::time::Duration;

/// Process-scoped counters for one run
///
/// Initialized at run start, mutated only by the single worker, and
/// rendered once as the terminal summary line. The summary is the
/// run's sole machine-parseable outcome signal, so its format never
/// changes shape.
#[derive(Debug, Default)]
pub struct RunMetrics {
    attempts: u32,
    attempts_by_transport: HashMap<&'static str, u32>,
    nav_errors: u32,
    blocked_responses: u32,
    listings_found: u32,
    complete: u32,
    incomplete: u32,
    duplicates: u32,
    failed_fetches: u32,
    extraction_failures: u32,
    delivered: u32,
    buffered: u32,
    delivery_failures: u32,
    fetch_time: Duration,
    fetch_samples: u32,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&mut self, transport: &'static str) {
        self.attempts += 1;
        *self.attempts_by_transport.entry(transport).or_insert(0) += 1;
    }

    pub fn record_nav_error(&mut self) {
        self.nav_errors += 1;
    }

    /// A blocked response is also a navigation error for counting
    pub fn record_blocked(&mut self) {
        self.nav_errors += 1;
        self.blocked_responses += 1;
    }

    /// Latency of one successful fetch, folded into the mean
    pub fn record_fetch_latency(&mut self, elapsed: Duration) {
        self.fetch_time += elapsed;
        self.fetch_samples += 1;
    }

    pub fn record_listings_found(&mut self, count: usize) {
        self.listings_found += count as u32;
    }

    pub fn record_complete(&mut self) {
        self.complete += 1;
    }

    pub fn record_incomplete(&mut self) {
        self.incomplete += 1;
    }

    pub fn record_duplicate(&mut self) {
        self.duplicates += 1;
    }

    pub fn record_failed_fetch(&mut self) {
        self.failed_fetches += 1;
    }

    pub fn record_extraction_failure(&mut self) {
        self.extraction_failures += 1;
    }

    pub fn record_delivered(&mut self) {
        self.delivered += 1;
    }

    pub fn record_buffered(&mut self) {
        self.buffered += 1;
    }

    pub fn record_delivery_failure(&mut self) {
        self.delivery_failures += 1;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn attempts_for(&self, transport: &str) -> u32 {
        self.attempts_by_transport.get(transport).copied().unwrap_or(0)
    }

    pub fn blocked_responses(&self) -> u32 {
        self.blocked_responses
    }

    pub fn listings_found(&self) -> u32 {
        self.listings_found
    }

    pub fn complete(&self) -> u32 {
        self.complete
    }

    pub fn duplicates(&self) -> u32 {
        self.duplicates
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    pub fn buffered(&self) -> u32 {
        self.buffered
    }

    /// Failures as the summary counts them: failed fetches plus
    /// incomplete records plus extraction dead ends. Duplicates are
    /// deliberately not in here.
    pub fn failed(&self) -> u32 {
        self.failed_fetches + self.incomplete + self.extraction_failures
    }

    /// Mean fetch latency in whole milliseconds
    pub fn avg_fetch_ms(&self) -> u64 {
        if self.fetch_samples == 0 {
            return 0;
        }
        (self.fetch_time.as_millis() as u64) / (self.fetch_samples as u64)
    }

    /// Complete records over listings found, for the exit-status check
    pub fn completion_rate(&self) -> f64 {
        if self.listings_found == 0 {
            return 1.0;
        }
        f64::from(self.complete) / f64::from(self.listings_found)
    }

    /// The fixed-format terminal summary line
    pub fn summary_line(&self) -> String {
        format!(
            "RUN_COMPLETE listings={} complete={} failed={} avg_ms={}",
            self.listings_found,
            self.complete,
            self.failed(),
            self.avg_fetch_ms()
        )
    }
}
