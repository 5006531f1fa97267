use crate::crawler::navigator::{ContentMarker, NavigationController};
use crate::crawler::quota::{QuotaExceeded, QuotaGovernor};
use crate::crawler::render::RenderEngine;
use crate::listing::RawDocument;
use crate::output::RunMetrics;
use crate::transport::TransportDescriptor;
use crate::url::substitute_host;
use crate::{FetchError, NavigationError};
use std::time::Instant;

/// Why the ladder stopped without a document
#[derive(Debug)]
pub enum LadderFailure {
    /// Every rung failed; the per-URL error the orchestrator records
    Exhausted(FetchError),

    /// The request budget ran out mid-ladder; ends the whole run phase
    Quota(QuotaExceeded),
}

/// Ordered transport fallback for one URL
///
/// Rungs: proxied (when configured), then direct, then direct against
/// the mobile host. The climb is a small explicit state machine, a
/// rung cursor plus a retry-used flag, so escalation order and
/// exhaustion are independently testable. A timeout retries the same
/// rung once; a block escalates immediately; the ladder is finite, so
/// every URL terminates.
pub struct FallbackLadder {
    steps: Vec<TransportDescriptor>,
    navigator: NavigationController,
    mobile_host: String,
}

impl FallbackLadder {
    /// Builds the default ladder from the resolved proxy transport
    pub fn new(proxy: TransportDescriptor, mobile_host: impl Into<String>) -> Self {
        let mut steps = Vec::new();
        if matches!(proxy, TransportDescriptor::Proxied(_)) {
            steps.push(proxy);
        }
        steps.push(TransportDescriptor::Direct);
        steps.push(TransportDescriptor::Mobile);

        Self {
            steps,
            navigator: NavigationController::new(),
            mobile_host: mobile_host.into(),
        }
    }

    /// The transport sequence this ladder climbs
    pub fn steps(&self) -> &[TransportDescriptor] {
        &self.steps
    }

    /// Fetches one URL, climbing rungs until success or exhaustion
    ///
    /// Every attempt consumes one request from the governor and is
    /// paced by it. Quota exhaustion propagates as a control signal,
    /// not as a fetch failure.
    pub async fn fetch(
        &self,
        engine: &dyn RenderEngine,
        quota: &mut QuotaGovernor,
        metrics: &mut RunMetrics,
        url: &str,
        marker: &ContentMarker,
    ) -> Result<RawDocument, LadderFailure> {
        let mut attempts = 0u32;

        for step in &self.steps {
            let mut retry_used = false;

            loop {
                if quota.exhausted() {
                    return Err(LadderFailure::Quota(QuotaExceeded));
                }
                quota.pace().await;
                quota.try_acquire().map_err(LadderFailure::Quota)?;

                let target = match step {
                    TransportDescriptor::Mobile => substitute_host(url, &self.mobile_host),
                    _ => url.to_string(),
                };

                attempts += 1;
                metrics.record_attempt(step.label());
                tracing::debug!(url = %target, transport = %step, attempt = attempts, "fetching");

                let started = Instant::now();
                match self.navigator.navigate(engine, &target, step, marker).await {
                    Ok(doc) => {
                        metrics.record_fetch_latency(started.elapsed());
                        return Ok(doc);
                    }
                    Err(NavigationError::Blocked { status, .. }) => {
                        metrics.record_blocked();
                        tracing::warn!(
                            url = %target,
                            transport = %step,
                            status,
                            "blocked response, escalating transport"
                        );
                        break;
                    }
                    Err(NavigationError::Timeout { .. }) => {
                        metrics.record_nav_error();
                        if retry_used {
                            tracing::warn!(url = %target, transport = %step, "second timeout, escalating transport");
                            break;
                        }
                        retry_used = true;
                        tracing::debug!(url = %target, transport = %step, "timeout, retrying same transport once");
                    }
                    Err(NavigationError::NonSuccess { status, .. }) => {
                        metrics.record_nav_error();
                        tracing::warn!(
                            url = %target,
                            transport = %step,
                            status,
                            "non-success response, escalating transport"
                        );
                        break;
                    }
                }
            }
        }

        Err(LadderFailure::Exhausted(FetchError::Exhausted {
            url: url.to_string(),
            attempts,
        }))
    }
}
