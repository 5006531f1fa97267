//! Crawl pipeline: rendering, navigation, fallback, quota, orchestration
//!
//! This module contains the resilient fetch machinery and the run
//! orchestrator that sequences search-page crawl, detail fetch,
//! extraction, validation and emission.

mod coordinator;
mod ladder;
mod navigator;
mod quota;
mod render;

pub use coordinator::{Coordinator, RunContext, RunState};
pub use ladder::{FallbackLadder, LadderFailure};
pub use navigator::{BlockClassifier, ContentMarker, DefaultBlockClassifier, NavigationController};
pub use quota::{QuotaExceeded, QuotaGovernor};
pub use render::{HttpRenderer, RenderEngine, RenderWait, Rendering};

use crate::config::Config;
use crate::output::RunMetrics;
use crate::transport::resolve_proxy;

/// Runs a complete scrape with the production HTTP renderer
///
/// Resolves the proxy transport once, wires the engine and the
/// coordinator, and drives the state machine to completion. The
/// returned metrics carry the completion rate the binary uses for its
/// exit-status decision.
pub async fn run_scrape(config: Config) -> crate::Result<RunMetrics> {
    let proxy = resolve_proxy(config.proxy_spec.as_deref());
    let engine = HttpRenderer::new(&proxy)?;
    let mut coordinator = Coordinator::new(config, engine, proxy)?;
    Ok(coordinator.run().await)
}
