use crate::config::{validate, Config, SearchQuery};
use crate::crawler::ladder::{FallbackLadder, LadderFailure};
use crate::crawler::navigator::ContentMarker;
use crate::crawler::quota::{QuotaExceeded, QuotaGovernor};
use crate::crawler::render::RenderEngine;
use crate::extract::{extract_listing, extract_listing_refs};
use crate::listing::{Deduper, ListingRef, ValidationOutcome};
use crate::output::{Delivery, Emitter, RunMetrics};
use crate::transport::TransportDescriptor;
use std::collections::HashSet;

/// Run phases, entered strictly in order
///
/// No state is ever skipped: quota exhaustion forces an ordered
/// transition to `Done` rather than an abrupt halt, which is what
/// guarantees the summary line is always produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    CrawlingSearch,
    FetchingDetail,
    Done,
}

/// Run-scoped mutable state, constructed at run start
///
/// One context object passed by reference through the pipeline instead
/// of process-wide globals; its lifecycle is bounded to one run.
pub struct RunContext {
    pub quota: QuotaGovernor,
    pub deduper: Deduper,
    pub metrics: RunMetrics,
}

/// Sequences the whole run: search crawl, detail fetch, validate, emit
pub struct Coordinator<E: RenderEngine> {
    config: Config,
    engine: E,
    ladder: FallbackLadder,
    emitter: Emitter,
    state: RunState,
}

impl<E: RenderEngine> Coordinator<E> {
    /// INIT: validates configuration and wires the pipeline
    pub fn new(config: Config, engine: E, proxy: TransportDescriptor) -> crate::Result<Self> {
        validate(&config)?;

        let ladder = FallbackLadder::new(proxy, &config.mobile_host);
        let emitter = Emitter::new(config.sink_url.clone(), &config.buffer_path);

        Ok(Self {
            config,
            engine,
            ladder,
            emitter,
            state: RunState::Init,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the full state machine and returns the final metrics
    ///
    /// Per-URL errors never escape: they are recorded and the run
    /// moves to the next item. The summary line is printed in `Done`
    /// unconditionally.
    pub async fn run(&mut self) -> RunMetrics {
        let mut context = RunContext {
            quota: QuotaGovernor::new(
                self.config.max_requests_per_run,
                self.config.pages_per_query,
                self.config.delay_min_ms,
                self.config.delay_max_ms,
            ),
            deduper: Deduper::new(),
            metrics: RunMetrics::new(),
        };

        self.transition(RunState::CrawlingSearch);
        let refs = self.crawl_search(&mut context).await;

        self.transition(RunState::FetchingDetail);
        self.fetch_details(&mut context, refs).await;

        self.transition(RunState::Done);
        tracing::info!(
            attempts = context.metrics.attempts(),
            blocked = context.metrics.blocked_responses(),
            duplicates = context.metrics.duplicates(),
            delivered = context.metrics.delivered(),
            buffered = context.metrics.buffered(),
            "run finished"
        );
        println!("{}", context.metrics.summary_line());

        context.metrics
    }

    fn transition(&mut self, to: RunState) {
        tracing::info!(from = ?self.state, to = ?to, "state transition");
        self.state = to;
    }

    /// CRAWLING_SEARCH: expand each query's result pages into refs
    async fn crawl_search(&self, context: &mut RunContext) -> Vec<ListingRef> {
        let mut refs: Vec<ListingRef> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        'queries: for raw_query in &self.config.queries {
            let query = SearchQuery::new(raw_query, self.config.pages_per_query);

            for page in 1..=query.pages {
                if context.quota.exhausted() {
                    tracing::info!("request quota exhausted, stopping search expansion");
                    break 'queries;
                }
                if context.quota.try_acquire_page(&query.query).is_err() {
                    tracing::debug!(query = %query.query, "page budget spent for query");
                    break;
                }

                let page_url = query.page_url(&self.config.search_host, page);
                let fetched = self
                    .ladder
                    .fetch(
                        &self.engine,
                        &mut context.quota,
                        &mut context.metrics,
                        &page_url,
                        &ContentMarker::search(),
                    )
                    .await;

                match fetched {
                    Ok(doc) => {
                        let mut found = 0usize;
                        for listing_ref in extract_listing_refs(&doc.body, &page_url) {
                            if seen_urls.insert(listing_ref.url.clone()) {
                                refs.push(listing_ref);
                                found += 1;
                            }
                        }
                        context.metrics.record_listings_found(found);
                        tracing::info!(page = %page_url, found, "search page crawled");
                    }
                    Err(LadderFailure::Quota(QuotaExceeded)) => {
                        tracing::info!("request quota exhausted mid-search, stopping expansion");
                        break 'queries;
                    }
                    Err(LadderFailure::Exhausted(error)) => {
                        context.metrics.record_failed_fetch();
                        tracing::warn!(page = %page_url, %error, "search page failed, continuing");
                    }
                }
            }
        }

        tracing::info!(total = refs.len(), "search crawl collected listing refs");
        refs
    }

    /// FETCHING_DETAIL: process refs in discovery order
    async fn fetch_details(&self, context: &mut RunContext, refs: Vec<ListingRef>) {
        for listing_ref in refs {
            if context.quota.exhausted() {
                tracing::info!("request quota exhausted, stopping detail fetching");
                break;
            }
            if self.process_ref(context, &listing_ref).await.is_err() {
                break;
            }
        }
    }

    /// One ref through fetch -> extract -> validate -> emit
    ///
    /// This is the per-URL error boundary: everything except quota
    /// exhaustion is recorded here and swallowed.
    async fn process_ref(
        &self,
        context: &mut RunContext,
        listing_ref: &ListingRef,
    ) -> std::result::Result<(), QuotaExceeded> {
        let doc = match self
            .ladder
            .fetch(
                &self.engine,
                &mut context.quota,
                &mut context.metrics,
                &listing_ref.url,
                &ContentMarker::detail(),
            )
            .await
        {
            Ok(doc) => doc,
            Err(LadderFailure::Quota(exceeded)) => return Err(exceeded),
            Err(LadderFailure::Exhausted(error)) => {
                context.metrics.record_failed_fetch();
                tracing::warn!(url = %listing_ref.url, %error, "detail fetch failed, continuing");
                return Ok(());
            }
        };

        let candidate = match extract_listing(&doc) {
            Ok(candidate) => candidate,
            Err(error) => {
                context.metrics.record_extraction_failure();
                tracing::warn!(url = %listing_ref.url, %error, "extraction failed, continuing");
                return Ok(());
            }
        };

        match context.deduper.check(candidate) {
            ValidationOutcome::Complete(record) => {
                context.metrics.record_complete();
                match self.emitter.emit(&record).await {
                    Ok(Delivery::Sent) => context.metrics.record_delivered(),
                    Ok(Delivery::Buffered { after_failure }) => {
                        context.metrics.record_buffered();
                        if after_failure {
                            context.metrics.record_delivery_failure();
                        }
                    }
                    Err(error) => {
                        context.metrics.record_delivery_failure();
                        tracing::error!(url = %record.url, %error, "record could not be delivered or buffered");
                    }
                }
            }
            ValidationOutcome::Incomplete { record, missing } => {
                context.metrics.record_incomplete();
                tracing::info!(
                    url = %record.url,
                    missing = ?missing,
                    "incomplete record, not emitted"
                );
            }
            ValidationOutcome::Duplicate(key) => {
                context.metrics.record_duplicate();
                tracing::debug!(url = %key.url, "duplicate listing suppressed");
            }
        }

        Ok(())
    }
}
