//! The news pipeline.
//!
//! One [`NewsPipeline::fetch_news`] call runs:
//!
//! 1. **Resolve** the selection (empty → the `all` pseudo-source, or
//!    `NoSourceSelected` in strict mode)
//! 2. **Query** every source concurrently, each under its own timeout; a
//!    failing source is logged and skipped
//! 3. **Filter** with the [`QualityFilter`], widening back to the unfiltered
//!    set if nothing survives
//! 4. **Deduplicate**, then **restrict** to the time window
//! 5. **Exclude** URLs already in the [`HistoryLedger`]
//! 6. **Rank** newest first (unknown dates last) and **cap**
//! 7. **Record** what was surfaced
//!
//! When the live path ends with nothing, sample data from [`sample`] is
//! returned instead, so a fetch only ever fails in strict mode.

pub mod dedupe;
pub mod filter;
pub mod ledger;
pub mod recency;
pub mod sample;

use crate::config::{PipelineConfig, SelectionPolicy};
use crate::error::{NewsError, Result};
use crate::models::Article;
use crate::search::{SearchProvider, SearchRequest};
use crate::sources::{SelectionSet, SourceRegistry};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

pub use filter::QualityFilter;
pub use ledger::HistoryLedger;

/// Identifies one fetch. Only the most recent ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Where the returned articles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Live,
    Sample,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub articles: Vec<Article>,
    pub origin: Origin,
    pub ticket: FetchTicket,
    /// Sources whose query failed or timed out.
    pub failed_sources: Vec<String>,
}

pub struct NewsPipeline<P> {
    provider: P,
    filter: QualityFilter,
    config: PipelineConfig,
    generation: AtomicU64,
}

impl<P: std::fmt::Debug> std::fmt::Debug for NewsPipeline<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsPipeline")
            .field("provider", &self.provider)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: SearchProvider> NewsPipeline<P> {
    pub fn new(provider: P, config: PipelineConfig) -> Self {
        Self {
            provider,
            filter: QualityFilter::default(),
            config,
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_filter(mut self, filter: QualityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether `ticket` belongs to the latest fetch. Consumers drop results
    /// of superseded fetches instead of rendering them.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    fn next_ticket(&self) -> FetchTicket {
        FetchTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn requests_for(
        &self,
        selection: &SelectionSet,
        registry: &SourceRegistry,
        window_days: u32,
    ) -> Vec<SearchRequest> {
        selection
            .resolved()
            .into_iter()
            .map(|id| SearchRequest {
                source_name: registry.display_name(&id),
                query: registry.keyword_for(&id),
                max_results: self.config.search_max_results,
                window_days,
                source_id: id,
            })
            .collect()
    }

    #[instrument(level = "info", skip_all, fields(provider = self.provider.name(), window_days = window_days))]
    pub async fn fetch_news(
        &self,
        selection: &SelectionSet,
        registry: &SourceRegistry,
        ledger: &mut HistoryLedger,
        window_days: u32,
    ) -> Result<FetchOutcome> {
        if selection.is_empty() && self.config.selection_policy == SelectionPolicy::Strict {
            return Err(NewsError::NoSourceSelected);
        }
        let ticket = self.next_ticket();
        let t0 = Instant::now();
        let requests = self.requests_for(selection, registry, window_days);
        info!(sources = ?selection.resolved(), "Fetching news");

        let (candidates, failed_sources) = self.query_all(&requests).await;
        let articles = self.refine_at(candidates, window_days, ledger, Utc::now());

        if !articles.is_empty() {
            let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
            if let Err(e) = ledger.record_seen(&urls) {
                warn!(error = %e, "Failed to persist seen ledger");
            }
            info!(
                count = articles.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Fetch finished with live articles"
            );
            return Ok(FetchOutcome {
                articles,
                origin: Origin::Live,
                ticket,
                failed_sources,
            });
        }

        warn!(
            failed = failed_sources.len(),
            "No usable live articles; serving sample data"
        );
        let articles = sample::generate(&requests, window_days, self.config.max_surfaced);
        Ok(FetchOutcome {
            articles,
            origin: Origin::Sample,
            ticket,
            failed_sources,
        })
    }

    /// Run every request, keeping results in request order.
    async fn query_all(&self, requests: &[SearchRequest]) -> (Vec<Article>, Vec<String>) {
        let limit = self.config.query_timeout;
        let results: Vec<(&SearchRequest, Result<Vec<Article>>)> = stream::iter(requests)
            .map(|request| async move {
                let result = match timeout(limit, self.provider.search(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(NewsError::fetch(
                        &request.source_id,
                        format!("timed out after {}ms", limit.as_millis()),
                    )),
                };
                (request, result)
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut candidates = Vec::new();
        let mut failed = Vec::new();
        for (request, result) in results {
            match result {
                Ok(articles) => {
                    debug!(source = %request.source_id, count = articles.len(), "Source answered");
                    candidates.extend(articles);
                }
                Err(e) => {
                    warn!(source = %request.source_id, error = %e, "Source query failed");
                    failed.push(request.source_id.clone());
                }
            }
        }
        (candidates, failed)
    }

    fn apply_quality(&self, candidates: Vec<Article>) -> Result<Vec<Article>> {
        let kept = self.filter.filter(candidates);
        if kept.is_empty() {
            return Err(NewsError::EmptySelectionAfterFilter);
        }
        Ok(kept)
    }

    /// Filter, widen, dedupe, restrict, exclude seen, rank and cap.
    pub fn refine_at(
        &self,
        candidates: Vec<Article>,
        window_days: u32,
        ledger: &HistoryLedger,
        now: DateTime<Utc>,
    ) -> Vec<Article> {
        if candidates.is_empty() {
            return candidates;
        }
        let total = candidates.len();
        let filtered = match self.apply_quality(candidates.clone()) {
            Ok(kept) => kept,
            Err(e) => {
                debug!(reason = %e, "Widening to the unfiltered candidates");
                candidates
            }
        };
        let kept_by_filter = filtered.len();

        let unique = dedupe::dedupe(filtered);
        let recent = recency::restrict_at(unique, window_days, now);
        let mut fresh: Vec<Article> = recent
            .into_iter()
            .filter(|a| ledger.is_new(&a.url))
            .collect();

        fresh.sort_by_key(|a| Reverse(a.publish_time));
        fresh.truncate(self.config.max_surfaced);
        debug!(total, kept_by_filter, surfaced = fresh.len(), "Refined candidates");
        fresh
    }
}
