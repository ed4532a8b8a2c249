// src/crawl/orchestrator.rs
// =============================================================================
// The crawl driver.
//
// Every discovered (url, depth) pair becomes its own tokio task:
// 1. Stop if depth > max_depth
// 2. Normalize the URL (drop it if it doesn't parse)
// 3. Claim it in the visited registry (drop it if someone else did)
// 4. Stop if it's on another host (it stays claimed, so it is never retried)
// 5. Wait for a fetch permit
// 6. Sleep the courtesy delay
// 7. Fetch: on error record the error, on success count keywords
// 8. Spawn a child task at depth + 1 for every followable link
//
// A TaskTracker counts every spawned task (including tasks spawned by tasks),
// so run_crawl() can wait until the whole site is exhausted.
//
// Cancellation: a single CancellationToken is checked at every suspension
// point (permit, delay, fetch). Whatever was recorded before it fired still
// ends up in the report.
// =============================================================================

use std::sync::Arc;

use chrono::Local;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::fetch::Fetcher;
use super::matcher::KeywordMatcher;
use super::registry::{ConcurrencyLimiter, ResultLog, VisitedRegistry};
use super::urls::{is_in_scope, normalize, resolve_link};
use crate::error::ConfigError;
use crate::model::{aggregate, CrawlConfig, CrawlReport, PageResult};

// Runs one complete crawl and returns its report
//
// Fails only when `config` is invalid; every per-page problem ends up in
// the report instead. A cancelled run returns a partial report with
// `cancelled` set.
pub async fn run_crawl(
    cancel: CancellationToken,
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
) -> Result<CrawlReport, ConfigError> {
    config.validate()?;
    let matcher = KeywordMatcher::new(&config.keywords)?;

    let start = Local::now();
    info!(
        target_url = %config.target_url,
        keywords = ?config.keywords,
        max_depth = config.max_depth,
        max_concurrent = config.max_concurrent,
        "Starting crawl"
    );

    let crawl = Arc::new(Crawl {
        limiter: ConcurrencyLimiter::new(config.max_concurrent),
        registry: VisitedRegistry::new(),
        results: ResultLog::default(),
        tracker: TaskTracker::new(),
        config,
        matcher,
        fetcher,
        cancel,
    });

    let seed = crawl.config.target_url.clone();
    crawl.tracker.spawn(crawl.clone().traverse(seed, 0));

    // close() only marks the tracker as "no more top-level spawns": tasks
    // may still spawn children, and wait() returns once all of them exit.
    crawl.tracker.close();
    crawl.tracker.wait().await;

    let end = Local::now();
    let mut report = aggregate(crawl.results.take(), &crawl.config, start, end);
    report.cancelled = crawl.cancel.is_cancelled();

    if report.cancelled {
        warn!(
            total_pages = report.total_pages,
            "Crawl cancelled, report contains partial results"
        );
    }
    info!(
        total_pages = report.total_pages,
        match_pages = report.match_pages,
        error_count = report.error_count,
        claimed_urls = crawl.registry.len(),
        elapsed = ?report.elapsed,
        "Crawl completed"
    );

    Ok(report)
}

// Per-run state shared by every traversal task
struct Crawl {
    config: CrawlConfig,
    matcher: KeywordMatcher,
    fetcher: Arc<dyn Fetcher>,
    registry: VisitedRegistry,
    limiter: ConcurrencyLimiter,
    results: ResultLog,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl Crawl {
    // Boxed because the task spawns more tasks of the same type
    fn traverse(self: Arc<Self>, url: String, depth: usize) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if depth > self.config.max_depth || self.cancel.is_cancelled() {
                return;
            }

            let url = match normalize(&url) {
                Ok(url) => url,
                Err(e) => {
                    debug!(error = %e, "Dropping invalid URL");
                    return;
                }
            };

            if !self.registry.claim_if_new(&url) {
                return;
            }

            if !is_in_scope(&url, &self.config.target_url) {
                debug!(url = %url, "Skipping out-of-scope URL");
                return;
            }

            let Some(links) = self.visit(&url, depth).await else {
                return;
            };

            for link in links {
                if let Some(child) = resolve_link(&url, &link) {
                    self.tracker.spawn(self.clone().traverse(child, depth + 1));
                }
            }
        })
    }

    // Fetches and records one page; returns its links on success
    async fn visit(&self, url: &str, depth: usize) -> Option<Vec<String>> {
        let _permit = self.limiter.acquire(&self.cancel).await?;

        if !self.config.request_interval.is_zero() {
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.config.request_interval) => {}
            }
        }

        debug!(url = %url, depth, "Crawling page");

        let fetched = tokio::select! {
            _ = self.cancel.cancelled() => return None,
            fetched = self.fetcher.fetch(url) => fetched,
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, depth, error = %e, "Failed to fetch page");
                self.results.push(PageResult::failed(url.to_string(), depth, e));
                return None;
            }
        };

        let hits = self.matcher.find(&page.body);
        if hits.total > 0 {
            info!(
                url = %url,
                keywords = ?hits.keywords,
                total_count = hits.total,
                "Found keywords"
            );
        }
        self.results.push(PageResult::matched(url.to_string(), depth, hits));

        Some(page.links)
    }
}
