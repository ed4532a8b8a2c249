// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Features:
// - Concurrent traversal: one tokio task per discovered URL
// - Same-host restriction (never leaves the target website)
// - Configurable depth limit and fetch concurrency
// - Every normalized URL is fetched at most once per run
// - Case-insensitive keyword counting on every fetched page
//
// Submodules:
// - urls: normalization, scoping and link resolution
// - fetch: HTTP GET + anchor extraction behind the Fetcher trait
// - matcher: keyword counting
// - registry: visited set, permit pool and result list
// - orchestrator: the traversal itself and the run_crawl() entry point
// =============================================================================

mod fetch;
mod matcher;
mod orchestrator;
mod registry;
mod urls;

pub use fetch::{Fetcher, HttpFetcher};
pub use orchestrator::run_crawl;
pub use urls::normalize;
