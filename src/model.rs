// src/model.rs
// =============================================================================
// Data types shared by the crawl engine and its collaborators.
//
// - CrawlConfig: immutable settings for one crawl run
// - PageResult: what we found on one page (keyword counts OR an error)
// - CrawlReport: the final summary handed to the report writer and notifier
//
// The aggregate() function at the bottom turns the raw list of page results
// into a CrawlReport once every traversal task has finished.
// =============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::error::ConfigError;

// Settings for a single crawl run
//
// Built by config::ScannerSettings::to_crawl_config() and shared read-only
// (behind an Arc) by every traversal task.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Seed URL; its host defines the crawl scope
    pub target_url: String,
    /// Keywords to count, matched case-insensitively in this order
    pub keywords: Vec<String>,
    /// Maximum number of link hops from the seed (seed = depth 0)
    pub max_depth: usize,
    /// Upper bound on simultaneous in-flight fetches
    pub max_concurrent: usize,
    /// Timeout applied to every page request
    pub request_timeout: Duration,
    /// Courtesy delay each task sleeps before its fetch
    pub request_interval: Duration,
    pub user_agent: String,
}

impl CrawlConfig {
    // Checks the conditions that must hold before any traversal starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let target = self.target_url.trim();
        if target.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        let parsed = crate::crawl::normalize(target)
            .ok()
            .and_then(|normalized| url::Url::parse(&normalized).ok())
            .ok_or_else(|| ConfigError::InvalidTarget(target.to_string()))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingHost(target.to_string()));
        }

        if self.max_concurrent < 1 {
            return Err(ConfigError::InvalidConcurrency(self.max_concurrent));
        }

        if self.keywords.is_empty() {
            return Err(ConfigError::NoKeywords);
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::BlankKeyword);
        }

        Ok(())
    }
}

/// Keyword hits found in one page body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordHits {
    /// Occurrences per keyword; keywords with zero hits are omitted
    pub counts: BTreeMap<String, usize>,
    /// Keywords with at least one hit, in configuration order
    pub keywords: Vec<String>,
    /// Sum of all counts
    pub total: usize,
}

// Result of visiting one page
//
// A page either produced keyword counts or an error, never both.
// The constructors below are the only way the crawler builds these,
// which keeps that rule in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub url: String,
    pub depth: usize,
    pub keyword_counts: BTreeMap<String, usize>,
    pub keywords: Vec<String>,
    pub total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    pub fn matched(url: String, depth: usize, hits: KeywordHits) -> Self {
        Self {
            url,
            depth,
            keyword_counts: hits.counts,
            keywords: hits.keywords,
            total_count: hits.total,
            error: None,
        }
    }

    pub fn failed(url: String, depth: usize, error: impl ToString) -> Self {
        Self {
            url,
            depth,
            keyword_counts: BTreeMap::new(),
            keywords: Vec::new(),
            total_count: 0,
            error: Some(error.to_string()),
        }
    }

    pub fn is_match(&self) -> bool {
        self.total_count > 0
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary of a whole crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub target_url: String,
    pub keywords: Vec<String>,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    #[serde(serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
    /// Every page that was fetched, including failed fetches
    pub total_pages: usize,
    pub match_pages: usize,
    pub error_count: usize,
    /// Only the pages with at least one keyword hit
    pub results: Vec<PageResult>,
    /// True when the run was stopped before the site was exhausted
    pub cancelled: bool,
}

// Durations are written as human-readable text ("1.532s") in JSON reports
fn serialize_elapsed<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.3?}", elapsed))
}

// Builds the final report from every recorded page result
//
// Pure function: no I/O, no locking. The caller hands over ownership of
// the result list once all traversal tasks have joined.
pub fn aggregate(
    results: Vec<PageResult>,
    config: &CrawlConfig,
    start: DateTime<Local>,
    end: DateTime<Local>,
) -> CrawlReport {
    let total_pages = results.len();
    let error_count = results.iter().filter(|r| r.is_error()).count();
    let matches: Vec<PageResult> = results.into_iter().filter(PageResult::is_match).collect();

    CrawlReport {
        target_url: config.target_url.clone(),
        keywords: config.keywords.clone(),
        start_time: start,
        end_time: end,
        elapsed: (end - start).to_std().unwrap_or_default(),
        total_pages,
        match_pages: matches.len(),
        error_count,
        results: matches,
        cancelled: false,
    }
}
