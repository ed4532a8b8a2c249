// src/report/mod.rs
// =============================================================================
// This module writes finished crawl reports somewhere a human can read them.
//
// Submodules:
// - text: the plain-text layout
// - file: FileReportSink, writes text or JSON files into the output dir
//
// The crawl engine never calls this module; the service hands it the
// CrawlReport after the run.
// =============================================================================

mod file;
mod text;

use async_trait::async_trait;

use crate::model::CrawlReport;

pub use file::FileReportSink;
pub use text::by_total_desc;

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persists the report and returns where it was written
    async fn write(&self, report: &CrawlReport) -> anyhow::Result<String>;
}
