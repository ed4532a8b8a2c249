// src/report/file.rs
// =============================================================================
// Writes each report to its own timestamped file:
//   <dir>/<prefix>_<YYYYmmdd_HHMMSS>.txt   (text format)
//   <dir>/<prefix>_<YYYYmmdd_HHMMSS>.json  (json format)
//
// Two runs started in the same second never overwrite each other: the
// second one gets a _1 suffix (then _2, ...).
// =============================================================================

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::{text, ReportSink};
use crate::config::{OutputSettings, ReportFormat};
use crate::model::CrawlReport;

#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
    file_prefix: String,
    format: ReportFormat,
}

impl FileReportSink {
    pub fn new(settings: &OutputSettings) -> Self {
        Self {
            dir: settings.dir.clone(),
            file_prefix: settings.file_prefix.clone(),
            format: settings.format,
        }
    }

    fn path_for(&self, report: &CrawlReport, attempt: usize) -> PathBuf {
        let extension = match self.format {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        };
        let timestamp = report.start_time.format("%Y%m%d_%H%M%S");
        let name = if attempt == 0 {
            format!("{}_{}.{}", self.file_prefix, timestamp, extension)
        } else {
            format!("{}_{}_{}.{}", self.file_prefix, timestamp, attempt, extension)
        };
        self.dir.join(name)
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn write(&self, report: &CrawlReport) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create output directory {}", self.dir.display()))?;

        let contents = match self.format {
            ReportFormat::Text => text::render(report),
            ReportFormat::Json => {
                serde_json::to_string_pretty(report).context("failed to serialize report")?
            }
        };

        // create_new fails instead of truncating an existing report
        let mut attempt = 0;
        let (path, mut file) = loop {
            let path = self.path_for(report, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to create report file {}", path.display()))
                }
            }
        };

        file.write_all(contents.as_bytes())
            .await
            .with_context(|| format!("failed to write report file {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("failed to write report file {}", path.display()))?;

        let location = path.display().to_string();
        info!(file_path = %location, "Report generated");
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_config;
    use crate::model::{aggregate, KeywordHits, PageResult};
    use chrono::{Local, TimeZone};

    fn report() -> CrawlReport {
        let config = sample_config("https://example.com/", &["foo"]);
        let mut hits = KeywordHits::default();
        hits.counts.insert("foo".into(), 2);
        hits.keywords.push("foo".into());
        hits.total = 2;
        let start = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap();
        aggregate(
            vec![PageResult::matched("https://example.com/".into(), 0, hits)],
            &config,
            start,
            start,
        )
    }

    fn sink(dir: &std::path::Path, format: ReportFormat) -> FileReportSink {
        FileReportSink::new(&OutputSettings {
            dir: dir.join("nested"),
            file_prefix: "scan".to_string(),
            format,
        })
    }

    #[tokio::test]
    async fn test_writes_text_report() {
        let tmp = tempfile::tempdir().unwrap();

        let location = sink(tmp.path(), ReportFormat::Text)
            .write(&report())
            .await
            .unwrap();

        assert!(location.ends_with("scan_20240301_093005.txt"));
        let contents = std::fs::read_to_string(&location).unwrap();
        assert!(contents.contains("https://example.com/"));
        assert!(contents.contains("Pages with keywords:  1"));
    }

    #[tokio::test]
    async fn test_writes_json_report() {
        let tmp = tempfile::tempdir().unwrap();

        let location = sink(tmp.path(), ReportFormat::Json)
            .write(&report())
            .await
            .unwrap();

        assert!(location.ends_with(".json"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&location).unwrap()).unwrap();
        assert_eq!(json["target_url"], "https://example.com/");
        assert_eq!(json["match_pages"], 1);
        assert_eq!(json["results"][0]["keyword_counts"]["foo"], 2);
        assert!(json["results"][0].get("error").is_none());
    }

    #[tokio::test]
    async fn test_same_second_runs_do_not_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = sink(tmp.path(), ReportFormat::Text);

        let first = sink.write(&report()).await.unwrap();
        let second = sink.write(&report()).await.unwrap();

        assert!(first.ends_with("scan_20240301_093005.txt"));
        assert!(second.ends_with("scan_20240301_093005_1.txt"));
        assert!(std::path::Path::new(&first).exists());
        assert!(std::path::Path::new(&second).exists());
    }
}
