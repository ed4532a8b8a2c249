// src/service.rs
// =============================================================================
// Drives crawl runs: crawl -> write report -> notify.
//
// Two modes:
// - run_once(): a single run (the `scan` subcommand)
// - run_scheduled(): a run every N seconds until Ctrl-C (the `schedule`
//   subcommand). Settings are re-read before every run, so edits to the
//   config file are picked up without a restart.
//
// A failed notification is logged and ignored; it never fails the run.
// =============================================================================

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cli::ScanOverrides;
use crate::config::Settings;
use crate::crawl::{run_crawl, Fetcher, HttpFetcher};
use crate::model::{CrawlConfig, CrawlReport};
use crate::notify::{self, Notifier};
use crate::report::{FileReportSink, ReportSink};

// Runs one crawl with collaborators built from `settings`
pub async fn run_once(settings: &Settings, cancel: CancellationToken) -> Result<CrawlReport> {
    let config = settings
        .scanner
        .to_crawl_config()
        .context("invalid scanner configuration")?;
    let fetcher = HttpFetcher::new(config.request_timeout, &config.user_agent)
        .context("failed to build HTTP client")?;
    let sink = FileReportSink::new(&settings.output);
    let notifier = notify::from_settings(&settings.notifier)?;

    execute(cancel, config, Arc::new(fetcher), &sink, notifier.as_ref()).await
}

// Crawl, then hand the report to the sink and the notifier
pub async fn execute(
    cancel: CancellationToken,
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    sink: &dyn ReportSink,
    notifier: &dyn Notifier,
) -> Result<CrawlReport> {
    let span = info_span!("scan", run_id = %Uuid::new_v4());

    async move {
        let report = run_crawl(cancel, config, fetcher).await?;

        let location = sink.write(&report).await?;
        info!(
            report_file = %location,
            total_pages = report.total_pages,
            match_pages = report.match_pages,
            "Scan completed successfully"
        );

        if let Err(e) = notifier.notify(&report, &location).await {
            error!(error = %format!("{:#}", e), "Failed to send notification");
        }

        Ok::<_, anyhow::Error>(report)
    }
    .instrument(span)
    .await
}

// Runs a crawl every `every` seconds (or schedule.interval_secs) until
// `cancel` fires
pub async fn run_scheduled(
    config_path: &Path,
    overrides: &ScanOverrides,
    every: Option<u64>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut settings = Settings::load(config_path, overrides)
        .with_context(|| format!("failed to load settings from {}", config_path.display()))?;

    let secs = every.unwrap_or(settings.schedule.interval_secs);
    if secs == 0 {
        return Err(anyhow!("schedule interval must be at least 1 second"));
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if !settings.schedule.run_on_start {
        // the first tick of an interval completes immediately
        ticker.tick().await;
    }

    info!(interval_secs = secs, "Scheduler started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match Settings::load(config_path, overrides) {
            Ok(reloaded) => settings = reloaded,
            Err(e) => warn!(error = %e, "Failed to reload settings, keeping previous ones"),
        }

        info!("Scheduled scan triggered");
        if let Err(e) = run_once(&settings, cancel.child_token()).await {
            error!(error = %format!("{:#}", e), "Scheduled scan failed");
        }

        if cancel.is_cancelled() {
            break;
        }
    }

    info!("Scheduler stopped");
    Ok(())
}
