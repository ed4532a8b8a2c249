// src/notify/mod.rs
// =============================================================================
// Tells someone a crawl finished.
//
// Submodules:
// - webhook: posts a markdown summary to a chat webhook
//
// Notification is best effort: the service logs a failed notify() and moves
// on, it never turns it into a crawl failure.
// =============================================================================

mod webhook;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::NotifierSettings;
use crate::model::CrawlReport;

pub use webhook::WebhookNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, report: &CrawlReport, location: &str) -> anyhow::Result<()>;
}

/// Used when notifications are turned off
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, _report: &CrawlReport, _location: &str) -> anyhow::Result<()> {
        debug!("Notifier is disabled, skipping notification");
        Ok(())
    }
}

// Picks the notifier described by the settings
pub fn from_settings(settings: &NotifierSettings) -> anyhow::Result<Box<dyn Notifier>> {
    match (&settings.webhook_url, settings.enabled) {
        (Some(url), true) if !url.trim().is_empty() => Ok(Box::new(WebhookNotifier::new(
            url.trim(),
            Duration::from_millis(settings.timeout_ms),
        )?)),
        _ => Ok(Box::new(DisabledNotifier)),
    }
}
