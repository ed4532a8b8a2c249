// src/notify/webhook.rs
// =============================================================================
// Chat webhook notifier.
//
// Sends one markdown message per crawl:
//   POST <webhook_url>
//   {"msgtype": "markdown", "markdown": {"content": "..."}}
//
// The webhook answers {"errcode": 0, "errmsg": "ok"} on success; any other
// errcode (or a non-2xx status) is reported as an error.
// =============================================================================

use std::fmt::Write;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::Notifier;
use crate::model::CrawlReport;

// Number of matching pages listed in the message
const TOP_RESULTS: usize = 5;
const MAX_URL_DISPLAY: usize = 50;

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

#[derive(Debug, Serialize)]
struct WebhookRequest<'a> {
    msgtype: &'static str,
    markdown: MarkdownMessage<'a>,
}

#[derive(Debug, Serialize)]
struct MarkdownMessage<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WebhookResponse {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook HTTP client")?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, report: &CrawlReport, location: &str) -> Result<()> {
        let content = format_markdown(report, location);
        let request = WebhookRequest {
            msgtype: "markdown",
            markdown: MarkdownMessage { content: &content },
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&request)
            .send()
            .await
            .context("failed to send webhook request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("webhook returned HTTP {}", status));
        }

        let body: WebhookResponse = response
            .json()
            .await
            .context("failed to parse webhook response")?;
        if body.errcode != 0 {
            error!(errcode = body.errcode, errmsg = %body.errmsg, "Webhook rejected message");
            return Err(anyhow!(
                "webhook error: code={}, msg={}",
                body.errcode,
                body.errmsg
            ));
        }

        info!("Webhook notification sent");
        Ok(())
    }
}

fn format_markdown(report: &CrawlReport, location: &str) -> String {
    let mut md = String::new();
    // fmt::Write into a String can't fail
    let _ = write_markdown(&mut md, report, location);
    md
}

fn write_markdown(md: &mut String, report: &CrawlReport, location: &str) -> std::fmt::Result {
    writeln!(md, "## 🔍 KeySpy scan report\n")?;

    writeln!(md, "### Scan")?;
    writeln!(md, "> Target: **{}**", report.target_url)?;
    writeln!(md, "> Keywords: `{}`", report.keywords.join("`, `"))?;
    writeln!(md, "> Started: {}", report.start_time.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(md, "> Elapsed: {:.2?}\n", report.elapsed)?;

    writeln!(md, "### Summary")?;
    if report.match_pages > 0 {
        writeln!(
            md,
            "> <font color=\"warning\">{} page(s) contain keywords</font>",
            report.match_pages
        )?;
    } else {
        writeln!(md, "> <font color=\"info\">No page contains the keywords</font>")?;
    }
    writeln!(md, "> Pages scanned: **{}**", report.total_pages)?;
    writeln!(md, "> Matching pages: **{}**", report.match_pages)?;
    if report.error_count > 0 {
        writeln!(md, "> <font color=\"warning\">Errors: {}</font>", report.error_count)?;
    }
    if report.cancelled {
        writeln!(md, "> <font color=\"warning\">Scan was cancelled, results are partial</font>")?;
    }
    writeln!(md)?;

    if !report.results.is_empty() {
        writeln!(md, "### Top {}", TOP_RESULTS)?;
        for (i, result) in crate::report::by_total_desc(&report.results)
            .into_iter()
            .take(TOP_RESULTS)
            .enumerate()
        {
            writeln!(
                md,
                "{}. [{}]({}) - **{}** hit(s)",
                i + 1,
                truncate_url(&result.url, MAX_URL_DISPLAY),
                result.url,
                result.total_count
            )?;
        }
        if report.results.len() > TOP_RESULTS {
            writeln!(
                md,
                "\n> See the full report for all {} results",
                report.results.len()
            )?;
        }
        writeln!(md)?;
    }

    write!(md, "📄 Report: `{}`", location)
}

// Shortens long URLs for display, counting characters (not bytes) so we
// never cut a multi-byte character in half
fn truncate_url(url: &str, max_len: usize) -> String {
    if url.chars().count() <= max_len {
        return url.to_string();
    }
    let kept: String = url.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}
