// src/crawl/fetch.rs
// =============================================================================
// Downloads one page and pulls the anchor hrefs out of it.
//
// How it works:
// 1. GET the URL with our User-Agent (redirects followed up to 10 hops,
//    whatever status comes back last is used as-is)
// 2. If the response isn't HTML, return an empty page (no body, no links)
// 3. Otherwise read the body and collect every <a href="..."> in order
//
// The Fetcher trait is the seam the crawler calls through, so tests can
// swap in an in-memory site without touching the network.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{FetchError, UrlError};

// After this many hops we stop following and use the redirect response itself
const MAX_REDIRECTS: usize = 10;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A downloaded page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// Decoded HTML; empty for non-HTML responses
    pub body: String,
    /// Raw href values in document order
    pub links: Vec<String>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::custom(|attempt| {
                if attempt.previous().len() >= MAX_REDIRECTS {
                    attempt.stop()
                } else {
                    attempt.follow()
                }
            }))
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|source| UrlError::Invalid {
            url: url.to_string(),
            source,
        })?;

        // Error statuses are not failures: a 404 or 500 HTML page is still
        // scanned and its links followed. Only transport problems are errors.
        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(is_html_content_type)
            .unwrap_or(false);
        if !is_html {
            return Ok(FetchedPage::default());
        }

        let body = response.text().await.map_err(FetchError::Body)?;
        let links = extract_links(&body);

        Ok(FetchedPage { body, links })
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

// Returns the raw href of every anchor, in document order
//
// The hrefs are NOT resolved here; the crawler resolves them against the
// page URL so it can drop anchors and special schemes in one place.
pub fn extract_links(html: &str) -> Vec<String> {
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
