//! Site signal collector
//!
//! Fetches one page of rendered HTML and derives Track B signals: transport
//! security, social presence, structured data, meta completeness, API docs,
//! integration keywords, and login affordances. Malformed markup degrades
//! the affected extraction to its negative default; it never fails the scan.

use reqwest::Client;
use scraper::{Html, Selector};
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use sr_core::SaasScanResult;
use sr_net::{create_page_client, with_retry, FetchError, HttpConfig, NetError, RetryPolicy};

/// Social-platform hostnames; a link counts when its host equals one of
/// these or is a subdomain of one.
pub const SOCIAL_DOMAINS: &[&str] = &[
    "twitter.com",
    "x.com",
    "github.com",
    "discord.gg",
    "discord.com",
    "linkedin.com",
];

/// Path fragments that mark a link as API documentation.
pub const API_DOC_PATHS: &[&str] = &["/docs", "/api", "/developers"];

/// Integration keywords scanned case-insensitively over the page text.
pub const INTEGRATION_KEYWORDS: &[&str] = &["sdk", "webhook", "zapier", "plugin"];

/// Phrases in button/link text that signal a login or signup affordance.
pub const LOGIN_PHRASES: &[&str] = &[
    "login",
    "log in",
    "sign in",
    "sign up",
    "get started",
    "create account",
    "start free",
];

/// Cap on stored page text; keyword scans run before truncation.
const MAX_CONTENT_LENGTH: usize = 20_000;

/// Collector configuration
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    pub http: HttpConfig,
    pub retry: RetryPolicy,
}

/// Collector for hosted-site signals
pub struct SiteCollector {
    client: Client,
    policy: RetryPolicy,
}

impl SiteCollector {
    pub fn new(config: SiteConfig) -> Result<Self, NetError> {
        Ok(Self {
            client: create_page_client(&config.http)?,
            policy: config.retry,
        })
    }

    /// Scan one URL. Fails only when the page is unreachable after retries
    /// or the URL itself is invalid; everything past the fetch degrades
    /// per-signal.
    pub async fn scan(
        &self,
        url: &str,
        deadline: Option<Instant>,
    ) -> Result<SaasScanResult, NetError> {
        Url::parse(url).map_err(|e| NetError::InvalidUrl(e.to_string()))?;

        let (final_url, html) = self.fetch_page(url, deadline).await?;
        debug!("Fetched {} ({} bytes of HTML)", final_url, html.len());

        Ok(extract_signals(&html, &final_url))
    }

    async fn fetch_page(
        &self,
        url: &str,
        deadline: Option<Instant>,
    ) -> Result<(Url, String), NetError> {
        with_retry(&self.policy, deadline, url, || {
            let client = &self.client;
            async move {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| FetchError::Transient(e.to_string()))?;

                let status = response.status();
                if status.is_server_error() {
                    return Err(FetchError::Transient(format!("status {status}")));
                }
                if !status.is_success() {
                    // Client errors still carry a body worth scanning;
                    // extraction will simply find little in it.
                    warn!("Page {} returned status {}", url, status);
                }

                let final_url = response.url().clone();
                let body = response
                    .text()
                    .await
                    .map_err(|e| FetchError::Transient(e.to_string()))?;
                Ok((final_url, body))
            }
        })
        .await
    }
}

/// Derive every Track B signal from the page HTML and its final resolved
/// URL. Pure and synchronous; the parsed DOM never crosses an await.
pub fn extract_signals(html: &str, final_url: &Url) -> SaasScanResult {
    let document = Html::parse_document(html);
    let mut result = SaasScanResult::empty();

    result.https_valid = final_url.scheme() == "https";
    // Certificate windows are not observable through the pooled client;
    // 0 is the documented "unknown" value.
    result.ssl_valid_months = 0;

    extract_meta(&document, &mut result);
    extract_json_ld(&document, &mut result);
    extract_links(&document, final_url, &mut result);
    extract_login(&document, &mut result);

    let text = extract_page_text(&document);
    let lowered = text.to_lowercase();
    result.integration_keywords = INTEGRATION_KEYWORDS
        .iter()
        .filter(|k| lowered.contains(*k))
        .map(|k| k.to_string())
        .collect();
    result.has_integration_keywords = !result.integration_keywords.is_empty();
    result.page_content = truncate_text(text);

    result
}

fn extract_meta(document: &Html, result: &mut SaasScanResult) {
    let title_sel = Selector::parse("title").unwrap();
    let desc_sel = Selector::parse(r#"meta[name="description"]"#).unwrap();
    let h1_sel = Selector::parse("h1").unwrap();
    let og_title_sel = Selector::parse(r#"meta[property="og:title"]"#).unwrap();
    let og_image_sel = Selector::parse(r#"meta[property="og:image"]"#).unwrap();

    result.meta_title = document
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    result.meta_description = document
        .select(&desc_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    result.has_h1 = document.select(&h1_sel).next().is_some();
    result.has_basic_meta =
        result.meta_title.is_some() && result.meta_description.is_some() && result.has_h1;

    result.og_title = document
        .select(&og_title_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string);
    result.og_image = document
        .select(&og_image_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string);
    result.has_og_tags = result.og_title.is_some() && result.og_image.is_some();
}

fn extract_json_ld(document: &Html, result: &mut SaasScanResult) {
    let sel = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();

    for script in document.select(&sel) {
        let body = script.text().collect::<String>();
        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => {
                result.has_json_ld = true;
                if result.json_ld_content.is_none() {
                    result.json_ld_content = Some(value);
                }
            }
            Err(e) => {
                // Broken structured data on one block must not abort the scan
                debug!("Skipping malformed JSON-LD block: {}", e);
            }
        }
    }
}

fn extract_links(document: &Html, base: &Url, result: &mut SaasScanResult) {
    let link_sel = Selector::parse("a").unwrap();
    let mut seen_social = std::collections::HashSet::new();

    for element in document.select(&link_sel) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };

        if let Some(host) = resolved.host_str() {
            if is_social_host(host) {
                let full = resolved.to_string();
                if seen_social.insert(full.clone()) {
                    result.social_links.push(full);
                }
            }
        }

        if !result.has_api_docs_path {
            let path = resolved.path();
            if API_DOC_PATHS.iter().any(|p| path.contains(p)) {
                result.has_api_docs_path = true;
                result.api_docs_url = Some(resolved.to_string());
            }
        }
    }
}

fn extract_login(document: &Html, result: &mut SaasScanResult) {
    let sel = Selector::parse("a, button").unwrap();

    result.has_login_button = document.select(&sel).any(|el| {
        let text = el.text().collect::<String>().to_lowercase();
        LOGIN_PHRASES.iter().any(|p| text.contains(p))
    });
}

fn is_social_host(host: &str) -> bool {
    let host = host.to_lowercase();
    SOCIAL_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

/// Visible page text: every text node outside script/style/noscript
/// subtrees, whitespace-normalized.
fn extract_page_text(document: &Html) -> String {
    use scraper::node::Node;

    let body_sel = Selector::parse("body").unwrap();
    let Some(body) = document.select(&body_sel).next() else {
        return String::new();
    };

    let mut parts = Vec::new();
    for node_ref in body.descendants() {
        if let Node::Text(text_node) = node_ref.value() {
            let in_excluded = node_ref.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map(|el| matches!(el.name(), "script" | "style" | "noscript"))
                    .unwrap_or(false)
            });

            if !in_excluded {
                let trimmed = text_node.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
        }
    }

    parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_text(text: String) -> String {
    if text.len() <= MAX_CONTENT_LENGTH {
        return text;
    }
    let mut cut = MAX_CONTENT_LENGTH;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text[..cut].to_string()
}
