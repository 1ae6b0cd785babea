use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, redirect::Policy, Client};
use ego_tree::NodeRef;
use scraper::{node::Node, Html};
use url::Url;

use crate::config::AppConfig;
use crate::error::AppError;

/// Upper bound on normalized page text so extraction cost stays predictable.
pub const MAX_CLEAN_TEXT_CHARS: usize = 12_000;

/// Job boards routinely serve stripped-down pages to unknown clients, so the
/// fetcher identifies as a desktop browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Markup subtrees that never carry posting content.
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "nav", "header", "footer", "aside", "noscript", "iframe", "svg",
    "form", "button",
];

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub clean_text: String,
    pub final_url: String,
}

/// Retrieves a posting URL and normalizes it to clean text. A trait so tests
/// can substitute a canned page for the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AppError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .redirect(Policy::limited(config.fetch_max_redirects))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AppError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| AppError::FetchFailed {
                status: err.status().map(|status| status.as_u16()),
                cause: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchFailed {
                status: Some(status.as_u16()),
                cause: format!("server answered with status {status}"),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_text_content(&content_type) {
            return Err(AppError::FetchFailed {
                status: Some(status.as_u16()),
                cause: format!("unsupported content type {content_type}"),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|err| AppError::FetchFailed {
            status: None,
            cause: format!("failed to read response body: {err}"),
        })?;

        Ok(FetchedPage {
            clean_text: clean_html(&body),
            final_url,
        })
    }
}

fn is_text_content(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.starts_with("application/xhtml")
}

/// Strips non-content markup and collapses whitespace into a single bounded
/// text block, truncated at a word boundary.
pub fn clean_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.tree.root(), &mut raw);

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_clean_text(&collapsed, MAX_CLEAN_TEXT_CHARS)
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(element) => {
            if SKIPPED_TAGS.contains(&element.name()) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
            // block boundary, keeps adjacent elements from gluing together
            out.push(' ');
        }
        Node::Text(text) => {
            out.push_str(&text.text);
            out.push(' ');
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Deterministic truncation that never cuts a token in half.
pub fn truncate_clean_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(char::is_whitespace) {
        Some(pos) => cut[..pos].trim_end().to_string(),
        None => cut,
    }
}
