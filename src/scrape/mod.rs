// Scrape Backends
// Fetches a URL's raw document via the direct or the rendering-proxy strategy

mod backend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use backend::{ScrapeService, DEFAULT_USER_AGENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeBackendKind {
    /// Direct GET with a rotated User-Agent.
    #[default]
    Standard,
    /// Routed through a third-party rendering service.
    #[serde(alias = "scraper_api", alias = "scraperapi")]
    Proxied,
}

impl ScrapeBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeBackendKind::Standard => "standard",
            ScrapeBackendKind::Proxied => "proxied",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Fetched { body: String },
    Failed { error: String },
}

/// One scrape attempt. Created once per URL per run and never mutated.
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub url: String,
    /// Backend that actually served the request (after any fallback).
    pub backend: ScrapeBackendKind,
    pub user_agent: Option<String>,
    /// Request target with credentials masked.
    pub raw_request: String,
    /// Leading slice of the response body, kept for diagnostics only.
    pub raw_response: Option<String>,
    pub outcome: ScrapeOutcome,
}

impl ScrapeResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ScrapeOutcome::Fetched { .. })
    }

    pub fn body(&self) -> Option<&str> {
        match &self.outcome {
            ScrapeOutcome::Fetched { body } => Some(body),
            ScrapeOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ScrapeOutcome::Fetched { .. } => None,
            ScrapeOutcome::Failed { error } => Some(error),
        }
    }
}

/// `scrape(url, backend)`. Never fails: every failure mode is a
/// `ScrapeOutcome::Failed` tagged with the backend that was used.
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str, backend: ScrapeBackendKind) -> ScrapeResult;
}
