// Content Extraction
// Boilerplate removal that turns a raw HTML document into article text

mod readability;

use serde::{Deserialize, Serialize};

pub use readability::ReadabilityExtractor;

use crate::scrape::ScrapeBackendKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Keep article blocks only, dropping navigation and page chrome.
    #[default]
    Readability,
    /// Keep all visible text.
    Verbatim,
}

impl ExtractionMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "readability" => Some(ExtractionMode::Readability),
            "verbatim" | "raw" => Some(ExtractionMode::Verbatim),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Readability => "readability",
            ExtractionMode::Verbatim => "verbatim",
        }
    }
}

/// Extraction mode chosen per scrape backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractionModes {
    pub standard: ExtractionMode,
    pub proxied: ExtractionMode,
}

impl ExtractionModes {
    pub fn for_backend(&self, backend: ScrapeBackendKind) -> ExtractionMode {
        match backend {
            ScrapeBackendKind::Standard => self.standard,
            ScrapeBackendKind::Proxied => self.proxied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Extracted { text: String },
    Rejected { reason: String },
}

/// Cleaned text for one source. `Extracted` text always meets the
/// extractor's minimum length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub url: String,
    pub outcome: ExtractionOutcome,
}

impl ExtractedContent {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::Extracted { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            ExtractionOutcome::Extracted { text } => Some(text),
            ExtractionOutcome::Rejected { .. } => None,
        }
    }
}

/// `extract(html, url)`. Deterministic for a given input.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str, url: &str, mode: ExtractionMode) -> ExtractedContent;
}
