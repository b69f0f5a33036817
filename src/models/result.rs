use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form per-run diagnostics keyed by stage. Not consumed by any component.
pub type DebugRecord = Map<String, Value>;

pub const RESEARCH_FAILED_TITLE: &str = "Research Failed";
pub const RESEARCH_FAILED_DESCRIPTION: &str =
    "Could not find enough relevant information for the topic.";
const RESEARCH_FAILED_BODY: &str = "<h1>Research Failed</h1><p>Could not find enough relevant \
information online to write a high-quality article on this topic. Please try a different topic \
or check the scraper settings.</p>";

pub const ERROR_TITLE: &str = "Error";
pub const ERROR_DESCRIPTION: &str = "An error occurred during generation.";

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    InsufficientContext,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub body: String,
    pub title: String,
    pub description: String,
    pub outcome: RunOutcome,
    pub debug: DebugRecord,
}

impl GenerationResult {
    pub fn completed(body: String, title: String, description: String, debug: DebugRecord) -> Self {
        Self {
            body,
            title,
            description,
            outcome: RunOutcome::Completed,
            debug,
        }
    }

    pub fn insufficient_context(debug: DebugRecord) -> Self {
        Self {
            body: RESEARCH_FAILED_BODY.to_string(),
            title: RESEARCH_FAILED_TITLE.to_string(),
            description: RESEARCH_FAILED_DESCRIPTION.to_string(),
            outcome: RunOutcome::InsufficientContext,
            debug,
        }
    }

    pub fn failed(message: &str, debug: DebugRecord) -> Self {
        Self {
            body: format!(
                "<h1>Error Generating Post</h1><p>A critical error occurred: {}</p>\
                 <p>Check the debug output for more details.</p>",
                escape_html(message)
            ),
            title: ERROR_TITLE.to_string(),
            description: ERROR_DESCRIPTION.to_string(),
            outcome: RunOutcome::Failed,
            debug,
        }
    }
}

/// Title and description pair produced by the metadata-only generation mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoResult {
    pub title: String,
    pub description: String,
    pub debug: DebugRecord,
}

impl SeoResult {
    pub fn completed(metadata: SeoMetadata, debug: DebugRecord) -> Self {
        Self {
            title: metadata.title,
            description: metadata.description,
            debug,
        }
    }

    pub fn failed(message: &str, debug: DebugRecord) -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            description: format!("An error occurred during generation: {}", message),
            debug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    pub success: bool,
    pub message: String,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
