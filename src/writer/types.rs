use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 60;
pub const DESCRIPTION_MAX_CHARS: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Prompt built from the request alone.
    Standard,
    /// Prompt additionally embeds aggregated research.
    RagContext,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Standard => "standard",
            GenerationMode::RagContext => "rag_context",
        }
    }
}

/// Structured output of an article generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    /// Complete article using h1, h2, p, ul, li and strong tags.
    pub html_content: String,
    /// SEO-optimized title.
    #[schemars(length(max = 60))]
    pub seo_title: String,
    /// SEO-optimized meta description.
    #[schemars(length(max = 160))]
    pub seo_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SeoDraft {
    #[schemars(length(max = 60))]
    pub seo_title: String,
    #[schemars(length(max = 160))]
    pub seo_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TitleDraft {
    #[schemars(length(max = 60))]
    pub seo_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescriptionDraft {
    #[schemars(length(max = 160))]
    pub seo_description: String,
}
