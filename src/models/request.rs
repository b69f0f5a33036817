use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::scrape::ScrapeBackendKind;

/// Voice requested for the article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Humorous,
    #[default]
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Humorous => "humorous",
            Tone::Neutral => "neutral",
        }
    }
}

/// Target article length: a named bucket or an explicit section count.
///
/// Serialized as `"medium"` for buckets and `{"custom": 4}` for section counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleLength {
    Shorter,
    Short,
    Medium,
    Long,
    Longer,
    Default,
    Custom(u32),
}

impl ArticleLength {
    /// Human-readable length hint embedded in generation prompts.
    pub fn prompt_text(&self) -> Option<String> {
        let text = match self {
            ArticleLength::Shorter => "≈ 400-500 words",
            ArticleLength::Short => "≈ 500-600 words",
            ArticleLength::Medium => "≈ 600-700 words",
            ArticleLength::Long => "≈ 700-1000 words",
            ArticleLength::Longer => "≈ 1200-2000 words",
            ArticleLength::Default => "default length",
            ArticleLength::Custom(0) => return None,
            ArticleLength::Custom(sections) => return Some(format!("{} sections", sections)),
        };
        Some(text.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualityMode {
    /// Context-free generation; no research stages run.
    #[default]
    Standard,
    /// Research-augmented generation.
    #[serde(alias = "rag")]
    HighQuality,
}

impl QualityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityMode::Standard => "standard",
            QualityMode::HighQuality => "high_quality",
        }
    }
}

/// Input to a full pipeline run. Immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    /// Comma-joined keywords; passed through to generation prompts only.
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub length: Option<ArticleLength>,
    #[serde(default, alias = "additional_instructions")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub quality: QualityMode,
    #[serde(default, alias = "scraper_type")]
    pub scrape_backend: ScrapeBackendKind,
    /// Model id for the final generation call; the configured default when absent.
    #[serde(default)]
    pub model: Option<String>,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            keywords: String::new(),
            tone: Tone::default(),
            length: None,
            instructions: None,
            quality: QualityMode::default(),
            scrape_backend: ScrapeBackendKind::default(),
            model: None,
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.topic.trim().is_empty() {
            return Err(ApiError::BadRequest("topic must not be empty".to_string()));
        }
        if let Some(ArticleLength::Custom(0)) = self.length {
            return Err(ApiError::BadRequest(
                "custom length must be at least one section".to_string(),
            ));
        }
        Ok(())
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoRequest {
    pub topic: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRating {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(alias = "blog_post")]
    pub post: String,
    pub rating: FeedbackRating,
}
