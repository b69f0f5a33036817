// Article Writer
// Standard and research-conditioned generation sharing one output contract

mod prompts;
mod types;

use std::sync::Arc;

pub use types::{ArticleDraft, GenerationMode, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};

use crate::core::errors::ApiError;
use crate::llm::{generate_typed, OutputSchema, StructuredGenerator, StructuredRequest};
use crate::models::{GenerationRequest, SeoMetadata};
use types::{DescriptionDraft, SeoDraft, TitleDraft};

pub const ARTICLE_SCHEMA_NAME: &str = "article_draft";
pub const SEO_SCHEMA_NAME: &str = "seo_metadata";
pub const TITLE_SCHEMA_NAME: &str = "seo_title";
pub const DESCRIPTION_SCHEMA_NAME: &str = "seo_description";

/// The one stage allowed to fail a run: there is no degraded output for
/// "no document", so every error propagates.
#[derive(Clone)]
pub struct ArticleWriter {
    generator: Arc<dyn StructuredGenerator>,
    /// Model for title/description regeneration when the caller names none.
    metadata_model: Option<String>,
}

impl ArticleWriter {
    pub fn new(generator: Arc<dyn StructuredGenerator>, metadata_model: Option<String>) -> Self {
        Self {
            generator,
            metadata_model,
        }
    }

    pub async fn generate(
        &self,
        mode: GenerationMode,
        request: &GenerationRequest,
        context: Option<&str>,
    ) -> Result<ArticleDraft, ApiError> {
        let prompt = match (mode, context) {
            (GenerationMode::Standard, _) => prompts::standard_article(request),
            (GenerationMode::RagContext, Some(context)) if !context.trim().is_empty() => {
                prompts::rag_article(request, context)
            }
            (GenerationMode::RagContext, _) => {
                return Err(ApiError::BadRequest(
                    "research context is required for rag_context generation".to_string(),
                ));
            }
        };

        let structured = StructuredRequest::new(prompt, OutputSchema::of::<ArticleDraft>(ARTICLE_SCHEMA_NAME))
            .with_model(request.model.clone());
        let draft: ArticleDraft = generate_typed(self.generator.as_ref(), structured).await?;

        if draft.html_content.trim().is_empty() {
            return Err(ApiError::Upstream(
                "model returned no article body".to_string(),
            ));
        }

        tracing::info!(
            "[writer] {} article generated ({} chars)",
            mode.as_str(),
            draft.html_content.chars().count()
        );
        Ok(ArticleDraft {
            html_content: draft.html_content,
            seo_title: clamp_chars(&draft.seo_title, TITLE_MAX_CHARS),
            seo_description: clamp_chars(&draft.seo_description, DESCRIPTION_MAX_CHARS),
        })
    }

    /// Metadata-only generation: title and description without a body.
    pub async fn seo_only(
        &self,
        topic: &str,
        keywords: &str,
        model: Option<String>,
    ) -> Result<SeoMetadata, ApiError> {
        let structured = StructuredRequest::new(
            prompts::seo_only(topic, keywords),
            OutputSchema::of::<SeoDraft>(SEO_SCHEMA_NAME),
        )
        .with_model(model);
        let draft: SeoDraft = generate_typed(self.generator.as_ref(), structured).await?;

        let title = require_text(&draft.seo_title, "title")?;
        let description = require_text(&draft.seo_description, "description")?;
        Ok(SeoMetadata {
            title: clamp_chars(title, TITLE_MAX_CHARS),
            description: clamp_chars(description, DESCRIPTION_MAX_CHARS),
        })
    }

    pub async fn regenerate_title(&self, content: &str, keywords: &str) -> Result<String, ApiError> {
        let structured = StructuredRequest::new(
            prompts::regenerate_title(content, keywords),
            OutputSchema::of::<TitleDraft>(TITLE_SCHEMA_NAME),
        )
        .with_model(self.metadata_model.clone());
        let draft: TitleDraft = generate_typed(self.generator.as_ref(), structured).await?;

        let title = require_text(&draft.seo_title, "title")?;
        Ok(clamp_chars(title, TITLE_MAX_CHARS))
    }

    pub async fn regenerate_description(
        &self,
        content: &str,
        keywords: &str,
    ) -> Result<String, ApiError> {
        let structured = StructuredRequest::new(
            prompts::regenerate_description(content, keywords),
            OutputSchema::of::<DescriptionDraft>(DESCRIPTION_SCHEMA_NAME),
        )
        .with_model(self.metadata_model.clone());
        let draft: DescriptionDraft = generate_typed(self.generator.as_ref(), structured).await?;

        let description = require_text(&draft.seo_description, "description")?;
        Ok(clamp_chars(description, DESCRIPTION_MAX_CHARS))
    }
}

fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Upstream(format!("model returned an empty {}", field)));
    }
    Ok(trimmed)
}

/// Trims and caps `text` at `max` characters.
pub fn clamp_chars(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .take(max)
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::stub::ScriptedGenerator;
    use serde_json::json;

    fn article_reply(title: &str, description: &str, body: &str) -> serde_json::Value {
        json!({ "htmlContent": body, "seoTitle": title, "seoDescription": description })
    }

    #[tokio::test]
    async fn rag_mode_embeds_context_and_uses_request_model() {
        let generator = ScriptedGenerator::new(|_| Ok(article_reply("EVs", "About EVs", "<h1>EVs</h1>")));
        let writer = ArticleWriter::new(generator.clone(), None);
        let mut request = GenerationRequest::new("Electric Vehicles");
        request.model = Some("writer-large".to_string());

        let draft = writer
            .generate(GenerationMode::RagContext, &request, Some("SOURCE: https://a\n\nfacts"))
            .await
            .expect("draft");

        assert_eq!(draft.html_content, "<h1>EVs</h1>");
        let calls = generator.calls_for(ARTICLE_SCHEMA_NAME);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("RESEARCH CONTEXT START"));
        assert_eq!(calls[0].model.as_deref(), Some("writer-large"));
    }

    #[tokio::test]
    async fn rag_mode_without_context_is_rejected_before_calling_model() {
        let generator = ScriptedGenerator::new(|_| Ok(article_reply("t", "d", "b")));
        let writer = ArticleWriter::new(generator.clone(), None);

        let err = writer
            .generate(GenerationMode::RagContext, &GenerationRequest::new("x"), Some("  "))
            .await
            .expect_err("no context");

        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_an_error() {
        let generator = ScriptedGenerator::new(|_| Ok(article_reply("t", "d", "   ")));
        let writer = ArticleWriter::new(generator, None);

        let err = writer
            .generate(GenerationMode::Standard, &GenerationRequest::new("x"), None)
            .await
            .expect_err("empty body");
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[tokio::test]
    async fn long_metadata_is_clamped() {
        let long_title = "T".repeat(90);
        let long_description = "D".repeat(400);
        let generator = ScriptedGenerator::new(move |_| {
            Ok(article_reply(&long_title, &long_description, "<p>body</p>"))
        });
        let writer = ArticleWriter::new(generator, None);

        let draft = writer
            .generate(GenerationMode::Standard, &GenerationRequest::new("x"), None)
            .await
            .expect("draft");

        assert_eq!(draft.seo_title.chars().count(), TITLE_MAX_CHARS);
        assert_eq!(draft.seo_description.chars().count(), DESCRIPTION_MAX_CHARS);
    }

    #[tokio::test]
    async fn seo_helpers_return_bounded_fields() {
        let generator = ScriptedGenerator::new(|request| match request.schema.name.as_str() {
            SEO_SCHEMA_NAME => Ok(json!({ "seoTitle": " Solar 101 ", "seoDescription": "All about solar." })),
            TITLE_SCHEMA_NAME => Ok(json!({ "seoTitle": "New solar title" })),
            DESCRIPTION_SCHEMA_NAME => Ok(json!({ "seoDescription": "" })),
            other => panic!("unexpected schema {}", other),
        });
        let writer = ArticleWriter::new(generator.clone(), Some("meta-model".to_string()));

        let seo = writer.seo_only("Solar", "panels", None).await.expect("seo");
        assert_eq!(seo.title, "Solar 101");

        let title = writer.regenerate_title("<p>post</p>", "solar").await.expect("title");
        assert_eq!(title, "New solar title");
        assert_eq!(
            generator.calls_for(TITLE_SCHEMA_NAME)[0].model.as_deref(),
            Some("meta-model")
        );

        let err = writer
            .regenerate_description("<p>post</p>", "solar")
            .await
            .expect_err("empty description");
        assert!(err.to_string().contains("empty description"));
    }

    #[test]
    fn clamp_chars_counts_characters_not_bytes() {
        assert_eq!(clamp_chars("  short  ", 60), "short");
        assert_eq!(clamp_chars("ééééé", 3), "ééé");
        assert_eq!(clamp_chars("abc def", 4), "abc");
    }
}
