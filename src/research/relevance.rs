use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::llm::{generate_typed, OutputSchema, StructuredGenerator, StructuredRequest};

pub const RELEVANCE_SCHEMA_NAME: &str = "relevance_verdict";

#[derive(Debug, Deserialize, JsonSchema)]
struct RelevanceVerdict {
    /// Whether the text is usable for writing about the topic.
    relevant: bool,
}

/// Binary topical judge. One attempt per item; any failure is "not relevant".
#[derive(Clone)]
pub struct RelevanceClassifier {
    generator: Arc<dyn StructuredGenerator>,
    model: Option<String>,
    excerpt_chars: usize,
}

impl RelevanceClassifier {
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        model: Option<String>,
        excerpt_chars: usize,
    ) -> Self {
        Self {
            generator,
            model,
            excerpt_chars,
        }
    }

    pub async fn is_relevant(&self, topic: &str, content: &str) -> bool {
        let excerpt: String = content.chars().take(self.excerpt_chars).collect();
        let prompt = format!(
            "You are a relevance checking agent. Is the following text relevant for writing an \
             article about \"{}\"?\nAnswer with {{\"relevant\": true}} or {{\"relevant\": false}}.\n\n\
             Text:\n---\n{}\n---",
            topic, excerpt
        );
        let request = StructuredRequest::new(
            prompt,
            OutputSchema::of::<RelevanceVerdict>(RELEVANCE_SCHEMA_NAME),
        )
        .with_model(self.model.clone());

        match generate_typed::<RelevanceVerdict>(self.generator.as_ref(), request).await {
            Ok(verdict) => verdict.relevant,
            Err(err) => {
                tracing::warn!("[relevance] classification failed, treating as irrelevant: {}", err);
                false
            }
        }
    }
}
