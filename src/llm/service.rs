use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::config::settings::LlmSettings;
use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;
use crate::llm::structured::{parse_json_payload, StructuredGenerator, StructuredRequest};
use crate::llm::types::{ChatMessage, ChatRequest, ResponseFormat};

const MAX_REPORTED_SCHEMA_ERRORS: usize = 3;

/// Schema-validated generation on top of a chat provider.
#[derive(Clone)]
pub struct LlmService {
    provider: Arc<dyn LlmProvider>,
    settings: LlmSettings,
}

impl LlmService {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: LlmSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn default_model(&self) -> &str {
        &self.settings.default_model
    }

    /// Model for cheap auxiliary calls (query planning, relevance checks).
    pub fn fast_model(&self) -> Option<String> {
        self.settings.fast_model.clone()
    }

    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }

    fn build_chat_request(&self, request: &StructuredRequest) -> ChatRequest {
        let schema_text = serde_json::to_string(&request.schema.schema).unwrap_or_default();
        let messages = vec![
            ChatMessage::system(format!(
                "Respond with a single JSON value and nothing else. It must match this JSON schema:\n{}",
                schema_text
            )),
            ChatMessage::user(request.prompt.clone()),
        ];

        let mut chat = ChatRequest::new(messages).with_temperature(self.settings.temperature);
        if self.settings.structured_output {
            chat = chat.with_response_format(ResponseFormat {
                name: request.schema.name.clone(),
                schema: request.schema.schema.clone(),
            });
        }
        chat
    }
}

#[async_trait]
impl StructuredGenerator for LlmService {
    async fn generate(&self, request: StructuredRequest) -> Result<Value, ApiError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.settings.default_model.clone());
        let chat = self.build_chat_request(&request);

        tracing::debug!(
            "[llm] {} via {} (model={})",
            request.schema.name,
            self.provider.name(),
            model
        );
        let reply = self.provider.chat(chat, &model).await?;

        if reply.trim().is_empty() {
            return Err(ApiError::Upstream(format!(
                "{}: model returned an empty reply",
                request.schema.name
            )));
        }

        let value = parse_json_payload(&reply).ok_or_else(|| {
            ApiError::Upstream(format!("{}: reply was not valid JSON", request.schema.name))
        })?;

        validate_against_schema(&request.schema.name, &request.schema.schema, &value)?;
        Ok(value)
    }
}

fn validate_against_schema(name: &str, schema: &Value, value: &Value) -> Result<(), ApiError> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| ApiError::Internal(format!("{}: invalid output schema: {}", name, e)))?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .take(MAX_REPORTED_SCHEMA_ERRORS)
        .map(|e| e.to_string())
        .collect();
    if errors.is_empty() {
        return Ok(());
    }

    Err(ApiError::Upstream(format!(
        "{}: output failed schema validation: {}",
        name,
        errors.join("; ")
    )))
}
