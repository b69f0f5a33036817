use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::errors::ApiError;

/// Named JSON schema describing the value a generation call must return.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl OutputSchema {
    /// Derives the schema from a Rust type, dropping the `$schema` meta key
    /// that OpenAI-style `response_format` payloads reject.
    pub fn of<T: JsonSchema>(name: &str) -> Self {
        let mut schema = schemars::schema_for!(T).to_value();
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }
        Self {
            name: name.to_string(),
            schema,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub prompt: String,
    pub schema: OutputSchema,
    pub model: Option<String>,
}

impl StructuredRequest {
    pub fn new(prompt: impl Into<String>, schema: OutputSchema) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model.filter(|m| !m.trim().is_empty());
        self
    }
}

/// `generate(prompt, schema, model?)`: returns a value conforming to the
/// schema, or errors on empty/invalid output.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, request: StructuredRequest) -> Result<Value, ApiError>;
}

/// Runs a structured generation and deserializes the validated value.
pub async fn generate_typed<T: DeserializeOwned>(
    generator: &dyn StructuredGenerator,
    request: StructuredRequest,
) -> Result<T, ApiError> {
    let name = request.schema.name.clone();
    let value = generator.generate(request).await?;
    serde_json::from_value(value)
        .map_err(|e| ApiError::Upstream(format!("{} output has unexpected shape: {}", name, e)))
}

/// Pulls a JSON value out of a model reply: bare JSON, a fenced block, or
/// the outermost object/array embedded in prose.
pub fn parse_json_payload(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = strip_code_fence(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced) {
            return Some(value);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                    return Some(value);
                }
            }
        }
    }

    None
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.rfind("```")?;
    Some(body[..end].trim())
}
