use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::core::config::settings::LlmSettings;
use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;
use crate::llm::service::LlmService;
use crate::llm::structured::{generate_typed, OutputSchema, StructuredGenerator, StructuredRequest};
use crate::llm::types::ChatRequest;

struct ScriptedProvider {
    reply: Result<String, String>,
    calls: Mutex<Vec<(ChatRequest, String)>>,
}

impl ScriptedProvider {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError> {
        self.calls
            .lock()
            .expect("lock")
            .push((request, model_id.to_string()));
        self.reply.clone().map_err(ApiError::Upstream)
    }
}

fn settings(structured_output: bool) -> LlmSettings {
    LlmSettings {
        base_url: "http://127.0.0.1:1234/v1".to_string(),
        api_key: None,
        default_model: "writer-model".to_string(),
        fast_model: Some("fast-model".to_string()),
        timeout: Duration::from_secs(30),
        temperature: 0.4,
        structured_output,
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct Verdict {
    relevant: bool,
}

fn verdict_request() -> StructuredRequest {
    StructuredRequest::new("is it relevant?", OutputSchema::of::<Verdict>("relevance_verdict"))
}

#[tokio::test]
async fn valid_reply_is_parsed_and_typed() {
    let provider = ScriptedProvider::replying("```json\n{\"relevant\": true}\n```");
    let service = LlmService::new(provider.clone(), settings(true));

    let verdict: Verdict = generate_typed(&service, verdict_request())
        .await
        .expect("verdict");

    assert!(verdict.relevant);
    let calls = provider.calls.lock().expect("lock");
    assert_eq!(calls.len(), 1);
    let (chat, model) = &calls[0];
    assert_eq!(model, "writer-model");
    assert_eq!(chat.temperature, Some(0.4));
    assert_eq!(
        chat.response_format.as_ref().map(|f| f.name.as_str()),
        Some("relevance_verdict")
    );
}

#[tokio::test]
async fn model_override_and_plain_mode_are_respected() {
    let provider = ScriptedProvider::replying("{\"relevant\": false}");
    let service = LlmService::new(provider.clone(), settings(false));

    service
        .generate(verdict_request().with_model(Some("fast-model".to_string())))
        .await
        .expect("value");

    let calls = provider.calls.lock().expect("lock");
    let (chat, model) = &calls[0];
    assert_eq!(model, "fast-model");
    assert!(chat.response_format.is_none());
    assert!(chat.messages[0].content.contains("JSON schema"));
}

#[tokio::test]
async fn schema_violations_are_upstream_errors() {
    let provider = ScriptedProvider::replying("{\"relevant\": \"maybe\"}");
    let service = LlmService::new(provider, settings(true));

    let err = service
        .generate(verdict_request())
        .await
        .expect_err("string is not a boolean");

    assert!(matches!(err, ApiError::Upstream(_)));
    assert!(err.to_string().contains("schema validation"));
}

#[tokio::test]
async fn empty_and_non_json_replies_fail() {
    for reply in ["", "   ", "I think so"] {
        let service = LlmService::new(ScriptedProvider::replying(reply), settings(true));
        let err = service.generate(verdict_request()).await.expect_err("bad reply");
        assert!(matches!(err, ApiError::Upstream(_)), "reply {:?}", reply);
    }
}

#[tokio::test]
async fn provider_errors_propagate() {
    let service = LlmService::new(ScriptedProvider::failing("offline"), settings(true));

    let err = service.generate(verdict_request()).await.expect_err("offline");

    assert_eq!(err.to_string(), "upstream error: offline");
}

#[test]
fn output_schema_marks_required_fields() {
    let schema = OutputSchema::of::<Verdict>("relevance_verdict");
    assert_eq!(schema.schema["required"], json!(["relevant"]));
}
