use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::models::{SeoRequest, SeoResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    #[serde(alias = "blog_post")]
    pub content: String,
    #[serde(default)]
    pub keywords: String,
}

impl RegenerateRequest {
    fn content(&self) -> Result<&str, ApiError> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ApiError::BadRequest("content must not be empty".to_string()));
        }
        Ok(content)
    }
}

pub async fn generate_seo(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SeoRequest>,
) -> Result<Json<SeoResult>, ApiError> {
    if request.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic must not be empty".to_string()));
    }
    Ok(Json(state.pipeline.run_seo_only(&request).await))
}

pub async fn regenerate_title(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    let title = state
        .pipeline
        .writer()
        .regenerate_title(request.content()?, &request.keywords)
        .await?;
    Ok(Json(json!({ "title": title })))
}

pub async fn regenerate_description(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    let description = state
        .pipeline
        .writer()
        .regenerate_description(request.content()?, &request.keywords)
        .await?;
    Ok(Json(json!({ "description": description })))
}
