use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::core::errors::ApiError;
use crate::models::{GenerationRequest, GenerationResult};
use crate::state::AppState;

/// Malformed input is rejected up front; everything after that resolves to
/// a result document, including failed runs.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerationResult>, ApiError> {
    request.validate()?;
    Ok(Json(state.pipeline.run(&request).await))
}
