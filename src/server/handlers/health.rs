use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let config = state.config.redacted_config()?;
    let llm_reachable = state.llm.health_check().await;
    Ok(Json(json!({
        "llm": {
            "provider": state.llm.provider_name(),
            "reachable": llm_reachable,
            "default_model": state.llm.default_model(),
        },
        "search": {
            "engine": state.search.engine().as_str(),
            "configured": state.search.is_configured(),
        },
        "scrape": {
            "proxy_available": state.scraper.proxy_available(),
        },
        "pipeline": state.settings.pipeline,
        "config": config,
    })))
}
