use axum::Json;

use crate::models::{FeedbackReceipt, FeedbackRequest};

const EXCERPT_CHARS: usize = 80;

/// Ratings are logged only.
pub async fn record_feedback(Json(request): Json<FeedbackRequest>) -> Json<FeedbackReceipt> {
    let excerpt: String = request.post.trim().chars().take(EXCERPT_CHARS).collect();
    tracing::info!(
        "[feedback] rating={:?} chars={} excerpt={:?}",
        request.rating,
        request.post.chars().count(),
        excerpt
    );
    Json(FeedbackReceipt {
        success: true,
        message: "Feedback received.".to_string(),
    })
}
