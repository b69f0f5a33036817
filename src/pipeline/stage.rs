use serde::Serialize;

use crate::core::errors::ApiError;

/// Run states, in the order a research run moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Planning,
    Searching,
    Scraping,
    Filtering,
    Aggregating,
    Generating,
    Done,
    AbortedInsufficientContext,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Planning => "planning",
            PipelineStage::Searching => "searching",
            PipelineStage::Scraping => "scraping",
            PipelineStage::Filtering => "filtering",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::Generating => "generating",
            PipelineStage::Done => "done",
            PipelineStage::AbortedInsufficientContext => "aborted_insufficient_context",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Done | PipelineStage::AbortedInsufficientContext | PipelineStage::Failed
        )
    }
}

/// Unrecoverable run error.
///
/// Carries the stage that failed and the ordered list of stages entered
/// before it, most-recent last.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineError {
    pub stage: PipelineStage,
    pub message: String,
    pub trace: Vec<PipelineStage>,
}

impl PipelineError {
    pub fn new(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            trace: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Vec<PipelineStage>) -> Self {
        self.trace = trace;
        self
    }

    fn trace_text(&self) -> String {
        self.trace
            .iter()
            .map(PipelineStage::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.trace.is_empty() {
            write!(f, "pipeline failed in {}: {}", self.stage.as_str(), self.message)
        } else {
            write!(
                f,
                "pipeline failed in {} (trace: {}): {}",
                self.stage.as_str(),
                self.trace_text(),
                self.message
            )
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_trace_when_present() {
        let bare = PipelineError::new(PipelineStage::Generating, "model offline");
        assert_eq!(bare.to_string(), "pipeline failed in generating: model offline");

        let traced = bare.with_trace(vec![PipelineStage::Planning, PipelineStage::Generating]);
        assert_eq!(
            traced.to_string(),
            "pipeline failed in generating (trace: planning -> generating): model offline"
        );
        assert!(matches!(ApiError::from(traced), ApiError::Internal(_)));
    }

    #[test]
    fn terminal_states() {
        assert!(PipelineStage::Done.is_terminal());
        assert!(PipelineStage::AbortedInsufficientContext.is_terminal());
        assert!(!PipelineStage::Filtering.is_terminal());
    }
}
