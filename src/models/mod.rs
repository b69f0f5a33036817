// Domain Models
// Request/result shapes shared by the pipeline, writer and HTTP surface

mod request;
mod result;

pub use request::{
    ArticleLength, FeedbackRating, FeedbackRequest, GenerationRequest, QualityMode,
    SeoRequest, Tone,
};
pub use result::{
    escape_html, DebugRecord, FeedbackReceipt, GenerationResult, RunOutcome, SeoMetadata,
    SeoResult,
};
