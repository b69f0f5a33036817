pub mod openai_compat;
pub mod provider;
pub mod service;
pub mod structured;
pub mod types;

#[cfg(test)]
pub(crate) mod stub;
#[cfg(test)]
mod tests;

pub use openai_compat::OpenAiCompatProvider;
pub use provider::LlmProvider;
pub use service::LlmService;
pub use structured::{generate_typed, OutputSchema, StructuredGenerator, StructuredRequest};
pub use types::{ChatMessage, ChatRequest};
