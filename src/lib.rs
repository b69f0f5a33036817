pub mod core;
pub mod extract;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod research;
pub mod scrape;
pub mod server;
pub mod state;
pub mod tools;
pub mod writer;
