pub mod fetch;
pub mod search;

pub use fetch::{FetchOptions, FetchResponse, HttpFetcher, PageFetcher};
pub use search::{SearchEngine, SearchHit, SearchProvider, WebSearchProvider};
