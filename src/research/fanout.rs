use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;

use crate::tools::search::{SearchHit, SearchProvider};

#[derive(Debug, Clone, Serialize)]
pub struct QueryHits {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FanoutResult {
    pub per_query: Vec<QueryHits>,
    /// Deduplicated links in first-seen order, capped at the ceiling.
    pub urls: Vec<String>,
}

/// Runs every planned query against the search collaborator concurrently.
#[derive(Clone)]
pub struct SearchFanout {
    provider: Arc<dyn SearchProvider>,
}

impl SearchFanout {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub async fn gather(&self, queries: &[String], url_ceiling: usize) -> FanoutResult {
        let searches = queries.iter().map(|query| {
            let provider = self.provider.clone();
            async move {
                let hits = provider.search(query).await;
                QueryHits {
                    query: query.clone(),
                    hits,
                }
            }
        });
        let per_query = join_all(searches).await;

        let urls = dedup_links(&per_query, url_ceiling);
        tracing::info!(
            "[search] {} queries -> {} unique urls (ceiling {})",
            per_query.len(),
            urls.len(),
            url_ceiling
        );

        FanoutResult { per_query, urls }
    }
}

/// Unique links across all queries: plan order, then result order.
pub fn dedup_links(per_query: &[QueryHits], url_ceiling: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    per_query
        .iter()
        .flat_map(|entry| entry.hits.iter())
        .map(|hit| hit.link.trim())
        .filter(|link| !link.is_empty())
        .filter(|link| seen.insert(link.to_string()))
        .take(url_ceiling)
        .map(ToString::to_string)
        .collect()
}
