use std::collections::HashSet;
use std::sync::Arc;

use chrono::Datelike;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::llm::{generate_typed, OutputSchema, StructuredGenerator, StructuredRequest};

pub const QUERY_SCHEMA_NAME: &str = "search_queries";
const MAX_QUERIES: usize = 4;

#[derive(Debug, Deserialize, JsonSchema)]
struct PlannedQueries {
    /// Distinct web search queries.
    queries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub queries: Vec<String>,
    /// Why the literal topic was used instead of generated queries.
    pub fallback_reason: Option<String>,
}

impl QueryPlan {
    fn fallback(topic: &str, reason: String) -> Self {
        Self {
            queries: vec![topic.to_string()],
            fallback_reason: Some(reason),
        }
    }
}

/// Expands a topic into a handful of diversified, time-aware search queries.
/// Never fails: any problem degrades to searching for the topic literally.
#[derive(Clone)]
pub struct QueryPlanner {
    generator: Arc<dyn StructuredGenerator>,
    model: Option<String>,
}

impl QueryPlanner {
    pub fn new(generator: Arc<dyn StructuredGenerator>, model: Option<String>) -> Self {
        Self { generator, model }
    }

    pub async fn plan(&self, topic: &str) -> QueryPlan {
        let topic = topic.trim();
        let request = StructuredRequest::new(
            build_prompt(topic, chrono::Utc::now().year()),
            OutputSchema::of::<PlannedQueries>(QUERY_SCHEMA_NAME),
        )
        .with_model(self.model.clone());

        let planned = match generate_typed::<PlannedQueries>(self.generator.as_ref(), request).await {
            Ok(planned) => planned,
            Err(err) => {
                tracing::warn!("[planner] query generation failed, using topic: {}", err);
                return QueryPlan::fallback(topic, err.to_string());
            }
        };

        let queries = normalize_queries(planned.queries);
        if queries.is_empty() {
            tracing::warn!("[planner] model returned no usable queries, using topic");
            return QueryPlan::fallback(topic, "model returned no queries".to_string());
        }

        tracing::info!("[planner] {} queries for {:?}", queries.len(), topic);
        QueryPlan {
            queries,
            fallback_reason: None,
        }
    }
}

fn build_prompt(topic: &str, year: i32) -> String {
    format!(
        "Generate 3-4 distinct web search queries to research \"{topic}\" for the current year, {year}.\n\
         Vary the angle of each query (news, data, expert analysis, practical guides) so the results \
         cover timely information from different sources.\n\
         Return ONLY JSON in the format: {{\"queries\":[\"query one\",\"query two\"]}}"
    )
}

fn normalize_queries(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .filter(|q| seen.insert(q.to_lowercase()))
        .take(MAX_QUERIES)
        .collect()
}
