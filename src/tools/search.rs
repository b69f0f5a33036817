use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::config::settings::SearchSettings;
use crate::core::errors::ApiError;

const GOOGLE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const BRAVE_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";
const BING_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";
const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    Google,
    Brave,
    Bing,
    DuckDuckGo,
}

impl SearchEngine {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "google" => Some(SearchEngine::Google),
            "brave" => Some(SearchEngine::Brave),
            "bing" => Some(SearchEngine::Bing),
            "duckduckgo" | "ddg" => Some(SearchEngine::DuckDuckGo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::Brave => "brave",
            SearchEngine::Bing => "bing",
            SearchEngine::DuckDuckGo => "duckduckgo",
        }
    }
}

/// Web search collaborator. Misconfiguration and transport errors resolve to
/// an empty list; implementations never fail.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Vec<SearchHit>;
}

#[derive(Clone)]
pub struct WebSearchProvider {
    client: Client,
    settings: SearchSettings,
}

impl WebSearchProvider {
    pub fn new(client: Client, settings: SearchSettings) -> Self {
        Self { client, settings }
    }

    pub fn engine(&self) -> SearchEngine {
        self.settings.provider
    }

    /// Whether the selected engine has the credentials it needs.
    pub fn is_configured(&self) -> bool {
        match self.settings.provider {
            SearchEngine::Google => {
                self.settings.google_api_key.is_some() && self.settings.google_engine_id.is_some()
            }
            SearchEngine::Brave => self.settings.brave_api_key.is_some(),
            SearchEngine::Bing => self.settings.bing_api_key.is_some(),
            SearchEngine::DuckDuckGo => true,
        }
    }

    async fn dispatch(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        let settings = &self.settings;
        match settings.provider {
            SearchEngine::Google => {
                let (Some(api_key), Some(engine_id)) =
                    (&settings.google_api_key, &settings.google_engine_id)
                else {
                    return Err(ApiError::ServiceUnavailable(
                        "Google search API key or engine id is not configured".to_string(),
                    ));
                };
                self.google_search(query, api_key, engine_id).await
            }
            SearchEngine::Brave => {
                let Some(api_key) = &settings.brave_api_key else {
                    return Err(ApiError::ServiceUnavailable(
                        "Brave search API key is not configured".to_string(),
                    ));
                };
                self.brave_search(query, api_key).await
            }
            SearchEngine::Bing => {
                let Some(api_key) = &settings.bing_api_key else {
                    return Err(ApiError::ServiceUnavailable(
                        "Bing search API key is not configured".to_string(),
                    ));
                };
                self.bing_search(query, api_key).await
            }
            SearchEngine::DuckDuckGo => self.duckduckgo_search(query).await,
        }
    }

    async fn get_json(&self, request: reqwest::RequestBuilder, engine: &str) -> Result<Value, ApiError> {
        let response = request
            .timeout(self.settings.timeout)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "{} search failed: {}",
                engine,
                response.status()
            )));
        }

        response.json().await.map_err(ApiError::upstream)
    }

    async fn google_search(
        &self,
        query: &str,
        api_key: &str,
        engine_id: &str,
    ) -> Result<Vec<SearchHit>, ApiError> {
        let url = format!(
            "{}?key={}&cx={}&q={}&num={}",
            GOOGLE_ENDPOINT,
            urlencoding::encode(api_key),
            urlencoding::encode(engine_id),
            urlencoding::encode(query),
            self.settings.results_per_query
        );
        let payload = self.get_json(self.client.get(url), "Google").await?;
        Ok(parse_google_payload(&payload))
    }

    async fn brave_search(&self, query: &str, api_key: &str) -> Result<Vec<SearchHit>, ApiError> {
        let url = format!(
            "{}?q={}&count={}",
            BRAVE_ENDPOINT,
            urlencoding::encode(query),
            self.settings.results_per_query
        );
        let request = self
            .client
            .get(url)
            .header("X-Subscription-Token", api_key)
            .header("Accept", "application/json");
        let payload = self.get_json(request, "Brave").await?;
        Ok(parse_brave_payload(&payload))
    }

    async fn bing_search(&self, query: &str, api_key: &str) -> Result<Vec<SearchHit>, ApiError> {
        let url = format!(
            "{}?q={}&count={}",
            BING_ENDPOINT,
            urlencoding::encode(query),
            self.settings.results_per_query
        );
        let request = self
            .client
            .get(url)
            .header("Ocp-Apim-Subscription-Key", api_key);
        let payload = self.get_json(request, "Bing").await?;
        Ok(parse_bing_payload(&payload))
    }

    async fn duckduckgo_search(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        let url = format!(
            "{}?q={}&format=json&no_redirect=1&no_html=1",
            DUCKDUCKGO_ENDPOINT,
            urlencoding::encode(query)
        );
        let payload = self.get_json(self.client.get(url), "DuckDuckGo").await?;
        Ok(parse_duckduckgo_payload(&payload))
    }
}

#[async_trait]
impl SearchProvider for WebSearchProvider {
    async fn search(&self, query: &str) -> Vec<SearchHit> {
        match self.dispatch(query).await {
            Ok(mut hits) => {
                hits.truncate(self.settings.results_per_query);
                tracing::debug!(
                    "[search] {} returned {} hits for {:?}",
                    self.settings.provider.as_str(),
                    hits.len(),
                    query
                );
                hits
            }
            Err(err) => {
                tracing::warn!(
                    "[search] {} query {:?} failed: {}",
                    self.settings.provider.as_str(),
                    query,
                    err
                );
                Vec::new()
            }
        }
    }
}

fn str_field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn push_hit(results: &mut Vec<SearchHit>, title: &str, link: &str, snippet: &str) {
    if title.is_empty() || link.is_empty() {
        return;
    }
    results.push(SearchHit {
        title: title.to_string(),
        link: link.to_string(),
        snippet: snippet.to_string(),
    });
}

fn parse_google_payload(payload: &Value) -> Vec<SearchHit> {
    let mut results = Vec::new();
    if let Some(items) = payload.get("items").and_then(|v| v.as_array()) {
        for item in items {
            push_hit(
                &mut results,
                str_field(item, "title"),
                str_field(item, "link"),
                str_field(item, "snippet"),
            );
        }
    }
    results
}

fn parse_brave_payload(payload: &Value) -> Vec<SearchHit> {
    let mut results = Vec::new();
    if let Some(items) = payload
        .get("web")
        .and_then(|w| w.get("results"))
        .and_then(|v| v.as_array())
    {
        for item in items {
            push_hit(
                &mut results,
                str_field(item, "title"),
                str_field(item, "url"),
                str_field(item, "description"),
            );
        }
    }
    results
}

fn parse_bing_payload(payload: &Value) -> Vec<SearchHit> {
    let mut results = Vec::new();
    if let Some(items) = payload
        .get("webPages")
        .and_then(|wp| wp.get("value"))
        .and_then(|v| v.as_array())
    {
        for item in items {
            push_hit(
                &mut results,
                str_field(item, "name"),
                str_field(item, "url"),
                str_field(item, "snippet"),
            );
        }
    }
    results
}

fn parse_duckduckgo_payload(payload: &Value) -> Vec<SearchHit> {
    let mut results = Vec::new();

    let abstract_text = str_field(payload, "AbstractText");
    let abstract_url = str_field(payload, "AbstractURL");
    let heading = str_field(payload, "Heading");
    let title = if heading.is_empty() {
        abstract_text.split(" - ").next().unwrap_or(abstract_text)
    } else {
        heading
    };
    if !abstract_text.is_empty() {
        push_hit(&mut results, title, abstract_url, abstract_text);
    }

    if let Some(items) = payload.get("Results").and_then(|v| v.as_array()) {
        collect_ddg_topics(items, &mut results);
    }
    if let Some(items) = payload.get("RelatedTopics").and_then(|v| v.as_array()) {
        collect_ddg_topics(items, &mut results);
    }

    results
}

fn collect_ddg_topics(items: &[Value], results: &mut Vec<SearchHit>) {
    for item in items {
        if let Some(topics) = item.get("Topics").and_then(|v| v.as_array()) {
            collect_ddg_topics(topics, results);
            continue;
        }
        let text = str_field(item, "Text");
        let url = str_field(item, "FirstURL");
        push_hit(results, text.split(" - ").next().unwrap_or(text), url, text);
    }
}
