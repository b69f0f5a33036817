use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::extract::{ExtractionMode, ExtractionModes};
use crate::tools::search::SearchEngine;

pub const DEFAULT_LLM_BASE_URL: &str = "http://127.0.0.1:1234/v1";
pub const DEFAULT_PROXY_ENDPOINT: &str = "http://api.scraperapi.com";

/// Typed view over the merged config tree. Every field has a default and
/// out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub scrape: ScrapeSettings,
    pub pipeline: PipelineSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmSettings {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub default_model: String,
    pub fast_model: Option<String>,
    pub timeout: Duration,
    pub temperature: f64,
    pub structured_output: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSettings {
    pub provider: SearchEngine,
    pub results_per_query: usize,
    pub timeout: Duration,
    #[serde(skip_serializing)]
    pub google_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub google_engine_id: Option<String>,
    #[serde(skip_serializing)]
    pub brave_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub bing_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeSettings {
    pub standard_timeout: Duration,
    pub proxied_timeout: Duration,
    pub max_bytes: usize,
    pub snapshot_chars: usize,
    pub proxy_endpoint: String,
    #[serde(skip_serializing)]
    pub proxy_api_key: Option<String>,
    pub standard_extraction: ExtractionMode,
    pub proxied_extraction: ExtractionMode,
    pub user_agents: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineSettings {
    pub url_ceiling: usize,
    pub batch_size: usize,
    pub min_article_chars: usize,
    pub min_context_chars: usize,
    pub relevance_excerpt_chars: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Prefix of the daily-rolling file under the log dir.
    pub file_name: String,
    pub stdout: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Value::Null)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            url_ceiling: 5,
            batch_size: 5,
            min_article_chars: 150,
            min_context_chars: 150,
            relevance_excerpt_chars: 4000,
        }
    }
}

impl Settings {
    pub fn from_config(config: &Value) -> Self {
        let llm = section(config, "llm");
        let search = section(config, "search");
        let scrape = section(config, "scrape");
        let pipeline = section(config, "pipeline");
        let server = section(config, "server");
        let logging = section(config, "logging");
        let pipeline_defaults = PipelineSettings::default();

        Self {
            llm: LlmSettings {
                base_url: string_or(llm, "base_url", DEFAULT_LLM_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                api_key: optional_string(llm, "api_key"),
                default_model: string_or(llm, "default_model", "local-model"),
                fast_model: optional_string(llm, "fast_model"),
                timeout: Duration::from_secs(clamped_u64(llm, "timeout_secs", 120, 1, 3_600)),
                temperature: llm
                    .and_then(|v| v.get("temperature"))
                    .and_then(Value::as_f64)
                    .map(|t| t.clamp(0.0, 2.0))
                    .unwrap_or(0.7),
                structured_output: llm
                    .and_then(|v| v.get("structured_output"))
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            },
            search: SearchSettings {
                provider: optional_string(search, "provider")
                    .and_then(|raw| SearchEngine::parse(&raw))
                    .unwrap_or(SearchEngine::Google),
                results_per_query: clamped_u64(search, "results_per_query", 5, 1, 10) as usize,
                timeout: Duration::from_secs(clamped_u64(search, "timeout_secs", 10, 1, 300)),
                google_api_key: optional_string(search, "google_search_api_key"),
                google_engine_id: optional_string(search, "google_search_engine_id"),
                brave_api_key: optional_string(search, "brave_search_api_key"),
                bing_api_key: optional_string(search, "bing_search_api_key"),
            },
            scrape: ScrapeSettings {
                standard_timeout: Duration::from_secs(clamped_u64(
                    scrape,
                    "standard_timeout_secs",
                    15,
                    1,
                    120,
                )),
                proxied_timeout: Duration::from_secs(clamped_u64(
                    scrape,
                    "proxied_timeout_secs",
                    70,
                    30,
                    120,
                )),
                max_bytes: clamped_u64(scrape, "max_bytes", 5_000_000, 1_000_000, 10_000_000) as usize,
                snapshot_chars: clamped_u64(scrape, "snapshot_chars", 1000, 0, 100_000) as usize,
                proxy_endpoint: string_or(scrape, "proxy_endpoint", DEFAULT_PROXY_ENDPOINT),
                proxy_api_key: optional_string(scrape, "proxy_api_key"),
                standard_extraction: optional_string(scrape, "standard_extraction")
                    .and_then(|raw| ExtractionMode::parse(&raw))
                    .unwrap_or(ExtractionMode::Readability),
                proxied_extraction: optional_string(scrape, "proxied_extraction")
                    .and_then(|raw| ExtractionMode::parse(&raw))
                    .unwrap_or(ExtractionMode::Readability),
                user_agents: string_array(scrape, "user_agents"),
            },
            pipeline: PipelineSettings {
                url_ceiling: clamped_u64(
                    pipeline,
                    "url_ceiling",
                    pipeline_defaults.url_ceiling as u64,
                    1,
                    10,
                ) as usize,
                batch_size: clamped_u64(
                    pipeline,
                    "batch_size",
                    pipeline_defaults.batch_size as u64,
                    1,
                    10,
                ) as usize,
                min_article_chars: clamped_u64(
                    pipeline,
                    "min_article_chars",
                    pipeline_defaults.min_article_chars as u64,
                    0,
                    100_000,
                ) as usize,
                min_context_chars: clamped_u64(
                    pipeline,
                    "min_context_chars",
                    pipeline_defaults.min_context_chars as u64,
                    0,
                    1_000_000,
                ) as usize,
                relevance_excerpt_chars: clamped_u64(
                    pipeline,
                    "relevance_excerpt_chars",
                    pipeline_defaults.relevance_excerpt_chars as u64,
                    1,
                    100_000,
                ) as usize,
            },
            server: ServerSettings {
                host: string_or(server, "host", "127.0.0.1"),
                allowed_origins: string_array(server, "allowed_origins"),
            },
            logging: LoggingSettings {
                level: string_or(logging, "level", "info").to_lowercase(),
                file_name: string_or(logging, "file_name", "ragpress.log"),
                stdout: logging
                    .and_then(|v| v.get("stdout"))
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            },
        }
    }
}

impl ScrapeSettings {
    pub fn extraction_modes(&self) -> ExtractionModes {
        ExtractionModes {
            standard: self.standard_extraction,
            proxied: self.proxied_extraction,
        }
    }
}

fn section<'a>(config: &'a Value, key: &str) -> Option<&'a Value> {
    config.get(key).filter(|value| value.is_object())
}

fn optional_string(section: Option<&Value>, key: &str) -> Option<String> {
    section
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn string_or(section: Option<&Value>, key: &str, default: &str) -> String {
    optional_string(section, key).unwrap_or_else(|| default.to_string())
}

fn clamped_u64(section: Option<&Value>, key: &str, default: u64, min: u64, max: u64) -> u64 {
    section
        .and_then(|v| v.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(default)
        .clamp(min, max)
}

fn string_array(section: Option<&Value>, key: &str) -> Vec<String> {
    section
        .and_then(|v| v.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
