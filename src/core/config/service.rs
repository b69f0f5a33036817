use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::validation::validate_config;
use crate::core::errors::ApiError;

const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 8] = [
    "api_key",
    "secret",
    "password",
    "_token",
    "token_",
    "credential",
    "bearer",
    "engine_id",
];

const SENSITIVE_WHITELIST: [&str; 2] = ["max_tokens", "tokens"];

/// Environment variables that override credential-bearing config paths.
const ENV_OVERRIDES: [(&str, &[&str]); 7] = [
    ("RAGPRESS_LLM_API_KEY", &["llm", "api_key"]),
    ("RAGPRESS_LLM_BASE_URL", &["llm", "base_url"]),
    ("GOOGLE_SEARCH_API_KEY", &["search", "google_search_api_key"]),
    ("GOOGLE_SEARCH_ENGINE_ID", &["search", "google_search_engine_id"]),
    ("BRAVE_SEARCH_API_KEY", &["search", "brave_search_api_key"]),
    ("BING_SEARCH_API_KEY", &["search", "bing_search_api_key"]),
    ("SCRAPERAPI_KEY", &["scrape", "proxy_api_key"]),
];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    /// Loads `config.yml` merged with `secrets.yaml` and credential env vars, then validates.
    pub fn load_config(&self) -> Result<Value, ApiError> {
        let public_config = load_yaml_file(&self.paths.config_path);
        let secrets_config = load_yaml_file(&self.paths.secrets_path);
        let mut merged = deep_merge(&public_config, &secrets_config);
        apply_env_overrides(&mut merged, |name| env::var(name).ok());
        validate_config(&merged)?;
        Ok(merged)
    }

    /// The effective configuration with every credential replaced by `****`.
    pub fn redacted_config(&self) -> Result<Value, ApiError> {
        self.load_config().map(|config| redact_sensitive_values(&config))
    }
}

fn load_yaml_file(path: &Path) -> Value {
    if !path.exists() {
        return Value::Object(Map::new());
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Value>(&contents) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => Value::Object(Map::new()),
            Err(err) => {
                tracing::warn!("Ignoring unparsable config file {}: {}", path.display(), err);
                Value::Object(Map::new())
            }
        },
        Err(err) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), err);
            Value::Object(Map::new())
        }
    }
}

pub(crate) fn apply_env_overrides<F>(config: &mut Value, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (name, path) in ENV_OVERRIDES {
        let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        ensure_object_path(config, path, Value::String(value.trim().to_string()));
    }
}

fn ensure_object_path(config: &mut Value, path: &[&str], value: Value) {
    if path.is_empty() {
        return;
    }
    if !config.is_object() {
        *config = Value::Object(Map::new());
    }

    let mut current = config;
    for (index, key) in path.iter().enumerate() {
        if index == path.len() - 1 {
            if let Some(map) = current.as_object_mut() {
                map.insert(key.to_string(), value);
            }
            return;
        }

        if !current.get(*key).map(|v| v.is_object()).unwrap_or(false) {
            let Some(map) = current.as_object_mut() else {
                return;
            };
            map.insert((*key).to_string(), Value::Object(Map::new()));
        }

        let Some(next) = current.get_mut(*key) else {
            return;
        };
        current = next;
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    redacted.insert(key.clone(), Value::String(REDACT_PLACEHOLDER.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_values(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST.iter().any(|allowed| *allowed == key_lower) {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_merges_objects_and_overrides_scalars() {
        let base = json!({
            "search": { "provider": "google", "results_per_query": 5 },
            "pipeline": { "url_ceiling": 5 }
        });
        let secrets = json!({
            "search": { "google_search_api_key": "k" },
            "pipeline": { "url_ceiling": 8 }
        });

        let merged = deep_merge(&base, &secrets);

        assert_eq!(
            merged,
            json!({
                "search": {
                    "provider": "google",
                    "results_per_query": 5,
                    "google_search_api_key": "k"
                },
                "pipeline": { "url_ceiling": 8 }
            })
        );
    }

    #[test]
    fn env_overrides_fill_credential_paths() {
        let mut config = json!({ "scrape": { "standard_timeout_secs": 15 } });
        apply_env_overrides(&mut config, |name| match name {
            "SCRAPERAPI_KEY" => Some("proxy-key".to_string()),
            "GOOGLE_SEARCH_API_KEY" => Some("  g-key ".to_string()),
            "BING_SEARCH_API_KEY" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config["scrape"]["proxy_api_key"], "proxy-key");
        assert_eq!(config["scrape"]["standard_timeout_secs"], 15);
        assert_eq!(config["search"]["google_search_api_key"], "g-key");
        assert!(config["search"].get("bing_search_api_key").is_none());
    }

    #[test]
    fn redact_sensitive_values_replaces_secrets_only() {
        let input = json!({
            "llm": { "api_key": "secret", "max_tokens": 42 },
            "scrape": { "proxy_api_key": "p", "max_bytes": 100 }
        });

        let redacted = redact_sensitive_values(&input);

        assert_eq!(
            redacted,
            json!({
                "llm": { "api_key": "****", "max_tokens": 42 },
                "scrape": { "proxy_api_key": "****", "max_bytes": 100 }
            })
        );
    }

    #[test]
    fn load_config_merges_files_from_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::from_data_dir(dir.path().to_path_buf());
        fs::write(
            dir.path().join("config.yml"),
            "pipeline:\n  url_ceiling: 7\nsearch:\n  provider: brave\n",
        )
        .expect("write config");
        fs::write(
            dir.path().join("secrets.yaml"),
            "search:\n  brave_search_api_key: brave-secret\n",
        )
        .expect("write secrets");

        let service = ConfigService::new(Arc::new(paths));
        let config = service.load_config().expect("config loads");

        assert_eq!(config["pipeline"]["url_ceiling"], 7);
        assert_eq!(config["search"]["provider"], "brave");
        assert_eq!(config["search"]["brave_search_api_key"], "brave-secret");

        let redacted = service.redacted_config().expect("redacted config");
        assert_eq!(redacted["search"]["brave_search_api_key"], "****");
        assert_eq!(redacted["search"]["provider"], "brave");
    }
}
