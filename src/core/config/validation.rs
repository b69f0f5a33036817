use serde_json::{Map, Value};

use crate::core::errors::ApiError;

const SEARCH_PROVIDERS: [&str; 4] = ["google", "brave", "bing", "duckduckgo"];
const EXTRACTION_MODES: [&str; 2] = ["readability", "verbatim"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Type- and range-checks the merged config tree before typed settings are built.
pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_optional_string_field(llm, "llm.base_url", "base_url")?;
        validate_optional_string_field(llm, "llm.api_key", "api_key")?;
        validate_optional_string_field(llm, "llm.default_model", "default_model")?;
        validate_optional_string_field(llm, "llm.fast_model", "fast_model")?;
        validate_u64_field(llm, "llm.timeout_secs", "timeout_secs", 1, 3_600)?;
        validate_f64_field(llm, "llm.temperature", "temperature", 0.0, 2.0)?;
        validate_bool_field(llm, "llm.structured_output", "structured_output")?;
    }

    if let Some(search) = expect_optional_object(root, "search")? {
        validate_enum_field(search, "search.provider", "provider", &SEARCH_PROVIDERS)?;
        validate_u64_field(
            search,
            "search.results_per_query",
            "results_per_query",
            1,
            10,
        )?;
        validate_u64_field(search, "search.timeout_secs", "timeout_secs", 1, 300)?;
        for key in [
            "google_search_api_key",
            "google_search_engine_id",
            "brave_search_api_key",
            "bing_search_api_key",
        ] {
            validate_optional_string_field(search, &format!("search.{}", key), key)?;
        }
    }

    if let Some(scrape) = expect_optional_object(root, "scrape")? {
        validate_u64_field(
            scrape,
            "scrape.standard_timeout_secs",
            "standard_timeout_secs",
            1,
            600,
        )?;
        validate_u64_field(
            scrape,
            "scrape.proxied_timeout_secs",
            "proxied_timeout_secs",
            1,
            600,
        )?;
        validate_u64_field(scrape, "scrape.max_bytes", "max_bytes", 1, 100_000_000)?;
        validate_u64_field(scrape, "scrape.snapshot_chars", "snapshot_chars", 0, 1_000_000)?;
        validate_optional_string_field(scrape, "scrape.proxy_endpoint", "proxy_endpoint")?;
        validate_optional_string_field(scrape, "scrape.proxy_api_key", "proxy_api_key")?;
        validate_enum_field(
            scrape,
            "scrape.standard_extraction",
            "standard_extraction",
            &EXTRACTION_MODES,
        )?;
        validate_enum_field(
            scrape,
            "scrape.proxied_extraction",
            "proxied_extraction",
            &EXTRACTION_MODES,
        )?;
        validate_string_array_field(scrape, "scrape.user_agents", "user_agents")?;
    }

    if let Some(pipeline) = expect_optional_object(root, "pipeline")? {
        validate_u64_field(pipeline, "pipeline.url_ceiling", "url_ceiling", 1, 100)?;
        validate_u64_field(pipeline, "pipeline.batch_size", "batch_size", 1, 100)?;
        validate_u64_field(
            pipeline,
            "pipeline.min_article_chars",
            "min_article_chars",
            0,
            1_000_000,
        )?;
        validate_u64_field(
            pipeline,
            "pipeline.min_context_chars",
            "min_context_chars",
            0,
            10_000_000,
        )?;
        validate_u64_field(
            pipeline,
            "pipeline.relevance_excerpt_chars",
            "relevance_excerpt_chars",
            1,
            1_000_000,
        )?;
    }

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_string_array_field(server, "server.allowed_origins", "allowed_origins")?;
    }

    if let Some(logging) = expect_optional_object(root, "logging")? {
        validate_enum_field(logging, "logging.level", "level", &LOG_LEVELS)?;
        validate_optional_string_field(logging, "logging.file_name", "file_name")?;
        validate_bool_field(logging, "logging.stdout", "stdout")?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(text.trim())) {
        return Ok(());
    }
    Err(ApiError::BadRequest(format!(
        "Invalid config at '{}': expected one of {}",
        path,
        allowed.join(", ")
    )))
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
