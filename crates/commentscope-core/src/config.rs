use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment, FetchSettings, InsightSettings, SourceBackend};
use crate::ConfigError;

const DEFAULT_INSIGHT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_INSIGHT_MODEL: &str = "llama3-8b-8192";
const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v18.0";
const MAX_TOKENS_LIMIT: u32 = 4096;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so tests can
/// drive them from a `HashMap`.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_key = require("GROQ_API_KEY")?;

    let env = parse_environment(&or_default("COMMENTSCOPE_ENV", "development"))?;
    let log_level = or_default("COMMENTSCOPE_LOG_LEVEL", "info");
    let rules_path = optional("COMMENTSCOPE_RULES_PATH").map(PathBuf::from);

    let temperature = or_default("COMMENTSCOPE_INSIGHT_TEMPERATURE", "0.3")
        .parse::<f32>()
        .map_err(|e| invalid("COMMENTSCOPE_INSIGHT_TEMPERATURE", e.to_string()))?;
    if !(0.0..=2.0).contains(&temperature) {
        return Err(invalid(
            "COMMENTSCOPE_INSIGHT_TEMPERATURE",
            format!("{temperature} is outside 0.0..=2.0"),
        ));
    }

    let max_tokens = parse_u32("COMMENTSCOPE_INSIGHT_MAX_TOKENS", "350")?;
    if max_tokens == 0 || max_tokens > MAX_TOKENS_LIMIT {
        return Err(invalid(
            "COMMENTSCOPE_INSIGHT_MAX_TOKENS",
            format!("{max_tokens} is outside 1..={MAX_TOKENS_LIMIT}"),
        ));
    }

    let insight = InsightSettings {
        api_url: or_default("COMMENTSCOPE_INSIGHT_URL", DEFAULT_INSIGHT_URL),
        api_key,
        model: or_default("COMMENTSCOPE_INSIGHT_MODEL", DEFAULT_INSIGHT_MODEL),
        temperature,
        max_tokens,
        timeout_secs: parse_u64("COMMENTSCOPE_INSIGHT_TIMEOUT_SECS", "60")?,
        max_retries: parse_u32("COMMENTSCOPE_INSIGHT_MAX_RETRIES", "2")?,
        backoff_base_ms: parse_u64("COMMENTSCOPE_INSIGHT_BACKOFF_BASE_MS", "1000")?,
    };

    let backend = or_default("COMMENTSCOPE_SOURCE_BACKEND", "cdp")
        .parse::<SourceBackend>()
        .map_err(|reason| invalid("COMMENTSCOPE_SOURCE_BACKEND", reason))?;

    let timeout_secs = parse_u64("COMMENTSCOPE_FETCH_TIMEOUT_SECS", "120")?;
    if timeout_secs == 0 {
        return Err(invalid(
            "COMMENTSCOPE_FETCH_TIMEOUT_SECS",
            "fetch timeout must be greater than zero".to_string(),
        ));
    }

    let graph_access_token = optional("INSTAGRAM_GRAPH_ACCESS_TOKEN");
    if backend == SourceBackend::Graph && graph_access_token.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "INSTAGRAM_GRAPH_ACCESS_TOKEN".to_string(),
        ));
    }

    let fetch = FetchSettings {
        backend,
        webdriver_url: or_default("COMMENTSCOPE_WEBDRIVER_URL", "http://localhost:9515"),
        chrome_path: optional("COMMENTSCOPE_CHROME_PATH").map(PathBuf::from),
        page_load_wait_ms: parse_u64("COMMENTSCOPE_PAGE_LOAD_WAIT_MS", "5000")?,
        youtube_scroll_count: parse_u32("COMMENTSCOPE_YOUTUBE_SCROLL_COUNT", "8")?,
        youtube_scroll_delay_ms: parse_u64("COMMENTSCOPE_YOUTUBE_SCROLL_DELAY_MS", "2000")?,
        timeout_secs,
        graph_base_url: or_default("INSTAGRAM_GRAPH_BASE_URL", DEFAULT_GRAPH_BASE_URL),
        graph_access_token,
        graph_media_id: optional("INSTAGRAM_GRAPH_MEDIA_ID"),
    };

    Ok(AppConfig {
        env,
        log_level,
        rules_path,
        insight,
        fetch,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COMMENTSCOPE_ENV".to_string(),
            reason: format!(
                "unknown environment '{other}'; expected development, test, or production"
            ),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
