use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but malformed.
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
/// Returns `ConfigError` if a variable is present but malformed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values are errors.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw.trim_end_matches('/').to_string())
        } else {
            Err(invalid(var, format!("\"{raw}\" is not an http(s) URL")))
        }
    };

    let env = parse_environment(&or_default("LARDER_ENV", "development"))?;
    let log_level = or_default("LARDER_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default("LARDER_SOURCES_PATH", "./config/sources.yaml"));
    let inventory_path = lookup("LARDER_INVENTORY_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let store_vendor = or_default("LARDER_STORE_VENDOR", "Earthfare Supermarket");
    let user_agent = or_default("LARDER_USER_AGENT", "larder/0.1 (product-enrichment)");

    let off_base_url = parse_url("LARDER_OFF_BASE_URL", "https://world.openfoodfacts.org")?;
    let off_timeout_secs = parse_u64("LARDER_OFF_TIMEOUT_SECS", "10")?;
    let scrape_timeout_secs = parse_u64("LARDER_SCRAPE_TIMEOUT_SECS", "15")?;
    let inter_request_delay_ms = parse_u64("LARDER_INTER_REQUEST_DELAY_MS", "600")?;
    let max_concurrent_products = parse_usize("LARDER_MAX_CONCURRENT_PRODUCTS", "1")?;
    let max_retries = parse_u32("LARDER_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("LARDER_RETRY_BACKOFF_BASE_SECS", "1")?;

    let openai_api_key = lookup("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let openai_base_url = parse_url("LARDER_OPENAI_BASE_URL", "https://api.openai.com/v1")?;
    let openai_model = or_default("LARDER_OPENAI_MODEL", "gpt-4o-mini");
    let openai_timeout_secs = parse_u64("LARDER_OPENAI_TIMEOUT_SECS", "120")?;
    let generation_max_attempts = parse_u32("LARDER_GENERATION_MAX_ATTEMPTS", "3")?;
    if generation_max_attempts == 0 {
        return Err(invalid(
            "LARDER_GENERATION_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        sources_path,
        inventory_path,
        store_vendor,
        user_agent,
        off_base_url,
        off_timeout_secs,
        scrape_timeout_secs,
        inter_request_delay_ms,
        max_concurrent_products,
        max_retries,
        retry_backoff_base_secs,
        openai_api_key,
        openai_base_url,
        openai_model,
        openai_timeout_secs,
        generation_max_attempts,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LARDER_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
