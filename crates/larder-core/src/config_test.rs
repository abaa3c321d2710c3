use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn empty_env<'a>() -> HashMap<&'a str, &'a str> {
    HashMap::new()
}

fn assert_invalid(map: &HashMap<&str, &str>, expected_var: &str) {
    let result = build_app_config(lookup_from_map(map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == expected_var),
        "expected InvalidEnvVar({expected_var}), got: {result:?}"
    );
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "LARDER_ENV"));
}

#[test]
fn build_app_config_defaults_without_any_vars() {
    let map = empty_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.sources_path.to_str(), Some("./config/sources.yaml"));
    assert!(cfg.inventory_path.is_none());
    assert_eq!(cfg.store_vendor, "Earthfare Supermarket");
    assert_eq!(cfg.user_agent, "larder/0.1 (product-enrichment)");
    assert_eq!(cfg.off_base_url, "https://world.openfoodfacts.org");
    assert_eq!(cfg.off_timeout_secs, 10);
    assert_eq!(cfg.scrape_timeout_secs, 15);
    assert_eq!(cfg.inter_request_delay_ms, 600);
    assert_eq!(cfg.max_concurrent_products, 1);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_secs, 1);
    assert!(cfg.openai_api_key.is_none());
    assert_eq!(cfg.openai_base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.openai_model, "gpt-4o-mini");
    assert_eq!(cfg.openai_timeout_secs, 120);
    assert_eq!(cfg.generation_max_attempts, 3);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = empty_env();
    map.insert("LARDER_ENV", "production");
    map.insert("LARDER_INVENTORY_PATH", "/data/inventory.csv");
    map.insert("LARDER_INTER_REQUEST_DELAY_MS", "0");
    map.insert("LARDER_MAX_CONCURRENT_PRODUCTS", "4");
    map.insert("LARDER_OFF_BASE_URL", "http://127.0.0.1:9000/");
    map.insert("OPENAI_API_KEY", "sk-test");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(
        cfg.inventory_path.as_deref().and_then(|p| p.to_str()),
        Some("/data/inventory.csv")
    );
    assert_eq!(cfg.inter_request_delay_ms, 0);
    assert_eq!(cfg.max_concurrent_products, 4);
    assert_eq!(cfg.off_base_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
}

#[test]
fn blank_inventory_path_is_treated_as_unset() {
    let mut map = empty_env();
    map.insert("LARDER_INVENTORY_PATH", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.inventory_path.is_none());
}

#[test]
fn invalid_numeric_vars_are_rejected() {
    for var in [
        "LARDER_OFF_TIMEOUT_SECS",
        "LARDER_SCRAPE_TIMEOUT_SECS",
        "LARDER_INTER_REQUEST_DELAY_MS",
        "LARDER_MAX_CONCURRENT_PRODUCTS",
        "LARDER_MAX_RETRIES",
        "LARDER_RETRY_BACKOFF_BASE_SECS",
        "LARDER_OPENAI_TIMEOUT_SECS",
        "LARDER_GENERATION_MAX_ATTEMPTS",
    ] {
        let mut map = empty_env();
        map.insert(var, "not-a-number");
        assert_invalid(&map, var);
    }
}

#[test]
fn zero_generation_attempts_is_rejected() {
    let mut map = empty_env();
    map.insert("LARDER_GENERATION_MAX_ATTEMPTS", "0");
    assert_invalid(&map, "LARDER_GENERATION_MAX_ATTEMPTS");
}

#[test]
fn non_http_base_url_is_rejected() {
    let mut map = empty_env();
    map.insert("LARDER_OFF_BASE_URL", "ftp://openfoodfacts.org");
    assert_invalid(&map, "LARDER_OFF_BASE_URL");
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = empty_env();
    map.insert("OPENAI_API_KEY", "sk-super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-super-secret"));
    assert!(rendered.contains("[redacted]"));
}
