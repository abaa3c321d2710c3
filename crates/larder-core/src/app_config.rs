use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub sources_path: PathBuf,
    pub inventory_path: Option<PathBuf>,
    pub store_vendor: String,
    pub user_agent: String,
    pub off_base_url: String,
    pub off_timeout_secs: u64,
    pub scrape_timeout_secs: u64,
    pub inter_request_delay_ms: u64,
    pub max_concurrent_products: usize,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout_secs: u64,
    pub generation_max_attempts: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field("inventory_path", &self.inventory_path)
            .field("store_vendor", &self.store_vendor)
            .field("user_agent", &self.user_agent)
            .field("off_base_url", &self.off_base_url)
            .field("off_timeout_secs", &self.off_timeout_secs)
            .field("scrape_timeout_secs", &self.scrape_timeout_secs)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("max_concurrent_products", &self.max_concurrent_products)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("openai_timeout_secs", &self.openai_timeout_secs)
            .field("generation_max_attempts", &self.generation_max_attempts)
            .finish()
    }
}
