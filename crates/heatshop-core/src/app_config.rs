use std::net::SocketAddr;
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

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    /// Base URL of the upstream product API, e.g. `http://10.0.0.5:8000`.
    pub upstream_url: String,
    pub upstream_timeout_secs: u64,
    pub upstream_user_agent: String,
    /// Page size for `skip`/`limit` pagination against the upstream API.
    pub upstream_page_size: u32,
    pub upstream_inter_request_delay_ms: u64,
    pub category_cache_ttl_secs: u64,
    pub product_cache_ttl_secs: u64,
    pub best_sellers_cache_ttl_secs: u64,
    pub listing_cache_ttl_secs: u64,
}
