use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let upstream_url = require("HEATSHOP_UPSTREAM_URL")?
        .trim()
        .trim_end_matches('/')
        .to_string();
    if !(upstream_url.starts_with("http://") || upstream_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "HEATSHOP_UPSTREAM_URL".to_string(),
            reason: format!("\"{upstream_url}\" must start with http:// or https://"),
        });
    }

    let env = parse_environment(&or_default("HEATSHOP_ENV", "development"))?;

    let bind_addr = parse_addr("HEATSHOP_BIND_ADDR", "0.0.0.0:3001")?;
    let log_level = or_default("HEATSHOP_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("HEATSHOP_CATALOG_PATH", "./config/catalog.yaml"));

    let upstream_timeout_secs = parse_u64("HEATSHOP_UPSTREAM_TIMEOUT_SECS", "10")?;
    let upstream_user_agent = or_default("HEATSHOP_UPSTREAM_USER_AGENT", "heatshop/0.1 (storefront)");
    let upstream_page_size = parse_u32("HEATSHOP_UPSTREAM_PAGE_SIZE", "50")?;
    if upstream_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "HEATSHOP_UPSTREAM_PAGE_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let upstream_inter_request_delay_ms =
        parse_u64("HEATSHOP_UPSTREAM_INTER_REQUEST_DELAY_MS", "100")?;

    let category_cache_ttl_secs = parse_u64("HEATSHOP_CATEGORY_CACHE_TTL_SECS", "120")?;
    let product_cache_ttl_secs = parse_u64("HEATSHOP_PRODUCT_CACHE_TTL_SECS", "300")?;
    let best_sellers_cache_ttl_secs = parse_u64("HEATSHOP_BEST_SELLERS_CACHE_TTL_SECS", "60")?;
    let listing_cache_ttl_secs = parse_u64("HEATSHOP_LISTING_CACHE_TTL_SECS", "60")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        upstream_url,
        upstream_timeout_secs,
        upstream_user_agent,
        upstream_page_size,
        upstream_inter_request_delay_ms,
        category_cache_ttl_secs,
        product_cache_ttl_secs,
        best_sellers_cache_ttl_secs,
        listing_cache_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HEATSHOP_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
