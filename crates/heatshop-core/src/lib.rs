pub mod app_config;
pub mod config;
pub mod facets;
pub mod products;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use facets::{load_catalog_facets, CatalogFacets, CategoryFacets, FacetConfig, FacetKind, FacetOption};
pub use products::{Category, NormalizedProduct, NormalizedVariant, VariantKind};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[source] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
