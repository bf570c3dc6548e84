use heatshop_upstream::UpstreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("best sellers unavailable: every category failed to load")]
    BestSellersUnavailable,

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}
