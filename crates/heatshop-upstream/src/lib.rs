pub mod client;
pub mod envelope;
pub mod error;
pub mod normalize;
pub mod stock;
pub mod types;

pub use client::{OrderReply, UpstreamClient};
pub use error::UpstreamError;
pub use normalize::normalize_product;
pub use stock::resolve_stock;
pub use types::{CategoryField, FlavorField, LooseValue, UpstreamCategory, UpstreamProduct};
