//! Catalog composition: cached category loads, filtering, sorting,
//! pagination, product lookup and order forwarding.

pub mod cache;
pub mod error;
pub mod filters;
pub mod order;
pub mod pagination;
pub mod service;
pub mod sort;

pub use cache::{CacheEntry, TtlCache};
pub use error::CatalogError;
pub use filters::{apply_filters, FilterCriteria, FilterError, FilterValue, PriceRange};
pub use order::{Order, OrderItem};
pub use pagination::{paginate, Page, PageRequest};
pub use service::{
    name_slug, CacheTtls, CatalogService, FetchSettings, SimilarProduct, DEFAULT_SIMILAR_LIMIT,
};
pub use sort::{sort_products, SortKey};
