//! The catalog service: cached upstream loads composed into the storefront
//! operations.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use futures::future::join_all;
use heatshop_core::{AppConfig, Category, NormalizedProduct, NormalizedVariant};
use heatshop_upstream::{normalize_product, OrderReply, UpstreamClient};
use rand::seq::SliceRandom;
use regex::Regex;
use serde::Serialize;

use crate::cache::TtlCache;
use crate::error::CatalogError;
use crate::filters::{apply_filters, FilterCriteria};
use crate::order::Order;
use crate::pagination::{paginate, Page, PageRequest};
use crate::sort::{compare_names, sort_products};

/// Categories that contribute to the best-seller list.
const BEST_SELLER_CATEGORIES: [Category; 2] = [Category::Terea, Category::Iqos];
/// Products taken from a category that has no hits.
const BEST_SELLER_FALLBACK_COUNT: usize = 6;
const BEST_SELLERS_KEY: &str = "best-sellers";

pub const DEFAULT_SIMILAR_LIMIT: usize = 4;
/// Distinct listing pages kept for one TTL window.
pub const LISTING_CACHE_MAX_ENTRIES: usize = 512;
const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_-]").expect("valid slug regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub category: Duration,
    pub product: Duration,
    pub best_sellers: Duration,
    pub listing: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            category: Duration::from_secs(120),
            product: Duration::from_secs(300),
            best_sellers: Duration::from_secs(60),
            listing: Duration::from_secs(60),
        }
    }
}

impl CacheTtls {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            category: Duration::from_secs(config.category_cache_ttl_secs),
            product: Duration::from_secs(config.product_cache_ttl_secs),
            best_sellers: Duration::from_secs(config.best_sellers_cache_ttl_secs),
            listing: Duration::from_secs(config.listing_cache_ttl_secs),
        }
    }
}

/// Paging parameters for upstream category fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub page_size: u32,
    pub inter_request_delay_ms: u64,
}

impl FetchSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_size: config.upstream_page_size,
            inter_request_delay_ms: config.upstream_inter_request_delay_ms,
        }
    }
}

/// Compact product card for the "similar products" carousel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image_url: String,
    pub url: String,
    pub description: String,
    pub variants: Vec<NormalizedVariant>,
    pub in_stock: bool,
}

impl From<&NormalizedProduct> for SimilarProduct {
    fn from(product: &NormalizedProduct) -> Self {
        let first = product.first_variant();
        let slug = if product.reference.is_empty() {
            &product.id
        } else {
            &product.reference
        };
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: first.map_or(product.price, |v| v.price),
            image_url: first
                .and_then(|v| v.image_url.clone())
                .or_else(|| product.image.clone())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            url: format!("/product/{slug}"),
            description: product.description.clone(),
            variants: product.variants.clone(),
            in_stock: product.in_stock,
        }
    }
}

/// Lowercases, turns whitespace runs into `-` and drops everything that is
/// not an ASCII word character or `-`.
#[must_use]
pub fn name_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(&lowered, "-");
    NON_SLUG_RE.replace_all(&dashed, "").into_owned()
}

pub struct CatalogService {
    upstream: UpstreamClient,
    fetch: FetchSettings,
    categories: TtlCache<Category, Vec<NormalizedProduct>>,
    products: TtlCache<String, NormalizedProduct>,
    best_sellers: TtlCache<&'static str, Vec<NormalizedProduct>>,
    listings: TtlCache<String, Page<NormalizedProduct>>,
}

impl CatalogService {
    #[must_use]
    pub fn new(upstream: UpstreamClient, fetch: FetchSettings, ttls: CacheTtls) -> Self {
        Self {
            upstream,
            fetch,
            categories: TtlCache::new(ttls.category),
            products: TtlCache::new(ttls.product),
            best_sellers: TtlCache::new(ttls.best_sellers),
            listings: TtlCache::with_max_entries(ttls.listing, LISTING_CACHE_MAX_ENTRIES),
        }
    }

    /// Returns every normalized product of `category`, fetching all upstream
    /// pages on a cache miss. Failures are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Upstream`] when any page fetch fails.
    pub async fn load_category(
        &self,
        category: Category,
    ) -> Result<Arc<Vec<NormalizedProduct>>, CatalogError> {
        let upstream = &self.upstream;
        let fetch = self.fetch;
        let products = self
            .categories
            .get_or_try_insert_with(category, move || async move {
                let raw = upstream
                    .fetch_all_category(category, fetch.page_size, fetch.inter_request_delay_ms)
                    .await?;
                let products: Vec<NormalizedProduct> = raw
                    .into_iter()
                    .map(|p| normalize_product(p, category))
                    .collect();
                tracing::info!(%category, count = products.len(), "loaded category from upstream");
                Ok::<_, CatalogError>(products)
            })
            .await?;
        Ok(products)
    }

    /// Like [`Self::load_category`], with failures logged and turned into an
    /// empty list.
    pub async fn load_category_or_empty(&self, category: Category) -> Arc<Vec<NormalizedProduct>> {
        match self.load_category(category).await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(%category, error = %e, "category load failed; serving empty list");
                Arc::new(Vec::new())
            }
        }
    }

    /// Filters, sorts and paginates `category`. Pages are memoized by
    /// `category:filters:page:perPage`; a page built from a failed load is
    /// returned empty and not memoized.
    pub async fn list_category(
        &self,
        category: Category,
        criteria: &FilterCriteria,
        request: PageRequest,
    ) -> Arc<Page<NormalizedProduct>> {
        let key = format!(
            "{category}:{}:{}:{}",
            criteria.cache_key(),
            request.page,
            request.per_page
        );
        if let Some(hit) = self.listings.get(&key).await {
            return hit;
        }

        let products = match self.load_category(category).await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(%category, error = %e, "category load failed; serving empty listing");
                return Arc::new(paginate(&[], request));
            }
        };

        let mut filtered = apply_filters(&products, criteria, category);
        sort_products(&mut filtered, criteria.sort_key());
        let page = paginate(&filtered, request);
        tracing::debug!(
            %category,
            total = page.total,
            page = page.page,
            filters = criteria.len(),
            "built category listing"
        );
        self.listings.insert(key, page).await
    }

    /// Looks a product up by ref (case-insensitive), id (exact) or name slug
    /// across every category. Categories that fail to load are skipped.
    /// Only hits are cached.
    pub async fn find_by_ref(&self, reference: &str) -> Option<Arc<NormalizedProduct>> {
        if reference.is_empty() {
            return None;
        }
        let key = reference.to_owned();
        if let Some(hit) = self.products.get(&key).await {
            return Some(hit);
        }

        let loads = join_all(Category::ALL.map(|c| self.load_category(c))).await;
        let needle = reference.to_lowercase();

        for (category, result) in Category::ALL.into_iter().zip(loads) {
            let products = match result {
                Ok(products) => products,
                Err(e) => {
                    tracing::warn!(%category, error = %e, "skipping category in product lookup");
                    continue;
                }
            };

            if let Some(product) = products
                .iter()
                .find(|p| matches_reference(p, reference, &needle))
            {
                return Some(self.products.insert(key, product.clone()).await);
            }
        }

        tracing::debug!(reference, "product not found in any category");
        None
    }

    /// In-stock products of `category` other than `product_id`, shuffled and
    /// truncated to `limit`.
    pub async fn similar_products(
        &self,
        product_id: &str,
        category: Category,
        limit: usize,
    ) -> Vec<SimilarProduct> {
        let products = self.load_category_or_empty(category).await;
        let mut candidates: Vec<&NormalizedProduct> = products
            .iter()
            .filter(|p| p.in_stock && !p.id.is_empty() && p.id != product_id)
            .collect();

        candidates.shuffle(&mut rand::rng());
        candidates
            .into_iter()
            .take(limit)
            .map(SimilarProduct::from)
            .collect()
    }

    /// Hits from terea and iqos (or each category's first in-stock products
    /// when it has no hits), sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::BestSellersUnavailable`] when every category
    /// fails and no earlier result is cached.
    pub async fn best_sellers(&self) -> Result<Arc<Vec<NormalizedProduct>>, CatalogError> {
        if let Some(hit) = self.best_sellers.get(&BEST_SELLERS_KEY).await {
            return Ok(hit);
        }

        let loads = join_all(BEST_SELLER_CATEGORIES.map(|c| self.load_category(c))).await;
        let mut picked = Vec::new();
        let mut failures = 0usize;

        for (category, result) in BEST_SELLER_CATEGORIES.into_iter().zip(loads) {
            match result {
                Ok(products) => {
                    let before = picked.len();
                    picked.extend(pick_best_sellers(&products));
                    tracing::debug!(%category, count = picked.len() - before, "picked best sellers");
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(%category, error = %e, "best sellers: category load failed");
                }
            }
        }

        if failures == BEST_SELLER_CATEGORIES.len() {
            if let Some(stale) = self.best_sellers.get_stale(&BEST_SELLERS_KEY).await {
                tracing::warn!("best sellers: serving stale cache");
                return Ok(stale);
            }
            return Err(CatalogError::BestSellersUnavailable);
        }

        picked.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(self.best_sellers.insert(BEST_SELLERS_KEY, picked).await)
    }

    /// Resolves each distinct ref through [`Self::find_by_ref`].
    pub async fn check_stock(
        &self,
        refs: &[String],
    ) -> BTreeMap<String, Option<Arc<NormalizedProduct>>> {
        let mut unique: Vec<&str> = refs.iter().map(String::as_str).collect();
        unique.sort_unstable();
        unique.dedup();

        let found = join_all(unique.iter().map(|r| self.find_by_ref(r))).await;
        unique
            .into_iter()
            .map(str::to_owned)
            .zip(found)
            .collect()
    }

    /// Validates `order` and forwards it upstream, relaying the reply.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidOrder`] before any upstream call when
    /// validation fails, or [`CatalogError::Upstream`] on transport failure.
    pub async fn submit_order(&self, order: &Order) -> Result<OrderReply, CatalogError> {
        order.validate()?;
        let reply = self.upstream.submit_order(order).await?;
        tracing::info!(
            status = reply.status,
            items = order.ordered_items.len(),
            "order forwarded upstream"
        );
        Ok(reply)
    }
}

fn matches_reference(product: &NormalizedProduct, reference: &str, needle: &str) -> bool {
    (!product.reference.is_empty() && product.reference.to_lowercase() == needle)
        || (!product.id.is_empty() && product.id == reference)
        || name_slug(&product.name) == needle
}

fn pick_best_sellers(products: &[NormalizedProduct]) -> Vec<NormalizedProduct> {
    let hits: Vec<NormalizedProduct> = products
        .iter()
        .filter(|p| p.in_stock && p.hit)
        .cloned()
        .collect();
    if !hits.is_empty() {
        return hits;
    }
    products
        .iter()
        .filter(|p| p.in_stock)
        .take(BEST_SELLER_FALLBACK_COUNT)
        .cloned()
        .collect()
}
