use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use heatshop_catalog::{FilterCriteria, Page, PageRequest, SimilarProduct, DEFAULT_SIMILAR_LIMIT};
use heatshop_core::{Category, CategoryFacets, NormalizedProduct};
use serde::{Deserialize, Serialize};

use super::{map_catalog_error, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SimilarQuery {
    product_id: Option<String>,
    category: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CheckStockRequest {
    refs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct BestSellersBody {
    success: bool,
    products: Arc<Vec<NormalizedProduct>>,
    count: usize,
    /// Milliseconds since the Unix epoch.
    timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

/// Full normalized product list of a category. Unknown names load terea.
pub(super) async fn get_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> Result<Json<Arc<Vec<NormalizedProduct>>>, ApiError> {
    let category = Category::parse_or_default(&category);
    let products = state
        .catalog
        .load_category(category)
        .await
        .map_err(|e| map_catalog_error(req_id.0, &e))?;
    Ok(Json(products))
}

/// A listing page when `slug` names a category, otherwise the product whose
/// ref, id or name slug equals `slug`.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ProductResponse>, ApiError> {
    if let Some(category) = Category::parse(&slug) {
        let param = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let request = PageRequest::from_query(param("page"), param("perPage"));
        let criteria = FilterCriteria::from_query_pairs(params.iter().map(|(k, v)| (k, v)));
        let page = state.catalog.list_category(category, &criteria, request).await;
        return Ok(Json(ProductResponse::Listing(page)));
    }

    match state.catalog.find_by_ref(&slug).await {
        Some(product) => Ok(Json(ProductResponse::Product(product))),
        None => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("product or category '{slug}' not found"),
        )),
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum ProductResponse {
    Listing(Arc<Page<NormalizedProduct>>),
    Product(Arc<NormalizedProduct>),
}

pub(super) async fn list_similar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<Vec<SimilarProduct>>, ApiError> {
    let present = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(product_id), Some(category)) = (present(query.product_id), present(query.category))
    else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "productId and category are required",
        ));
    };

    let limit = query
        .limit
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_SIMILAR_LIMIT);
    let category = Category::parse_or_default(&category);

    let similar = state
        .catalog
        .similar_products(&product_id, category, limit)
        .await;
    Ok(Json(similar))
}

pub(super) async fn check_stock(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<CheckStockRequest>, JsonRejection>,
) -> Result<Json<BTreeMap<String, Option<Arc<NormalizedProduct>>>>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "invalid check-stock payload");
        ApiError::new(req_id.0, "bad_request", "body must be {\"refs\": [string]}")
    })?;

    Ok(Json(state.catalog.check_stock(&request.refs).await))
}

/// Best sellers in the storefront envelope. The timestamp is taken when the
/// response is built.
pub(super) async fn list_best_sellers(
    State(state): State<AppState>,
) -> (StatusCode, Json<BestSellersBody>) {
    let timestamp = chrono::Utc::now().timestamp_millis();
    match state.catalog.best_sellers().await {
        Ok(products) => (
            StatusCode::OK,
            Json(BestSellersBody {
                success: true,
                count: products.len(),
                products,
                timestamp,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "best sellers request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BestSellersBody {
                    success: false,
                    products: Arc::new(Vec::new()),
                    count: 0,
                    timestamp,
                    error: Some("failed to fetch best sellers"),
                }),
            )
        }
    }
}

pub(super) async fn get_filters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> Result<Json<CategoryFacets>, ApiError> {
    Category::parse(&category)
        .and_then(|c| state.facets.for_category(c))
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            ApiError::new(
                req_id.0,
                "not_found",
                format!("no filters configured for '{category}'"),
            )
        })
}
