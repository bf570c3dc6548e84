//! Extraction of the product array from an upstream page response.
//!
//! Depending on the collection, the upstream returns the products as a bare
//! array, under a key named after the category (`{"terea": [...]}`), under
//! `products`, or under `data`. Pagination metadata (`skip`, `limit`,
//! `total`) may sit alongside.

use heatshop_core::Category;
use serde_json::Value;

use crate::error::UpstreamError;
use crate::types::UpstreamProduct;

const METADATA_KEYS: &[&str] = &["skip", "limit", "total"];

/// Pulls the list of product records for `category` out of a page body.
///
/// Lookup order: bare array, `{category}` key, `products`, `data`, then the
/// first array-valued non-metadata key. Elements that are not JSON objects
/// are skipped. Records that fail to deserialize are skipped with a warning.
///
/// Returns the records together with the raw element count, which callers
/// compare against the page size to detect the last page.
///
/// # Errors
///
/// Returns [`UpstreamError::UnexpectedShape`] when the body contains no
/// product array at all.
pub fn extract_products(
    body: Value,
    category: Category,
) -> Result<(Vec<UpstreamProduct>, usize), UpstreamError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let key = [category.as_str(), "products", "data"]
                .into_iter()
                .find(|k| map.get(*k).is_some_and(Value::is_array))
                .map(str::to_owned)
                .or_else(|| {
                    map.iter()
                        .find(|(k, v)| v.is_array() && !METADATA_KEYS.contains(&k.as_str()))
                        .map(|(k, _)| k.clone())
                });

            match key.and_then(|k| map.remove(&k)) {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(UpstreamError::UnexpectedShape {
                        context: format!("products page for {category}"),
                        reason: "no product array in response object".to_owned(),
                    })
                }
            }
        }
        other => {
            return Err(UpstreamError::UnexpectedShape {
                context: format!("products page for {category}"),
                reason: format!("expected array or object, got {}", json_kind(&other)),
            })
        }
    };

    let raw_count = items.len();
    let products = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| match serde_json::from_value::<UpstreamProduct>(item) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(%category, error = %e, "skipping malformed upstream product");
                None
            }
        })
        .collect();

    Ok((products, raw_count))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
