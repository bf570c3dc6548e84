//! Query-driven product filters for category listings.
//!
//! Criteria come from the storefront query string. Every key maps to one
//! predicate; predicates run left to right over the in-stock products of the
//! category. Keys without a predicate keep every product, and a predicate
//! that cannot evaluate its value keeps the product too.

use heatshop_core::{Category, NormalizedProduct, VariantKind};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::sort::SortKey;

/// Lower bound used when a `price` range omits `min`.
pub const DEFAULT_PRICE_MIN: f64 = 0.0;
/// Upper bound used when a `price` range omits `max`.
pub const DEFAULT_PRICE_MAX: f64 = 10_000.0;

/// Query keys that drive pagination rather than filtering.
const PAGING_KEYS: &[&str] = &["page", "perPage"];

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter '{key}' does not accept {kind} values")]
    UnsupportedValue { key: String, kind: &'static str },
}

/// Inclusive price bounds. A `None` bound imposes no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<FilterValue>),
    Range(PriceRange),
    Object(Map<String, Value>),
}

impl FilterValue {
    /// Converts a parsed JSON value. `null` (and `null` list items) yield `None`.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s)),
            Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(map) => Some(Self::Object(map)),
        }
    }

    fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::List(_) | Self::Range(_) | Self::Object(_) => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::List(_) => "list",
            Self::Range(_) => "range",
            Self::Object(_) => "object",
        }
    }
}

/// Ordered filter key/value pairs. Re-inserting a key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    entries: Vec<(String, FilterValue)>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FilterValue) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `sort` criterion, when it names a known sort order.
    #[must_use]
    pub fn sort_key(&self) -> Option<SortKey> {
        match self.get("sort") {
            Some(FilterValue::Text(s)) => SortKey::parse(s),
            _ => None,
        }
    }

    /// Stable string form used in listing cache keys.
    #[must_use]
    pub fn cache_key(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_default()
    }

    /// Builds criteria from decoded query pairs, skipping `page` and `perPage`.
    ///
    /// - `price` must be a JSON object; `min` defaults to
    ///   [`DEFAULT_PRICE_MIN`] and `max` to [`DEFAULT_PRICE_MAX`]. Anything
    ///   else drops the filter.
    /// - values containing a comma become a trimmed text list;
    /// - other values are parsed as JSON, and non-JSON text stays text.
    ///   JSON `null` drops the filter.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = Self::new();

        for (key, raw) in pairs {
            let (key, raw) = (key.as_ref(), raw.as_ref());
            if PAGING_KEYS.contains(&key) {
                continue;
            }

            if key == "price" {
                match serde_json::from_str::<Value>(raw) {
                    Ok(Value::Object(bounds)) => {
                        criteria.insert(key, FilterValue::Range(parse_price_range(&bounds)));
                    }
                    Ok(other) => {
                        tracing::debug!(value = %other, "ignoring non-object price filter");
                    }
                    Err(e) => {
                        tracing::warn!(raw, error = %e, "failed to parse price filter");
                    }
                }
                continue;
            }

            if raw.contains(',') {
                let items = raw
                    .split(',')
                    .map(|item| FilterValue::Text(item.trim().to_owned()))
                    .collect();
                criteria.insert(key, FilterValue::List(items));
                continue;
            }

            match serde_json::from_str::<Value>(raw) {
                Ok(value) => {
                    if let Some(value) = FilterValue::from_json(value) {
                        criteria.insert(key, value);
                    }
                }
                Err(_) => criteria.insert(key, FilterValue::Text(raw.to_owned())),
            }
        }

        criteria
    }
}

fn parse_price_range(bounds: &Map<String, Value>) -> PriceRange {
    let bound = |name: &str, default: f64| match bounds.get(name) {
        None => Some(default),
        Some(value) => json_number(value),
    };
    PriceRange {
        min: bound("min", DEFAULT_PRICE_MIN),
        max: bound("max", DEFAULT_PRICE_MAX),
    }
}

fn json_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().ok()?,
        Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Keeps the in-stock products of `category` that satisfy every criterion.
///
/// Stock filtering always runs first. A predicate error keeps the product and
/// is logged once per criterion.
#[must_use]
pub fn apply_filters(
    products: &[NormalizedProduct],
    criteria: &FilterCriteria,
    category: Category,
) -> Vec<NormalizedProduct> {
    let mut filtered: Vec<&NormalizedProduct> = products.iter().filter(|p| p.in_stock).collect();

    for (key, value) in criteria.iter() {
        if key == "sort" || key == "page" {
            continue;
        }

        if let Some((failures, e)) = retain_matching(&mut filtered, key, value, category) {
            tracing::warn!(
                %category,
                key,
                failures,
                error = %e,
                "filter evaluation failed; keeping affected products"
            );
        }
    }

    filtered.into_iter().cloned().collect()
}

/// Drops the products that fail one criterion. Products whose evaluation
/// errors are kept; returns how many errored along with the first error.
fn retain_matching(
    products: &mut Vec<&NormalizedProduct>,
    key: &str,
    value: &FilterValue,
    category: Category,
) -> Option<(usize, FilterError)> {
    let mut failures = 0;
    let mut first_error = None;
    products.retain(|product| match matches_filter(key, value, product, category) {
        Ok(keep) => keep,
        Err(e) => {
            failures += 1;
            first_error.get_or_insert(e);
            true
        }
    });
    first_error.map(|e| (failures, e))
}

/// Evaluates a single criterion against one product.
///
/// # Errors
///
/// Returns [`FilterError::UnsupportedValue`] when the value has a shape the
/// predicate cannot interpret.
pub fn matches_filter(
    key: &str,
    value: &FilterValue,
    product: &NormalizedProduct,
    category: Category,
) -> Result<bool, FilterError> {
    match key {
        "price" => Ok(match value {
            FilterValue::Range(range) => range.contains(product.price),
            _ => true,
        }),
        "minPrice" => Ok(price_bound(key, value)?.is_none_or(|min| product.price >= min)),
        "maxPrice" => Ok(price_bound(key, value)?.is_none_or(|max| product.price <= max)),
        "package_type" => Ok(category != Category::Terea
            || match value {
                FilterValue::Text(s) => VariantKind::parse(s).is_none_or(|k| product.has_variant(k)),
                _ => true,
            }),
        "brand" => Ok(!matches!(category, Category::Iqos | Category::Devices)
            || exact_match(product.category_name.as_deref(), value)),
        "country" => Ok(category != Category::Terea || exact_match(Some(&product.country), value)),
        "color" => Ok(exact_match(product.color.as_deref(), value)),
        "flavor" => {
            if category == Category::Terea {
                flavor_match(key, value, &product.flavor_tokens)
            } else {
                Ok(true)
            }
        }
        "search" => search_match(key, value, product, category),
        _ => Ok(true),
    }
}

fn unsupported(key: &str, value: &FilterValue) -> FilterError {
    FilterError::UnsupportedValue {
        key: key.to_owned(),
        kind: value.kind(),
    }
}

/// `None` means the bound is unparseable and imposes no constraint.
fn price_bound(key: &str, value: &FilterValue) -> Result<Option<f64>, FilterError> {
    match value {
        FilterValue::Number(n) => Ok(Some(*n)),
        FilterValue::Text(s) => Ok(s.trim().parse::<f64>().ok().filter(|n| n.is_finite())),
        other => Err(unsupported(key, other)),
    }
}

fn exact_match(product_value: Option<&str>, filter: &FilterValue) -> bool {
    let Some(product_value) = product_value else {
        return false;
    };
    let product_value = product_value.trim().to_lowercase();
    let equals = |v: &FilterValue| {
        v.scalar_text()
            .is_some_and(|t| t.trim().to_lowercase() == product_value)
    };

    match filter {
        FilterValue::List(items) => items.iter().any(equals),
        FilterValue::Range(_) | FilterValue::Object(_) => false,
        scalar => equals(scalar),
    }
}

fn flavor_match(key: &str, value: &FilterValue, tokens: &[String]) -> Result<bool, FilterError> {
    let hits = |selected: &str| {
        let selected = selected.trim().to_lowercase();
        tokens
            .iter()
            .any(|t| t.contains(selected.as_str()) || selected.contains(t.as_str()))
    };

    match value {
        FilterValue::Text(s) => Ok(hits(s)),
        FilterValue::List(items) => {
            for item in items {
                match item {
                    FilterValue::Text(s) if hits(s) => return Ok(true),
                    FilterValue::Text(_) => {}
                    other => return Err(unsupported(key, other)),
                }
            }
            Ok(false)
        }
        _ => Ok(true),
    }
}

fn search_match(
    key: &str,
    value: &FilterValue,
    product: &NormalizedProduct,
    category: Category,
) -> Result<bool, FilterError> {
    let term = match value {
        FilterValue::Bool(false) => return Ok(true),
        FilterValue::Number(n) if *n == 0.0 => return Ok(true),
        FilterValue::List(items) => items
            .iter()
            .filter_map(FilterValue::scalar_text)
            .collect::<Vec<_>>()
            .join(","),
        FilterValue::Range(_) | FilterValue::Object(_) => return Err(unsupported(key, value)),
        scalar => scalar.scalar_text().unwrap_or_default(),
    };
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Ok(true);
    }

    let fields = [
        Some(product.name.as_str()),
        Some(product.description.as_str()),
        Some(product.country.as_str()),
        Some(product.brand.as_str()),
        product.model.as_deref(),
        product.color.as_deref(),
        product.category_name.as_deref(),
        Some(product.flavor.as_str()),
        product.strength.as_deref(),
    ];
    let found = fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term));

    Ok(found
        || (category == Category::Terea
            && product
                .variants
                .iter()
                .any(|v| v.name.to_lowercase().contains(&term))))
}

#[cfg(test)]
#[path = "filters_test.rs"]
mod tests;
