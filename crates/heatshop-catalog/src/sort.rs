//! Listing sort orders.

use std::cmp::Ordering;

use heatshop_core::NormalizedProduct;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "price-asc" => Some(SortKey::PriceAsc),
            "price-desc" => Some(SortKey::PriceDesc),
            "name-asc" => Some(SortKey::NameAsc),
            "name-desc" => Some(SortKey::NameDesc),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }
}

/// Sorts in place. `None` leaves the order unchanged. The sort is stable.
pub fn sort_products(products: &mut [NormalizedProduct], key: Option<SortKey>) {
    let Some(key) = key else {
        return;
    };

    match key {
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::NameAsc => products.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::NameDesc => products.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }
}

/// Case-insensitive primary order with a case-sensitive tie-break.
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
