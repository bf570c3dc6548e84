//! Offset pagination for category listings.

use serde::Serialize;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 12;
pub const MAX_PER_PAGE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// `page` is at least 1 and `per_page` is clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Parses raw query values by their leading integer, falling back to the
    /// defaults when a value is absent or has no leading digits.
    #[must_use]
    pub fn from_query(page: Option<&str>, per_page: Option<&str>) -> Self {
        let parse = |raw: Option<&str>, default: usize| {
            raw.and_then(parse_int_prefix)
                .map_or(default, |n| usize::try_from(n).unwrap_or(0))
        };
        Self::new(
            parse(page, DEFAULT_PAGE),
            parse(per_page, DEFAULT_PER_PAGE),
        )
    }
}

/// Leading integer of `raw`: optional whitespace and sign, then digits.
/// Anything after the digits is ignored, so `"2.5"` reads as 2.
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub products: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

/// Slices `items` to the requested page.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let total = items.len();
    let start = (request.page - 1).saturating_mul(request.per_page);
    let end = start.saturating_add(request.per_page);
    let products = items
        .get(start.min(total)..end.min(total))
        .map(<[T]>::to_vec)
        .unwrap_or_default();

    Page {
        products,
        total,
        page: request.page,
        total_pages: total.div_ceil(request.per_page),
        has_more: end < total,
    }
}
