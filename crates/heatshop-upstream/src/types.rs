//! Upstream product API response types for `GET /products/{category}`.
//!
//! ## Observed shape
//!
//! The three upstream collections (`terea`, `iqos`, `devices`) share most
//! field names but not their value types:
//!
//! - `price` / `pricePack` / `sale_price` are decimals serialized either as
//!   JSON numbers or as strings (`"5000"`), and `pricePack` may be `null`.
//! - `nalichie` (stock) is usually `0`/`1`, but older records carry booleans,
//!   `"1"`, or free text such as `"есть"`.
//! - `flavor` is a JSON array of strings on terea records and a
//!   comma/slash-separated string on hand-edited ones.
//! - `category` is an object `{ id, category_name }`.
//! - `ref` is the storefront slug; `id` is numeric.
//!
//! Every field is optional and typed loosely so one odd value never drops
//! the whole record. Interpretation happens in `normalize.rs`.

use serde::Deserialize;

/// A JSON scalar of unknown type. Anything that is not a scalar lands in
/// [`LooseValue::Other`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseValue {
    /// Reads the value as display text. Falsy values (empty string, zero,
    /// `false`) and non-scalars yield `None`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            LooseValue::Text(s) if !s.is_empty() => Some(s.clone()),
            LooseValue::Int(n) if *n != 0 => Some(n.to_string()),
            LooseValue::Float(f) if *f != 0.0 && f.is_finite() => Some(f.to_string()),
            LooseValue::Bool(true) => Some("true".to_owned()),
            _ => None,
        }
    }

    /// Reads the value as a number. Strings are trimmed first and a blank
    /// string reads as `0`. Booleans read as `1`/`0`. Returns `None` for
    /// unparseable text, non-finite results and non-scalars.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            LooseValue::Bool(b) => f64::from(u8::from(*b)),
            // Upstream ids and prices fit comfortably in f64's exact range.
            #[allow(clippy::cast_precision_loss)]
            LooseValue::Int(n) => *n as f64,
            LooseValue::Float(f) => *f,
            LooseValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().ok()?
                }
            }
            LooseValue::Other(_) => return None,
        };
        n.is_finite().then_some(n)
    }
}

/// Raw `flavor` field: a list of names or a single delimited string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlavorField {
    List(Vec<LooseValue>),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamCategory {
    #[serde(default)]
    pub id: Option<LooseValue>,
    #[serde(default)]
    pub category_name: Option<LooseValue>,
}

/// Raw `category` field. Normally an object; a bare name is accepted too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CategoryField {
    Object(UpstreamCategory),
    Name(String),
    Other(serde_json::Value),
}

impl CategoryField {
    #[must_use]
    pub fn name(&self) -> Option<String> {
        match self {
            CategoryField::Object(c) => c.category_name.as_ref().and_then(LooseValue::as_text),
            CategoryField::Name(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// One product record as returned by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamProduct {
    pub id: Option<LooseValue>,
    #[serde(rename = "ref")]
    pub reference: Option<LooseValue>,
    #[serde(rename = "type")]
    pub product_type: Option<LooseValue>,
    pub name: Option<LooseValue>,
    pub description: Option<LooseValue>,
    pub country: Option<LooseValue>,
    pub brend: Option<LooseValue>,
    pub model: Option<LooseValue>,
    pub color: Option<LooseValue>,
    pub strength: Option<LooseValue>,
    pub image: Option<LooseValue>,
    #[serde(rename = "imagePack")]
    pub image_pack: Option<LooseValue>,
    pub price: Option<LooseValue>,
    #[serde(rename = "pricePack")]
    pub price_pack: Option<LooseValue>,
    pub sale_price: Option<LooseValue>,
    /// Stock status; see [`crate::stock::resolve_stock`].
    pub nalichie: Option<LooseValue>,
    pub hit: Option<LooseValue>,
    pub new: Option<LooseValue>,
    pub flavor: Option<FlavorField>,
    pub category: Option<CategoryField>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_terea_record() {
        let raw: UpstreamProduct = serde_json::from_value(json!({
            "id": 14,
            "name": "Terea Sienna AM",
            "image": "/images/terea/armenia/Armenia Terea Sienna Блок.png.webp",
            "imagePack": "/images/terea/armenia/Armenia Terea Sienna.png.webp",
            "price": "5000",
            "pricePack": 510,
            "flavor": ["Табачный вкус"],
            "nalichie": 1,
            "ref": "terea-armenia-sienna",
            "type": "terea",
            "category": { "id": 3, "category_name": "arm" }
        }))
        .unwrap();

        assert_eq!(raw.id, Some(LooseValue::Int(14)));
        assert_eq!(raw.price, Some(LooseValue::Text("5000".into())));
        assert_eq!(raw.price_pack, Some(LooseValue::Int(510)));
        assert!(matches!(raw.flavor, Some(FlavorField::List(ref v)) if v.len() == 1));
        assert_eq!(
            raw.category.as_ref().and_then(CategoryField::name).as_deref(),
            Some("arm")
        );
    }

    #[test]
    fn tolerates_unexpected_value_types() {
        let raw: UpstreamProduct = serde_json::from_value(json!({
            "name": { "ru": "Терея" },
            "price": [1, 2],
            "nalichie": "есть",
            "category": 7,
            "unknown_field": true
        }))
        .unwrap();

        assert!(matches!(raw.name, Some(LooseValue::Other(_))));
        assert!(matches!(raw.price, Some(LooseValue::Other(_))));
        assert_eq!(raw.nalichie, Some(LooseValue::Text("есть".into())));
        assert!(matches!(raw.category, Some(CategoryField::Other(_))));
    }

    #[test]
    fn null_fields_are_none() {
        let raw: UpstreamProduct =
            serde_json::from_value(json!({ "pricePack": null, "imagePack": null })).unwrap();
        assert!(raw.price_pack.is_none());
        assert!(raw.image_pack.is_none());
    }

    #[test]
    fn as_text_treats_falsy_values_as_absent() {
        assert_eq!(LooseValue::Text(String::new()).as_text(), None);
        assert_eq!(LooseValue::Int(0).as_text(), None);
        assert_eq!(LooseValue::Bool(false).as_text(), None);
        assert_eq!(LooseValue::Int(42).as_text().as_deref(), Some("42"));
    }

    #[test]
    fn as_number_parses_numeric_strings() {
        assert_eq!(LooseValue::Text(" 510 ".into()).as_number(), Some(510.0));
        assert_eq!(LooseValue::Text(String::new()).as_number(), Some(0.0));
        assert_eq!(LooseValue::Text("abc".into()).as_number(), None);
        assert_eq!(LooseValue::Text("inf".into()).as_number(), None);
        assert_eq!(LooseValue::Bool(true).as_number(), Some(1.0));
    }
}
