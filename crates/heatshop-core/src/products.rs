use serde::{Deserialize, Serialize};

/// Storefront product category. Each maps to one upstream collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Terea,
    Iqos,
    Devices,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Terea, Category::Iqos, Category::Devices];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Terea => "terea",
            Category::Iqos => "iqos",
            Category::Devices => "devices",
        }
    }

    /// Parses a category name exactly as it appears in URLs.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "terea" => Some(Category::Terea),
            "iqos" => Some(Category::Iqos),
            "devices" => Some(Category::Devices),
            _ => None,
        }
    }

    /// Like [`Category::parse`], but unknown names fall back to
    /// [`Category::Terea`].
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or(Category::Terea)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product from the upstream catalog, normalized into one canonical shape
/// regardless of which collection it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProduct {
    /// Upstream `id`, or `ref` when the id is missing. Empty when neither exists.
    pub id: String,
    /// Upstream `ref` slug, or the stringified id when the ref is missing.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Upstream record type (`"terea"`, `"iqos"`, `"devices"`).
    #[serde(rename = "type")]
    pub product_type: String,
    pub name: String,
    pub description: String,
    pub country: String,
    /// Upstream `brend`, falling back to the category name.
    pub brand: String,
    pub model: Option<String>,
    pub color: Option<String>,
    pub strength: Option<String>,
    /// Name of the upstream sub-category (e.g. `"arm"`, `"onei"`).
    pub category_name: Option<String>,
    /// Raw flavor value as a display string, e.g. `"Ментол, Ягоды"`.
    pub flavor: String,
    /// Lowercased, trimmed flavor tokens used for matching.
    pub flavor_tokens: Vec<String>,
    pub in_stock: bool,
    pub price: f64,
    pub pack_price: f64,
    pub sale_price: Option<f64>,
    pub image: Option<String>,
    pub image_pack: Option<String>,
    pub hit: bool,
    pub is_new: bool,
    pub variants: Vec<NormalizedVariant>,
}

impl NormalizedProduct {
    #[must_use]
    pub fn is_terea(&self) -> bool {
        self.product_type == Category::Terea.as_str()
    }

    #[must_use]
    pub fn has_variant(&self, kind: VariantKind) -> bool {
        self.variants.iter().any(|v| v.kind == kind)
    }

    #[must_use]
    pub fn first_variant(&self) -> Option<&NormalizedVariant> {
        self.variants.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// A single pack of sticks, or the only unit for non-terea products.
    Pack,
    /// A block (carton) of packs.
    Block,
}

impl VariantKind {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pack" => Some(VariantKind::Pack),
            "block" => Some(VariantKind::Block),
            _ => None,
        }
    }
}

/// A purchasable unit of a [`NormalizedProduct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedVariant {
    #[serde(rename = "type")]
    pub kind: VariantKind,
    pub image_url: Option<String>,
    pub price: f64,
    /// Display name, e.g. `"Terea Sienna (пачка)"`.
    pub name: String,
    pub in_stock: bool,
}
