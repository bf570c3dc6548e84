//! Normalization from raw upstream records to [`heatshop_core::NormalizedProduct`].

use heatshop_core::{Category, NormalizedProduct, NormalizedVariant, VariantKind};

use crate::stock::resolve_stock;
use crate::types::{CategoryField, FlavorField, LooseValue, UpstreamProduct};

/// Display name used when the upstream record has none.
pub const DEFAULT_PRODUCT_NAME: &str = "Без названия";

/// Normalizes a raw [`UpstreamProduct`] loaded from `category` into a
/// [`NormalizedProduct`].
///
/// Never fails: missing names get [`DEFAULT_PRODUCT_NAME`], unparseable
/// prices become `0`, stock always resolves to a boolean, and at least one
/// variant is always produced.
#[must_use]
pub fn normalize_product(product: UpstreamProduct, category: Category) -> NormalizedProduct {
    let text = |v: &Option<LooseValue>| v.as_ref().and_then(LooseValue::as_text);

    let raw_id = text(&product.id);
    let raw_ref = text(&product.reference);
    let id = raw_id.clone().or_else(|| raw_ref.clone()).unwrap_or_default();
    let reference = raw_ref.or(raw_id).unwrap_or_default();

    let product_type =
        text(&product.product_type).unwrap_or_else(|| category.as_str().to_owned());
    let name = text(&product.name).unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_owned());
    let category_name = product.category.as_ref().and_then(CategoryField::name);
    let brand = text(&product.brend)
        .or_else(|| category_name.clone())
        .unwrap_or_default();

    let (flavor, flavor_tokens) = normalize_flavor(product.flavor.as_ref());

    let in_stock = resolve_stock(product.nalichie.as_ref());
    let price = coerce_price(product.price.as_ref());
    let pack_price = coerce_price(product.price_pack.as_ref());
    let sale_price = product
        .sale_price
        .as_ref()
        .and_then(LooseValue::as_number)
        .filter(|p| *p > 0.0);

    let image = text(&product.image);
    let image_pack = text(&product.image_pack);

    let mut normalized = NormalizedProduct {
        id,
        reference,
        product_type,
        name,
        description: text(&product.description).unwrap_or_default(),
        country: text(&product.country).unwrap_or_default(),
        brand,
        model: text(&product.model),
        color: text(&product.color),
        strength: text(&product.strength),
        category_name,
        flavor,
        flavor_tokens,
        in_stock,
        price,
        pack_price,
        sale_price,
        image,
        image_pack,
        hit: is_flag_set(product.hit.as_ref()),
        is_new: is_flag_set(product.new.as_ref()),
        variants: Vec::new(),
    };
    normalized.variants = build_variants(&normalized);
    normalized
}

/// Builds the purchasable variants for a normalized product.
///
/// Terea products with a pack image get a `pack` and a `block` variant:
/// the pack uses the pack image and pack price (falling back to the base
/// price), the block uses the base image and price. Everything else gets a
/// single `pack` variant from the base image and price. All variants inherit
/// the product's stock flag.
#[must_use]
pub fn build_variants(product: &NormalizedProduct) -> Vec<NormalizedVariant> {
    match (&product.image_pack, product.is_terea()) {
        (Some(image_pack), true) => {
            let pack_price = if product.pack_price == 0.0 {
                product.price
            } else {
                product.pack_price
            };
            vec![
                NormalizedVariant {
                    kind: VariantKind::Pack,
                    image_url: Some(image_pack.clone()),
                    price: pack_price,
                    name: format!("{} (пачка)", product.name),
                    in_stock: product.in_stock,
                },
                NormalizedVariant {
                    kind: VariantKind::Block,
                    image_url: product.image.clone(),
                    price: product.price,
                    name: format!("{} (блок)", product.name),
                    in_stock: product.in_stock,
                },
            ]
        }
        _ => vec![NormalizedVariant {
            kind: VariantKind::Pack,
            image_url: product.image.clone(),
            price: product.price,
            name: product.name.clone(),
            in_stock: product.in_stock,
        }],
    }
}

/// Coerces a raw price to a number, defaulting to `0` when absent or
/// unparseable.
#[must_use]
pub fn coerce_price(raw: Option<&LooseValue>) -> f64 {
    raw.and_then(LooseValue::as_number).unwrap_or(0.0)
}

fn is_flag_set(raw: Option<&LooseValue>) -> bool {
    raw.and_then(LooseValue::as_number) == Some(1.0)
}

/// Returns the display string and the lowercase token list for a raw flavor.
///
/// List values are joined with `", "` for display; string values are split
/// on `,`, `/` and `|` into tokens.
fn normalize_flavor(raw: Option<&FlavorField>) -> (String, Vec<String>) {
    match raw {
        Some(FlavorField::List(items)) => {
            let names: Vec<String> = items.iter().filter_map(LooseValue::as_text).collect();
            let tokens = names
                .iter()
                .map(|f| f.trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect();
            (names.join(", "), tokens)
        }
        Some(FlavorField::Text(s)) => {
            let tokens = s
                .split([',', '/', '|'])
                .map(|f| f.trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect();
            (s.clone(), tokens)
        }
        Some(FlavorField::Other(_)) | None => (String::new(), Vec::new()),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
