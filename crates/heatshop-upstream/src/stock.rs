//! Stock-status resolution for the upstream `nalichie` field.

use crate::types::LooseValue;

/// Free-text stock values that mean "in stock", compared after trimming and
/// lowercasing.
const IN_STOCK_TOKENS: &[&str] = &["да", "есть", "true", "1", "available", "in stock", "yes"];

/// Resolves a raw stock value of unknown type to a boolean.
///
/// - booleans pass through;
/// - numbers and numeric strings are in stock only when equal to `1`;
/// - other strings are matched against [`IN_STOCK_TOKENS`];
/// - anything else, including an absent value, is out of stock.
#[must_use]
pub fn resolve_stock(raw: Option<&LooseValue>) -> bool {
    let Some(value) = raw else {
        return false;
    };

    match value {
        LooseValue::Bool(b) => *b,
        LooseValue::Int(_) | LooseValue::Float(_) => value.as_number() == Some(1.0),
        LooseValue::Text(s) => match value.as_number() {
            Some(n) => n == 1.0,
            None => {
                let token = s.trim().to_lowercase();
                IN_STOCK_TOKENS.contains(&token.as_str())
            }
        },
        LooseValue::Other(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> LooseValue {
        LooseValue::Text(s.to_owned())
    }

    #[test]
    fn truthy_encodings_resolve_in_stock() {
        for value in [
            LooseValue::Bool(true),
            LooseValue::Int(1),
            LooseValue::Float(1.0),
            text("1"),
            text("да"),
            text("yes"),
        ] {
            assert!(resolve_stock(Some(&value)), "expected in stock for {value:?}");
        }
    }

    #[test]
    fn falsy_encodings_resolve_out_of_stock() {
        for value in [
            LooseValue::Bool(false),
            LooseValue::Int(0),
            text("0"),
            text("нет"),
            LooseValue::Other(serde_json::Value::Null),
        ] {
            assert!(!resolve_stock(Some(&value)), "expected out of stock for {value:?}");
        }
    }

    #[test]
    fn absent_value_is_out_of_stock() {
        assert!(!resolve_stock(None));
    }

    #[test]
    fn tokens_are_trimmed_and_case_insensitive() {
        assert!(resolve_stock(Some(&text("  ЕСТЬ "))));
        assert!(resolve_stock(Some(&text("In Stock"))));
        assert!(resolve_stock(Some(&text("TRUE"))));
    }

    #[test]
    fn numeric_strings_other_than_one_are_out_of_stock() {
        assert!(!resolve_stock(Some(&text("2"))));
        assert!(!resolve_stock(Some(&text(" "))));
        assert!(resolve_stock(Some(&text(" 1 "))));
        assert!(resolve_stock(Some(&text("1.0"))));
    }

    #[test]
    fn counts_above_one_are_out_of_stock() {
        assert!(!resolve_stock(Some(&LooseValue::Int(5))));
    }
}
