//! Storefront order payload and its validation rules.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

const MAX_NAME_CHARS: usize = 256;
const MAX_ADDRESS_CHARS: usize = 1000;
const PHONE_CHARS: std::ops::RangeInclusive<usize> = 10..=32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_name: String,
    pub quantity: i64,
    pub price_at_time_of_order: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub customer_name: String,
    pub phone_number: String,
    pub is_delivery: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub ordered_items: Vec<OrderItem>,
}

impl Order {
    /// Checks the order against the limits the upstream enforces.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidOrder`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CatalogError> {
        check_text("customer_name", &self.customer_name, MAX_NAME_CHARS)?;

        let phone_len = self.phone_number.trim().chars().count();
        if !PHONE_CHARS.contains(&phone_len) {
            return Err(CatalogError::InvalidOrder(format!(
                "phone_number must be {}-{} characters",
                PHONE_CHARS.start(),
                PHONE_CHARS.end()
            )));
        }

        if let Some(city) = &self.city {
            check_max("city", city, MAX_NAME_CHARS)?;
        }
        if let Some(address) = &self.address {
            check_max("address", address, MAX_ADDRESS_CHARS)?;
        }

        for (i, item) in self.ordered_items.iter().enumerate() {
            check_text(
                &format!("ordered_items[{i}].product_name"),
                &item.product_name,
                MAX_NAME_CHARS,
            )?;
            if item.quantity <= 0 {
                return Err(CatalogError::InvalidOrder(format!(
                    "ordered_items[{i}].quantity must be positive"
                )));
            }
            if !item.price_at_time_of_order.is_finite() || item.price_at_time_of_order < 0.0 {
                return Err(CatalogError::InvalidOrder(format!(
                    "ordered_items[{i}].price_at_time_of_order must be a non-negative number"
                )));
            }
        }

        Ok(())
    }
}

fn check_text(field: &str, value: &str, max: usize) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::InvalidOrder(format!("{field} must not be empty")));
    }
    check_max(field, value, max)
}

fn check_max(field: &str, value: &str, max: usize) -> Result<(), CatalogError> {
    if value.chars().count() > max {
        return Err(CatalogError::InvalidOrder(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_order() -> Order {
        Order {
            customer_name: "Иванов Иван".to_owned(),
            phone_number: "+79991234567".to_owned(),
            is_delivery: true,
            city: Some("Москва".to_owned()),
            address: Some("ул. Ленина, д. 1".to_owned()),
            ordered_items: vec![OrderItem {
                product_name: "IQOS Iluma i One".to_owned(),
                quantity: 1,
                price_at_time_of_order: 9000.0,
            }],
        }
    }

    fn rejection(order: &Order) -> String {
        order.validate().unwrap_err().to_string()
    }

    #[test]
    fn accepts_valid_order() {
        assert!(valid_order().validate().is_ok());
    }

    #[test]
    fn accepts_pickup_without_address_or_items() {
        let order = Order {
            city: None,
            address: None,
            is_delivery: false,
            ordered_items: Vec::new(),
            ..valid_order()
        };
        assert!(order.validate().is_ok());
    }

    #[test]
    fn rejects_blank_customer_name() {
        let order = Order {
            customer_name: "   ".to_owned(),
            ..valid_order()
        };
        assert!(rejection(&order).contains("customer_name must not be empty"));
    }

    #[test]
    fn rejects_phone_outside_length_bounds() {
        let short = Order {
            phone_number: "12345".to_owned(),
            ..valid_order()
        };
        assert!(rejection(&short).contains("phone_number"));

        let long = Order {
            phone_number: "1".repeat(33),
            ..valid_order()
        };
        assert!(rejection(&long).contains("phone_number"));
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let mut order = valid_order();
        order.ordered_items[0].quantity = 0;
        assert!(rejection(&order).contains("ordered_items[0].quantity"));
    }

    #[test]
    fn rejects_negative_price() {
        let mut order = valid_order();
        order.ordered_items[0].price_at_time_of_order = -1.0;
        assert!(rejection(&order).contains("price_at_time_of_order"));
    }

    #[test]
    fn rejects_overlong_address() {
        let order = Order {
            address: Some("д".repeat(1001)),
            ..valid_order()
        };
        assert!(rejection(&order).contains("address must be at most 1000"));
    }

    #[test]
    fn serialization_omits_absent_optionals() {
        let order = Order {
            city: None,
            address: None,
            ..valid_order()
        };
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("city").is_none());
        assert_eq!(json["ordered_items"][0]["quantity"], 1);
    }
}
