//! # Validation Module
//!
//! Input and definition validation for Daffodil pricing.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  └── Only offers options that exist, quantities from a picker          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: State layer (daffodil-state)                                 │
//! │  └── validate_identifier / validate_quantity on "apply option"         │
//! │  └── validate_composite_product on construction and catalog load       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing engine (THIS MODULE)                                 │
//! │  └── validate_priceable before any min/max is taken                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use daffodil_core::validation::{validate_identifier, validate_quantity};
//!
//! validate_identifier("item id", "base").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CompositeProduct, Discount};
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest identifier accepted from a caller.
pub const MAX_IDENTIFIER_LEN: usize = 128;

// =============================================================================
// Product Definition
// =============================================================================

/// Checks the one property pricing depends on: every required item offers
/// at least one option, so its cheapest and priciest option exist.
///
/// Anything else the catalog sends (negative prices, discounts above the
/// price, repeated ids) is priced as given.
pub fn validate_priceable(product: &CompositeProduct) -> CoreResult<()> {
    match product
        .items
        .iter()
        .find(|item| item.required && item.options.is_empty())
    {
        Some(item) => Err(CoreError::invalid_product(
            &product.id,
            format!("item '{}' is required but has no options", item.id),
        )),
        None => Ok(()),
    }
}

/// Validates a composite product definition entering the catalog.
///
/// ## Rules
/// - Everything [`validate_priceable`] checks
/// - Item ids are unique within the product
/// - Option ids are unique within their item
/// - Prices are non-negative and discounts never exceed the price they discount
///
/// Optional items may have no options; they simply never add to a price.
pub fn validate_composite_product(product: &CompositeProduct) -> CoreResult<()> {
    validate_priceable(product)?;

    let product_id = product.id.as_str();
    check_price(product_id, "product", product.price, product.discount.as_ref())?;

    let mut item_ids = HashSet::with_capacity(product.items.len());
    for item in &product.items {
        if !item_ids.insert(item.id.as_str()) {
            return Err(CoreError::invalid_product(
                product_id,
                format!("duplicate item id '{}'", item.id),
            ));
        }

        let mut option_ids = HashSet::with_capacity(item.options.len());
        for option in &item.options {
            if !option_ids.insert(option.id.as_str()) {
                return Err(CoreError::invalid_product(
                    product_id,
                    format!("duplicate option id '{}' on item '{}'", option.id, item.id),
                ));
            }

            check_price(
                product_id,
                &format!("option '{}'", option.id),
                option.price,
                option.discount.as_ref(),
            )?;
        }
    }

    Ok(())
}

fn check_price(
    product_id: &str,
    subject: &str,
    price: Money,
    discount: Option<&Discount>,
) -> CoreResult<()> {
    if price.is_negative() {
        return Err(CoreError::invalid_product(
            product_id,
            format!("{} has a negative price", subject),
        ));
    }

    if let Some(discount) = discount {
        if discount.amount.is_negative() || discount.amount > price {
            return Err(CoreError::invalid_product(
                product_id,
                format!("{} discount must be between 0 and its price", subject),
            ));
        }
    }

    Ok(())
}

// =============================================================================
// Caller Input
// =============================================================================

/// Validates a selected quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a product, item or option identifier supplied by a caller.
pub fn validate_identifier(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompositeItem, CompositeItemOption};
    use rust_decimal_macros::dec;

    fn option(id: &str, price: rust_decimal::Decimal) -> CompositeItemOption {
        CompositeItemOption::new(id, Money::from_decimal(price))
    }

    fn product(items: Vec<CompositeItem>) -> CompositeProduct {
        CompositeProduct {
            id: "bundle".to_string(),
            name: String::new(),
            price: Money::from_decimal(dec!(10)),
            discount: None,
            items,
        }
    }

    #[test]
    fn test_valid_product() {
        let product = product(vec![
            CompositeItem::new("base", true, vec![option("a", dec!(5)), option("b", dec!(8))]),
            CompositeItem::new("extra", false, vec![]),
        ]);
        assert!(validate_composite_product(&product).is_ok());
    }

    #[test]
    fn test_required_item_without_options_is_rejected() {
        let product = product(vec![CompositeItem::new("base", true, vec![])]);
        let err = validate_composite_product(&product).unwrap_err();
        assert!(matches!(err, CoreError::InvalidProduct { .. }));
        assert!(err.to_string().contains("'base' is required"));
    }

    #[test]
    fn test_priceable_only_requires_options_on_required_items() {
        let loose = product(vec![
            CompositeItem::new("base", true, vec![option("a", dec!(-1)), option("a", dec!(2))]),
            CompositeItem::new("base", false, vec![]),
        ]);
        assert!(validate_priceable(&loose).is_ok());
        assert!(validate_composite_product(&loose).is_err());

        let empty = product(vec![CompositeItem::new("base", true, vec![])]);
        assert!(matches!(
            validate_priceable(&empty),
            Err(CoreError::InvalidProduct { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let items = vec![
            CompositeItem::new("base", true, vec![option("a", dec!(5))]),
            CompositeItem::new("base", false, vec![option("b", dec!(3))]),
        ];
        assert!(validate_composite_product(&product(items)).is_err());

        let items = vec![CompositeItem::new(
            "base",
            true,
            vec![option("a", dec!(5)), option("a", dec!(6))],
        )];
        assert!(validate_composite_product(&product(items)).is_err());
    }

    #[test]
    fn test_discount_larger_than_price_is_rejected() {
        let discounted = option("a", dec!(5)).with_discount(Discount {
            amount: Money::from_decimal(dec!(6)),
            percent: dec!(120),
        });
        let items = vec![CompositeItem::new("base", true, vec![discounted])];
        assert!(validate_composite_product(&product(items)).is_err());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let items = vec![CompositeItem::new("base", true, vec![option("a", dec!(-1))])];
        assert!(validate_composite_product(&product(items)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("item id", "base").is_ok());
        assert!(validate_identifier("item id", "").is_err());
        assert!(validate_identifier("item id", "   ").is_err());
        assert!(validate_identifier("item id", &"x".repeat(200)).is_err());
    }
}
