//! # Error Types
//!
//! Domain-specific error types for daffodil-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  daffodil-core errors (this file)                                      │
//! │  ├── CoreError        - Invalid definitions, overflow, unknown ids     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  daffodil-state errors (separate crate)                                │
//! │  └── StateError       - Store lookups, config loading                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StateError → storefront           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! Pricing a non-composite product, or asking for a discount before every
//! required item is chosen, returns `Ok(None)`. Only a product definition
//! the engine cannot price at all, or a total too large for a decimal, is
//! an `Err`.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product definition cannot be priced.
    ///
    /// ## When This Occurs
    /// - Pricing: a required item offers no options (no min/max exists)
    /// - Construction or catalog load only: duplicate item or option ids,
    ///   negative prices, discounts larger than their price
    #[error("Invalid product definition for {product_id}: {reason}")]
    InvalidProduct { product_id: String, reason: String },

    /// A price total does not fit in a decimal.
    #[error("Price arithmetic overflowed for {product_id}")]
    Overflow { product_id: String },

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Item id does not belong to the product.
    #[error("Item {item_id} not found on product {product_id}")]
    ItemNotFound { product_id: String, item_id: String },

    /// Option id does not belong to the item.
    #[error("Option {option_id} not found on item {item_id}")]
    OptionNotFound { item_id: String, option_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub(crate) fn overflow(product_id: &str) -> Self {
        CoreError::Overflow {
            product_id: product_id.to_string(),
        }
    }

    pub(crate) fn invalid_product(product_id: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidProduct {
            product_id: product_id.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::invalid_product("bundle", "item 'base' is required but has no options");
        assert_eq!(
            err.to_string(),
            "Invalid product definition for bundle: item 'base' is required but has no options"
        );

        let err = CoreError::OptionNotFound {
            item_id: "base".to_string(),
            option_id: "x".to_string(),
        };
        assert_eq!(err.to_string(), "Option x not found on item base");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "item id".to_string(),
        };
        assert_eq!(err.to_string(), "item id is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
