//! # daffodil-core: Pure Composite Pricing for Daffodil
//!
//! This crate is the **heart** of Daffodil pricing. It contains the
//! composite-product pricing engine as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Daffodil Storefront Architecture                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront (Angular)                         │   │
//! │  │    Product page ──► Option picker ──► Price display            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ apply option / select price           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 daffodil-state (stores + cache)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ daffodil-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  ranges   │  │ definition│  │   │
//! │  │   │ Composite │  │ (Decimal) │  │ discounts │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CACHING • NO GLOBAL STATE • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CompositeProduct, Configuration, PriceRange)
//! - [`money`] - Money type with decimal arithmetic (no floating point!)
//! - [`pricing`] - Price ranges and discount queries
//! - [`error`] - Domain error types
//! - [`validation`] - Product definition and input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use daffodil_core::pricing::{discount_amount, optional_item_price_range_for_configuration};
//! use daffodil_core::{
//!     CompositeItem, CompositeItemOption, CompositeProduct, Configuration, ConfigurationItem,
//!     Money, Product,
//! };
//!
//! let product: Product = CompositeProduct::new(
//!     "bundle",
//!     Money::from_minor_units(1000),
//!     None,
//!     vec![
//!         CompositeItem::new("base", true, vec![
//!             CompositeItemOption::new("a", Money::from_minor_units(500)),
//!             CompositeItemOption::new("b", Money::from_minor_units(800)),
//!         ]),
//!         CompositeItem::new("extra", false, vec![
//!             CompositeItemOption::new("c", Money::from_minor_units(300)),
//!         ]),
//!     ],
//! )
//! .unwrap()
//! .into();
//!
//! let range = optional_item_price_range_for_configuration(&product, None).unwrap().unwrap();
//! assert_eq!(range.max_price.original_price.to_string(), "21.00");
//!
//! // Discounts are only known once every required item is chosen.
//! let live: HashMap<String, Configuration> = HashMap::new();
//! assert_eq!(discount_amount(&product, &live).unwrap(), None);
//!
//! let live = HashMap::from([(
//!     "bundle".to_string(),
//!     Configuration::new().with("base", ConfigurationItem::selected("b")),
//! )]);
//! assert_eq!(discount_amount(&product, &live).unwrap(), Some(Money::zero()));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{AppliedOption, AppliedOptionsLookup, ProductLookup};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity a shopper may select for one item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: u32 = 999;
