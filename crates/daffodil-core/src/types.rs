//! # Domain Types
//!
//! Core domain types used throughout Daffodil pricing.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Product (tagged by `type`)                                            │
//! │  ├── Simple(ProductDetails)                                            │
//! │  ├── Configurable(ProductDetails)                                      │
//! │  └── Composite(CompositeProduct)                                       │
//! │                   │                                                     │
//! │                   └── items: Vec<CompositeItem>                        │
//! │                                  │                                      │
//! │                                  └── options: Vec<CompositeItemOption> │
//! │                                                                         │
//! │  Configuration (shopper input)     PriceRange (engine output)          │
//! │  item_id ──► ConfigurationItem     min_price / max_price: Prices       │
//! │              { value, qty }                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialized Shape
//! Field names are camelCase and the product variant is carried in a
//! lowercase `type` field, matching the storefront's product payloads.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::validate_composite_product;

// =============================================================================
// Discount
// =============================================================================

/// A discount attached to a product or an item option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    /// Absolute amount taken off the price.
    pub amount: Money,

    /// Percent taken off, as reported by the back end.
    #[ts(type = "string")]
    pub percent: Decimal,
}

/// Price after applying an optional discount.
#[inline]
pub(crate) fn discounted(price: Money, discount: Option<&Discount>) -> Option<Money> {
    match discount {
        Some(discount) => price.checked_sub(discount.amount),
        None => Some(price),
    }
}

// =============================================================================
// Product
// =============================================================================

/// Fields shared by every non-composite product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub discount: Option<Discount>,
}

/// A catalog product.
///
/// The pricing engine only prices [`Product::Composite`]; every other
/// variant is "not applicable" and yields `None` from the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Product {
    Simple(ProductDetails),
    Configurable(ProductDetails),
    Composite(CompositeProduct),
}

impl Product {
    /// Returns the product identifier regardless of variant.
    pub fn id(&self) -> &str {
        match self {
            Product::Simple(details) | Product::Configurable(details) => &details.id,
            Product::Composite(composite) => &composite.id,
        }
    }

    /// Returns the base price regardless of variant.
    pub fn price(&self) -> Money {
        match self {
            Product::Simple(details) | Product::Configurable(details) => details.price,
            Product::Composite(composite) => composite.price,
        }
    }

    /// Returns the composite definition, if this is a composite product.
    pub fn as_composite(&self) -> Option<&CompositeProduct> {
        match self {
            Product::Composite(composite) => Some(composite),
            _ => None,
        }
    }
}

impl From<CompositeProduct> for Product {
    fn from(composite: CompositeProduct) -> Self {
        Product::Composite(composite)
    }
}

// =============================================================================
// Composite Product
// =============================================================================

/// A product composed of items, each offering purchasable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompositeProduct {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Base price before any item is added.
    pub price: Money,
    #[serde(default)]
    pub discount: Option<Discount>,
    /// Items in display order.
    pub items: Vec<CompositeItem>,
}

impl CompositeProduct {
    /// Builds a composite product, rejecting invalid definitions up front.
    ///
    /// ## Errors
    /// `CoreError::InvalidProduct` when a required item has no options,
    /// identifiers collide, or prices/discounts are negative.
    pub fn new(
        id: impl Into<String>,
        price: Money,
        discount: Option<Discount>,
        items: Vec<CompositeItem>,
    ) -> CoreResult<Self> {
        let product = CompositeProduct {
            id: id.into(),
            name: String::new(),
            price,
            discount,
            items,
        };
        validate_composite_product(&product)?;
        Ok(product)
    }

    /// Base price after the product-level discount; `None` on overflow.
    pub fn discounted_price(&self) -> Option<Money> {
        discounted(self.price, self.discount.as_ref())
    }

    /// Looks up an item by id.
    pub fn item(&self, item_id: &str) -> Option<&CompositeItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// A slot within a composite product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompositeItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Whether the shopper must pick an option before checkout.
    pub required: bool,
    pub options: Vec<CompositeItemOption>,
}

impl CompositeItem {
    pub fn new(id: impl Into<String>, required: bool, options: Vec<CompositeItemOption>) -> Self {
        CompositeItem {
            id: id.into(),
            title: String::new(),
            required,
            options,
        }
    }

    /// Looks up an option by id.
    pub fn option(&self, option_id: &str) -> Option<&CompositeItemOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    /// The option flagged as default, if any.
    pub fn default_option(&self) -> Option<&CompositeItemOption> {
        self.options.iter().find(|option| option.is_default)
    }
}

/// A concrete purchasable choice within an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompositeItemOption {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub discount: Option<Discount>,
    /// Preselected when the product is first shown.
    #[serde(default)]
    pub is_default: bool,
}

impl CompositeItemOption {
    pub fn new(id: impl Into<String>, price: Money) -> Self {
        CompositeItemOption {
            id: id.into(),
            name: String::new(),
            price,
            discount: None,
            is_default: false,
        }
    }

    /// Attaches a discount.
    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = Some(discount);
        self
    }

    /// Flags the option as the item's default.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Price after the option-level discount; `None` on overflow.
    pub fn discounted_price(&self) -> Option<Money> {
        discounted(self.price, self.discount.as_ref())
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// The shopper's choice for a single item.
///
/// A `None` value means the entry exists but nothing is selected yet,
/// which is distinct from the item having no entry at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationItem {
    /// Selected option id.
    #[serde(default)]
    pub value: Option<String>,
    /// Selected quantity; treated as 1 when absent.
    #[serde(default)]
    pub qty: Option<u32>,
}

impl ConfigurationItem {
    /// An entry selecting `option_id` with the default quantity.
    pub fn selected(option_id: impl Into<String>) -> Self {
        ConfigurationItem {
            value: Some(option_id.into()),
            qty: None,
        }
    }

    /// An entry with nothing selected yet.
    pub fn unselected() -> Self {
        ConfigurationItem::default()
    }

    /// Sets the quantity.
    pub fn with_qty(mut self, qty: u32) -> Self {
        self.qty = Some(qty);
        self
    }

    /// Quantity with the default of 1 applied.
    #[inline]
    pub fn effective_qty(&self) -> u32 {
        self.qty.unwrap_or(DEFAULT_QUANTITY)
    }
}

/// Quantity used whenever none was chosen.
pub const DEFAULT_QUANTITY: u32 = 1;

/// Per-item selections for one composite product, keyed by item id.
///
/// Ordered so that serializing the same selections always yields the
/// same string, which makes it usable as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Configuration(BTreeMap<String, ConfigurationItem>);

impl Configuration {
    pub fn new() -> Self {
        Configuration(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, item_id: impl Into<String>, entry: ConfigurationItem) -> Self {
        self.0.insert(item_id.into(), entry);
        self
    }

    pub fn insert(&mut self, item_id: impl Into<String>, entry: ConfigurationItem) {
        self.0.insert(item_id.into(), entry);
    }

    pub fn get(&self, item_id: &str) -> Option<&ConfigurationItem> {
        self.0.get(item_id)
    }

    pub fn get_mut(&mut self, item_id: &str) -> Option<&mut ConfigurationItem> {
        self.0.get_mut(item_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigurationItem)> {
        self.0.iter()
    }
}

impl FromIterator<(String, ConfigurationItem)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (String, ConfigurationItem)>>(iter: I) -> Self {
        Configuration(iter.into_iter().collect())
    }
}

// =============================================================================
// Computed Prices
// =============================================================================

/// Original and discounted price for one bound of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Prices {
    pub original_price: Money,
    pub discounted_price: Money,
    /// Always `None` on computed prices; use the discount queries instead.
    pub discount: Option<Discount>,
}

impl Prices {
    pub fn new(original_price: Money, discounted_price: Money) -> Self {
        Prices {
            original_price,
            discounted_price,
            discount: None,
        }
    }
}

/// Lower and upper price bounds for a partially configured product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_price: Prices,
    pub max_price: Prices,
}

impl PriceRange {
    /// True when both bounds agree, i.e. the configuration pins the price.
    pub fn is_fixed(&self) -> bool {
        self.min_price == self.max_price
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(amount: Decimal) -> Money {
        Money::from_decimal(amount)
    }

    #[test]
    fn test_product_deserializes_by_type_tag() {
        let json = r#"{
            "type": "composite",
            "id": "bundle",
            "price": "10.00",
            "items": [{
                "id": "base",
                "required": true,
                "options": [{ "id": "a", "price": "5", "isDefault": true }]
            }]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id(), "bundle");
        let composite = product.as_composite().unwrap();
        assert_eq!(composite.items[0].default_option().unwrap().id, "a");
        assert!(composite.discount.is_none());

        let simple: Product =
            serde_json::from_str(r#"{ "type": "simple", "id": "s", "price": "3.50" }"#).unwrap();
        assert!(simple.as_composite().is_none());
        assert_eq!(simple.price(), money(dec!(3.5)));
    }

    #[test]
    fn test_configuration_keeps_null_value_distinct_from_missing() {
        let json = r#"{ "base": { "value": null, "qty": 2 } }"#;
        let configuration: Configuration = serde_json::from_str(json).unwrap();

        let entry = configuration.get("base").unwrap();
        assert_eq!(entry.value, None);
        assert_eq!(entry.effective_qty(), 2);
        assert!(configuration.get("extra").is_none());
    }

    #[test]
    fn test_configuration_serialization_is_stable() {
        let a = Configuration::new()
            .with("z", ConfigurationItem::selected("1"))
            .with("a", ConfigurationItem::unselected());
        let b = Configuration::new()
            .with("a", ConfigurationItem::unselected())
            .with("z", ConfigurationItem::selected("1"));

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_effective_qty_defaults_to_one() {
        assert_eq!(ConfigurationItem::selected("x").effective_qty(), 1);
        assert_eq!(ConfigurationItem::selected("x").with_qty(4).effective_qty(), 4);
    }

    #[test]
    fn test_discounted_price() {
        let option = CompositeItemOption::new("o", money(dec!(8))).with_discount(Discount {
            amount: money(dec!(1.5)),
            percent: dec!(18.75),
        });
        assert_eq!(option.discounted_price(), Some(money(dec!(6.5))));
        assert_eq!(
            CompositeItemOption::new("p", money(dec!(8))).discounted_price(),
            Some(money(dec!(8)))
        );

        // A discount larger than the price is taken as given.
        let oversold = CompositeItemOption::new("q", money(dec!(2))).with_discount(Discount {
            amount: money(dec!(3)),
            percent: dec!(150),
        });
        assert_eq!(oversold.discounted_price(), Some(money(dec!(-1))));
    }
}
