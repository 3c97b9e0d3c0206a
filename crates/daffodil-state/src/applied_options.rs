//! # Applied Options Store
//!
//! The shopper's live configuration of each composite product.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Applied Options Operations                             │
//! │                                                                         │
//! │  Storefront Event          Store Method           State Change          │
//! │  ────────────────          ────────────           ────────────          │
//! │                                                                         │
//! │  Product loaded ─────────► initialize_for() ────► one entry per item    │
//! │                                                  (default option/null) │
//! │                                                                         │
//! │  Option picked ──────────► apply_option() ──────► items[item] = option  │
//! │                                                                         │
//! │  Option cleared ─────────► clear_option() ──────► items[item] = null    │
//! │                                                                         │
//! │  Price shown ────────────► configuration() ─────► (read only)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use daffodil_core::validation::{validate_identifier, validate_quantity};
use daffodil_core::{
    AppliedOptionsLookup, CompositeProduct, Configuration, ConfigurationItem, CoreError,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StateResult;

/// Live configuration of one composite product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedConfiguration {
    pub product_id: String,
    pub items: Configuration,
    /// When the shopper last changed a selection.
    pub updated_at: DateTime<Utc>,
}

impl AppliedConfiguration {
    /// Seeds one entry per item: the default option if asked for, else null.
    fn seeded(product: &CompositeProduct, seed_defaults: bool) -> Self {
        let items = product
            .items
            .iter()
            .map(|item| {
                let value = seed_defaults
                    .then(|| item.default_option())
                    .flatten()
                    .map(|option| option.id.clone());
                (item.id.clone(), ConfigurationItem { value, qty: None })
            })
            .collect();

        AppliedConfiguration {
            product_id: product.id.clone(),
            items,
            updated_at: Utc::now(),
        }
    }
}

/// Applied configurations keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct AppliedOptionsStore {
    entries: HashMap<String, AppliedConfiguration>,
    seed_defaults: bool,
}

impl AppliedOptionsStore {
    /// Creates an empty store; `seed_defaults` preselects `is_default` options.
    pub fn new(seed_defaults: bool) -> Self {
        AppliedOptionsStore {
            entries: HashMap::new(),
            seed_defaults,
        }
    }

    /// Resets the product's configuration to its initial selections.
    pub fn initialize_for(&mut self, product: &CompositeProduct) {
        let seeded = AppliedConfiguration::seeded(product, self.seed_defaults);
        debug!(product_id = %product.id, items = seeded.items.len(), "Seeded applied options");
        self.entries.insert(product.id.clone(), seeded);
    }

    /// Records the shopper's choice of `option_id` for `item_id`.
    ///
    /// A `None` quantity keeps whatever quantity the item already had.
    ///
    /// ## Errors
    /// - `ValidationError` for blank ids or a quantity outside 1..=999
    /// - `ItemNotFound` / `OptionNotFound` when the ids do not belong to `product`
    pub fn apply_option(
        &mut self,
        product: &CompositeProduct,
        item_id: &str,
        option_id: &str,
        qty: Option<u32>,
    ) -> StateResult<()> {
        validate_identifier("item id", item_id).map_err(CoreError::from)?;
        validate_identifier("option id", option_id).map_err(CoreError::from)?;
        if let Some(qty) = qty {
            validate_quantity(qty).map_err(CoreError::from)?;
        }

        let item = product.item(item_id).ok_or_else(|| CoreError::ItemNotFound {
            product_id: product.id.clone(),
            item_id: item_id.to_string(),
        })?;
        if item.option(option_id).is_none() {
            return Err(CoreError::OptionNotFound {
                item_id: item_id.to_string(),
                option_id: option_id.to_string(),
            }
            .into());
        }

        let seed_defaults = self.seed_defaults;
        let entry = self
            .entries
            .entry(product.id.clone())
            .or_insert_with(|| AppliedConfiguration::seeded(product, seed_defaults));

        let previous_qty = entry.items.get(item_id).and_then(|existing| existing.qty);
        entry.items.insert(
            item_id,
            ConfigurationItem {
                value: Some(option_id.to_string()),
                qty: qty.or(previous_qty),
            },
        );
        entry.updated_at = Utc::now();

        debug!(product_id = %product.id, item_id, option_id, ?qty, "Applied composite option");
        Ok(())
    }

    /// Unselects the item's option, keeping its entry and quantity.
    pub fn clear_option(&mut self, product_id: &str, item_id: &str) -> bool {
        let Some(entry) = self.entries.get_mut(product_id) else {
            return false;
        };
        let Some(item) = entry.items.get_mut(item_id) else {
            return false;
        };

        item.value = None;
        entry.updated_at = Utc::now();
        true
    }

    /// The product's live configuration with its timestamp.
    pub fn applied(&self, product_id: &str) -> Option<&AppliedConfiguration> {
        self.entries.get(product_id)
    }

    pub fn configuration(&self, product_id: &str) -> Option<&Configuration> {
        self.entries.get(product_id).map(|entry| &entry.items)
    }

    pub fn remove(&mut self, product_id: &str) -> Option<AppliedConfiguration> {
        self.entries.remove(product_id)
    }
}

impl AppliedOptionsLookup for AppliedOptionsStore {
    fn applied_options_by_product_id(&self, product_id: &str) -> Option<&Configuration> {
        self.configuration(product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;
    use daffodil_core::{CompositeItem, CompositeItemOption, Money};

    fn bundle() -> CompositeProduct {
        CompositeProduct::new(
            "bundle",
            Money::from_minor_units(1000),
            None,
            vec![
                CompositeItem::new(
                    "base",
                    true,
                    vec![
                        CompositeItemOption::new("a", Money::from_minor_units(500)),
                        CompositeItemOption::new("b", Money::from_minor_units(800)).as_default(),
                    ],
                ),
                CompositeItem::new(
                    "extra",
                    false,
                    vec![CompositeItemOption::new("c", Money::from_minor_units(300))],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_seeds_defaults() {
        let mut store = AppliedOptionsStore::new(true);
        store.initialize_for(&bundle());

        let configuration = store.configuration("bundle").unwrap();
        assert_eq!(configuration.len(), 2);
        assert_eq!(configuration.get("base").unwrap().value.as_deref(), Some("b"));
        assert_eq!(configuration.get("extra").unwrap().value, None);
    }

    #[test]
    fn test_initialize_without_defaults_leaves_items_null() {
        let mut store = AppliedOptionsStore::new(false);
        store.initialize_for(&bundle());

        let configuration = store.configuration("bundle").unwrap();
        assert!(configuration.iter().all(|(_, entry)| entry.value.is_none()));
    }

    #[test]
    fn test_apply_option_keeps_previous_quantity() {
        let product = bundle();
        let mut store = AppliedOptionsStore::new(false);

        store.apply_option(&product, "base", "a", Some(3)).unwrap();
        store.apply_option(&product, "base", "b", None).unwrap();

        let entry = store.configuration("bundle").unwrap().get("base").unwrap();
        assert_eq!(entry.value.as_deref(), Some("b"));
        assert_eq!(entry.qty, Some(3));
    }

    #[test]
    fn test_apply_option_rejects_unknown_ids() {
        let product = bundle();
        let mut store = AppliedOptionsStore::new(false);

        let err = store.apply_option(&product, "missing", "a", None).unwrap_err();
        assert!(err.is_not_found());

        let err = store.apply_option(&product, "base", "zzz", None).unwrap_err();
        assert!(matches!(err, StateError::Core(CoreError::OptionNotFound { .. })));

        let err = store.apply_option(&product, "base", "a", Some(0)).unwrap_err();
        assert!(matches!(err, StateError::Core(CoreError::Validation(_))));

        assert!(store.configuration("bundle").is_none());
    }

    #[test]
    fn test_clear_option() {
        let product = bundle();
        let mut store = AppliedOptionsStore::new(false);
        store.apply_option(&product, "base", "a", Some(2)).unwrap();

        assert!(store.clear_option("bundle", "base"));
        let entry = store.configuration("bundle").unwrap().get("base").unwrap();
        assert_eq!(entry.value, None);
        assert_eq!(entry.qty, Some(2));

        assert!(!store.clear_option("bundle", "missing"));
        assert!(!store.clear_option("other", "base"));
    }

    #[test]
    fn test_lookup_trait() {
        let mut store = AppliedOptionsStore::new(true);
        store.initialize_for(&bundle());
        assert!(store.applied_options_by_product_id("bundle").is_some());
        assert!(store.applied_options_by_product_id("nope").is_none());
        assert!(store.applied("bundle").unwrap().updated_at <= Utc::now());
        assert!(store.remove("bundle").is_some());
    }
}
