//! # Composite Product Selectors
//!
//! Thread-safe facade that looks products and applied options up by id and
//! runs the pricing engine over them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Selector Data Flow                                   │
//! │                                                                         │
//! │  load_products() ──► ProductStore ──┐                                   │
//! │                      (RwLock)       │                                   │
//! │                                     ├──► daffodil_core::pricing ──► UI  │
//! │  apply_option() ──► AppliedOptions ─┘          │                        │
//! │                     (RwLock)                   ▼                        │
//! │                                          PricingCache (Mutex)           │
//! │                                                                         │
//! │  LOCK ORDER: products → applied options → cache                        │
//! │  Every write invalidates the cached ranges of the touched product.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use daffodil_core::pricing::{
    discount_amount, discount_percent, optional_item_price_range_for_configuration,
    required_item_price_range_for_configuration,
};
use daffodil_core::validation::validate_composite_product;
use daffodil_core::{
    AppliedOptionsLookup, Configuration, CoreError, Money, PriceRange, Product, ProductLookup,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::applied_options::AppliedOptionsStore;
use crate::cache::{CacheKey, CacheStats, PricingCache, RangeKind};
use crate::config::PricingStateConfig;
use crate::error::{StateError, StateResult};
use crate::products::ProductStore;

/// Shared pricing state. Clones share the same stores.
#[derive(Debug, Clone)]
pub struct CompositeProductSelectors {
    products: Arc<RwLock<ProductStore>>,
    applied: Arc<RwLock<AppliedOptionsStore>>,
    cache: Arc<Mutex<PricingCache>>,
    config: Arc<PricingStateConfig>,
}

impl CompositeProductSelectors {
    pub fn new(config: PricingStateConfig) -> Self {
        CompositeProductSelectors {
            products: Arc::new(RwLock::new(ProductStore::new())),
            applied: Arc::new(RwLock::new(AppliedOptionsStore::new(
                config.options.seed_default_options,
            ))),
            cache: Arc::new(Mutex::new(PricingCache::new(
                config.cache.enabled,
                config.cache.capacity,
            ))),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PricingStateConfig {
        &self.config
    }

    // =========================================================================
    // Lock helpers
    // =========================================================================

    fn read_products(&self) -> StateResult<RwLockReadGuard<'_, ProductStore>> {
        self.products
            .read()
            .map_err(|_| StateError::LockPoisoned("products"))
    }

    fn write_products(&self) -> StateResult<RwLockWriteGuard<'_, ProductStore>> {
        self.products
            .write()
            .map_err(|_| StateError::LockPoisoned("products"))
    }

    fn read_applied(&self) -> StateResult<RwLockReadGuard<'_, AppliedOptionsStore>> {
        self.applied
            .read()
            .map_err(|_| StateError::LockPoisoned("applied options"))
    }

    fn write_applied(&self) -> StateResult<RwLockWriteGuard<'_, AppliedOptionsStore>> {
        self.applied
            .write()
            .map_err(|_| StateError::LockPoisoned("applied options"))
    }

    fn with_cache<F, R>(&self, f: F) -> StateResult<R>
    where
        F: FnOnce(&mut PricingCache) -> R,
    {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| StateError::LockPoisoned("pricing cache"))?;
        Ok(f(&mut cache))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Loads catalog products.
    ///
    /// Composite products are validated before anything is stored, so a
    /// rejected batch leaves the state untouched. Each composite product's
    /// applied options are (re)seeded.
    pub fn load_products(&self, products: Vec<Product>) -> StateResult<()> {
        for product in &products {
            if let Some(composite) = product.as_composite() {
                validate_composite_product(composite)?;
            }
        }

        let mut store = self.write_products()?;
        let mut applied = self.write_applied()?;
        let count = products.len();

        for product in products {
            if let Some(composite) = product.as_composite() {
                applied.initialize_for(composite);
            } else {
                applied.remove(product.id());
            }
            self.with_cache(|cache| cache.invalidate_product(product.id()))?;
            store.upsert(product);
        }

        info!(count, total = store.len(), "Loaded products");
        Ok(())
    }

    /// Applies the shopper's option choice to a composite product.
    pub fn apply_option(
        &self,
        product_id: &str,
        item_id: &str,
        option_id: &str,
        qty: Option<u32>,
    ) -> StateResult<()> {
        let products = self.read_products()?;
        let product = Self::lookup(&products, product_id)?;
        let composite = product
            .as_composite()
            .ok_or_else(|| StateError::NotComposite(product_id.to_string()))?;

        self.write_applied()?
            .apply_option(composite, item_id, option_id, qty)?;
        self.with_cache(|cache| cache.invalidate_product(product_id))
    }

    /// Unselects an item; returns false when there was nothing to clear.
    pub fn clear_option(&self, product_id: &str, item_id: &str) -> StateResult<bool> {
        let cleared = self.write_applied()?.clear_option(product_id, item_id);
        if cleared {
            self.with_cache(|cache| cache.invalidate_product(product_id))?;
        }
        Ok(cleared)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    fn lookup<'a>(products: &'a ProductStore, product_id: &str) -> StateResult<&'a Product> {
        products
            .product_by_id(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
    }

    pub fn product(&self, product_id: &str) -> StateResult<Product> {
        let products = self.read_products()?;
        Self::lookup(&products, product_id).cloned()
    }

    /// The live configuration of a composite product.
    pub fn configuration(&self, product_id: &str) -> StateResult<Option<Configuration>> {
        Ok(self
            .read_applied()?
            .applied_options_by_product_id(product_id)
            .cloned())
    }

    fn cached_range(
        &self,
        product_id: &str,
        kind: RangeKind,
        configuration: Option<&Configuration>,
    ) -> StateResult<Option<PriceRange>> {
        let products = self.read_products()?;
        let product = Self::lookup(&products, product_id)?;
        let key = CacheKey::new(product_id, kind, configuration)?;

        let range = self.with_cache(|cache| {
            cache.get_or_compute(key, || match kind {
                RangeKind::Required => {
                    required_item_price_range_for_configuration(product, configuration)
                }
                RangeKind::Optional => {
                    optional_item_price_range_for_configuration(product, configuration)
                }
            })
        })?;

        range.map_err(|err| {
            warn!(product_id, error = %err, "Price range unavailable");
            err.into()
        })
    }

    pub fn required_item_price_range(
        &self,
        product_id: &str,
        configuration: Option<&Configuration>,
    ) -> StateResult<Option<PriceRange>> {
        self.cached_range(product_id, RangeKind::Required, configuration)
    }

    pub fn optional_item_price_range(
        &self,
        product_id: &str,
        configuration: Option<&Configuration>,
    ) -> StateResult<Option<PriceRange>> {
        self.cached_range(product_id, RangeKind::Optional, configuration)
    }

    /// Required-item range for the product's live configuration.
    pub fn price_range_as_currently_configured(
        &self,
        product_id: &str,
    ) -> StateResult<Option<PriceRange>> {
        let configuration = self.configuration(product_id)?;
        self.cached_range(product_id, RangeKind::Required, configuration.as_ref())
    }

    pub fn discount_amount(&self, product_id: &str) -> StateResult<Option<Money>> {
        let products = self.read_products()?;
        let product = Self::lookup(&products, product_id)?;
        let applied = self.read_applied()?;
        Ok(discount_amount(product, &*applied)?)
    }

    pub fn discount_percent(&self, product_id: &str) -> StateResult<Option<Decimal>> {
        let products = self.read_products()?;
        let product = Self::lookup(&products, product_id)?;
        let applied = self.read_applied()?;
        Ok(discount_percent(product, &*applied)?)
    }

    pub fn cache_stats(&self) -> StateResult<CacheStats> {
        self.with_cache(|cache| cache.stats())
    }
}

impl Default for CompositeProductSelectors {
    fn default() -> Self {
        Self::new(PricingStateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daffodil_core::{
        CompositeItem, CompositeItemOption, CompositeProduct, ConfigurationItem, Discount,
        ProductDetails,
    };
    use rust_decimal_macros::dec;

    fn option(id: &str, price: Decimal) -> CompositeItemOption {
        CompositeItemOption::new(id, Money::from_decimal(price))
    }

    fn bundle() -> Product {
        CompositeProduct::new(
            "bundle",
            Money::from_decimal(dec!(10)),
            Some(Discount {
                amount: Money::from_decimal(dec!(1)),
                percent: dec!(10),
            }),
            vec![
                CompositeItem::new(
                    "base",
                    true,
                    vec![
                        option("a", dec!(5)),
                        option("b", dec!(8)).with_discount(Discount {
                            amount: Money::from_decimal(dec!(2)),
                            percent: dec!(25),
                        }),
                    ],
                ),
                CompositeItem::new("extra", false, vec![option("c", dec!(3))]),
            ],
        )
        .unwrap()
        .into()
    }

    fn simple() -> Product {
        Product::Simple(ProductDetails {
            id: "mug".to_string(),
            name: "Mug".to_string(),
            price: Money::from_decimal(dec!(4)),
            discount: None,
        })
    }

    fn selectors() -> CompositeProductSelectors {
        let mut config = PricingStateConfig::default();
        config.options.seed_default_options = false;
        let selectors = CompositeProductSelectors::new(config);
        selectors.load_products(vec![bundle(), simple()]).unwrap();
        selectors
    }

    #[test]
    fn test_ranges_by_id() {
        let selectors = selectors();

        let required = selectors
            .required_item_price_range("bundle", None)
            .unwrap()
            .unwrap();
        assert_eq!(required.min_price.original_price, Money::from_decimal(dec!(15)));
        assert_eq!(required.max_price.original_price, Money::from_decimal(dec!(18)));

        let optional = selectors
            .optional_item_price_range("bundle", None)
            .unwrap()
            .unwrap();
        assert_eq!(optional.max_price.original_price, Money::from_decimal(dec!(21)));

        assert_eq!(selectors.required_item_price_range("mug", None).unwrap(), None);
    }

    #[test]
    fn test_unknown_product() {
        let selectors = selectors();
        let err = selectors
            .required_item_price_range("nope", None)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(selectors.product("nope").unwrap_err().is_not_found());
        assert!(selectors.discount_amount("nope").is_err());
    }

    #[test]
    fn test_repeated_reads_hit_cache() {
        let selectors = selectors();
        let configuration = Configuration::new().with("base", ConfigurationItem::selected("a"));

        for _ in 0..3 {
            selectors
                .required_item_price_range("bundle", Some(&configuration))
                .unwrap();
        }

        let stats = selectors.cache_stats().unwrap();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_apply_option_updates_live_prices() {
        let selectors = selectors();

        let before = selectors
            .price_range_as_currently_configured("bundle")
            .unwrap()
            .unwrap();
        assert!(!before.is_fixed());
        assert_eq!(selectors.discount_amount("bundle").unwrap(), None);

        selectors.apply_option("bundle", "base", "b", Some(2)).unwrap();
        assert_eq!(selectors.cache_stats().unwrap().entries, 0);

        let after = selectors
            .price_range_as_currently_configured("bundle")
            .unwrap()
            .unwrap();
        assert!(after.is_fixed());
        assert_eq!(after.min_price.original_price, Money::from_decimal(dec!(26)));

        assert_eq!(
            selectors.discount_amount("bundle").unwrap(),
            Some(Money::from_decimal(dec!(5)))
        );
        assert!(selectors.discount_percent("bundle").unwrap().is_some());
    }

    #[test]
    fn test_clear_option_closes_discount_gate() {
        let selectors = selectors();
        selectors.apply_option("bundle", "base", "a", None).unwrap();
        assert!(selectors.discount_amount("bundle").unwrap().is_some());

        assert!(selectors.clear_option("bundle", "base").unwrap());
        assert_eq!(selectors.discount_amount("bundle").unwrap(), None);
    }

    #[test]
    fn test_apply_option_to_simple_product() {
        let selectors = selectors();
        let err = selectors.apply_option("mug", "base", "a", None).unwrap_err();
        assert!(matches!(err, StateError::NotComposite(id) if id == "mug"));
    }

    #[test]
    fn test_invalid_batch_is_rejected_whole() {
        let selectors = CompositeProductSelectors::default();
        let invalid: Product = CompositeProduct {
            id: "broken".to_string(),
            name: String::new(),
            price: Money::zero(),
            discount: None,
            items: vec![CompositeItem::new("base", true, vec![])],
        }
        .into();

        let err = selectors.load_products(vec![simple(), invalid]).unwrap_err();
        assert!(matches!(err, StateError::Core(CoreError::InvalidProduct { .. })));
        assert!(selectors.product("mug").is_err());
    }

    #[test]
    fn test_default_options_are_seeded() {
        let selectors = CompositeProductSelectors::default();
        let product: Product = CompositeProduct::new(
            "kit",
            Money::zero(),
            None,
            vec![CompositeItem::new(
                "base",
                true,
                vec![option("x", dec!(2)), option("y", dec!(3)).as_default()],
            )],
        )
        .unwrap()
        .into();
        selectors.load_products(vec![product]).unwrap();

        let configuration = selectors.configuration("kit").unwrap().unwrap();
        assert_eq!(configuration.get("base").unwrap().value.as_deref(), Some("y"));
        assert_eq!(
            selectors.discount_amount("kit").unwrap(),
            Some(Money::zero())
        );
    }

    #[test]
    fn test_clones_share_state() {
        let selectors = selectors();
        let other = selectors.clone();

        other.apply_option("bundle", "base", "a", None).unwrap();
        let configuration = selectors.configuration("bundle").unwrap().unwrap();
        assert_eq!(configuration.get("base").unwrap().value.as_deref(), Some("a"));
    }
}
