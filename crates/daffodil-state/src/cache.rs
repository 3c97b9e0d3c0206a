//! # Pricing Cache
//!
//! Memoizes price ranges per product and configuration.
//!
//! The engine itself is pure; this cache is owned by the caller and
//! flushed whenever the inputs for a product change.
//!
//! ## Cache Key
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (product_id, kind, configuration JSON)                                 │
//! │                                                                         │
//! │  "bundle", Required, {"base":{"value":"b","qty":2}}  ──► PriceRange     │
//! │  "bundle", Optional, null                            ──► PriceRange     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use daffodil_core::{Configuration, CoreResult, PriceRange};
use serde::Serialize;
use tracing::debug;

use crate::error::StateResult;

/// Which range selector produced a cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKind {
    Required,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    product_id: String,
    kind: RangeKind,
    configuration: String,
}

impl CacheKey {
    /// Builds a key from the serialized configuration; `None` and an empty
    /// configuration get distinct keys.
    pub fn new(
        product_id: &str,
        kind: RangeKind,
        configuration: Option<&Configuration>,
    ) -> StateResult<Self> {
        Ok(CacheKey {
            product_id: product_id.to_string(),
            kind,
            configuration: serde_json::to_string(&configuration)?,
        })
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Clone)]
pub struct PricingCache {
    entries: HashMap<CacheKey, Option<PriceRange>>,
    capacity: usize,
    enabled: bool,
    hits: u64,
    misses: u64,
}

impl PricingCache {
    pub fn new(enabled: bool, capacity: usize) -> Self {
        PricingCache {
            entries: HashMap::new(),
            capacity,
            enabled,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached range for `key`, computing and storing it on a miss.
    ///
    /// Errors from `compute` are returned as-is and never cached.
    pub fn get_or_compute(
        &mut self,
        key: CacheKey,
        compute: impl FnOnce() -> CoreResult<Option<PriceRange>>,
    ) -> CoreResult<Option<PriceRange>> {
        if !self.enabled {
            return compute();
        }

        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(*cached);
        }

        self.misses += 1;
        let range = compute()?;

        if self.entries.len() >= self.capacity {
            debug!(capacity = self.capacity, "Pricing cache full, flushing");
            self.entries.clear();
        }
        self.entries.insert(key, range);

        Ok(range)
    }

    /// Drops every entry for the product.
    pub fn invalidate_product(&mut self, product_id: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.product_id != product_id);

        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(product_id, dropped, "Invalidated cached price ranges");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daffodil_core::{ConfigurationItem, CoreError, Money, Prices};

    fn range(minor: i64) -> PriceRange {
        let prices = Prices::new(Money::from_minor_units(minor), Money::from_minor_units(minor));
        PriceRange {
            min_price: prices,
            max_price: prices,
        }
    }

    fn key(product_id: &str, configuration: Option<&Configuration>) -> CacheKey {
        CacheKey::new(product_id, RangeKind::Required, configuration).unwrap()
    }

    #[test]
    fn test_hit_after_miss() {
        let mut cache = PricingCache::new(true, 8);
        let mut calls = 0;

        for _ in 0..3 {
            let result = cache
                .get_or_compute(key("bundle", None), || {
                    calls += 1;
                    Ok(Some(range(1500)))
                })
                .unwrap();
            assert_eq!(result, Some(range(1500)));
        }

        assert_eq!(calls, 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn test_keys_distinguish_configuration_and_kind() {
        let configuration = Configuration::new().with("base", ConfigurationItem::selected("a"));

        assert_ne!(key("bundle", None), key("bundle", Some(&Configuration::new())));
        assert_ne!(key("bundle", None), key("bundle", Some(&configuration)));
        assert_ne!(
            key("bundle", None),
            CacheKey::new("bundle", RangeKind::Optional, None).unwrap()
        );
        assert_eq!(
            key("bundle", Some(&configuration)),
            key("bundle", Some(&configuration.clone()))
        );
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = PricingCache::new(true, 8);

        let err = cache
            .get_or_compute(key("bad", None), || {
                Err(CoreError::ProductNotFound("bad".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(_)));
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_invalidate_product() {
        let mut cache = PricingCache::new(true, 8);
        cache.get_or_compute(key("a", None), || Ok(None)).unwrap();
        cache.get_or_compute(key("b", None), || Ok(None)).unwrap();

        cache.invalidate_product("a");
        assert_eq!(cache.stats().entries, 1);

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_flushes_when_full() {
        let mut cache = PricingCache::new(true, 2);
        for id in ["a", "b", "c"] {
            cache.get_or_compute(key(id, None), || Ok(None)).unwrap();
        }
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn test_disabled_cache_always_computes() {
        let mut cache = PricingCache::new(false, 8);
        let mut calls = 0;
        for _ in 0..2 {
            cache
                .get_or_compute(key("bundle", None), || {
                    calls += 1;
                    Ok(None)
                })
                .unwrap();
        }
        assert_eq!(calls, 2);
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
