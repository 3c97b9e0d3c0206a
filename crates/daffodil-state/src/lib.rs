//! # daffodil-state: State Layer for Composite Pricing
//!
//! Holds catalog products and the shopper's applied options, and exposes
//! the `daffodil-core` pricing engine as by-id selectors with memoized
//! price ranges.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. PricingStateConfig::load_or_default(None)                           │
//! │     • pricing.toml in the platform config dir                          │
//! │     • DAFF_PRICING_* environment overrides                             │
//! │                                                                         │
//! │  2. init_tracing(&config.logging)                                       │
//! │     • RUST_LOG wins over the configured filter                         │
//! │                                                                         │
//! │  3. CompositeProductSelectors::new(config)                              │
//! │     • load_products() as catalog pages arrive                          │
//! │     • apply_option() on every shopper choice                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use daffodil_core::{CompositeItem, CompositeItemOption, CompositeProduct, Money};
//! use daffodil_state::{CompositeProductSelectors, PricingStateConfig};
//!
//! let selectors = CompositeProductSelectors::new(PricingStateConfig::default());
//! let product = CompositeProduct::new(
//!     "bundle",
//!     Money::from_minor_units(1000),
//!     None,
//!     vec![CompositeItem::new("base", true, vec![
//!         CompositeItemOption::new("a", Money::from_minor_units(500)),
//!     ])],
//! )
//! .unwrap();
//! selectors.load_products(vec![product.into()]).unwrap();
//!
//! selectors.apply_option("bundle", "base", "a", Some(2)).unwrap();
//! let range = selectors.price_range_as_currently_configured("bundle").unwrap().unwrap();
//! assert_eq!(range.min_price.original_price.to_string(), "20.00");
//! ```

pub mod applied_options;
pub mod cache;
pub mod config;
pub mod error;
pub mod products;
pub mod selectors;

pub use applied_options::{AppliedConfiguration, AppliedOptionsStore};
pub use cache::{CacheKey, CacheStats, PricingCache, RangeKind};
pub use config::{CacheSettings, LoggingSettings, OptionSettings, PricingStateConfig};
pub use error::{StateError, StateResult};
pub use products::ProductStore;
pub use selectors::CompositeProductSelectors;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - otherwise `settings.filter` (default `info,daffodil=debug`)
///
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_tracing(settings: &LoggingSettings) -> StateResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.filter)
            .map_err(|e| StateError::InvalidConfig(format!("logging.filter: {e}")))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| StateError::InvalidConfig(format!("tracing already initialized: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_installs_once() {
        let settings = LoggingSettings::default();
        let _ = init_tracing(&settings);

        let err = init_tracing(&settings).unwrap_err();
        assert!(matches!(err, StateError::InvalidConfig(_)));
    }
}
