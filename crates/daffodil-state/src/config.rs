//! # Pricing State Configuration
//!
//! Configuration for the state layer around the pricing engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DAFF_PRICING_CACHE_CAPACITY=2048                                   │
//! │     DAFF_PRICING_LOG=debug                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/daffodil-pricing/pricing.toml (Linux)                    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 1024
//!
//! [options]
//! seed_default_options = true
//!
//! [logging]
//! filter = "info,daffodil=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{StateError, StateResult};

// =============================================================================
// Cache Settings
// =============================================================================

/// Memoization settings for price range selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Cache price ranges by product id and configuration.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entries kept before the cache is flushed.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    1024
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            enabled: true,
            capacity: default_capacity(),
        }
    }
}

// =============================================================================
// Option Settings
// =============================================================================

/// How applied options are seeded when a composite product is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSettings {
    /// Preselect options flagged `is_default` on load.
    #[serde(default = "default_true")]
    pub seed_default_options: bool,
}

impl Default for OptionSettings {
    fn default() -> Self {
        OptionSettings {
            seed_default_options: true,
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info,daffodil=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete state layer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingStateConfig {
    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub options: OptionSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl PricingStateConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pricing.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StateResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pricing config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load pricing config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> StateResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StateResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StateError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Pricing config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StateResult<()> {
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(StateError::InvalidConfig(
                "cache.capacity must be greater than 0 when the cache is enabled".into(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(StateError::InvalidConfig(
                "logging.filter must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies `DAFF_PRICING_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(enabled) = var("DAFF_PRICING_CACHE_ENABLED") {
            match enabled.parse::<bool>() {
                Ok(enabled) => self.cache.enabled = enabled,
                Err(_) => warn!(value = %enabled, "Ignoring invalid DAFF_PRICING_CACHE_ENABLED"),
            }
        }

        if let Some(capacity) = var("DAFF_PRICING_CACHE_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(capacity) => {
                    debug!(capacity, "Overriding cache capacity from environment");
                    self.cache.capacity = capacity;
                }
                Err(_) => warn!(value = %capacity, "Ignoring invalid DAFF_PRICING_CACHE_CAPACITY"),
            }
        }

        if let Some(seed) = var("DAFF_PRICING_SEED_DEFAULTS") {
            if let Ok(seed) = seed.parse::<bool>() {
                self.options.seed_default_options = seed;
            }
        }

        if let Some(filter) = var("DAFF_PRICING_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "daffodil", "pricing")
            .map(|dirs| dirs.config_dir().join("pricing.toml"))
    }
}
