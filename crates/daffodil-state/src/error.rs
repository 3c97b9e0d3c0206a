//! # State Error Types
//!
//! Error types for the state layer.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       State Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Lookup      │  │     Internal            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Core(NotFound) │  │  LockPoisoned           │ │
//! │  │  ConfigIo       │  │  NotComposite   │  │  Serialization          │ │
//! │  │  TomlParse      │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use daffodil_core::CoreError;
use thiserror::Error;

/// Result type alias for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// State layer error type.
#[derive(Debug, Error)]
pub enum StateError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Error raised by the pricing core (invalid product, unknown ids).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Options can only be applied to composite products.
    #[error("Product {0} is not a composite product")]
    NotComposite(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid state configuration.
    #[error("Invalid pricing configuration: {0}")]
    InvalidConfig(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Config file could not be read or written.
    #[error("Config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML.
    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// A writer panicked while holding a store lock.
    #[error("State lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Configuration could not be serialized into a cache key.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StateError {
    /// True when the error means "no such product/item/option".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StateError::Core(
                CoreError::ProductNotFound(_)
                    | CoreError::ItemNotFound { .. }
                    | CoreError::OptionNotFound { .. }
            )
        )
    }
}
