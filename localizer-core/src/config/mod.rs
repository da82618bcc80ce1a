//! Configuration
//!
//! Compiled defaults plus the runtime settings persisted in the
//! key-value store. Stored values are validated on every load; anything
//! suspicious falls back to the compiled default.

pub mod defaults;
pub mod settings;

pub use settings::{
    load, store_setting, ConfigError, LoadReport, Rejected, Settings, Value, LINK_KEYS,
};
