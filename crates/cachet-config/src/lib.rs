//! # Cachet Config
//!
//! Typed configuration for the cache facade with layered loading and
//! fail-fast validation. Values come from TOML files under a config
//! directory, overridden by `CACHET__`-prefixed environment variables.

mod cache_config;
mod loader;

pub use cache_config::{CacheConfig, ReconnectConfig};
pub use loader::ConfigLoader;
