//! TOML configuration for kvrealm.
//!
//! Maps `[cache]`, `[session]` and `[store]` tables onto
//! [`kvrealm::CacheSettings`] and [`kvrealm::SessionSettings`], validating
//! values the core builders would otherwise silently correct.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    CONFIG_ENV_VAR, LoadedConfig, PROJECT_CONFIG_FILE, load_config, load_config_file,
    load_config_with_options,
};
pub use error::{ConfigError, Result};
pub use types::*;
