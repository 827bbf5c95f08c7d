//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An `expire` value below the `-1` sentinel.
    #[error("invalid expire {value} in [{section}]: use seconds >= 0, or -1 for the default")]
    InvalidTtl { section: String, value: i64 },

    /// Any other out-of-range value.
    #[error("invalid value for '{field}' in [{section}]: {reason}")]
    InvalidValue {
        section: String,
        field: String,
        reason: String,
    },
}
