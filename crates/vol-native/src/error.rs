/// Errors from loading a [`NativeConfig`](crate::config::NativeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse native config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid native config: {0}")]
    Invalid(String),
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
