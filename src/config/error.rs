use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to parse layer source: {0}")]
    LayerParse(#[from] toml::de::Error),

    #[error("layer '{layer}' failed to load: {reason}")]
    LayerLoad { layer: String, reason: String },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("invalid value for '{key}': expected {expected}, found {found}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("invalid URL for '{key}': {source}")]
    InvalidUrl {
        key: String,
        source: url::ParseError,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, expected: &'static str, found: impl ToString) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}
