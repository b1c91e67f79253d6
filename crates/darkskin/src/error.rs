//! Error types for the dark-mode converter.

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring the converter or parsing colors.
///
/// Stylesheet conversion itself never fails; these errors surface only from
/// the fallible helpers (color parsing, configuration loading).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A color literal could not be parsed.
    #[error("Invalid color '{literal}': {message}")]
    InvalidColor { literal: String, message: String },

    /// A configuration value is out of range.
    #[error("Invalid value for config field '{field}': {message}")]
    InvalidConfig { field: &'static str, message: String },

    /// Malformed TOML configuration document.
    #[error("Failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The process-wide converter was configured after first use.
    #[error("The global converter is already initialized")]
    AlreadyInitialized,
}

impl Error {
    /// Create a color parse error.
    pub fn invalid_color(literal: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidColor {
            literal: literal.into(),
            message: message.into(),
        }
    }

    /// Create a configuration range error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}
