use std::path::PathBuf;

use thiserror::Error;

/// An error while resolving a setting
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    /// The setting has no override and declares no default
    #[error("required setting: {settings}.{setting}")]
    Required {
        /// The name of the settings accessor
        settings: String,
        /// The name of the setting
        setting: String,
    },

    /// An attempt was made to write a setting
    #[error("settings are read-only: {settings}.{setting}")]
    Immutable {
        /// The name of the settings accessor
        settings: String,
        /// The name of the setting
        setting: String,
    },

    /// The setting was never declared on the accessor
    #[error("unknown setting: {settings}.{setting}")]
    Unknown {
        /// The name of the settings accessor
        settings: String,
        /// The name of the setting
        setting: String,
    },

    /// The resolved value does not have the expected shape
    #[error("invalid value for setting {settings}.{setting}: {source}")]
    InvalidValue {
        /// The name of the settings accessor
        settings: String,
        /// The name of the setting
        setting: String,
        /// The underlying conversion error
        source: serde_json::Error,
    },

    /// The host configuration holds something other than a table under
    /// the accessor's key
    #[error("settings section '{0}' must be a table")]
    InvalidSection(String),
}

/// An error while loading host configuration
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HostSettingsError {
    /// The configuration file could not be read
    #[error("failed to read settings file '{path}': {source}")]
    ReadError {
        /// The path of the file
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML
    #[error("failed to parse settings file '{path}': {source}")]
    ParseError {
        /// The path of the file
        path: PathBuf,
        /// The underlying parse error
        source: toml::de::Error,
    },

    /// Inline configuration is not valid TOML
    #[error("failed to parse settings: {0}")]
    DeserializeError(#[from] toml::de::Error),

    /// The root of the configuration is not a table
    #[error("settings root must be a table")]
    NotATable,
}
