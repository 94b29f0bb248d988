use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No source supplied all keys for '{config_type}' configuration \
         (wanted: {}; missing from environment: {}; tried: {})",
        .keys.join(", "),
        .missing.join(", "),
        .tried.join(", ")
    )]
    NotFound {
        config_type: String,
        keys: Vec<String>,
        missing: Vec<String>,
        tried: Vec<String>,
    },

    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Top level of {path} is not a mapping")]
    NotAMapping { path: PathBuf },

    #[error("{path} is missing keys: {}", .missing.join(", "))]
    MissingKeys { path: PathBuf, missing: Vec<String> },

    #[error("No keys requested for '{config_type}' configuration; call .keys() on the builder")]
    NoKeys { config_type: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("Invalid time format '{input}': {reason}")]
    InvalidClock { input: String, reason: String },

    #[error("Cannot parse time from string '{input}'")]
    Unparseable { input: String },

    #[error("Unit '{unit}' appears more than once in '{input}'")]
    Ambiguous { input: String, unit: &'static str },

    #[error("Duration '{input}' is negative or not finite")]
    OutOfRange { input: String },
}
