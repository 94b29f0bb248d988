//! Request and result types shared by the resolver pipeline.
//!
//! A [`ConfigRequest`] says *which* keys are needed and *where* to look. A
//! [`ResolvedConfig`] is what comes back: every requested key, plus the
//! [`ConfigSource`] that supplied them. There is no partially-filled
//! `ResolvedConfig`; resolution either satisfies the whole key set from one
//! source or fails.
//!
//! # Source priority
//!
//! ```text
//! Explicit path         a config file, or a folder of config files
//!        ↓ falls through to
//! Env files             .env files merged over the process snapshot
//!        ↓ falls through to
//! Environment lookup    KEY (uppercased) in the merged overlay
//! ```
//!
//! Unlike a merging config system, sources are **not** layered key by key.
//! The first source that has every key wins outright.
//!
//! # Env override policy
//!
//! When an env file and the process environment both define a variable,
//! [`EnvPolicy`] decides which value the lookup sees:
//!
//! - [`PreferProcess`](EnvPolicy::PreferProcess) (default): variables already
//!   set in the process are never overwritten. Among env files, later files
//!   overwrite earlier ones.
//! - [`PreferFiles`](EnvPolicy::PreferFiles): env files overwrite the process
//!   snapshot, later files overwriting earlier ones.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Top-level mapping parsed from a config file.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Env file consulted when the caller does not list any.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Serialization format of a candidate config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Detect the format from a file extension.
    ///
    /// Matching is case-insensitive and by substring, so `YAML`, `yml` and
    /// `Json` are all recognized. Returns `None` for anything else.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if ext.contains("json") {
            Some(Format::Json)
        } else if ext.contains("yaml") || ext.contains("yml") {
            Some(Format::Yaml)
        } else if ext.contains("toml") {
            Some(Format::Toml)
        } else {
            None
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "JSON"),
            Format::Yaml => write!(f, "YAML"),
            Format::Toml => write!(f, "TOML"),
        }
    }
}

/// Which value wins when an env file redefines a process variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvPolicy {
    #[default]
    PreferProcess,
    PreferFiles,
}

/// Where a resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Environment => write!(f, "environment variables"),
        }
    }
}

/// Everything needed to resolve one configuration set.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRequest {
    /// Required keys. Stored as a set; output uses these exact spellings.
    pub keys: BTreeSet<String>,
    /// Free-text label used in log lines and errors.
    pub config_type: String,
    /// Config file or folder of config files, tried first.
    pub path: Option<PathBuf>,
    /// Env files merged into the overlay, in order.
    pub env_files: Vec<PathBuf>,
    pub env_policy: EnvPolicy,
}

impl ConfigRequest {
    pub fn new<I, K>(keys: I, config_type: &str) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            config_type: config_type.to_string(),
            path: None,
            env_files: vec![PathBuf::from(DEFAULT_ENV_FILE)],
            env_policy: EnvPolicy::default(),
        }
    }

    /// Explicit path, or `None` when absent or blank.
    pub fn effective_path(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
    }
}

/// A complete set of requested keys and their values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    values: BTreeMap<String, Value>,
    source: ConfigSource,
}

impl ResolvedConfig {
    pub(crate) fn new(values: BTreeMap<String, Value>, source: ConfigSource) -> Self {
        Self { values, source }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Value rendered as a string: strings verbatim, other scalars via JSON.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.values
    }

    /// Deserialize the resolved keys into a typed struct.
    ///
    /// Environment-sourced values are strings, so numeric fields fed from
    /// the environment need a string-tolerant deserializer.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let map: serde_json::Map<String, Value> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(Value::Object(map))
    }
}
