//! Config file discovery, parsing, and key validation.
//!
//! # Discovery
//!
//! When the explicit path is a folder, [`discover_candidates`] lists its
//! immediate children whose extension is `json`, `yaml`, `yml` or `toml` (any
//! letter case) and sorts them by path, so the outcome never depends on
//! directory iteration order.
//!
//! # Validation
//!
//! [`validate_file`] is the fail-closed gate used by the resolver: any
//! problem (missing file, unknown extension, parse error, non-mapping top
//! level, missing key) turns into `None` plus a log line. Callers that want
//! the reason use [`load_file`] and [`check_keys`] directly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::types::{ConfigMap, Format};

const CANDIDATE_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "toml"];

/// Expand a leading `~/` (or a bare `~`) to the user's home directory.
///
/// Paths without the prefix, or systems without a home directory, are
/// returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match directories::UserDirs::new() {
        Some(user) => user.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

/// Parse a config file according to its extension.
///
/// The top level must be a mapping. YAML is loaded with `serde_yaml`, which
/// never constructs arbitrary tagged objects.
pub fn load_file(path: &Path) -> Result<ConfigMap, ConfigError> {
    let format = Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let parse_err = |reason: String| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    };
    let value: Value = match format {
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
        Format::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
        Format::Toml => toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Check that `map` holds every key in `keys` (exact, case-sensitive).
pub fn check_keys(path: &Path, map: &ConfigMap, keys: &BTreeSet<String>) -> Result<(), ConfigError> {
    let missing: Vec<String> = keys
        .iter()
        .filter(|k| !map.contains_key(k.as_str()))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingKeys {
            path: path.to_path_buf(),
            missing,
        })
    }
}

/// Load `path` and return its mapping only if it contains every key.
///
/// Never errors: every failure is logged and reported as `None`.
pub fn validate_file(path: &Path, keys: &BTreeSet<String>) -> Option<ConfigMap> {
    if !path.is_file() {
        debug!(path = %path.display(), "config file does not exist");
        return None;
    }
    let result = load_file(path).and_then(|map| {
        check_keys(path, &map, keys)?;
        Ok(map)
    });
    match result {
        Ok(map) => Some(map),
        Err(e) => {
            info!("Skipping config candidate: {e}");
            None
        }
    }
}

/// List the config candidates directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list. Other I/O errors are propagated.
pub fn discover_candidates(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => {
            return Err(ConfigError::Io {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_candidate_extension(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates)
}

fn is_candidate_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CANDIDATE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
