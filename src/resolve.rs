//! Core resolution pipeline: try each source in priority order, stop at the
//! first one that supplies every requested key.
//!
//! Operates on a [`ResolveInput`] whose environment is an already-captured
//! [`EnvOverlay`], so the whole chain is testable with synthetic variables.
//! File I/O is limited to the candidate files and env files named in the
//! input. Steps:
//!
//! 1. Explicit path: a config file, or a folder scanned in sorted order
//! 2. Env files merged into a copy of the overlay
//! 3. Every key looked up in the merged overlay
//! 4. Nothing matched: [`ConfigError::NotFound`]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::EnvOverlay;
use crate::error::ConfigError;
use crate::file;
use crate::types::{ConfigMap, ConfigSource, ResolvedConfig};

/// All data needed to resolve a config.
pub struct ResolveInput {
    pub keys: BTreeSet<String>,
    pub config_type: String,
    /// Config file or folder, already `~`-expanded. `None` skips step 1.
    pub path: Option<PathBuf>,
    /// Env files in merge order. Missing files are skipped.
    pub env_files: Vec<PathBuf>,
    /// Base environment (process snapshot or synthetic pairs).
    pub env: EnvOverlay,
}

/// One step of the priority chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// A config file, or a folder of candidate files.
    Path(PathBuf),
    /// Env files merged over the base environment, then key lookup.
    Environment(Vec<PathBuf>),
}

/// What a single strategy produced.
#[derive(Debug)]
pub enum Outcome {
    Match(ResolvedConfig),
    /// Keys the strategy could not supply, when it can tell.
    NoMatch { missing: Vec<String> },
}

impl Strategy {
    /// Short name used in logs and in [`ConfigError::NotFound`].
    pub fn label(&self) -> String {
        match self {
            Strategy::Path(path) => path.display().to_string(),
            Strategy::Environment(files) if files.is_empty() => "environment".to_string(),
            Strategy::Environment(files) => {
                let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
                format!("environment (env files: {})", names.join(", "))
            }
        }
    }

    pub fn attempt(&self, keys: &BTreeSet<String>, env: &EnvOverlay) -> Outcome {
        match self {
            Strategy::Path(path) => attempt_path(path, keys),
            Strategy::Environment(files) => attempt_environment(files, keys, env),
        }
    }
}

/// The strategies for `input`, highest priority first.
pub fn strategies(input: &ResolveInput) -> Vec<Strategy> {
    let mut chain = Vec::with_capacity(2);
    if let Some(path) = &input.path {
        chain.push(Strategy::Path(path.clone()));
    }
    chain.push(Strategy::Environment(input.env_files.clone()));
    chain
}

/// Resolve configuration from `input`.
pub fn resolve(input: ResolveInput) -> Result<ResolvedConfig, ConfigError> {
    if input.keys.is_empty() {
        return Err(ConfigError::NoKeys {
            config_type: input.config_type,
        });
    }

    info!("Loading configuration for '{}'", input.config_type);

    let mut tried = Vec::new();
    let mut missing = Vec::new();
    for strategy in strategies(&input) {
        match strategy.attempt(&input.keys, &input.env) {
            Outcome::Match(config) => {
                info!(
                    "Configuration '{}' successfully loaded from {}",
                    input.config_type,
                    config.source()
                );
                return Ok(config);
            }
            Outcome::NoMatch { missing: m } => {
                if !m.is_empty() {
                    missing = m;
                }
                tried.push(strategy.label());
            }
        }
    }

    Err(ConfigError::NotFound {
        config_type: input.config_type,
        keys: input.keys.into_iter().collect(),
        missing,
        tried,
    })
}

fn attempt_path(path: &Path, keys: &BTreeSet<String>) -> Outcome {
    let no_match = Outcome::NoMatch { missing: vec![] };

    if path.is_file() {
        return match file::validate_file(path, keys) {
            Some(map) => Outcome::Match(pick(map, keys, path)),
            None => {
                info!("No valid configuration found in path: {}", path.display());
                no_match
            }
        };
    }

    if path.is_dir() {
        return scan_folder(path, file::discover_candidates(path), keys);
    }

    info!("Config path is neither a file nor a folder: {}", path.display());
    no_match
}

/// First candidate in the folder listing that validates. A listing that
/// failed counts as an empty folder.
fn scan_folder(
    path: &Path,
    listing: Result<Vec<PathBuf>, ConfigError>,
    keys: &BTreeSet<String>,
) -> Outcome {
    let candidates = listing.unwrap_or_else(|e| {
        info!("Cannot list config folder: {e}");
        Vec::new()
    });
    for candidate in candidates {
        debug!(candidate = %candidate.display(), "checking config candidate");
        if let Some(map) = file::validate_file(&candidate, keys) {
            return Outcome::Match(pick(map, keys, &candidate));
        }
    }
    info!("No valid configuration found in folder: {}", path.display());
    Outcome::NoMatch { missing: vec![] }
}

fn attempt_environment(files: &[PathBuf], keys: &BTreeSet<String>, base: &EnvOverlay) -> Outcome {
    let mut env = base.clone();
    for env_file in files {
        if !env_file.is_file() {
            debug!(path = %env_file.display(), "env file not found, skipped");
            continue;
        }
        match env.merge_file(env_file) {
            Ok(count) => info!("Loaded env file: {} ({count} entries)", env_file.display()),
            Err(e) => info!("Skipping env file: {e}"),
        }
    }

    match env.lookup_all(keys) {
        Ok(values) => Outcome::Match(ResolvedConfig::new(values, ConfigSource::Environment)),
        Err(missing) => {
            info!(
                "Missing keys in environment variables: {}",
                missing.join(", ")
            );
            Outcome::NoMatch { missing }
        }
    }
}

/// Keep only the requested keys from a validated file mapping.
fn pick(mut map: ConfigMap, keys: &BTreeSet<String>, path: &Path) -> ResolvedConfig {
    let values: BTreeMap<_, _> = keys
        .iter()
        .filter_map(|k| map.remove(k.as_str()).map(|v| (k.clone(), v)))
        .collect();
    ResolvedConfig::new(values, ConfigSource::File(path.to_path_buf()))
}
