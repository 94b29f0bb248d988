//! Clap adapter for osh.
//!
//! Compiled only with the `clap` Cargo feature (on by default). Two pieces:
//!
//! - [`ConfigArgs`]: `--config` and `--env-file` flags to flatten into your
//!   own clap struct; [`ConfigArgs::apply()`] threads them into a
//!   [`ConfigResolverBuilder`](crate::ConfigResolverBuilder).
//! - [`parse_duration_arg`]: a `value_parser` accepting any dialect that
//!   [`parse_duration`](crate::parse_duration) reads.
//!
//! Nothing here is required: the builder works the same without clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::builder::ConfigResolverBuilder;
use crate::duration::parse_std_duration;

/// Clap-derived flags pointing the resolver at config sources.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     config: ConfigArgs,
/// }
///
/// let db = cli.config.apply(ConfigResolver::builder().keys(["host", "port"])).resolve()?;
/// ```
#[derive(Debug, Args, Clone, PartialEq, Default)]
pub struct ConfigArgs {
    /// Config file, or folder of JSON/YAML/TOML config files.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Env file to merge before reading environment variables. Repeatable;
    /// later files win. Defaults to `.env`.
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_files: Vec<PathBuf>,
}

impl ConfigArgs {
    /// Apply the parsed flags to `builder`.
    ///
    /// Flags that were not given leave the builder's settings untouched.
    pub fn apply(self, builder: ConfigResolverBuilder) -> ConfigResolverBuilder {
        let mut builder = builder;
        if let Some(path) = self.config {
            builder = builder.path(path);
        }
        if !self.env_files.is_empty() {
            builder = builder.env_files(self.env_files);
        }
        builder
    }
}

/// `value_parser` for duration flags, e.g. `--timeout 1h30m`.
pub fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    parse_std_duration(s).map_err(|e| e.to_string())
}
