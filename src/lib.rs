//! Small helpers other projects keep rewriting: find a required set of
//! config keys wherever they live, and read or write durations the way
//! people type them.
//!
//! # Config resolution
//!
//! ```ignore
//! let db = osh::ConfigResolver::builder()
//!     .keys(["host", "port", "user"])
//!     .config_type("database")
//!     .path("conf/")
//!     .resolve()?;
//! let host = db.get_string("host");
//! ```
//!
//! Sources are tried in priority order and the **first source that holds
//! every key wins**. Nothing is merged key by key: a file with two of three
//! keys is skipped entirely, never topped up from the environment.
//!
//! ```text
//! 1. Explicit path     a JSON/YAML/TOML file, or a folder of them
//!                      (candidates checked in sorted filename order)
//! 2. Env files         KEY=VALUE files merged over the process environment
//! 3. Environment       each key looked up as KEY (uppercased), then as spelled
//! ```
//!
//! File values keep their native types (`5432` stays a number); values from
//! the environment are always strings. [`ResolvedConfig::deserialize`] turns
//! the result into your own struct.
//!
//! ## No global state
//!
//! Env files are merged into a private [`EnvOverlay`] seeded from a snapshot
//! of the process environment. Resolving never calls `set_var`, so two
//! resolvers in the same process cannot interfere. By default a variable
//! already set in the process beats the same name in an env file; switch with
//! [`EnvPolicy::PreferFiles`].
//!
//! ## Errors
//!
//! Resolution returns [`ConfigError::NotFound`] when no source has every
//! key. The message names the config type, the keys, the keys still missing
//! from the environment, and every source tried. What to do about it (exit,
//! retry, fall back) is the caller's choice.
//!
//! # Durations
//!
//! ```ignore
//! assert_eq!(osh::parse_duration("1 hr 30 min")?, 5400.0);
//! assert_eq!(osh::parse_duration("1:30")?, 90.0);
//! assert_eq!(osh::format_duration(3661.0, false), "1 hr 1 min 1 sec");
//! assert_eq!(osh::format_duration(61.0, true), "1min 1sec");
//! ```
//!
//! Input that matches no dialect is a [`DurationError`], never a silent zero.
//! A unit given twice (`"5 min 10 min"`) is rejected as ambiguous.
//!
//! # Logging
//!
//! Every resolution step logs through [`tracing`] at `info`/`debug` level.
//! The crate never installs a subscriber.

pub mod error;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod duration;
mod env;
mod file;
mod resolve;

#[cfg(test)]
mod fixtures;

pub use builder::{ConfigResolver, ConfigResolverBuilder, resolve_config};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, parse_duration_arg};
pub use duration::{format_duration, parse_duration, parse_std_duration};
pub use env::EnvOverlay;
pub use error::{ConfigError, DurationError};
pub use file::{load_file, validate_file};
pub use types::{ConfigMap, ConfigRequest, ConfigSource, EnvPolicy, Format, ResolvedConfig};
