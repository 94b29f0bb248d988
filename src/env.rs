//! The environment overlay: a caller-owned view of environment variables.
//!
//! Env files are merged into an [`EnvOverlay`] instead of the process
//! environment, so resolving a config never mutates global state and two
//! resolvers in one process cannot race on a shared merge. The overlay is
//! seeded from a snapshot of the process variables (or synthetic pairs in
//! tests) and env files are layered on top under an [`EnvPolicy`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::types::EnvPolicy;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverlay {
    vars: BTreeMap<String, String>,
    // Names that came from the base snapshot rather than an env file.
    base: BTreeSet<String>,
    policy: EnvPolicy,
}

impl EnvOverlay {
    /// Build an overlay whose base layer is `vars`.
    ///
    /// Takes an iterator so tests can pass synthetic data instead of the
    /// process environment.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>, policy: EnvPolicy) -> Self {
        let vars: BTreeMap<String, String> = vars.into_iter().collect();
        let base = vars.keys().cloned().collect();
        Self { vars, base, policy }
    }

    /// Snapshot the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process(policy: EnvPolicy) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::from_vars(vars, policy)
    }

    /// Merge `(key, value)` pairs from one env file.
    ///
    /// Under [`EnvPolicy::PreferProcess`] a name present in the base layer
    /// keeps its base value; names introduced by env files are overwritten by
    /// later pairs. Under [`EnvPolicy::PreferFiles`] every pair overwrites.
    pub fn merge(&mut self, pairs: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in pairs {
            if self.policy == EnvPolicy::PreferProcess && self.base.contains(&key) {
                continue;
            }
            self.vars.insert(key, value);
        }
    }

    /// Parse the env file at `path` and merge it. Returns the number of
    /// pairs read. Lines `dotenvy` cannot parse are skipped.
    pub fn merge_file(&mut self, path: &Path) -> Result<usize, ConfigError> {
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let iter = dotenvy::from_path_iter(path).map_err(|e| match e {
            dotenvy::Error::Io(source) => io_error(source),
            other => io_error(std::io::Error::other(other.to_string())),
        })?;

        let mut pairs = Vec::new();
        for item in iter {
            match item {
                Ok(pair) => pairs.push(pair),
                Err(dotenvy::Error::Io(source)) => return Err(io_error(source)),
                Err(e) => debug!(path = %path.display(), "env line skipped: {e}"),
            }
        }
        let count = pairs.len();
        self.merge(pairs);
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Find `key` as `KEY` (uppercased) first, then under its exact spelling.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.get(&key.to_uppercase()).or_else(|| self.get(key))
    }

    /// Look up every key; all or nothing.
    ///
    /// On success the map is keyed by the requested spellings and every value
    /// is a string. On failure the missing keys are returned.
    pub fn lookup_all(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, Value>, Vec<String>> {
        let mut found = BTreeMap::new();
        let mut missing = Vec::new();
        for key in keys {
            match self.lookup(key) {
                Some(v) => {
                    found.insert(key.clone(), Value::String(v.to_string()));
                }
                None => missing.push(key.clone()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{key_set, vars, write};
    use tempfile::TempDir;

    #[test]
    fn lookup_is_case_insensitive_on_source_side() {
        let env = EnvOverlay::from_vars(vars(&[("API_KEY", "secret")]), EnvPolicy::default());
        assert_eq!(env.lookup("api_key"), Some("secret"));
        assert_eq!(env.lookup("Api_Key"), Some("secret"));
    }

    #[test]
    fn lookup_falls_back_to_exact_spelling() {
        let env = EnvOverlay::from_vars(vars(&[("mixed_Case", "v")]), EnvPolicy::default());
        assert_eq!(env.lookup("mixed_Case"), Some("v"));
        assert_eq!(env.lookup("mixed_case"), None);
    }

    #[test]
    fn uppercase_wins_over_exact() {
        let env = EnvOverlay::from_vars(
            vars(&[("HOST", "upper"), ("host", "lower")]),
            EnvPolicy::default(),
        );
        assert_eq!(env.lookup("host"), Some("upper"));
    }

    #[test]
    fn lookup_all_uses_requested_names() {
        let env = EnvOverlay::from_vars(
            vars(&[("HOST", "h"), ("PORT", "5432")]),
            EnvPolicy::default(),
        );
        let found = env.lookup_all(&key_set(&["host", "port"])).unwrap();
        assert_eq!(found["host"], "h");
        assert_eq!(found["port"], "5432");
    }

    #[test]
    fn lookup_all_reports_missing() {
        let env = EnvOverlay::from_vars(vars(&[("HOST", "h")]), EnvPolicy::default());
        let missing = env.lookup_all(&key_set(&["host", "port", "user"])).unwrap_err();
        assert_eq!(missing, vec!["port".to_string(), "user".to_string()]);
    }

    #[test]
    fn prefer_process_keeps_base_values() {
        let mut env = EnvOverlay::from_vars(vars(&[("HOST", "process")]), EnvPolicy::PreferProcess);
        env.merge(vars(&[("HOST", "file"), ("PORT", "1")]));
        assert_eq!(env.get("HOST"), Some("process"));
        assert_eq!(env.get("PORT"), Some("1"));
    }

    #[test]
    fn prefer_process_later_files_overwrite_earlier() {
        let mut env = EnvOverlay::from_vars(vars(&[]), EnvPolicy::PreferProcess);
        env.merge(vars(&[("PORT", "1")]));
        env.merge(vars(&[("PORT", "2")]));
        assert_eq!(env.get("PORT"), Some("2"));
    }

    #[test]
    fn prefer_files_overwrites_base() {
        let mut env = EnvOverlay::from_vars(vars(&[("HOST", "process")]), EnvPolicy::PreferFiles);
        env.merge(vars(&[("HOST", "file")]));
        assert_eq!(env.get("HOST"), Some("file"));
    }

    fn load(content: &str) -> EnvOverlay {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), ".env", content);
        let mut env = EnvOverlay::default();
        env.merge_file(&path).unwrap();
        env
    }

    #[test]
    fn merge_file_reads_dotenv() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), ".env", "# creds\nAPI_KEY=abc\nexport REGION=eu\n");
        let mut env = EnvOverlay::default();
        assert_eq!(env.merge_file(&path).unwrap(), 2);
        assert_eq!(env.lookup("api_key"), Some("abc"));
        assert_eq!(env.lookup("region"), Some("eu"));
    }

    #[test]
    fn dotenv_comments_and_blank_lines_ignored() {
        let env = load("# header\n\n   \n# another\nA=1\n");
        assert_eq!(env.get("A"), Some("1"));
    }

    #[test]
    fn dotenv_quoted_values_lose_quotes_before_comment() {
        let env = load("API_KEY=\"abc\" # prod key\nTOKEN='xyz' # c\n");
        assert_eq!(env.get("API_KEY"), Some("abc"));
        assert_eq!(env.get("TOKEN"), Some("xyz"));
    }

    #[test]
    fn dotenv_inline_comment_stripped_when_unquoted() {
        let env = load("PORT=5432 # default port\n");
        assert_eq!(env.get("PORT"), Some("5432"));
    }

    #[test]
    fn dotenv_double_quotes_honour_escapes() {
        let env = load("B=\"line\\nnext\"\nC='lit\\n'\n");
        assert_eq!(env.get("B"), Some("line\nnext"));
        assert_eq!(env.get("C"), Some("lit\\n"));
    }

    #[test]
    fn dotenv_value_may_contain_equals() {
        let env = load("URL=postgres://u:p@h/db?sslmode=require\n");
        assert_eq!(env.get("URL"), Some("postgres://u:p@h/db?sslmode=require"));
    }

    #[test]
    fn dotenv_malformed_line_skipped() {
        let env = load("NOEQUALS\nOK=1\n");
        assert_eq!(env.get("OK"), Some("1"));
        assert_eq!(env.get("NOEQUALS"), None);
    }

    #[test]
    fn dotenv_later_line_wins_within_a_file() {
        let env = load("A=1\nA=2\n");
        assert_eq!(env.get("A"), Some("2"));
    }

    #[test]
    fn merge_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut env = EnvOverlay::default();
        let result = env.merge_file(&dir.path().join(".env"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn process_snapshot_matches_std_env() {
        let env = EnvOverlay::from_process(EnvPolicy::default());
        if let Ok(path) = std::env::var("PATH") {
            assert_eq!(env.get("PATH"), Some(path.as_str()));
        }
    }
}
