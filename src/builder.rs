use std::path::{Path, PathBuf};

use crate::env::EnvOverlay;
use crate::error::ConfigError;
use crate::file;
use crate::resolve::{self, ResolveInput};
use crate::types::{ConfigRequest, DEFAULT_ENV_FILE, EnvPolicy, ResolvedConfig};

/// Entry point for resolving a key set.
pub struct ConfigResolver;

impl ConfigResolver {
    pub fn builder() -> ConfigResolverBuilder {
        ConfigResolverBuilder::new()
    }
}

/// Builder for a single config resolution.
///
/// ```ignore
/// let db = ConfigResolver::builder()
///     .keys(["host", "port"])
///     .config_type("database")
///     .path("conf/")
///     .resolve()?;
/// ```
pub struct ConfigResolverBuilder {
    keys: Vec<String>,
    config_type: Option<String>,
    path: Option<PathBuf>,
    env_files: Option<Vec<PathBuf>>,
    env_policy: EnvPolicy,
    env_vars: Option<Vec<(String, String)>>,
}

impl ConfigResolverBuilder {
    fn new() -> Self {
        Self {
            keys: Vec::new(),
            config_type: None,
            path: None,
            env_files: None,
            env_policy: EnvPolicy::default(),
            env_vars: None,
        }
    }

    /// Start from an existing request.
    pub fn from_request(request: ConfigRequest) -> Self {
        Self {
            keys: request.keys.into_iter().collect(),
            config_type: Some(request.config_type),
            path: request.path,
            env_files: Some(request.env_files),
            env_policy: request.env_policy,
            env_vars: None,
        }
    }

    /// Add required keys. Duplicates collapse.
    pub fn keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.keys.push(key.to_string());
        self
    }

    /// Label used in log lines and errors (default: `"config"`).
    pub fn config_type(mut self, label: &str) -> Self {
        self.config_type = Some(label.to_string());
        self
    }

    /// Config file, or folder of config files, tried before the environment.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the env file list (default: `[".env"]`). An empty list skips
    /// env files entirely.
    pub fn env_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.env_files = Some(files.into_iter().map(|p| p.as_ref().to_path_buf()).collect());
        self
    }

    /// Append an env file. If no list has been set yet, starts from the default `[".env"]`.
    pub fn add_env_file<P: AsRef<Path>>(mut self, file: P) -> Self {
        self.env_files
            .get_or_insert_with(|| vec![PathBuf::from(DEFAULT_ENV_FILE)])
            .push(file.as_ref().to_path_buf());
        self
    }

    /// Set who wins when an env file redefines a process variable.
    pub fn env_policy(mut self, policy: EnvPolicy) -> Self {
        self.env_policy = policy;
        self
    }

    /// Use these variables instead of a snapshot of the process environment.
    pub fn env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env_vars = Some(vars.into_iter().collect());
        self
    }

    /// Ignore the process environment; only env files feed the lookup.
    pub fn no_process_env(mut self) -> Self {
        self.env_vars = Some(Vec::new());
        self
    }

    /// The request this builder describes, before any I/O.
    pub fn request(&self) -> ConfigRequest {
        let mut request = ConfigRequest::new(self.keys.iter().cloned(), self.effective_config_type());
        request.path = self.path.clone();
        request.env_files = self.effective_env_files();
        request.env_policy = self.env_policy;
        request
    }

    fn effective_config_type(&self) -> &str {
        self.config_type.as_deref().unwrap_or("config")
    }

    fn effective_env_files(&self) -> Vec<PathBuf> {
        match &self.env_files {
            Some(files) => files.clone(),
            None => vec![PathBuf::from(DEFAULT_ENV_FILE)],
        }
    }

    fn build_input(self) -> ResolveInput {
        let request = self.request();
        let env = match self.env_vars {
            Some(vars) => EnvOverlay::from_vars(vars, self.env_policy),
            None => EnvOverlay::from_process(self.env_policy),
        };
        ResolveInput {
            path: request.effective_path().map(file::expand_home),
            env_files: request
                .env_files
                .iter()
                .map(|p| file::expand_home(p))
                .collect(),
            keys: request.keys,
            config_type: request.config_type,
            env,
        }
    }

    /// Resolve the key set through the source chain.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        resolve::resolve(self.build_input())
    }
}

/// Resolve `keys` from `path`, then `env_files` merged over the process
/// environment, then the environment alone.
///
/// Shorthand for the [`ConfigResolver`] builder with default settings.
pub fn resolve_config<I, K, P>(
    keys: I,
    config_type: &str,
    path: Option<&Path>,
    env_files: &[P],
) -> Result<ResolvedConfig, ConfigError>
where
    I: IntoIterator<Item = K>,
    K: Into<String>,
    P: AsRef<Path>,
{
    let mut builder = ConfigResolver::builder()
        .keys(keys)
        .config_type(config_type)
        .env_files(env_files);
    if let Some(path) = path {
        builder = builder.path(path);
    }
    builder.resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{DB_JSON, DB_YAML, key_set, vars, write};
    use crate::types::ConfigSource;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let builder = ConfigResolver::builder().keys(["host"]);
        let request = builder.request();
        assert_eq!(request.config_type, "config");
        assert_eq!(request.env_files, vec![PathBuf::from(".env")]);
        assert_eq!(request.env_policy, EnvPolicy::PreferProcess);
        assert!(request.path.is_none());
    }

    #[test]
    fn keys_and_key_accumulate() {
        let request = ConfigResolver::builder()
            .keys(["host", "port"])
            .key("host")
            .key("user")
            .request();
        assert_eq!(request.keys, key_set(&["host", "port", "user"]));
    }

    #[test]
    fn env_files_replace() {
        let request = ConfigResolver::builder()
            .env_files(["a.env", "b.env"])
            .request();
        assert_eq!(
            request.env_files,
            vec![PathBuf::from("a.env"), PathBuf::from("b.env")]
        );
    }

    #[test]
    fn add_env_file_appends_to_default() {
        let request = ConfigResolver::builder().add_env_file("local.env").request();
        assert_eq!(
            request.env_files,
            vec![PathBuf::from(".env"), PathBuf::from("local.env")]
        );
    }

    #[test]
    fn from_request_round_trips() {
        let mut original = ConfigRequest::new(["a", "b"], "svc");
        original.path = Some("conf".into());
        original.env_files = vec![];
        original.env_policy = EnvPolicy::PreferFiles;
        let request = ConfigResolverBuilder::from_request(original.clone()).request();
        assert_eq!(request, original);
    }

    #[test]
    fn resolve_from_folder() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.yaml", DB_YAML);
        write(dir.path(), "a.json", DB_JSON);
        let config = ConfigResolver::builder()
            .keys(["host", "port"])
            .config_type("database")
            .path(dir.path())
            .env_files(Vec::<PathBuf>::new())
            .no_process_env()
            .resolve()
            .unwrap();
        assert_eq!(config.get("host").unwrap(), "json-host");
        assert_eq!(config.source(), &ConfigSource::File(dir.path().join("a.json")));
    }

    #[test]
    fn resolve_from_synthetic_env() {
        let config = ConfigResolver::builder()
            .keys(["api_key"])
            .env_files(Vec::<PathBuf>::new())
            .env_vars(vars(&[("API_KEY", "k-123")]))
            .resolve()
            .unwrap();
        assert_eq!(config.get_string("api_key").unwrap(), "k-123");
        assert_eq!(config.source(), &ConfigSource::Environment);
    }

    #[test]
    fn resolve_prefer_files_policy() {
        let dir = TempDir::new().unwrap();
        let env_file = write(dir.path(), "app.env", "API_KEY=from-file\n");
        let config = ConfigResolver::builder()
            .keys(["api_key"])
            .env_files([env_file])
            .env_vars(vars(&[("API_KEY", "from-process")]))
            .env_policy(EnvPolicy::PreferFiles)
            .resolve()
            .unwrap();
        assert_eq!(config.get("api_key").unwrap(), "from-file");
    }

    #[test]
    fn resolve_failure_names_config_type() {
        let err = ConfigResolver::builder()
            .keys(["secret"])
            .config_type("vault")
            .env_files(Vec::<PathBuf>::new())
            .no_process_env()
            .resolve()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("vault"));
        assert!(msg.contains("secret"));
    }

    #[test]
    fn blank_path_skips_file_step() {
        let config = ConfigResolver::builder()
            .keys(["k"])
            .path("  ")
            .env_files(Vec::<PathBuf>::new())
            .env_vars(vars(&[("K", "v")]))
            .resolve()
            .unwrap();
        assert_eq!(config.source(), &ConfigSource::Environment);
    }

    #[test]
    fn resolve_config_shorthand() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "db.json", DB_JSON);
        let config =
            resolve_config(["host", "user"], "database", Some(path.as_path()), &[dir.path().join(".env")])
                .unwrap();
        assert_eq!(config.get("user").unwrap(), "admin");
    }
}
