#[cfg(test)]
pub mod test {
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Owned `(name, value)` pairs for synthetic environments.
    pub fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn key_set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    /// Write `content` to `dir/name` and return the full path.
    pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    // -- Canned config files -----------------------------------------------

    pub const DB_JSON: &str = r#"{"host": "json-host", "port": 5432, "user": "admin"}"#;

    pub const DB_YAML: &str = "host: yaml-host\nport: 6543\nuser: admin\n";

    pub const PARTIAL_YAML: &str = "host: partial-host\n";

    #[test]
    fn write_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(dir.path(), "a.json", DB_JSON);
        assert_eq!(fs::read_to_string(path).unwrap(), DB_JSON);
    }
}
