//! Environment-variable backend.

use indexmap::{IndexMap, IndexSet};

use super::flat::{children_of, load_entry, FlatProvider};
use crate::config::{PrimitiveLeaf, Value};
use crate::error::ConfigError;

/// A flat provider over a snapshot of environment variables.
///
/// The snapshot is taken once at construction. Keys are matched exactly and
/// case-sensitively against the path segments joined with the path delimiter
/// (default `_`), so `APP_DEBUG` answers the path `["APP", "DEBUG"]`.
///
/// Tests can substitute a deterministic snapshot with
/// [`from_snapshot`](EnvProvider::from_snapshot) instead of mutating the
/// real process environment.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    snapshot: IndexMap<String, String>,
    path_delim: String,
    seq_delim: String,
}

impl EnvProvider {
    /// Snapshots the current process environment.
    pub fn from_process() -> Self {
        Self::from_snapshot(std::env::vars())
    }

    /// Builds a provider over an explicit snapshot of key/value pairs.
    pub fn from_snapshot<K: Into<String>, V: Into<String>>(
        vars: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        EnvProvider {
            snapshot: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            path_delim: "_".to_string(),
            seq_delim: ",".to_string(),
        }
    }

    /// Overrides the delimiter joining path segments into variable names.
    #[must_use]
    pub fn with_path_delim(mut self, delim: impl Into<String>) -> Self {
        let delim = delim.into();
        assert!(!delim.is_empty(), "path delimiter must not be empty");
        self.path_delim = delim;
        self
    }

    /// Overrides the delimiter separating multiple values within one
    /// variable.
    #[must_use]
    pub fn with_seq_delim(mut self, delim: impl Into<String>) -> Self {
        let delim = delim.into();
        assert!(!delim.is_empty(), "sequence delimiter must not be empty");
        self.seq_delim = delim;
        self
    }
}

impl FlatProvider for EnvProvider {
    fn load(&self, path: &[String], leaf: &PrimitiveLeaf) -> Result<Vec<Value>, ConfigError> {
        load_entry(
            &self.snapshot,
            path,
            leaf,
            &self.path_delim,
            &self.seq_delim,
            "the process environment",
        )
    }

    fn enumerate_children(&self, path: &[String]) -> Result<IndexSet<String>, ConfigError> {
        Ok(children_of(self.snapshot.keys(), &self.path_delim, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_key_names_joined_path() {
        let provider = EnvProvider::from_snapshot([("OTHER", "1")]);
        let leaf = string_leaf();
        let error = provider.load(&seg(&["APP", "DEBUG"]), &leaf).unwrap_err();
        assert_eq!(
            error,
            ConfigError::missing_data(
                seg(&["APP", "DEBUG"]),
                "Expected APP_DEBUG to exist in the process environment",
            )
        );
    }

    #[test]
    fn test_enumerate_children_with_underscore_delimiter() {
        let provider = EnvProvider::from_snapshot([
            ("APP_DEBUG", "true"),
            ("APP_DB_HOST", "localhost"),
            ("APP_DB_PORT", "5432"),
            ("UNRELATED", "x"),
        ]);
        let children = provider.enumerate_children(&seg(&["APP"])).unwrap();
        let collected: Vec<&str> = children.iter().map(String::as_str).collect();
        assert_eq!(collected, vec!["DEBUG", "DB"]);
    }

    fn string_leaf() -> PrimitiveLeaf {
        use std::sync::Arc;
        PrimitiveLeaf {
            description: "a text property".to_string(),
            parse: Arc::new(|text| Ok(Arc::new(text.to_string()) as Value)),
            split: true,
        }
    }
}
