//! In-memory map backend.

use indexmap::{IndexMap, IndexSet};

use super::flat::{children_of, load_entry, FlatProvider};
use crate::config::{PrimitiveLeaf, Value};
use crate::error::ConfigError;

/// A flat provider over an explicit, ordered string-to-string map.
///
/// Keys are matched exactly against the path segments joined with the path
/// delimiter (default `.`), so `app.debug` answers the path
/// `["app", "debug"]`. Entry order is preserved, which fixes the key order
/// reported by child enumeration.
#[derive(Debug, Clone)]
pub struct MapProvider {
    entries: IndexMap<String, String>,
    path_delim: String,
    seq_delim: String,
}

impl MapProvider {
    pub fn new<K: Into<String>, V: Into<String>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        MapProvider {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            path_delim: ".".to_string(),
            seq_delim: ",".to_string(),
        }
    }

    /// Overrides the delimiter joining path segments into map keys.
    #[must_use]
    pub fn with_path_delim(mut self, delim: impl Into<String>) -> Self {
        let delim = delim.into();
        assert!(!delim.is_empty(), "path delimiter must not be empty");
        self.path_delim = delim;
        self
    }

    /// Overrides the delimiter separating multiple values within one entry.
    #[must_use]
    pub fn with_seq_delim(mut self, delim: impl Into<String>) -> Self {
        let delim = delim.into();
        assert!(!delim.is_empty(), "sequence delimiter must not be empty");
        self.seq_delim = delim;
        self
    }
}

impl FlatProvider for MapProvider {
    fn load(&self, path: &[String], leaf: &PrimitiveLeaf) -> Result<Vec<Value>, ConfigError> {
        load_entry(
            &self.entries,
            path,
            leaf,
            &self.path_delim,
            &self.seq_delim,
            "the provided map",
        )
    }

    fn enumerate_children(&self, path: &[String]) -> Result<IndexSet<String>, ConfigError> {
        Ok(children_of(self.entries.keys(), &self.path_delim, path))
    }
}
