//! The minimal capability a configuration backend must expose.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::config::{PrimitiveLeaf, Value};
use crate::error::ConfigError;

/// A flat view of a configuration backend.
///
/// A backend only needs two operations: resolve a path to the raw values of
/// a leaf, and enumerate the immediate child keys under a path. Everything
/// else — nesting, tables, sequences, fallbacks — is interpreted on top of
/// these.
///
/// Implementations must tolerate concurrent reads; this layer performs no
/// locking.
pub trait FlatProvider: fmt::Debug + Send + Sync {
    /// Resolves `path` to the ordered raw values of the given leaf.
    ///
    /// Fails with [`ConfigError::MissingData`] when nothing exists at the
    /// path, or with the leaf's parse error (prefixed with `path`) when the
    /// raw text is malformed.
    fn load(&self, path: &[String], leaf: &PrimitiveLeaf) -> Result<Vec<Value>, ConfigError>;

    /// Enumerates the immediate child keys under `path`, deduplicated, in
    /// first-seen order.
    fn enumerate_children(&self, path: &[String]) -> Result<IndexSet<String>, ConfigError>;
}

/// Splits raw text into leaf values.
///
/// The text is split on the backend's sequence delimiter and each piece is
/// trimmed and parsed independently — unless the leaf opts out of splitting
/// (secrets), in which case the whole text is parsed as a single value.
/// Parse errors are stamped with the full `path`.
pub(crate) fn parse_primitive(
    text: &str,
    path: &[String],
    leaf: &PrimitiveLeaf,
    seq_delim: &str,
) -> Result<Vec<Value>, ConfigError> {
    if !leaf.split_values() {
        let value = leaf.parse(text).map_err(|error| error.prefixed(path))?;
        return Ok(vec![value]);
    }
    text.split(seq_delim)
        .map(|piece| leaf.parse(piece.trim()))
        .collect::<Result<Vec<Value>, ConfigError>>()
        .map_err(|error| error.prefixed(path))
}

/// Looks up a joined path in a flat key/value store and parses the result.
pub(crate) fn load_entry(
    entries: &IndexMap<String, String>,
    path: &[String],
    leaf: &PrimitiveLeaf,
    path_delim: &str,
    seq_delim: &str,
    source: &str,
) -> Result<Vec<Value>, ConfigError> {
    let key = path.join(path_delim);
    match entries.get(&key) {
        Some(raw) => parse_primitive(raw, path, leaf, seq_delim),
        None => {
            tracing::debug!(key = %key, source, "configuration key not found");
            Err(ConfigError::missing_data(
                path,
                format!("Expected {key} to exist in {source}"),
            ))
        }
    }
}

/// Collects the immediate child segments of `path` from a set of delimited
/// keys.
///
/// A key contributes a child when its leading segments match `path`
/// component-wise and at least one segment follows.
pub(crate) fn children_of<'a>(
    keys: impl Iterator<Item = &'a String>,
    path_delim: &str,
    path: &[String],
) -> IndexSet<String> {
    let mut children = IndexSet::new();
    for key in keys {
        let segments: Vec<&str> = key.split(path_delim).collect();
        if segments.len() > path.len()
            && segments
                .iter()
                .zip(path)
                .all(|(segment, wanted)| *segment == wanted.as_str())
        {
            children.insert(segments[path.len()].to_string());
        }
    }
    children
}

/// Namespaces an inner provider: every path is extended with `name` at the
/// front before delegating.
#[derive(Debug, Clone)]
pub(crate) struct NestedFlat {
    pub(crate) name: String,
    pub(crate) inner: Arc<dyn FlatProvider>,
}

impl NestedFlat {
    fn prepend(&self, path: &[String]) -> Vec<String> {
        let mut full = Vec::with_capacity(path.len() + 1);
        full.push(self.name.clone());
        full.extend_from_slice(path);
        full
    }
}

impl FlatProvider for NestedFlat {
    fn load(&self, path: &[String], leaf: &PrimitiveLeaf) -> Result<Vec<Value>, ConfigError> {
        self.inner.load(&self.prepend(path), leaf)
    }

    fn enumerate_children(&self, path: &[String]) -> Result<IndexSet<String>, ConfigError> {
        self.inner.enumerate_children(&self.prepend(path))
    }
}

/// Chains two providers: the first is consulted, the second only on failure.
#[derive(Debug, Clone)]
pub(crate) struct OrElseFlat {
    pub(crate) first: Arc<dyn FlatProvider>,
    pub(crate) second: Arc<dyn FlatProvider>,
}

impl FlatProvider for OrElseFlat {
    fn load(&self, path: &[String], leaf: &PrimitiveLeaf) -> Result<Vec<Value>, ConfigError> {
        match self.first.load(path, leaf) {
            Ok(values) => Ok(values),
            Err(first_error) => match self.second.load(path, leaf) {
                Ok(values) => Ok(values),
                Err(second_error) => Err(ConfigError::and(first_error, second_error)),
            },
        }
    }

    fn enumerate_children(&self, path: &[String]) -> Result<IndexSet<String>, ConfigError> {
        // Both enumerations run before the outcome is inspected so a
        // single failure never hides the surviving side's keys.
        let first = self.first.enumerate_children(path);
        let second = self.second.enumerate_children(path);
        match (first, second) {
            (Ok(mut left), Ok(right)) => {
                left.extend(right);
                Ok(left)
            }
            (Ok(left), Err(_)) => Ok(left),
            (Err(_), Ok(right)) => Ok(right),
            (Err(first_error), Err(second_error)) => {
                Err(ConfigError::and(first_error, second_error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_children_of_matches_prefix_componentwise() {
        let keys = vec![
            "app.debug".to_string(),
            "app.server.host".to_string(),
            "app.server.port".to_string(),
            "application.name".to_string(),
            "app".to_string(),
        ];
        let children = children_of(keys.iter(), ".", &seg(&["app"]));
        let collected: Vec<&str> = children.iter().map(String::as_str).collect();
        // "application" must not match "app"; the bare "app" key has no
        // child segment to contribute.
        assert_eq!(collected, vec!["debug", "server"]);
    }

    #[test]
    fn test_children_of_root() {
        let keys = vec!["a.x".to_string(), "b.y".to_string(), "a.z".to_string()];
        let children = children_of(keys.iter(), ".", &[]);
        let collected: Vec<&str> = children.iter().map(String::as_str).collect();
        assert_eq!(collected, vec!["a", "b"]);
    }
}
