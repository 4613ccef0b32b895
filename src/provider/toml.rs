//! TOML-document backend.
//!
//! A parsed TOML table is flattened into dot-delimited path/value entries and
//! then served exactly like an in-memory map: nested tables recurse, scalar
//! arrays collapse into one multi-value entry joined with the sequence
//! delimiter, and arrays of tables are indexed by position so they stay
//! reachable through child enumeration.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use toml::Value as TomlValue;

use super::flat::{children_of, load_entry, FlatProvider};
use crate::config::{PrimitiveLeaf, Value};
use crate::error::ConfigError;

/// An error constructing a [`TomlProvider`] from a file or string.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TomlSourceError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A flat provider over a flattened TOML document.
#[derive(Debug, Clone)]
pub struct TomlProvider {
    entries: IndexMap<String, String>,
}

const PATH_DELIM: &str = ".";
const SEQ_DELIM: &str = ",";

impl TomlProvider {
    pub fn from_table(table: toml::Table) -> Self {
        let mut entries = IndexMap::new();
        let mut prefix = Vec::new();
        flatten_table(&table, &mut prefix, &mut entries);
        TomlProvider { entries }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TomlSourceError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => contents.parse(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TomlSourceError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => Err(TomlSourceError::Read {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

impl FromStr for TomlProvider {
    type Err = TomlSourceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let table: toml::Table = toml::from_str(text)?;
        Ok(Self::from_table(table))
    }
}

impl FlatProvider for TomlProvider {
    fn load(&self, path: &[String], leaf: &PrimitiveLeaf) -> Result<Vec<Value>, ConfigError> {
        load_entry(
            &self.entries,
            path,
            leaf,
            PATH_DELIM,
            SEQ_DELIM,
            "the TOML source",
        )
    }

    fn enumerate_children(&self, path: &[String]) -> Result<IndexSet<String>, ConfigError> {
        Ok(children_of(self.entries.keys(), PATH_DELIM, path))
    }
}

fn flatten_table(
    table: &toml::Table,
    prefix: &mut Vec<String>,
    out: &mut IndexMap<String, String>,
) {
    for (key, value) in table {
        prefix.push(key.clone());
        flatten_value(value, prefix, out);
        prefix.pop();
    }
}

fn flatten_value(value: &TomlValue, prefix: &mut Vec<String>, out: &mut IndexMap<String, String>) {
    match value {
        TomlValue::Table(table) => flatten_table(table, prefix, out),
        TomlValue::Array(items) if items.iter().all(is_scalar) => {
            let joined = items
                .iter()
                .map(scalar_to_string)
                .collect::<Vec<String>>()
                .join(SEQ_DELIM);
            out.insert(prefix.join(PATH_DELIM), joined);
        }
        TomlValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                prefix.push(index.to_string());
                flatten_value(item, prefix, out);
                prefix.pop();
            }
        }
        scalar => {
            out.insert(prefix.join(PATH_DELIM), scalar_to_string(scalar));
        }
    }
}

fn is_scalar(value: &TomlValue) -> bool {
    !matches!(value, TomlValue::Table(_) | TomlValue::Array(_))
}

fn scalar_to_string(value: &TomlValue) -> String {
    match value {
        TomlValue::String(s) => s.clone(),
        TomlValue::Integer(i) => i.to_string(),
        TomlValue::Float(f) => f.to_string(),
        TomlValue::Boolean(b) => b.to_string(),
        TomlValue::Datetime(dt) => dt.to_string(),
        TomlValue::Array(_) | TomlValue::Table(_) => {
            unreachable!("flatten_value never stringifies composites")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, ConfigProvider};
    use std::io::Write;

    const DOC: &str = r#"
        [app]
        debug = true
        ports = [8000, 8001]

        [[app.servers]]
        host = "a"

        [[app.servers]]
        host = "b"
    "#;

    #[test]
    fn test_flattening() {
        let provider: TomlProvider = DOC.parse().unwrap();
        assert_eq!(provider.entries["app.debug"], "true");
        assert_eq!(provider.entries["app.ports"], "8000,8001");
        assert_eq!(provider.entries["app.servers.0.host"], "a");
        assert_eq!(provider.entries["app.servers.1.host"], "b");
    }

    #[test]
    fn test_load_through_facade() {
        let provider = ConfigProvider::from_toml_str(DOC).unwrap();
        let debug = Config::boolean().nested("debug").nested("app");
        assert_eq!(provider.load(&debug), Ok(true));

        let ports = Config::integer().repeat().nested("ports").nested("app");
        assert_eq!(provider.load(&ports), Ok(vec![8000, 8001]));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name = \"demo\"").unwrap();
        let provider = TomlProvider::from_file(file.path()).unwrap();
        assert_eq!(provider.entries["name"], "demo");

        let missing = TomlProvider::from_file("/nonexistent/config.toml");
        assert!(matches!(missing, Err(TomlSourceError::FileNotFound(_))));
    }
}
