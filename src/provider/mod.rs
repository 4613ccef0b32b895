//! Configuration providers: backends plus the facade that evaluates
//! descriptions against them.

mod env;
mod flat;
mod interpreter;
mod map;
mod toml;

pub use env::EnvProvider;
pub use flat::FlatProvider;
pub use map::MapProvider;
pub use self::toml::{TomlProvider, TomlSourceError};

use std::sync::Arc;

use flat::{NestedFlat, OrElseFlat};

use crate::config::{downcast, Config};
use crate::error::ConfigError;

/// A hierarchical configuration provider.
///
/// Wraps a [`FlatProvider`] and exposes the one entry point applications
/// use: evaluate a [`Config`] description and get back exactly one
/// strongly-typed value or a structured error.
///
/// Providers are pure values: cheap to clone, reusable, and safe to share.
/// Every [`load`](ConfigProvider::load) re-reads the backend; nothing is
/// cached.
///
/// ## Example
///
/// ```
/// use declconf::{Config, ConfigProvider};
///
/// let provider = ConfigProvider::from_map([
///     ("server.host", "localhost"),
///     ("server.port", "8080"),
/// ]);
///
/// let address = Config::string()
///     .nested("host")
///     .zip(Config::integer().nested("port"))
///     .nested("server");
///
/// assert_eq!(provider.load(&address), Ok(("localhost".to_string(), 8080)));
/// ```
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    flat: Arc<dyn FlatProvider>,
}

impl ConfigProvider {
    /// Builds a provider from any flat backend.
    pub fn from_flat(flat: impl FlatProvider + 'static) -> Self {
        ConfigProvider {
            flat: Arc::new(flat),
        }
    }

    fn from_flat_arc(flat: Arc<dyn FlatProvider>) -> Self {
        ConfigProvider { flat }
    }

    /// A provider over a snapshot of the current process environment, with
    /// path delimiter `_` and sequence delimiter `,`.
    pub fn from_env() -> Self {
        Self::from_flat(EnvProvider::from_process())
    }

    /// A provider over an explicit environment snapshot, useful for
    /// deterministic tests.
    pub fn from_env_snapshot<K: Into<String>, V: Into<String>>(
        vars: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::from_flat(EnvProvider::from_snapshot(vars))
    }

    /// A provider over an ordered in-memory map, with path delimiter `.`
    /// and sequence delimiter `,`.
    pub fn from_map<K: Into<String>, V: Into<String>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::from_flat(MapProvider::new(entries))
    }

    /// A provider over a flattened TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, TomlSourceError> {
        Ok(Self::from_flat(text.parse::<TomlProvider>()?))
    }

    /// Evaluates `config` against this provider's backend, yielding exactly
    /// one value.
    pub fn load<A: Clone + Send + Sync + 'static>(
        &self,
        config: &Config<A>,
    ) -> Result<A, ConfigError> {
        tracing::debug!(structure = %config.node.describe(), "loading configuration");
        let values = interpreter::eval(self.flat.as_ref(), &[], &config.node)?;
        match values.into_iter().next() {
            Some(value) => Ok(downcast::<A>(&value)),
            None => Err(ConfigError::missing_data(
                Vec::new(),
                format!(
                    "Expected a single value having structure: {}",
                    config.node.describe()
                ),
            )),
        }
    }

    /// Namespaces this provider: every lookup happens under the extra
    /// leading path segment `name`.
    #[must_use]
    pub fn nested(self, name: impl Into<String>) -> Self {
        Self::from_flat(NestedFlat {
            name: name.into(),
            inner: self.flat,
        })
    }

    /// Chains providers: `self` is consulted first and `that` on failure.
    /// When both fail, the failures combine into `And`; child enumeration
    /// unions both sides.
    #[must_use]
    pub fn or_else(self, that: ConfigProvider) -> Self {
        Self::from_flat(OrElseFlat {
            first: self.flat,
            second: that.flat,
        })
    }

    /// The underlying flat view, for composing custom backends.
    pub fn flatten(&self) -> Arc<dyn FlatProvider> {
        Arc::clone(&self.flat)
    }
}

impl From<Arc<dyn FlatProvider>> for ConfigProvider {
    fn from(flat: Arc<dyn FlatProvider>) -> Self {
        Self::from_flat_arc(flat)
    }
}
