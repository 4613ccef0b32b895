//! Declarative configuration descriptions evaluated against pluggable
//! key/value backends.
//!
//! Build an immutable, backend-agnostic [`Config`] describing the shape your
//! application expects, then evaluate it with a [`ConfigProvider`] over the
//! process environment, an in-memory map, a TOML document, or any custom
//! [`FlatProvider`](provider::FlatProvider). Failures come back as a
//! structured [`ConfigError`] tree that keeps every contributing failure and
//! the full path of each failing value.
//!
//! ## Example
//!
//! ```
//! use declconf::{Config, ConfigProvider};
//!
//! let description = Config::string()
//!     .nested("host")
//!     .zip(Config::integer().nested("port").with_default(5432))
//!     .nested("database");
//!
//! let provider = ConfigProvider::from_map([("database.host", "localhost")]);
//! let (host, port) = provider.load(&description)?;
//! assert_eq!(host, "localhost");
//! assert_eq!(port, 5432);
//! # Ok::<(), declconf::ConfigError>(())
//! ```

pub mod config;
pub mod provider;

mod error;
mod secret;

pub use config::{Config, PrimitiveLeaf, Value};
pub use error::ConfigError;
pub use provider::ConfigProvider;
pub use secret::Secret;
