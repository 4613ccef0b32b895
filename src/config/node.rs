//! The erased description tree walked by the interpreter.
//!
//! Public combinators on [`Config`](crate::Config) track the static result
//! type; the nodes below carry no type information at all. Values flowing
//! through evaluation are erased to `Arc<dyn Any>` and only recovered at the
//! typed boundaries (map/zip closures built at construction time, and the
//! final load).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ConfigError;

/// An evaluated configuration value with its static type erased.
pub type Value = Arc<dyn Any + Send + Sync>;

pub(crate) type ParseFn = dyn Fn(&str) -> Result<Value, ConfigError> + Send + Sync;
pub(crate) type MapFn = dyn Fn(Value) -> Result<Value, ConfigError> + Send + Sync;
pub(crate) type ZipFn = dyn Fn(Value, Value) -> Value + Send + Sync;
pub(crate) type ConditionFn = dyn Fn(&ConfigError) -> bool + Send + Sync;
pub(crate) type ThunkFn = dyn Fn() -> Arc<ConfigNode> + Send + Sync;
pub(crate) type WrapListFn = dyn Fn(Vec<Value>) -> Value + Send + Sync;
pub(crate) type WrapTableFn = dyn Fn(IndexMap<String, Value>) -> Value + Send + Sync;

/// Recovers the static type of an erased value.
///
/// Construction-time typing guarantees the downcast succeeds; a mismatch is
/// an interpreter bug, not a user error, so it panics rather than entering
/// the [`ConfigError`] taxonomy.
pub(crate) fn downcast<A: Clone + 'static>(value: &Value) -> A {
    value
        .downcast_ref::<A>()
        .cloned()
        .expect("configuration value had an unexpected type (bug in the interpreter)")
}

/// A leaf that parses raw backend text.
///
/// This is the only node kind a [`FlatProvider`](crate::provider::FlatProvider)
/// ever sees: the interpreter hands it over together with the path so the
/// backend can look up the raw string and parse each piece.
pub struct PrimitiveLeaf {
    pub(crate) description: String,
    pub(crate) parse: Arc<ParseFn>,
    pub(crate) split: bool,
}

impl PrimitiveLeaf {
    /// Human-readable description of the expected value, e.g. "a boolean
    /// property".
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether raw text should be split on the backend's sequence delimiter
    /// before parsing. Secret leaves are loaded whole because their text may
    /// legitimately contain the delimiter.
    pub fn split_values(&self) -> bool {
        self.split
    }

    /// Parses one piece of raw text into an erased value.
    pub fn parse(&self, text: &str) -> Result<Value, ConfigError> {
        (self.parse)(text)
    }
}

impl fmt::Debug for PrimitiveLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveLeaf")
            .field("description", &self.description)
            .field("split", &self.split)
            .finish()
    }
}

/// One case per combinator. Nodes are built once and never mutated; sharing
/// is via `Arc` so descriptions stay cheap to clone and safe to evaluate
/// concurrently.
pub(crate) enum ConfigNode {
    Constant(Value),
    Described {
        config: Arc<ConfigNode>,
        description: String,
    },
    Fail(String),
    Fallback {
        first: Arc<ConfigNode>,
        second: Arc<ConfigNode>,
        condition: Arc<ConditionFn>,
    },
    Lazy(Arc<ThunkFn>),
    MapOrFail {
        original: Arc<ConfigNode>,
        map: Arc<MapFn>,
    },
    Nested {
        name: String,
        config: Arc<ConfigNode>,
    },
    Primitive(Arc<PrimitiveLeaf>),
    Sequence {
        config: Arc<ConfigNode>,
        wrap: Arc<WrapListFn>,
    },
    Table {
        value: Arc<ConfigNode>,
        wrap: Arc<WrapTableFn>,
    },
    Zipped {
        left: Arc<ConfigNode>,
        right: Arc<ConfigNode>,
        zip: Arc<ZipFn>,
    },
}

impl ConfigNode {
    /// Renders the shape this node describes, used in diagnostics such as
    /// "Expected a single value having structure: ...".
    ///
    /// Deliberately does not force `Lazy` thunks: recursive shapes would
    /// otherwise render forever.
    pub(crate) fn describe(&self) -> String {
        match self {
            ConfigNode::Constant(_) => "a constant value".to_string(),
            ConfigNode::Described {
                config,
                description,
            } => format!("{} ({description})", config.describe()),
            ConfigNode::Fail(message) => format!("a failing configuration ({message})"),
            ConfigNode::Fallback { first, second, .. } => {
                format!("{} or else {}", first.describe(), second.describe())
            }
            ConfigNode::Lazy(_) => "a deferred configuration".to_string(),
            ConfigNode::MapOrFail { original, .. } => original.describe(),
            ConfigNode::Nested { name, config } => {
                format!("{} under \"{name}\"", config.describe())
            }
            ConfigNode::Primitive(leaf) => leaf.description.clone(),
            ConfigNode::Sequence { config, .. } => format!("a sequence of {}", config.describe()),
            ConfigNode::Table { value, .. } => format!("a table of {}", value.describe()),
            ConfigNode::Zipped { left, right, .. } => {
                format!("({} zipped with {})", left.describe(), right.describe())
            }
        }
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config({})", self.describe())
    }
}
