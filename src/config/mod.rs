//! Declarative descriptions of configuration values.
//!
//! A [`Config<A>`] is an immutable blueprint of the shape an application
//! expects, independent of any backend. Descriptions are built once from
//! primitives and combinators and then evaluated any number of times by a
//! [`ConfigProvider`](crate::ConfigProvider).

mod node;

pub use node::{PrimitiveLeaf, Value};

pub(crate) use node::{downcast, ConfigNode};

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::secret::Secret;

/// A description of a configuration value of type `A`.
///
/// Descriptions are pure values: cheap to clone, safe to share across
/// threads, and side-effect-free to construct. Nothing touches a backend
/// until [`ConfigProvider::load`](crate::ConfigProvider::load) is called.
///
/// ## Example
///
/// ```
/// use declconf::{Config, ConfigProvider};
///
/// let debug = Config::boolean().nested("debug").nested("app");
/// let provider = ConfigProvider::from_map([("app.debug", "true")]);
/// assert_eq!(provider.load(&debug), Ok(true));
/// ```
pub struct Config<A> {
    pub(crate) node: Arc<ConfigNode>,
    _result: PhantomData<fn() -> A>,
}

impl<A> Clone for Config<A> {
    fn clone(&self) -> Self {
        Config {
            node: Arc::clone(&self.node),
            _result: PhantomData,
        }
    }
}

impl<A> fmt::Debug for Config<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config({})", self.node.describe())
    }
}

impl<A> Config<A> {
    pub(crate) fn from_node(node: ConfigNode) -> Self {
        Config {
            node: Arc::new(node),
            _result: PhantomData,
        }
    }
}

impl<A: Clone + Send + Sync + 'static> Config<A> {
    /// A description that always yields `value` without touching the
    /// backend.
    pub fn succeed(value: A) -> Self {
        Config::from_node(ConfigNode::Constant(Arc::new(value)))
    }

    /// Defers construction of a description until evaluation time.
    ///
    /// Required for self-referential shapes: building them eagerly would
    /// recurse without bound, so the thunk is only forced when the
    /// interpreter reaches this node.
    pub fn defer(thunk: impl Fn() -> Config<A> + Send + Sync + 'static) -> Self {
        Config::from_node(ConfigNode::Lazy(Arc::new(move || thunk().node)))
    }

    /// A description that always fails with [`ConfigError::Unsupported`] at
    /// the current path.
    pub fn fail(message: impl Into<String>) -> Self {
        Config::from_node(ConfigNode::Fail(message.into()))
    }

    /// A leaf backed by raw backend text.
    ///
    /// `description` names the expected shape for diagnostics; `parse`
    /// should reject bad text with [`ConfigError::InvalidData`] (an empty
    /// path is fine, the backend prefixes it with the full path).
    pub fn primitive(
        description: impl Into<String>,
        parse: impl Fn(&str) -> Result<A, ConfigError> + Send + Sync + 'static,
    ) -> Self {
        Config::leaf(description, parse, true)
    }

    fn leaf(
        description: impl Into<String>,
        parse: impl Fn(&str) -> Result<A, ConfigError> + Send + Sync + 'static,
        split: bool,
    ) -> Self {
        Config::from_node(ConfigNode::Primitive(Arc::new(PrimitiveLeaf {
            description: description.into(),
            parse: Arc::new(move |text| parse(text).map(|a| Arc::new(a) as Value)),
            split,
        })))
    }

    /// Prepends a path segment: the value is looked up one level deeper
    /// under `name`.
    #[must_use]
    pub fn nested(self, name: impl Into<String>) -> Self {
        Config::from_node(ConfigNode::Nested {
            name: name.into(),
            config: self.node,
        })
    }

    /// Attaches human-readable documentation. Transparent to evaluation.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Config::from_node(ConfigNode::Described {
            config: self.node,
            description: description.into(),
        })
    }

    /// Transforms the resolved value.
    pub fn map<B: Clone + Send + Sync + 'static>(
        self,
        f: impl Fn(A) -> B + Send + Sync + 'static,
    ) -> Config<B> {
        self.map_or_fail(move |a| Ok(f(a)))
    }

    /// Transforms the resolved value with a fallible function, turning any
    /// error into [`ConfigError::InvalidData`] carrying the error's message.
    pub fn map_attempt<B, E>(
        self,
        f: impl Fn(A) -> Result<B, E> + Send + Sync + 'static,
    ) -> Config<B>
    where
        B: Clone + Send + Sync + 'static,
        E: fmt::Display,
    {
        self.map_or_fail(move |a| {
            f(a).map_err(|error| ConfigError::invalid_data(Vec::new(), error.to_string()))
        })
    }

    /// Transforms the resolved value with a function that may fail with a
    /// full [`ConfigError`]. The error is stamped with the current path
    /// prefix during evaluation.
    pub fn map_or_fail<B: Clone + Send + Sync + 'static>(
        self,
        f: impl Fn(A) -> Result<B, ConfigError> + Send + Sync + 'static,
    ) -> Config<B> {
        Config::from_node(ConfigNode::MapOrFail {
            original: self.node,
            map: Arc::new(move |value| f(downcast::<A>(&value)).map(|b| Arc::new(b) as Value)),
        })
    }

    /// Fails with `InvalidData(message)` when `predicate` rejects the
    /// resolved value.
    #[must_use]
    pub fn validate(
        self,
        message: impl Into<String>,
        predicate: impl Fn(&A) -> bool + Send + Sync + 'static,
    ) -> Self {
        let message = message.into();
        self.map_or_fail(move |a| {
            if predicate(&a) {
                Ok(a)
            } else {
                Err(ConfigError::invalid_data(Vec::new(), message.clone()))
            }
        })
    }

    /// Attempts `self`; on any failure, attempts `that`. If both fail the
    /// combined failure is `Or(first, second)`.
    #[must_use]
    pub fn or_else(self, that: Config<A>) -> Self {
        self.or_else_if(that, |_| true)
    }

    /// Attempts `self`; falls through to `that` only when `condition` holds
    /// for the first failure. If both fail the combined failure is
    /// `Or(first, second)`; otherwise the first failure propagates.
    #[must_use]
    pub fn or_else_if(
        self,
        that: Config<A>,
        condition: impl Fn(&ConfigError) -> bool + Send + Sync + 'static,
    ) -> Self {
        Config::from_node(ConfigNode::Fallback {
            first: self.node,
            second: that.node,
            condition: Arc::new(condition),
        })
    }

    /// Makes the value optional: a *missing* value becomes `None`, while a
    /// present-but-malformed value still fails hard.
    pub fn optional(self) -> Config<Option<A>> {
        self.map(Some)
            .or_else_if(Config::succeed(None), ConfigError::is_missing_data_only)
    }

    /// Supplies a default for a *missing* value. Parse and validation
    /// failures are never defaulted.
    #[must_use]
    pub fn with_default(self, default: A) -> Self {
        self.or_else_if(Config::succeed(default), ConfigError::is_missing_data_only)
    }

    /// Aggregates every occurrence of the inner value into one list.
    ///
    /// Against a multi-value leaf (raw text `"1,2,3"`) this yields the whole
    /// list as a single element one level up.
    pub fn repeat(self) -> Config<Vec<A>> {
        Config::from_node(ConfigNode::Sequence {
            config: self.node,
            wrap: Arc::new(|values| {
                Arc::new(values.iter().map(downcast::<A>).collect::<Vec<A>>()) as Value
            }),
        })
    }

    /// Combines two descriptions into a pair. Both sides are evaluated
    /// independently; see [`zip_with`](Config::zip_with).
    pub fn zip<B: Clone + Send + Sync + 'static>(self, that: Config<B>) -> Config<(A, B)> {
        self.zip_with(that, |a, b| (a, b))
    }

    /// Combines two independent descriptions with `f`.
    ///
    /// Neither side observes the other's outcome: if both fail, the
    /// failures merge into `And`; if their result sequences have different
    /// lengths, the shorter side is padded with per-index missing-data
    /// sentinels before the pairwise combination.
    pub fn zip_with<B, C>(
        self,
        that: Config<B>,
        f: impl Fn(A, B) -> C + Send + Sync + 'static,
    ) -> Config<C>
    where
        B: Clone + Send + Sync + 'static,
        C: Clone + Send + Sync + 'static,
    {
        Config::from_node(ConfigNode::Zipped {
            left: self.node,
            right: that.node,
            zip: Arc::new(move |left, right| {
                Arc::new(f(downcast::<A>(&left), downcast::<B>(&right))) as Value
            }),
        })
    }

    /// Constructor-position spelling of [`repeat`](Config::repeat).
    pub fn vec_of(item: Config<A>) -> Config<Vec<A>> {
        item.repeat()
    }

    /// A dynamically-keyed map whose keys are discovered from the backend's
    /// children at the current path.
    pub fn table(value: Config<A>) -> Config<IndexMap<String, A>> {
        Config::from_node(ConfigNode::Table {
            value: value.node,
            wrap: Arc::new(|entries| {
                Arc::new(
                    entries
                        .iter()
                        .map(|(key, value)| (key.clone(), downcast::<A>(value)))
                        .collect::<IndexMap<String, A>>(),
                ) as Value
            }),
        })
    }

    /// A record of named fields, each nested under its own name.
    ///
    /// Built as a left-fold of [`zip_with`](Config::zip_with) merging each
    /// field into a growing record, so independent field failures combine
    /// into `And` rather than short-circuiting.
    ///
    /// # Panics
    ///
    /// Panics if `fields` is empty.
    pub fn struct_of<S: Into<String>>(
        fields: impl IntoIterator<Item = (S, Config<A>)>,
    ) -> Config<IndexMap<String, A>> {
        let mut fields = fields.into_iter();
        let (name, config) = fields
            .next()
            .expect("struct_of requires at least one field");
        let first_name = name.into();
        let nested = config.nested(first_name.clone());
        let mut result = nested.map(move |value| {
            let mut record = IndexMap::new();
            record.insert(first_name.clone(), value);
            record
        });
        for (name, config) in fields {
            let name = name.into();
            let nested = config.nested(name.clone());
            result = result.zip_with(nested, move |mut record, value| {
                record.insert(name.clone(), value);
                record
            });
        }
        result
    }

    /// An ordered list of descriptions combined positionally.
    ///
    /// Built as a left-fold of [`zip_with`](Config::zip_with). The result is
    /// always a list: a single item yields a one-element list, never the
    /// bare item. For heterogeneous pairing use [`zip`](Config::zip) or
    /// [`zip_with`](Config::zip_with).
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty.
    pub fn tuple_of(items: impl IntoIterator<Item = Config<A>>) -> Config<Vec<A>> {
        let mut items = items.into_iter();
        let first = items.next().expect("tuple_of requires at least one item");
        let mut result = first.map(|a| vec![a]);
        for item in items {
            result = result.zip_with(item, |mut list, a| {
                list.push(a);
                list
            });
        }
        result
    }
}

impl<A: Clone + Send + Sync + Eq + Hash + 'static> Config<A> {
    /// Collects every occurrence of the inner value into a set,
    /// deduplicating repeats.
    pub fn set_of(item: Config<A>) -> Config<HashSet<A>> {
        item.repeat().map(|values| values.into_iter().collect())
    }
}

impl Config<String> {
    /// A text leaf. Any raw value parses successfully.
    pub fn string() -> Config<String> {
        Config::primitive("a text property", |text| Ok(text.to_string()))
    }
}

impl Config<bool> {
    /// A boolean leaf.
    ///
    /// Parsing is case-sensitive and exact: `"true"`, `"yes"`, `"on"` and
    /// `"1"` are true; `"false"`, `"no"`, `"off"` and `"0"` are false; any
    /// other text is `InvalidData`.
    pub fn boolean() -> Config<bool> {
        Config::primitive("a boolean property", |text| match text {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(ConfigError::invalid_data(
                Vec::new(),
                format!("Expected a boolean value, but received {text}"),
            )),
        })
    }
}

impl Config<i64> {
    /// An integer leaf.
    pub fn integer() -> Config<i64> {
        Config::primitive("an integer property", |text| {
            text.parse::<i64>().map_err(|_| {
                ConfigError::invalid_data(
                    Vec::new(),
                    format!("Expected an integer value but received {text}"),
                )
            })
        })
    }
}

impl Config<f64> {
    /// A float leaf.
    pub fn float() -> Config<f64> {
        Config::primitive("a float property", |text| {
            text.parse::<f64>().map_err(|_| {
                ConfigError::invalid_data(
                    Vec::new(),
                    format!("Expected a float value but received {text}"),
                )
            })
        })
    }
}

impl Config<DateTime<FixedOffset>> {
    /// An RFC 3339 date-time leaf.
    pub fn date() -> Config<DateTime<FixedOffset>> {
        Config::primitive("a date property", |text| {
            DateTime::parse_from_rfc3339(text).map_err(|_| {
                ConfigError::invalid_data(
                    Vec::new(),
                    format!("Expected a date value but received {text}"),
                )
            })
        })
    }
}

impl Config<Secret> {
    /// A secret leaf.
    ///
    /// The raw text is taken whole — never split on the sequence delimiter —
    /// and the resulting [`Secret`] redacts itself from formatted output.
    pub fn secret() -> Config<Secret> {
        Config::leaf("a secret property", |text| Ok(Secret::new(text)), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_renders_structure() {
        let config = Config::integer().nested("port").nested("server");
        assert_eq!(
            format!("{config:?}"),
            "Config(an integer property under \"port\" under \"server\")"
        );
    }

    #[test]
    fn test_described_is_construction_only() {
        let config = Config::boolean().with_description("enables verbose output");
        assert_eq!(
            format!("{config:?}"),
            "Config(a boolean property (enables verbose output))"
        );
    }

    #[test]
    #[should_panic(expected = "struct_of requires at least one field")]
    fn test_struct_of_rejects_empty() {
        let fields: Vec<(&str, Config<i64>)> = Vec::new();
        let _ = Config::struct_of(fields);
    }

    #[test]
    #[should_panic(expected = "tuple_of requires at least one item")]
    fn test_tuple_of_rejects_empty() {
        let items: Vec<Config<i64>> = Vec::new();
        let _ = Config::tuple_of(items);
    }

    #[test]
    fn test_defer_does_not_force_thunk() {
        // A self-referential shape would recurse forever if the thunk ran
        // at construction time.
        let config: Config<i64> = Config::defer(|| panic!("thunk forced during construction"));
        assert_eq!(format!("{config:?}"), "Config(a deferred configuration)");
    }
}
