//! The configuration error algebra.
//!
//! Failures are plain values, never panics. When several independent checks
//! fail, their errors are merged with [`ConfigError::And`] (both of two
//! independent attempts failed) or [`ConfigError::Or`] (a fallback chain was
//! exhausted) so that no contributing failure is ever discarded.

use thiserror::Error;

/// An error produced while loading configuration data.
///
/// The three leaf variants carry the full path of the failing value; the two
/// binary variants combine sibling failures into a tree. Leaf paths are
/// preserved losslessly through every combinator so they can be rendered
/// later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Nothing was present at the path.
    #[error("(missing data at {}: {message})", fmt_path(.path))]
    MissingData {
        path: Vec<String>,
        message: String,
    },

    /// A value was present at the path but failed parsing or validation.
    #[error("(invalid data at {}: {message})", fmt_path(.path))]
    InvalidData {
        path: Vec<String>,
        message: String,
    },

    /// The description explicitly disallows a value at the path.
    #[error("(unsupported operation at {}: {message})", fmt_path(.path))]
    Unsupported {
        path: Vec<String>,
        message: String,
    },

    /// Both of two independent attempts failed.
    #[error("({0} and {1})")]
    And(Box<ConfigError>, Box<ConfigError>),

    /// A fallback chain was exhausted: the first attempt failed, its
    /// condition held, and the alternative failed too.
    #[error("({0} or {1})")]
    Or(Box<ConfigError>, Box<ConfigError>),
}

fn fmt_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        format!("\"{}\"", path.join("."))
    }
}

impl ConfigError {
    pub fn missing_data(path: impl Into<Vec<String>>, message: impl Into<String>) -> Self {
        ConfigError::MissingData {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_data(path: impl Into<Vec<String>>, message: impl Into<String>) -> Self {
        ConfigError::InvalidData {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(path: impl Into<Vec<String>>, message: impl Into<String>) -> Self {
        ConfigError::Unsupported {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn and(left: ConfigError, right: ConfigError) -> Self {
        ConfigError::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: ConfigError, right: ConfigError) -> Self {
        ConfigError::Or(Box::new(left), Box::new(right))
    }

    /// Prepends `prefix` to the path of every leaf error, recursing through
    /// `And`/`Or`, so the final error names the full path of each failing
    /// leaf.
    #[must_use]
    pub fn prefixed(self, prefix: &[String]) -> Self {
        let prepend = |path: Vec<String>| {
            let mut full = prefix.to_vec();
            full.extend(path);
            full
        };
        match self {
            ConfigError::MissingData { path, message } => ConfigError::MissingData {
                path: prepend(path),
                message,
            },
            ConfigError::InvalidData { path, message } => ConfigError::InvalidData {
                path: prepend(path),
                message,
            },
            ConfigError::Unsupported { path, message } => ConfigError::Unsupported {
                path: prepend(path),
                message,
            },
            ConfigError::And(left, right) => {
                ConfigError::and(left.prefixed(prefix), right.prefixed(prefix))
            }
            ConfigError::Or(left, right) => {
                ConfigError::or(left.prefixed(prefix), right.prefixed(prefix))
            }
        }
    }

    /// Returns `true` when every leaf of the error tree is `MissingData`.
    ///
    /// This is the gate for `optional`/`with_default`: only "nothing was
    /// present" failures may be absorbed; present-but-malformed values must
    /// still surface as hard errors.
    pub fn is_missing_data_only(&self) -> bool {
        match self {
            ConfigError::MissingData { .. } => true,
            ConfigError::InvalidData { .. } | ConfigError::Unsupported { .. } => false,
            ConfigError::And(left, right) | ConfigError::Or(left, right) => {
                left.is_missing_data_only() && right.is_missing_data_only()
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
    fn test_prefixed_reaches_every_leaf() {
        let error = ConfigError::and(
            ConfigError::missing_data(seg(&["host"]), "absent"),
            ConfigError::invalid_data(seg(&["port"]), "not a number"),
        );
        let prefixed = error.prefixed(&seg(&["app", "database"]));
        assert_eq!(
            prefixed,
            ConfigError::and(
                ConfigError::missing_data(seg(&["app", "database", "host"]), "absent"),
                ConfigError::invalid_data(seg(&["app", "database", "port"]), "not a number"),
            )
        );
    }

    #[test]
    fn test_missing_data_only() {
        let both_missing = ConfigError::and(
            ConfigError::missing_data(seg(&["a"]), "absent"),
            ConfigError::missing_data(seg(&["b"]), "absent"),
        );
        assert!(both_missing.is_missing_data_only());

        let mixed = ConfigError::or(
            ConfigError::missing_data(seg(&["a"]), "absent"),
            ConfigError::invalid_data(seg(&["a"]), "garbage"),
        );
        assert!(!mixed.is_missing_data_only());
    }

    #[test]
    fn test_display_includes_path() {
        let error = ConfigError::missing_data(seg(&["app", "debug"]), "no such key");
        assert_eq!(
            error.to_string(),
            "(missing data at \"app.debug\": no such key)"
        );

        let root = ConfigError::invalid_data(Vec::new(), "bad");
        assert_eq!(root.to_string(), "(invalid data at <root>: bad)");
    }
}
