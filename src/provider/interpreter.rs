//! The recursive evaluator for description trees.
//!
//! Every node evaluates to an ordered *sequence* of erased values, never a
//! bare scalar. The sequence is the mechanism by which plain leaves
//! (singleton), explicit repetition, dynamically-keyed tables and zips all
//! compose through one interpreter: a table of structs, for example, is
//! assembled by zipping several independently loaded leaf sequences that
//! share a common row index.

use indexmap::IndexMap;

use super::flat::FlatProvider;
use crate::config::{ConfigNode, Value};
use crate::error::ConfigError;

/// Evaluates `node` against `flat` at the path prefix `prefix`.
pub(crate) fn eval(
    flat: &dyn FlatProvider,
    prefix: &[String],
    node: &ConfigNode,
) -> Result<Vec<Value>, ConfigError> {
    match node {
        ConfigNode::Constant(value) => Ok(vec![value.clone()]),

        ConfigNode::Described { config, .. } => eval(flat, prefix, config),

        ConfigNode::Fail(message) => Err(ConfigError::unsupported(prefix, message.clone())),

        ConfigNode::Fallback {
            first,
            second,
            condition,
        } => match eval(flat, prefix, first) {
            Ok(values) => Ok(values),
            Err(first_error) if condition(&first_error) => match eval(flat, prefix, second) {
                Ok(values) => Ok(values),
                Err(second_error) => Err(ConfigError::or(first_error, second_error)),
            },
            Err(first_error) => Err(first_error),
        },

        ConfigNode::Lazy(thunk) => {
            let forced = thunk();
            eval(flat, prefix, &forced)
        }

        ConfigNode::MapOrFail { original, map } => {
            let values = eval(flat, prefix, original)?;
            values
                .into_iter()
                .map(|value| map(value).map_err(|error| error.prefixed(prefix)))
                .collect()
        }

        ConfigNode::Nested { name, config } => {
            let mut extended = prefix.to_vec();
            extended.push(name.clone());
            eval(flat, &extended, config)
        }

        ConfigNode::Primitive(leaf) => {
            let values = flat.load(prefix, leaf)?;
            if values.is_empty() {
                // A leaf must yield at least one value; an empty-but-
                // successful load is promoted to missing data.
                let name = prefix.last().map(String::as_str).unwrap_or("<n/a>");
                return Err(ConfigError::missing_data(
                    prefix,
                    format!("Expected {} with name {name}", leaf.description()),
                ));
            }
            Ok(values)
        }

        ConfigNode::Sequence { config, wrap } => {
            let values = eval(flat, prefix, config)?;
            Ok(vec![wrap(values)])
        }

        ConfigNode::Table { value, wrap } => {
            let keys = flat.enumerate_children(prefix)?;
            if keys.is_empty() {
                return Ok(vec![wrap(IndexMap::new())]);
            }
            // Key-major evaluation: one result column per discovered key.
            let mut columns = Vec::with_capacity(keys.len());
            for key in &keys {
                let mut extended = prefix.to_vec();
                extended.push(key.clone());
                columns.push(eval(flat, &extended, value)?);
            }
            // Transpose to row-major so each output element is one complete
            // key-to-value map for a given row index.
            let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
            Ok((0..rows)
                .map(|row| {
                    wrap(
                        keys.iter()
                            .cloned()
                            .zip(columns.iter().map(|column| column[row].clone()))
                            .collect(),
                    )
                })
                .collect())
        }

        ConfigNode::Zipped { left, right, zip } => {
            // Both sides run before the outcome is inspected: a double
            // failure must combine into And, never surface only one side.
            let lefts = eval(flat, prefix, left);
            let rights = eval(flat, prefix, right);
            match (lefts, rights) {
                (Err(left_error), Err(right_error)) => {
                    Err(ConfigError::and(left_error, right_error))
                }
                (Err(error), Ok(_)) | (Ok(_), Err(error)) => Err(error),
                (Ok(lefts), Ok(rights)) => {
                    let len = lefts.len().max(rights.len());
                    let joined = prefix.join(".");
                    let missing = |index: usize| {
                        ConfigError::missing_data(
                            prefix,
                            format!(
                                "The element at index {index} in a sequence at path \
                                 \"{joined}\" was missing"
                            ),
                        )
                    };
                    (0..len)
                        .map(|index| {
                            let left = lefts.get(index).cloned().ok_or_else(|| missing(index))?;
                            let right = rights.get(index).cloned().ok_or_else(|| missing(index))?;
                            Ok(zip(left, right))
                        })
                        .collect()
                }
            }
        }
    }
}
