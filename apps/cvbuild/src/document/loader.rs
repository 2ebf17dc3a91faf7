//! Builds a [`Node`] tree from a YAML (or JSON) source.

use std::path::Path;

use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use crate::document::node::{Map, Node, Scalar};
use crate::document::tags::{ALL_TAG, TAGS_KEY};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Document root must be a mapping, found {0}")]
    RootNotMapping(&'static str),

    #[error("Mapping keys must be scalars, found a {0} key")]
    UnsupportedKey(&'static str),
}

/// Reads and loads a document from disk.
pub fn load_path(path: &Path) -> Result<Node, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_str(&source)
}

/// Parses a document, resolves `<<` merge keys and injects the root gate.
///
/// The root mapping always receives `_tags: ["_all"]` so it survives any
/// filtering pass. An existing root `_tags` value is overwritten in place.
/// Duplicate keys in one mapping are rejected.
pub fn load_str(source: &str) -> Result<Node, LoadError> {
    let mut value: Value = serde_yaml::from_str(source)?;
    value.apply_merge()?;

    let mut root = match value {
        Value::Mapping(root) => root,
        other => return Err(LoadError::RootNotMapping(value_kind(&other))),
    };

    root.insert(
        Value::String(TAGS_KEY.to_string()),
        Value::Sequence(vec![Value::String(ALL_TAG.to_string())]),
    );

    let node = from_value(Value::Mapping(root))?;
    debug!(nodes = node.node_count(), "Document loaded");
    Ok(node)
}

/// Converts a parsed YAML value into a classified tree. No root gate is added.
pub fn from_value(value: Value) -> Result<Node, LoadError> {
    Ok(match value {
        Value::Null => Node::Scalar(Scalar::Null),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
        Value::Number(n) => Node::Scalar(Scalar::Number(n)),
        Value::String(s) => Node::Scalar(Scalar::String(s)),
        Value::Sequence(items) => Node::Sequence(
            items
                .into_iter()
                .map(from_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(key_label(key)?, from_value(value)?);
            }
            Node::from_map(map)
        }
        Value::Tagged(tagged) => from_value(tagged.value)?,
    })
}

fn key_label(key: Value) -> Result<String, LoadError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => key_label(tagged.value),
        other => Err(LoadError::UnsupportedKey(value_kind(&other))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
