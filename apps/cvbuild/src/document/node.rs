//! Document tree model.
//!
//! Maps are classified once, when the tree is built, by the reserved key they
//! carry. The filter then dispatches on the variant instead of probing keys.

#![allow(dead_code)]

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::document::tags::{DEFAULT_KEY, TAGS_KEY};

/// Order-preserving mapping. Declaration order breaks ties between variants.
pub type Map = IndexMap<String, Node>;

/// Opaque leaf value. Never inspected by the filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    /// Map carrying `_default`: each key is a tag label, each value a variant.
    DefaultSelector(Map),
    /// Map carrying `_tags`: the body is kept only when the gate passes.
    TagGated(Map),
    /// Map without a reserved key.
    PlainMap(Map),
}

impl Node {
    /// Builds a map node, classifying it by its reserved key.
    /// `_default` wins when both reserved keys are present.
    pub fn from_map(map: Map) -> Self {
        if map.contains_key(DEFAULT_KEY) {
            Node::DefaultSelector(map)
        } else if map.contains_key(TAGS_KEY) {
            Node::TagGated(map)
        } else {
            Node::PlainMap(map)
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::DefaultSelector(map) | Node::TagGated(map) | Node::PlainMap(map) => Some(map),
            _ => None,
        }
    }

    /// Short human-readable name of the node's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(Scalar::Null) => "null",
            Node::Scalar(Scalar::Bool(_)) => "boolean",
            Node::Scalar(Scalar::Number(_)) => "number",
            Node::Scalar(Scalar::String(_)) => "string",
            Node::Sequence(_) => "sequence",
            Node::DefaultSelector(_) | Node::TagGated(_) | Node::PlainMap(_) => "mapping",
        }
    }

    /// Total number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Node::Scalar(_) => 0,
            Node::Sequence(items) => items.iter().map(Node::node_count).sum(),
            Node::DefaultSelector(map) | Node::TagGated(map) | Node::PlainMap(map) => {
                map.values().map(Node::node_count).sum()
            }
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(scalar) => scalar.serialize(serializer),
            Node::Sequence(items) => serializer.collect_seq(items),
            Node::DefaultSelector(map) | Node::TagGated(map) | Node::PlainMap(map) => {
                serializer.collect_map(map)
            }
        }
    }
}
