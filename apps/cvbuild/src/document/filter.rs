//! Tag-based document filter.
//!
//! Walks a loaded tree and, for an active tag set, picks one variant per
//! default-selector and drops every gated or plain map that does not apply.
//! Pure: no I/O, no logging, the input tree is only borrowed.

#![allow(dead_code)]

use thiserror::Error;

use crate::document::node::{Map, Node};
use crate::document::tags::{TagSet, ALL_TAG, TAGS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("`_tags` at {path} must be a sequence of strings, found {found}")]
    Structure { path: String, found: String },
}

/// Filters a whole document.
///
/// `None` means no filtering was requested: the tree is returned unchanged,
/// without pruning or validation. `Some` of an empty set is a real pass.
pub fn filter_document(tree: &Node, tags: Option<&TagSet>) -> Result<Option<Node>, FilterError> {
    match tags {
        None => Ok(Some(tree.clone())),
        Some(tags) => filter(tree, tags),
    }
}

/// Filters a single node. `Ok(None)` means the node is pruned.
pub fn filter(node: &Node, tags: &TagSet) -> Result<Option<Node>, FilterError> {
    filter_at(node, tags, &mut Vec::new())
}

/// Filters each entry of an already-accepted map, keeping key order.
pub fn filter_entries(map: &Map, tags: &TagSet) -> Result<Map, FilterError> {
    filter_entries_at(map, tags, &mut Vec::new())
}

fn filter_at(
    node: &Node,
    tags: &TagSet,
    path: &mut Vec<String>,
) -> Result<Option<Node>, FilterError> {
    match node {
        Node::Scalar(_) => Ok(Some(node.clone())),
        Node::Sequence(items) => {
            let mut kept = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                let filtered = filter_at(item, tags, path)?;
                path.pop();
                kept.extend(filtered);
            }
            Ok(Some(Node::Sequence(kept)))
        }
        // First declared label in the active set wins. The variant is
        // returned as written, not filtered further.
        Node::DefaultSelector(variants) => Ok(variants
            .iter()
            .find(|(label, _)| tags.contains(label))
            .map(|(_, variant)| variant.clone())),
        Node::TagGated(entries) => {
            if gate_passes(entries, tags, path)? {
                Ok(Some(Node::TagGated(filter_entries_at(entries, tags, path)?)))
            } else {
                Ok(None)
            }
        }
        Node::PlainMap(_) => Ok(None),
    }
}

fn filter_entries_at(
    map: &Map,
    tags: &TagSet,
    path: &mut Vec<String>,
) -> Result<Map, FilterError> {
    let mut filtered = Map::with_capacity(map.len());
    for (key, value) in map {
        path.push(key.clone());
        let result = filter_at(value, tags, path)?;
        path.pop();
        if let Some(value) = result {
            filtered.insert(key.clone(), value);
        }
    }
    Ok(filtered)
}

fn gate_passes(entries: &Map, tags: &TagSet, path: &[String]) -> Result<bool, FilterError> {
    let structure_error = |found: String| FilterError::Structure {
        path: display_path(path),
        found,
    };

    let labels = match entries.get(TAGS_KEY) {
        Some(Node::Sequence(labels)) => labels,
        Some(other) => return Err(structure_error(other.kind().to_string())),
        None => return Err(structure_error("nothing".to_string())),
    };

    let mut passes = false;
    for entry in labels {
        let label = entry
            .as_str()
            .ok_or_else(|| structure_error(format!("a sequence containing a {}", entry.kind())))?;
        passes |= label == ALL_TAG || tags.contains(label);
    }
    Ok(passes)
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "the document root".to_string()
    } else {
        path.join(".")
    }
}
