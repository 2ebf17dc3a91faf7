#![allow(dead_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Reserved key marking a default-selector map.
pub const DEFAULT_KEY: &str = "_default";
/// Reserved key marking a tag-gated map. Its value is the gate list.
pub const TAGS_KEY: &str = "_tags";
/// Gate label that passes regardless of the active tags.
pub const ALL_TAG: &str = "_all";

/// Active tag set for one filtering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Parses a comma-separated list such as `eng, sales`.
    ///
    /// Labels are trimmed and empty labels are skipped, so `""` yields an
    /// empty set (which still filters everything gated).
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for TagSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        TagSet(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        TagSet(iter.into_iter().map(str::to_string).collect())
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.iter().collect();
        write!(f, "{}", labels.join(","))
    }
}
