//! Delta-notifier payloads.
//!
//! The notifier posts a JSON array of change sets, each with `inserts` and
//! `deletes` triples. Only inserted subjects trigger re-rendering.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub inserts: Vec<Triple>,
    #[serde(default)]
    pub deletes: Vec<Triple>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Node,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: String,
}

impl Triple {
    pub fn with_subject(subject: impl Into<String>) -> Self {
        Self {
            subject: Node {
                kind: "uri".into(),
                value: subject.into(),
            },
            predicate: None,
            object: None,
            graph: None,
        }
    }
}

/// Unique subjects of all inserted triples, in order of first occurrence.
pub fn extract_insert_uris(changes: &[ChangeSet]) -> Vec<String> {
    let mut seen = HashSet::new();
    changes
        .iter()
        .flat_map(|change| change.inserts.iter())
        .map(|triple| triple.subject.value.as_str())
        .filter(|uri| seen.insert(*uri))
        .map(str::to_string)
        .collect()
}
