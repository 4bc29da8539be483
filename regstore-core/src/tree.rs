//! Regulation trees and their flattening into a bulk batch.
//!
//! A [`RegulationNode`] is hierarchical: each node owns its children. The
//! store wants one flat record per node, so [`flatten`] walks the tree in
//! pre-order and emits a [`FlatRegDocument`] for every node, annotated with
//! the derived metadata (id, version, regulation, label string, root flag).
//!
//! The input tree is only borrowed. Nothing is written back into it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contract::Document;
use crate::error::{MappingError, Result};
use crate::keys;

/// Fields added by [`flatten`] that are not part of the caller's node.
pub const DERIVED_FIELDS: [&str; 5] = ["id", "version", "regulation", "label_string", "root"];

/// One node of a regulation, e.g. a part, section or paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegulationNode {
    /// Full path from the regulation root, e.g. `["111", "2", "a"]`.
    #[serde(default)]
    pub label: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RegulationNode>,
    /// Any other node fields (title, node_type, ...), carried through verbatim.
    #[serde(flatten)]
    pub extra: Document,
}

impl RegulationNode {
    pub fn new(label: &[&str], text: impl Into<String>) -> Self {
        Self {
            label: label.iter().map(|s| s.to_string()).collect(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<RegulationNode>) -> Self {
        self.children = children;
        self
    }

    pub fn label_string(&self) -> String {
        keys::label_string(&self.label)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

/// A single node as stored: the node's own fields (minus `children`) plus
/// the derived metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRegDocument {
    pub id: String,
    pub version: String,
    pub regulation: String,
    pub label_string: String,
    pub root: bool,
    pub label: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Flatten `root` and all its descendants into a pre-order batch.
///
/// The first document is always the starting node and is the only one with
/// `root == true`. Sibling order is preserved. Fails with
/// [`MappingError::MalformedInput`] on the first node with an empty label.
pub fn flatten(
    root: &RegulationNode,
    version: &str,
    regulation: &str,
) -> Result<Vec<FlatRegDocument>> {
    let mut batch = Vec::with_capacity(root.node_count());
    let mut pending = vec![root];

    while let Some(node) = pending.pop() {
        if node.label.is_empty() {
            return Err(MappingError::malformed_input(format!(
                "regulation node without a label path (after {} nodes of version {version})",
                batch.len()
            )));
        }

        let label_string = node.label_string();
        let mut extra = node.extra.clone();
        for field in DERIVED_FIELDS {
            extra.remove(field);
        }

        batch.push(FlatRegDocument {
            id: keys::regulation_id(version, &label_string),
            version: version.to_string(),
            regulation: regulation.to_string(),
            root: batch.is_empty(),
            label_string,
            label: node.label.clone(),
            text: node.text.clone(),
            extra,
        });

        // Reversed so the first child is popped next.
        pending.extend(node.children.iter().rev());
    }

    debug!(
        version,
        regulation,
        count = batch.len(),
        "[TREE] Flattened regulation tree"
    );
    Ok(batch)
}
