//! Regulation codec: whole trees in, single nodes out.
//!
//! - [`encode`] flattens a tree into a `reg_tree` bulk batch.
//! - [`decode`] strips the derived metadata from a stored document and gives
//!   back the rest of it, unchanged.
//! - [`Regulations`] wires both to a [`Store`] and adds the version listing.

use serde_json::Value;
use tracing::{debug, error, info};

use crate::contract::{BulkDoc, DocType, Document, Hit, Query, SearchRequest, Store};
use crate::error::{MappingError, Result};
use crate::keys;
use crate::tree::{self, RegulationNode, DERIVED_FIELDS};

/// Fields projected by the listing search.
pub const LISTING_FIELDS: [&str; 2] = ["version", "label_string"];

/// Encode a regulation tree into a bulk batch, root first.
pub fn encode(root: &RegulationNode, version: &str, regulation: &str) -> Result<Vec<BulkDoc>> {
    tree::flatten(root, version, regulation)?
        .into_iter()
        .map(|flat| {
            let id = flat.id.clone();
            Ok(BulkDoc {
                doc: crate::to_document(&flat, &id)?,
                id,
            })
        })
        .collect()
}

/// The stored node minus the derived fields. Whatever else was stored comes
/// back as is; children are separate documents and never appear here.
pub fn decode(mut stored: Document) -> Document {
    for field in DERIVED_FIELDS {
        stored.remove(field);
    }
    stored
}

/// Reads a `(version, label_string)` pair out of a listing hit.
fn listing_entry(hit: &Hit) -> Result<(String, String)> {
    let field = |name: &str| {
        hit.fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MappingError::malformed_document(&hit.id, format!("hit has no `{name}`")))
    };
    Ok((field("version")?, field("label_string")?))
}

/// Store-facing operations on `reg_tree` documents.
pub struct Regulations<'s, S: Store + ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> Regulations<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Fetch the node stored under `version/label_string`.
    pub async fn get(&self, label_string: &str, version: &str) -> Result<Option<Document>> {
        let id = keys::regulation_id(version, label_string);
        match self.store.get(DocType::RegTree, &id).await? {
            Some(stored) => {
                debug!(id = %id, "[REGS] Found regulation node");
                Ok(Some(decode(stored)))
            }
            None => {
                info!(id = %id, "[REGS] No regulation node stored under id");
                Ok(None)
            }
        }
    }

    /// Flatten and store an entire tree in one bulk call.
    pub async fn bulk_put(
        &self,
        root: &RegulationNode,
        version: &str,
        regulation: &str,
    ) -> Result<()> {
        let batch = encode(root, version, regulation)?;
        let count = batch.len();
        info!(version, regulation, count, "[REGS] Writing regulation tree");
        self.store
            .bulk_put(DocType::RegTree, batch)
            .await
            .map_err(|e| {
                error!(error = ?e, version, regulation, "[REGS][ERROR] Bulk write failed");
                MappingError::Store(e)
            })
    }

    /// All `(version, label_string)` pairs for `label_string`, or for every
    /// regulation root when `None`. Sorted ascending by version.
    pub async fn listing(&self, label_string: Option<&str>) -> Result<Vec<(String, String)>> {
        let query = match label_string {
            Some(label) => Query::matching("label_string", label),
            None => Query::matching("root", true),
        };
        let hits = self
            .store
            .search(DocType::RegTree, SearchRequest::new(query, &LISTING_FIELDS))
            .await?;

        let mut entries = hits.iter().map(listing_entry).collect::<Result<Vec<_>>>()?;
        entries.sort();
        debug!(count = entries.len(), "[REGS] Listed regulation versions");
        Ok(entries)
    }
}
