//! Layer codec.
//!
//! A layer is a set of annotation entries for one regulation version, one entry
//! per node label. Each entry carries a reserved `label` key naming the node;
//! everything else is opaque payload that gets wrapped under `layer`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::contract::{BulkDoc, DocType, Document, Store};
use crate::error::{MappingError, Result};
use crate::keys;

pub const LABEL_KEY: &str = "label";

/// A layer entry as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDocument {
    pub id: String,
    pub version: String,
    pub name: String,
    pub label: String,
    /// The entry's payload, never containing `label`.
    pub layer: Document,
}

impl LayerDocument {
    /// Split `entry` into its label and payload. The entry itself is not modified.
    pub fn from_entry(entry: &Document, version: &str, name: &str) -> Result<Self> {
        let label = match entry.get(LABEL_KEY) {
            Some(Value::String(label)) if !label.is_empty() => label.clone(),
            Some(Value::String(_)) => {
                return Err(MappingError::malformed_input(format!(
                    "layer `{name}` entry has an empty label"
                )))
            }
            Some(other) => {
                return Err(MappingError::malformed_input(format!(
                    "layer `{name}` entry has a non-string label: {other}"
                )))
            }
            None => {
                return Err(MappingError::malformed_input(format!(
                    "layer `{name}` entry has no `{LABEL_KEY}` key"
                )))
            }
        };

        let mut layer = entry.clone();
        layer.remove(LABEL_KEY);

        Ok(Self {
            id: keys::layer_id(version, name, &label),
            version: version.to_string(),
            name: name.to_string(),
            label,
            layer,
        })
    }
}

/// Encode layer entries into a bulk batch, one document per entry, in input order.
pub fn encode(entries: &[Document], version: &str, name: &str) -> Result<Vec<BulkDoc>> {
    entries
        .iter()
        .map(|entry| {
            let record = LayerDocument::from_entry(entry, version, name)?;
            Ok(BulkDoc {
                doc: crate::to_document(&record, &record.id)?,
                id: record.id,
            })
        })
        .collect()
}

/// The `layer` payload of a stored document, or `None` when it has none.
///
/// A payload that is present but not an object is a
/// [`MappingError::MalformedDocument`].
pub fn decode(mut stored: Document) -> Result<Option<Document>> {
    match stored.remove("layer") {
        None => Ok(None),
        Some(Value::Object(layer)) => Ok(Some(layer)),
        Some(other) => {
            let id = stored.get("id").and_then(Value::as_str).unwrap_or_default();
            Err(MappingError::malformed_document(
                id,
                format!("`layer` is not an object: {other}"),
            ))
        }
    }
}

/// Store-facing operations on `layer` documents.
pub struct Layers<'s, S: Store + ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> Layers<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub async fn get(&self, name: &str, label: &str, version: &str) -> Result<Option<Document>> {
        let id = keys::layer_id(version, name, label);
        let found = match self.store.get(DocType::Layer, &id).await? {
            Some(stored) => decode(stored)?,
            None => None,
        };
        debug!(id = %id, found = found.is_some(), "[LAYERS] Looked up layer entry");
        Ok(found)
    }

    /// Store every entry of a layer in one bulk call.
    ///
    /// `top_label` names the regulation the layer was computed for; it is
    /// recorded in the logs only, ids are derived from each entry's own label.
    pub async fn bulk_put(
        &self,
        entries: &[Document],
        version: &str,
        name: &str,
        top_label: &str,
    ) -> Result<()> {
        let batch = encode(entries, version, name)?;
        info!(
            version,
            name,
            top_label,
            count = batch.len(),
            "[LAYERS] Writing layer"
        );
        self.store.bulk_put(DocType::Layer, batch).await?;
        Ok(())
    }
}
