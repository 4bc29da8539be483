//! Diff codec: the changes to one label between two versions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::contract::{DocType, Document, Store};
use crate::error::Result;
use crate::keys;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffDocument {
    pub label: String,
    pub old_version: String,
    pub new_version: String,
    pub diff: Value,
}

impl DiffDocument {
    pub fn new(label: &str, old_version: &str, new_version: &str, diff: Value) -> Self {
        Self {
            label: label.to_string(),
            old_version: old_version.to_string(),
            new_version: new_version.to_string(),
            diff,
        }
    }

    pub fn id(&self) -> String {
        keys::diff_id(&self.label, &self.old_version, &self.new_version)
    }
}

/// The `diff` payload of a stored document, or `None` when it has none.
pub fn decode(mut stored: Document) -> Option<Value> {
    stored.remove("diff")
}

/// Store-facing operations on `diff` documents.
pub struct Diffs<'s, S: Store + ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> Diffs<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub async fn get(
        &self,
        label: &str,
        old_version: &str,
        new_version: &str,
    ) -> Result<Option<Value>> {
        let id = keys::diff_id(label, old_version, new_version);
        let found = self.store.get(DocType::Diff, &id).await?.and_then(decode);
        debug!(id = %id, found = found.is_some(), "[DIFFS] Looked up diff");
        Ok(found)
    }

    pub async fn put(
        &self,
        label: &str,
        old_version: &str,
        new_version: &str,
        diff: &Value,
    ) -> Result<()> {
        let record = DiffDocument::new(label, old_version, new_version, diff.clone());
        let id = record.id();
        info!(id = %id, "[DIFFS] Writing diff");
        let doc = crate::to_document(&record, &id)?;
        self.store.put(DocType::Diff, &id, doc).await?;
        Ok(())
    }
}
