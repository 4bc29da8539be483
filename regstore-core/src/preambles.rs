//! Preamble codec: verbatim storage keyed by document number.

use tracing::{debug, info};

use crate::contract::{DocType, Document, Store};
use crate::error::Result;

pub struct Preambles<'s, S: Store + ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> Preambles<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub async fn get(&self, document_number: &str) -> Result<Option<Document>> {
        let found = self.store.get(DocType::Preamble, document_number).await?;
        debug!(document_number, found = found.is_some(), "[PREAMBLES] Looked up preamble");
        Ok(found)
    }

    pub async fn put(&self, document_number: &str, preamble: &Document) -> Result<()> {
        info!(document_number, "[PREAMBLES] Writing preamble");
        self.store
            .put(DocType::Preamble, document_number, preamble.clone())
            .await?;
        Ok(())
    }
}
