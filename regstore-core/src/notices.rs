//! Notice codec.
//!
//! Notices are stored exactly as given, keyed by document number. The only
//! derived shape is the listing summary.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contract::{DocType, Document, Query, SearchRequest, Store};
use crate::error::Result;
use crate::listing;

/// Fields projected by the listing search.
pub const LISTING_FIELDS: [&str; 3] = ["effective_on", "fr_url", "publication_date"];

/// A sparse notice summary: the document number plus whichever listing
/// fields the hit actually had.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeSummary {
    pub document_number: String,
    #[serde(flatten)]
    pub fields: Document,
}

impl From<&crate::contract::Hit> for NoticeSummary {
    fn from(hit: &crate::contract::Hit) -> Self {
        Self {
            document_number: hit.id.clone(),
            fields: listing::present_fields(hit),
        }
    }
}

/// Store-facing operations on `notice` documents.
pub struct Notices<'s, S: Store + ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> Notices<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub async fn get(&self, document_number: &str) -> Result<Option<Document>> {
        let found = self.store.get(DocType::Notice, document_number).await?;
        debug!(document_number, found = found.is_some(), "[NOTICES] Looked up notice");
        Ok(found)
    }

    pub async fn put(&self, document_number: &str, notice: &Document) -> Result<()> {
        info!(document_number, "[NOTICES] Writing notice");
        self.store
            .put(DocType::Notice, document_number, notice.clone())
            .await?;
        Ok(())
    }

    /// Summaries of all notices, or of those touching `cfr_part`.
    ///
    /// Hits keep the order the store returned them in; no re-sorting.
    pub async fn listing(&self, cfr_part: Option<&str>) -> Result<Vec<NoticeSummary>> {
        let query = match cfr_part {
            Some(part) => Query::matching("cfr_parts", part),
            None => Query::MatchAll,
        };
        let hits = self
            .store
            .search(DocType::Notice, SearchRequest::new(query, &LISTING_FIELDS))
            .await?;
        debug!(count = hits.len(), cfr_part = ?cfr_part, "[NOTICES] Listed notices");
        Ok(hits.iter().map(NoticeSummary::from).collect())
    }
}
