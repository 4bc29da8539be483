//! # contract: the document-store boundary
//!
//! This module defines the single trait ([`Store`]) through which every codec
//! talks to the search-indexing backend, plus the plain data types that cross
//! that boundary.
//!
//! ## Interface
//! - Four operations per logical document type: `get`, `put`, `bulk_put`, `search`.
//! - A missing document is `Ok(None)` from `get`; it is never an error.
//! - All other backend failures come back as a boxed [`StoreError`] and are
//!   propagated unchanged by the codecs.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests can set expectations on the
//!   exact doc type, id, query and batch contents a codec produces.
//!
//! ## Adding New Backends
//! - Implement [`Store`] for your client. Translate [`Query`] into the
//!   backend's own query language; the codecs only ever build the two shapes
//!   it defines.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A flat, single-level JSON record as held by the store.
pub type Document = serde_json::Map<String, Value>;

/// Error type for store operations (boxed, like every other adapter boundary).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Logical document type names used by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    RegTree,
    Layer,
    Notice,
    Diff,
    Preamble,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::RegTree => "reg_tree",
            DocType::Layer => "layer",
            DocType::Notice => "notice",
            DocType::Diff => "diff",
            DocType::Preamble => "preamble",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only query shapes this layer constructs.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Exact match of a single field against a value.
    Match { field: String, value: Value },
    MatchAll,
}

impl Query {
    pub fn matching(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Match {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A search issued against one doc type, with the fields each hit should expose.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: Query,
    /// Projected fields. Empty means "identity only".
    pub fields: Vec<String>,
}

impl SearchRequest {
    pub fn new(query: Query, fields: &[&str]) -> Self {
        Self {
            query,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// One search result: the document's id and a sparse map of projected fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hit {
    pub id: String,
    pub fields: Document,
}

/// One entry of a bulk batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkDoc {
    pub id: String,
    pub doc: Document,
}

/// Trait for the external document store.
///
/// Implemented by real backend clients and by test mocks. Every codec
/// operation issues exactly one call on this trait.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch one document. `Ok(None)` when the store has nothing under `id`.
    async fn get(&self, doc_type: DocType, id: &str) -> Result<Option<Document>, StoreError>;

    /// Write one document under `id`, replacing any previous version.
    async fn put(&self, doc_type: DocType, id: &str, doc: Document) -> Result<(), StoreError>;

    /// Write a batch of documents, each under its own id.
    ///
    /// A failure means the batch as a whole failed; callers do no partial recovery.
    async fn bulk_put(&self, doc_type: DocType, docs: Vec<BulkDoc>) -> Result<(), StoreError>;

    /// Run a search and return hits in the store's own order.
    async fn search(&self, doc_type: DocType, request: SearchRequest)
        -> Result<Vec<Hit>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_type_names() {
        assert_eq!(DocType::RegTree.as_str(), "reg_tree");
        assert_eq!(DocType::Layer.as_str(), "layer");
        assert_eq!(DocType::Notice.as_str(), "notice");
        assert_eq!(DocType::Diff.as_str(), "diff");
        assert_eq!(DocType::Preamble.to_string(), "preamble");
    }

    #[test]
    fn search_request_collects_fields() {
        let req = SearchRequest::new(Query::matching("root", true), &["version", "label_string"]);
        assert_eq!(req.fields, vec!["version".to_string(), "label_string".to_string()]);
        assert_eq!(
            req.query,
            Query::Match {
                field: "root".into(),
                value: Value::Bool(true)
            }
        );
    }
}
