#![doc = "regstore-core: document mapping between regulation domain objects and a search-index store."]

//! This crate holds all domain logic for regstore: deriving keys, flattening
//! regulation trees into bulk batches, encoding/decoding the five document
//! types, and turning search hits into listing summaries.
//!
//! The search backend itself is behind the [`contract::Store`] trait; concrete
//! clients live outside this crate.
//!
//! # Usage
//! Build a codec facade over any `Store` and call its operations:
//!
//! ```rust,ignore
//! let regs = Regulations::new(&store);
//! regs.bulk_put(&tree, "2015-01-01", "1005").await?;
//! let node = regs.get("1005-2", "2015-01-01").await?;
//! ```

pub mod contract;
pub mod diffs;
pub mod error;
pub mod keys;
pub mod layers;
pub mod listing;
pub mod notices;
pub mod preambles;
pub mod regulations;
pub mod tree;

pub use contract::{BulkDoc, DocType, Document, Hit, Query, SearchRequest, Store, StoreError};
pub use diffs::Diffs;
pub use error::{MappingError, Result};
pub use layers::Layers;
pub use notices::{NoticeSummary, Notices};
pub use preambles::Preambles;
pub use regulations::Regulations;
pub use tree::{FlatRegDocument, RegulationNode};

/// Serialise a typed record into the flat object the store expects.
pub(crate) fn to_document<T: serde::Serialize>(record: &T, id: &str) -> Result<Document> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(doc) => Ok(doc),
        other => Err(MappingError::malformed_document(
            id,
            format!("expected a JSON object, got {other}"),
        )),
    }
}
