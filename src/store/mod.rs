//! Revision-tracked document storage.
//!
//! A store maps string ids to [`Document`]s. Every accepted write gets a new
//! [`Revision`]; a write must carry the revision currently stored for its id
//! (or none at all for a first insert), otherwise it is rejected with
//! [`StoreError::Conflict`]. Nothing is ever retried here.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{Document, Revision};

pub use file::{JsonFileStore, DATA_FILE_NAME};
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document '{id}' not found")]
    NotFound { id: String },

    #[error("revision conflict on document '{id}'")]
    Conflict { id: String },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id, with its current revision
    async fn get(&self, id: &str) -> Result<Document, StoreError>;

    /// Insert or update a document, returning the new revision
    async fn put(&self, doc: Document) -> Result<Revision, StoreError>;

    /// Every stored document; order is unspecified
    async fn list_all(&self) -> Result<Vec<Document>, StoreError>;
}

/// Apply a put to an in-memory table after the revision check.
///
/// Returns the new revision and the document it replaced, so callers that
/// persist afterwards can roll back.
pub(crate) fn apply_put(
    docs: &mut BTreeMap<String, Document>,
    mut doc: Document,
) -> Result<(Revision, Option<Document>), StoreError> {
    let current = docs.get(&doc.id).and_then(|d| d.revision.as_ref());

    match (current, doc.revision.as_ref()) {
        (None, None) => {}
        (Some(stored), Some(given)) if stored == given => {}
        _ => return Err(StoreError::Conflict { id: doc.id.clone() }),
    }

    let revision = Revision::next(doc.revision.as_ref(), &doc.fields);
    doc.revision = Some(revision.clone());
    let previous = docs.insert(doc.id.clone(), doc);

    Ok((revision, previous))
}
