//! In-memory document store, used by tests and as a scratch store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::{apply_put, DocumentStore, StoreError};
use crate::models::{Document, Revision};

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Document, StoreError> {
        self.docs
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn put(&self, doc: Document) -> Result<Revision, StoreError> {
        let mut docs = self.docs.lock().await;
        let (revision, _) = apply_put(&mut docs, doc)?;
        Ok(revision)
    }

    async fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.docs.lock().await.values().cloned().collect())
    }
}
