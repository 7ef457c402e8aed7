//! JSON file backed document store.
//!
//! The whole database lives in memory and is written back to a single pretty
//! printed JSON array after every accepted put.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{apply_put, DocumentStore, StoreError};
use crate::models::{Document, Revision};

/// Default data file name inside the data directory
pub const DATA_FILE_NAME: &str = "tasks.json";

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    docs: Mutex<BTreeMap<String, Document>>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let docs = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                let list: Vec<Document> = serde_json::from_str(&content)?;
                list.into_iter().map(|doc| (doc.id.clone(), doc)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), count = docs.len(), "opened document store");

        Ok(Self {
            path,
            docs: Mutex::new(docs),
        })
    }
}

/// Write the table to a temp file next to `path`, then rename it over
async fn persist(path: &Path, docs: &BTreeMap<String, Document>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let list: Vec<&Document> = docs.values().collect();
    let json = serde_json::to_string_pretty(&list)?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await?;
    tokio::fs::rename(&tmp_path, path).await?;

    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
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
        let id = doc.id.clone();
        let (revision, previous) = apply_put(&mut docs, doc)?;

        if let Err(e) = persist(&self.path, &docs).await {
            // 写盘失败：回滚内存中的修改
            match previous {
                Some(previous) => {
                    docs.insert(id, previous);
                }
                None => {
                    docs.remove(&id);
                }
            }
            return Err(e);
        }

        Ok(revision)
    }

    async fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.docs.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use tempfile::TempDir;

    fn doc(id: &str, name: &str) -> Document {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(name));
        Document::new(id, fields)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join(DATA_FILE_NAME)).await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(DATA_FILE_NAME);

        let store = JsonFileStore::open(&path).await.unwrap();
        let rev = store.put(doc("a", "first")).await.unwrap();
        let rev = store.put(doc("a", "second").with_revision(Some(rev))).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let fetched = reopened.get("a").await.unwrap();
        assert_eq!(fetched.revision, Some(rev));
        assert_eq!(fetched.fields["name"], json!("second"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_conflict_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DATA_FILE_NAME);

        let store = JsonFileStore::open(&path).await.unwrap();
        store.put(doc("a", "kept")).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = store.put(doc("a", "lost")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DATA_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_failed_persist_rolls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DATA_FILE_NAME);
        let store = JsonFileStore::open(&path).await.unwrap();
        let rev = store.put(doc("a", "kept")).await.unwrap();

        // 临时文件位置被目录占住，写盘必然失败
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let err = store.put(doc("b", "new")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.get("b").await.unwrap_err().is_not_found());

        let err = store
            .put(doc("a", "changed").with_revision(Some(rev.clone())))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        let current = store.get("a").await.unwrap();
        assert_eq!(current.revision, Some(rev));
        assert_eq!(current.fields["name"], json!("kept"));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}
