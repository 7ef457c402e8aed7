//! Backup files: export every document as pretty JSON, import them back.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::repository::{ImportReport, RepositoryError, TaskRepository};
use crate::store::DocumentStore;

pub const BACKUP_FILE_NAME: &str = "tasks-backup.json";

#[derive(Debug, Error)]
pub enum BackupError {
    /// The file is not a JSON array of objects; nothing was written
    #[error("malformed import file: {0}")]
    Malformed(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("backup file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode backup: {0}")]
    Encode(#[from] serde_json::Error),
}

/// All documents as a pretty-printed JSON array
pub async fn export<S: DocumentStore>(repo: &TaskRepository<S>) -> Result<String, BackupError> {
    let docs = repo.export_all().await?;
    Ok(serde_json::to_string_pretty(&docs)?)
}

/// Write the export to `<dir>/tasks-backup.json`
pub async fn export_to<S: DocumentStore>(repo: &TaskRepository<S>, dir: &Path) -> Result<PathBuf, BackupError> {
    let json = export(repo).await?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(BACKUP_FILE_NAME);
    tokio::fs::write(&path, json).await?;

    tracing::info!(path = %path.display(), "exported backup");
    Ok(path)
}

/// Check the top-level shape: an array whose entries are all objects.
///
/// Whether each object is a valid task is decided later, per item.
pub fn parse_import(contents: &str) -> Result<Vec<Map<String, Value>>, BackupError> {
    let value: Value =
        serde_json::from_str(contents).map_err(|e| BackupError::Malformed(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(BackupError::Malformed("expected a JSON array of documents".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(fields),
            _ => Err(BackupError::Malformed(format!("entry {} is not an object", index))),
        })
        .collect()
}

/// Parse `contents` and merge every document into the store
pub async fn import<S: DocumentStore>(repo: &TaskRepository<S>, contents: &str) -> Result<ImportReport, BackupError> {
    let incoming = parse_import(contents)?;
    Ok(repo.import_merge(incoming).await)
}

pub async fn import_from<S: DocumentStore>(repo: &TaskRepository<S>, path: &Path) -> Result<ImportReport, BackupError> {
    let contents = tokio::fs::read_to_string(path).await?;
    tracing::info!(path = %path.display(), "importing backup");
    import(repo, &contents).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_parse_import_shapes() {
        assert!(parse_import("[]").unwrap().is_empty());
        assert_eq!(parse_import(r#"[{"id":"a"},{}]"#).unwrap().len(), 2);

        for bad in ["", "{}", r#"{"id":"a"}"#, "[1]", r#"[{"id":"a"}, "b"]"#, "[{", "null"] {
            assert!(matches!(parse_import(bad), Err(BackupError::Malformed(_))), "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn test_malformed_import_writes_nothing() {
        let repo = TaskRepository::new(MemoryStore::new());
        let err = import(&repo, r#"[{"id":"a","name":"a","status":"pending","createdAt":1,"updatedAt":1}, 5]"#)
            .await
            .unwrap_err();

        assert!(matches!(err, BackupError::Malformed(_)));
        assert!(repo.export_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_with_bad_middle_document() {
        let repo = TaskRepository::new(MemoryStore::new());
        let contents = r#"[
            {"id":"1","name":"one","date":null,"status":"pending","createdAt":1,"updatedAt":1},
            {"id":"2","name":"two","date":"2024-02-31","status":"pending","createdAt":2,"updatedAt":2},
            {"id":"3","name":"three","date":"2024-03-03","status":"done","createdAt":3,"updatedAt":3}
        ]"#;

        let report = import(&repo, contents).await.unwrap();
        assert_eq!(report.written(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, "2");

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1".to_string(), "3".to_string()]);
    }

    #[tokio::test]
    async fn test_export_then_import_into_empty_store() {
        let dir = TempDir::new().unwrap();

        let source = TaskRepository::new(MemoryStore::new());
        source
            .create("Buy milk", NaiveDate::from_ymd_opt(2024, 3, 1))
            .await
            .unwrap();
        let path = export_to(&source, dir.path()).await.unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(BACKUP_FILE_NAME));

        let target = TaskRepository::new(MemoryStore::new());
        let report = import_from(&target, &path).await.unwrap();
        assert_eq!(report.inserted.len(), 1);

        let tasks = target.list().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Buy milk");
        assert_eq!(tasks[0].date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(tasks[0].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_reimport_into_same_store_updates() {
        let repo = TaskRepository::new(MemoryStore::new());
        let task = repo.create("Buy milk", None).await.unwrap();
        let toggled = repo.toggle_status(&task).await.unwrap();

        // 备份文件里的 revision 已经过期，仍应按现有 revision 写入
        let stale = serde_json::to_string(&vec![task.to_document().unwrap()]).unwrap();
        let report = import(&repo, &stale).await.unwrap();
        assert_eq!(report.updated, vec![task.id.clone()]);

        let current = repo.get(&task.id).await.unwrap();
        assert_eq!(current.status, TaskStatus::Pending);
        assert_ne!(current.revision, toggled.revision);
    }

    #[tokio::test]
    async fn test_export_is_pretty_array() {
        let repo = TaskRepository::new(MemoryStore::new());
        repo.create("a", None).await.unwrap();

        let json = export(&repo).await.unwrap();
        assert!(json.starts_with("[\n"));
        assert!(json.contains("\"revision\""));
        assert!(json.contains("\"createdAt\""));
    }
}
