//! Task operations on top of a [`DocumentStore`].

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::clock::{format_id, parse_id, Clock, IdSource, SystemClock};
use crate::models::{Document, Revision, Task, TaskDocumentError};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("document '{id}' is not a valid task: {source}")]
    InvalidDocument {
        id: String,
        #[source]
        source: TaskDocumentError,
    },

    #[error("task name must not be empty")]
    EmptyName,

    #[error("could not encode task '{id}': {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RepositoryError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Store(e) if e.is_conflict())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::Store(e) if e.is_not_found())
    }
}

/// One document of an import batch that could not be written
#[derive(Debug, Error)]
#[error("could not import '{id}': {reason}")]
pub struct ItemImportError {
    pub id: String,
    pub reason: String,
}

/// Outcome of an import batch
#[derive(Debug, Default)]
pub struct ImportReport {
    pub inserted: Vec<String>,
    pub updated: Vec<String>,
    pub failed: Vec<ItemImportError>,
}

impl ImportReport {
    pub fn written(&self) -> usize {
        self.inserted.len() + self.updated.len()
    }
}

enum Upsert {
    Inserted,
    Updated,
}

pub struct TaskRepository<S> {
    store: S,
    clock: Arc<dyn Clock>,
    ids: IdSource,
}

impl<S: DocumentStore> TaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ids: IdSource::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Continue the id sequence from the ids already in the store
    pub async fn resume_ids(&self) -> Result<(), RepositoryError> {
        let docs = self.store.list_all().await?;
        if let Some(latest) = docs.iter().filter_map(|doc| parse_id(&doc.id)).max() {
            self.ids.observe(latest);
            tracing::debug!(latest = %format_id(latest), "resumed id sequence");
        }
        Ok(())
    }

    /// Create a pending task. Store errors are returned as-is, never retried.
    pub async fn create(&self, name: &str, date: Option<NaiveDate>) -> Result<Task, RepositoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepositoryError::EmptyName);
        }

        let created = self.ids.next(self.clock.now());
        let task = Task::new(
            format_id(created),
            name.to_string(),
            date,
            created.timestamp_millis(),
        );

        let task = self.write_over(task, None).await?;
        tracing::info!(id = %task.id, name = %task.name, "created task");
        Ok(task)
    }

    pub async fn get(&self, id: &str) -> Result<Task, RepositoryError> {
        let doc = self.store.get(id).await?;
        Task::from_document(&doc).map_err(|source| RepositoryError::InvalidDocument {
            id: doc.id,
            source,
        })
    }

    /// All tasks in store order. Documents that are not tasks are skipped.
    pub async fn list(&self) -> Result<Vec<Task>, RepositoryError> {
        let docs = self.store.list_all().await?;

        Ok(docs
            .iter()
            .filter_map(|doc| match Task::from_document(doc) {
                Ok(task) => Some(task),
                Err(e) => {
                    tracing::warn!(id = %doc.id, error = %e, "skipping document that is not a task");
                    None
                }
            })
            .collect())
    }

    /// Flip the status of `task` as it was read.
    ///
    /// The write carries the revision the caller holds; if the task changed in
    /// the meantime the store rejects it and the conflict is returned.
    pub async fn toggle_status(&self, task: &Task) -> Result<Task, RepositoryError> {
        let mut next = task.clone();
        next.status = task.status.toggled();
        next.updated_at = self.clock.now().timestamp_millis();

        let base = task.revision.clone();
        let next = self.write_over(next, base).await?;
        tracing::info!(id = %next.id, status = %next.status, "toggled task status");
        Ok(next)
    }

    /// Every stored document verbatim, revisions included
    pub async fn export_all(&self) -> Result<Vec<Document>, RepositoryError> {
        Ok(self.store.list_all().await?)
    }

    /// Upsert every incoming record by id.
    ///
    /// An existing document is replaced whole by the incoming one, written at
    /// the revision currently stored. A missing one is inserted fresh. Each
    /// record is handled on its own; a failure is logged and reported and the
    /// rest of the batch still runs.
    pub async fn import_merge(&self, incoming: Vec<Map<String, Value>>) -> ImportReport {
        let mut report = ImportReport::default();

        for fields in incoming {
            let id = fields
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<missing id>")
                .to_string();

            match self.import_one(fields).await {
                Ok(Upsert::Inserted) => report.inserted.push(id),
                Ok(Upsert::Updated) => report.updated.push(id),
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "failed to import document");
                    report.failed.push(ItemImportError {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            inserted = report.inserted.len(),
            updated = report.updated.len(),
            failed = report.failed.len(),
            "import finished"
        );
        report
    }

    async fn import_one(&self, fields: Map<String, Value>) -> Result<Upsert, RepositoryError> {
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let task = Task::from_fields(fields)
            .map_err(|source| RepositoryError::InvalidDocument { id, source })?;

        match self.store.get(&task.id).await {
            Ok(existing) => {
                self.write_over(task, existing.revision).await?;
                Ok(Upsert::Updated)
            }
            Err(e) if e.is_not_found() => {
                self.write_over(task, None).await?;
                Ok(Upsert::Inserted)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write `task` at `base` (the revision the write is based on, `None` for
    /// a first insert) and return it carrying the revision the store assigned.
    ///
    /// Every task write goes through here.
    async fn write_over(&self, mut task: Task, base: Option<Revision>) -> Result<Task, RepositoryError> {
        task.revision = base;

        let doc = task.to_document().map_err(|source| RepositoryError::Encode {
            id: task.id.clone(),
            source,
        })?;
        let revision = self.store.put(doc).await?;

        task.revision = Some(revision);
        Ok(task)
    }
}
