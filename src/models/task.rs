use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::document::{Document, Revision};
use super::status::TaskStatus;

/// Why a stored or imported document could not be read as a task
#[derive(Debug, Error)]
pub enum TaskDocumentError {
    #[error("not a task document: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("task id must not be empty")]
    EmptyId,

    #[error("task name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Serialized as `YYYY-MM-DD` or `null`
    pub date: Option<NaiveDate>,
    pub status: TaskStatus,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds
    pub updated_at: i64,
    #[serde(default)]
    pub revision: Option<Revision>,
}

impl Task {
    pub fn new(id: String, name: String, date: Option<NaiveDate>, now_ms: i64) -> Self {
        Self {
            id,
            name,
            date,
            status: TaskStatus::Pending,
            created_at: now_ms,
            updated_at: now_ms,
            revision: None,
        }
    }

    /// Decode a stored document
    pub fn from_document(doc: &Document) -> Result<Self, TaskDocumentError> {
        let value = serde_json::to_value(doc)?;
        Self::from_value(value)
    }

    /// Decode a raw JSON record (for example one entry of an import file)
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, TaskDocumentError> {
        Self::from_value(Value::Object(fields))
    }

    fn from_value(value: Value) -> Result<Self, TaskDocumentError> {
        let mut task: Task = serde_json::from_value(value)?;

        if task.id.trim().is_empty() {
            return Err(TaskDocumentError::EmptyId);
        }

        let trimmed = task.name.trim();
        if trimmed.is_empty() {
            return Err(TaskDocumentError::EmptyName);
        }
        if trimmed.len() != task.name.len() {
            task.name = trimmed.to_string();
        }

        Ok(task)
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Task {
        Task::new(
            "2024-03-01T09:30:00.000Z".to_string(),
            "Buy milk".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1),
            1_709_285_400_000,
        )
    }

    #[test]
    fn test_task_document_shape() {
        let doc = sample().to_document().unwrap();
        assert_eq!(doc.id, "2024-03-01T09:30:00.000Z");
        assert_eq!(doc.fields.get("name"), Some(&json!("Buy milk")));
        assert_eq!(doc.fields.get("date"), Some(&json!("2024-03-01")));
        assert_eq!(doc.fields.get("status"), Some(&json!("pending")));
        assert_eq!(doc.fields.get("createdAt"), Some(&json!(1_709_285_400_000_i64)));
        assert_eq!(doc.fields.get("updatedAt"), Some(&json!(1_709_285_400_000_i64)));
    }

    #[test]
    fn test_task_from_document() {
        let mut task = sample();
        task.revision = Some(Revision::new("1-abc"));

        let decoded = Task::from_document(&task.to_document().unwrap()).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn test_null_and_missing_date() {
        let with_null = json!({
            "id": "a", "name": "n", "date": null, "status": "done",
            "createdAt": 1, "updatedAt": 2
        });
        let task = Task::from_fields(with_null.as_object().unwrap().clone()).unwrap();
        assert_eq!(task.date, None);
        assert_eq!(task.status, TaskStatus::Done);

        let missing = json!({
            "id": "a", "name": "n", "status": "pending",
            "createdAt": 1, "updatedAt": 2
        });
        let task = Task::from_fields(missing.as_object().unwrap().clone()).unwrap();
        assert_eq!(task.date, None);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let cases = [
            json!({ "id": "a", "name": "  ", "status": "pending", "createdAt": 1, "updatedAt": 1 }),
            json!({ "id": "", "name": "n", "status": "pending", "createdAt": 1, "updatedAt": 1 }),
            json!({ "id": "a", "name": "n", "status": "archived", "createdAt": 1, "updatedAt": 1 }),
            json!({ "id": "a", "name": "n", "date": "01/03/2024", "status": "pending", "createdAt": 1, "updatedAt": 1 }),
            json!({ "id": "a", "name": "n", "status": "pending" }),
        ];

        for case in cases {
            let fields = case.as_object().unwrap().clone();
            assert!(Task::from_fields(fields).is_err(), "accepted {}", case);
        }
    }

    #[test]
    fn test_name_is_trimmed() {
        let value = json!({
            "id": "a", "name": "  Walk dog ", "status": "pending",
            "createdAt": 1, "updatedAt": 1
        });
        let task = Task::from_fields(value.as_object().unwrap().clone()).unwrap();
        assert_eq!(task.name, "Walk dog");
    }
}
