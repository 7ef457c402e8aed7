//! Builds the pending and done lists from the store.

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::Write;

use crate::models::{Task, TaskStatus};
use crate::repository::{RepositoryError, TaskRepository};
use crate::store::DocumentStore;

/// Fallback when the configured display format is not a valid strftime string
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// One displayed task with its single action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    /// Snapshot the action operates on, revision included
    pub task: Task,
    /// `01/03/2024 · Pending`, or just `Pending` without a date
    pub meta: String,
    pub action: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedLists {
    pub pending: Vec<RenderedItem>,
    pub done: Vec<RenderedItem>,
}

impl RenderedLists {
    pub fn list(&self, status: TaskStatus) -> &[RenderedItem] {
        match status {
            TaskStatus::Pending => &self.pending,
            TaskStatus::Done => &self.done,
        }
    }
}

pub struct ListRenderer<'a, S> {
    repo: &'a TaskRepository<S>,
    date_format: &'a str,
}

impl<'a, S: DocumentStore> ListRenderer<'a, S> {
    pub fn new(repo: &'a TaskRepository<S>, date_format: &'a str) -> Self {
        Self { repo, date_format }
    }

    /// Query every task and rebuild both lists, newest first
    pub async fn render(&self) -> Result<RenderedLists, RepositoryError> {
        let tasks = self.repo.list().await?;
        Ok(build_lists(tasks, self.date_format))
    }

    /// The item's action: toggle its status, then render again
    pub async fn activate(&self, item: &RenderedItem) -> Result<RenderedLists, RepositoryError> {
        self.repo.toggle_status(&item.task).await?;
        self.render().await
    }
}

/// Sort by `createdAt` descending (ties: id descending) and split by status
pub fn build_lists(mut tasks: Vec<Task>, date_format: &str) -> RenderedLists {
    tasks.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut lists = RenderedLists::default();
    for task in tasks {
        let item = RenderedItem {
            meta: meta_line(&task, date_format),
            action: task.status.action_label(),
            task,
        };
        match item.task.status {
            TaskStatus::Pending => lists.pending.push(item),
            TaskStatus::Done => lists.done.push(item),
        }
    }
    lists
}

fn meta_line(task: &Task, date_format: &str) -> String {
    match task.date {
        Some(date) => format!("{} · {}", format_date(date, date_format), task.status.display()),
        None => task.status.display().to_string(),
    }
}

/// Format a date for display; an invalid format string falls back to ISO
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let format = if is_valid_format(format) {
        format
    } else {
        FALLBACK_DATE_FORMAT
    };
    date.format(format).to_string()
}

/// The format parses and only uses fields a plain date can fill (no `%H`, `%Z`, ...)
pub fn is_valid_format(format: &str) -> bool {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return false;
    }
    write!(String::new(), "{}", NaiveDate::MIN.format(format)).is_ok()
}
