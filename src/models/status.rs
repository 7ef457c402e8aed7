use serde::{Deserialize, Serialize};

/// Task status. A task is never deleted, it only moves between these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Pending,
        }
    }

    /// Display name used in list meta lines
    pub fn display(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Done => "Done",
        }
    }

    /// Label of the action that flips this status
    pub fn action_label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Mark done ✓",
            TaskStatus::Done => "Mark pending ↺",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TaskStatus::Pending),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => f.write_str("pending"),
            TaskStatus::Done => f.write_str("done"),
        }
    }
}
