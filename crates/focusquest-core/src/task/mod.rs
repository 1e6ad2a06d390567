//! Task ledger.
//!
//! An ordered list of tasks whose identity is their position. Tasks are
//! appended and toggled, never removed, so an index stays valid for the
//! lifetime of the ledger.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::events::Event;

/// Task status.
///
/// ```text
///   PENDING <───toggle───> DONE
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
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
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Never empty, already trimmed.
    pub text: String,
    pub status: TaskStatus,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Before/after statuses of a toggle, handed to the reward engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    pub index: usize,
    pub previous: TaskStatus,
    pub current: TaskStatus,
}

impl Toggle {
    /// Pending -> Done. The only direction that earns anything.
    pub fn is_completion(&self) -> bool {
        self.previous == TaskStatus::Pending && self.current == TaskStatus::Done
    }

    pub fn to_event(&self) -> Event {
        Event::TaskToggled {
            index: self.index,
            previous: self.previous,
            current: self.current,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskLedger {
    tasks: Vec<Task>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending task. Blank text is ignored and yields `None`.
    pub fn add_task(&mut self, text: &str) -> Option<Event> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.tasks.push(Task {
            text: text.to_string(),
            status: TaskStatus::Pending,
        });
        let index = self.tasks.len() - 1;
        tracing::debug!(index, "task added");
        Some(Event::TaskAdded {
            index,
            text: text.to_string(),
            at: Utc::now(),
        })
    }

    /// Flip the status of the task at `index`.
    pub fn toggle_task(&mut self, index: usize) -> Result<Toggle> {
        let len = self.tasks.len();
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(CoreError::Index { index, len })?;
        let previous = task.status;
        task.status = previous.toggled();
        tracing::debug!(index, %previous, current = %task.status, "task toggled");
        Ok(Toggle {
            index,
            previous,
            current: task.status,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_done()).count()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_trims_and_appends_pending() {
        let mut ledger = TaskLedger::new();
        assert!(ledger.add_task("  write report \n").is_some());
        assert!(ledger.add_task("review PR").is_some());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.tasks()[0].text, "write report");
        assert_eq!(ledger.tasks()[0].status, TaskStatus::Pending);
        assert_eq!(ledger.tasks()[1].text, "review PR");
    }

    #[test]
    fn blank_text_is_ignored() {
        let mut ledger = TaskLedger::new();
        assert!(ledger.add_task("").is_none());
        assert!(ledger.add_task("   \t").is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn toggle_flips_and_reports_transition() {
        let mut ledger = TaskLedger::new();
        ledger.add_task("a");

        let first = ledger.toggle_task(0).unwrap();
        assert!(first.is_completion());
        assert_eq!(ledger.done_count(), 1);

        let second = ledger.toggle_task(0).unwrap();
        assert_eq!(second.previous, TaskStatus::Done);
        assert_eq!(second.current, TaskStatus::Pending);
        assert!(!second.is_completion());
        assert_eq!(ledger.done_count(), 0);
    }

    #[test]
    fn toggle_out_of_range_fails_without_change() {
        let mut ledger = TaskLedger::new();
        ledger.add_task("a");
        let err = ledger.toggle_task(1).unwrap_err();
        assert!(matches!(err, CoreError::Index { index: 1, len: 1 }));
        assert_eq!(ledger.get(0).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn status_serializes_lowercase() {
        let task = Task {
            text: "a".into(),
            status: TaskStatus::Done,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "done");
    }
}
