use ratatui::widgets::ListState;
use thiserror::Error;

use super::storage::{Storage, StorageError, TASKS_KEY};

pub const DEFAULT_TASKS: [&str; 6] = [
    "Read a book",
    "Exercise",
    "Meditate",
    "Journal",
    "Clean up",
    "Go for a walk",
];

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task label is empty")]
    EmptyLabel,
    #[error("No task at position {index} (list has {len})")]
    OutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The ordered task labels plus the cursor of the editable list view.
#[derive(Debug, Default)]
pub struct TaskList {
    pub items: Vec<String>,
    pub state: ListState,
}

impl TaskList {
    /// Reads the persisted list, seeding the defaults when it is missing or unreadable.
    pub fn load(storage: &Storage) -> Result<Self, StorageError> {
        let items = match storage.get(TASKS_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(error = %e, "stored tasks unreadable, using defaults");
                    default_tasks()
                }
            },
            None => default_tasks(),
        };
        tracing::debug!(count = items.len(), "tasks loaded");
        Ok(Self {
            items,
            state: ListState::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Selected row, clamped to the list.
    pub fn cursor(&self) -> Option<usize> {
        let last = self.items.len().checked_sub(1)?;
        self.state.selected().map(|i| i.min(last))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn add(&mut self, storage: &Storage, label: &str) -> Result<(), TaskError> {
        if label.trim().is_empty() {
            return Err(TaskError::EmptyLabel);
        }
        self.items.push(label.to_string());
        self.persist(storage)?;
        tracing::info!(label, "task added");
        Ok(())
    }

    pub fn edit(&mut self, storage: &Storage, index: usize, label: &str) -> Result<(), TaskError> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(TaskError::OutOfRange { index, len })?;
        *slot = label.to_string();
        self.persist(storage)
    }

    pub fn remove(&mut self, storage: &Storage, index: usize) -> Result<String, TaskError> {
        if index >= self.items.len() {
            return Err(TaskError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.persist(storage)?;
        self.clamp_cursor();
        tracing::info!(label = %removed, index, "task removed");
        Ok(removed)
    }

    fn persist(&self, storage: &Storage) -> Result<(), TaskError> {
        let raw = serde_json::to_string(&self.items).map_err(StorageError::from)?;
        storage.set(TASKS_KEY, &raw)?;
        Ok(())
    }

    fn clamp_cursor(&mut self) {
        match (self.state.selected(), self.items.len()) {
            (_, 0) => self.state.select(None),
            (Some(i), len) if i >= len => self.state.select(Some(len - 1)),
            _ => {}
        }
    }
}

fn default_tasks() -> Vec<String> {
    DEFAULT_TASKS.iter().map(|t| t.to_string()).collect()
}
