pub mod settings;
pub mod storage;
pub mod task_list;

pub use settings::{Durations, SettingsError};
pub use storage::Storage;
pub use task_list::{TaskError, TaskList};
