// Taskify - task list with write-through JSON blob persistence

pub mod config;
pub mod filter;
pub mod persist;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;

// Re-export main types for convenience
pub use config::Config;
pub use filter::FilterMode;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Confirm, Deletion, Store};
pub use task::Task;
