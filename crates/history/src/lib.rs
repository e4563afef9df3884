//! Run history for reproducible cover runs

pub mod history;
pub mod manager;
pub mod types;

pub use history::History;
pub use manager::HistoryManager;
pub use types::{hash_content, hash_file, HistoryStatistics, RunRecord};
