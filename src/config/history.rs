//! Run history configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use ugen_history::HistoryManager;

/// Run history settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Record cover runs
    pub enabled: bool,

    /// History file
    pub path: PathBuf,

    /// Keep at most this many runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

impl HistoryConfig {
    /// Manager for the configured history file
    pub fn manager(&self) -> HistoryManager {
        let manager = HistoryManager::new(self.path.clone());
        match self.max_entries {
            Some(max) => manager.with_max_entries(max),
            None => manager,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: HistoryManager::default_path(),
            max_entries: Some(500),
        }
    }
}
