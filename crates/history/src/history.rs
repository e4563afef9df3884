//! History file model

use crate::types::{HistoryStatistics, RunRecord};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Record of past cover runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// History format version
    pub version: String,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Tool version that last wrote the file
    pub tool_version: String,

    /// Runs, oldest first
    pub runs: Vec<RunRecord>,

    /// Aggregate statistics over `runs`
    pub statistics: HistoryStatistics,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            updated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            runs: Vec::new(),
            statistics: HistoryStatistics::default(),
        }
    }

    /// Load history from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("History file does not exist: {:?}", path));
        }

        let content = std::fs::read_to_string(path)?;
        let history: History = serde_yaml::from_str(&content)?;
        Ok(history)
    }

    /// Save history to disk, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Append a run and refresh statistics
    pub fn record(&mut self, run: RunRecord) {
        self.runs.push(run);
        self.touch();
    }

    /// Keep only the newest `max_entries` runs
    pub fn truncate(&mut self, max_entries: usize) {
        if self.runs.len() > max_entries {
            let excess = self.runs.len() - max_entries;
            self.runs.drain(..excess);
            self.touch();
        }
    }

    /// Drop runs older than the given number of hours, returning how many were removed
    pub fn remove_stale(&mut self, max_age_hours: u64) -> usize {
        let before = self.runs.len();
        self.runs.retain(|run| !run.is_stale(max_age_hours));
        let removed = before - self.runs.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// All runs for a source file, oldest first
    pub fn runs_for(&self, source_path: &Path) -> Vec<&RunRecord> {
        self.runs
            .iter()
            .filter(|run| run.source_path == source_path)
            .collect()
    }

    /// Most recent run for a source file
    pub fn last_run_for(&self, source_path: &Path) -> Option<&RunRecord> {
        self.runs
            .iter()
            .rev()
            .find(|run| run.source_path == source_path)
    }

    /// Check if a source differs from its last recorded run
    pub fn source_changed(&self, source_path: &Path, current_sha256: &str) -> bool {
        match self.last_run_for(source_path) {
            Some(run) => run.source_sha256 != current_sha256,
            None => true,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.tool_version = env!("CARGO_PKG_VERSION").to_string();
        self.statistics = HistoryStatistics::from_runs(&self.runs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_run;
    use std::path::PathBuf;

    #[test]
    fn test_history_creation() {
        let history = History::new();
        assert_eq!(history.version, "1.0");
        assert_eq!(history.tool_version, env!("CARGO_PKG_VERSION"));
        assert!(history.runs.is_empty());
    }

    #[test]
    fn test_history_serialization() {
        let mut history = History::new();
        history.record(sample_run("calc.py", "abc123"));

        let yaml = serde_yaml::to_string(&history).unwrap();
        let parsed: History = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed.runs.len(), 1);
        assert_eq!(parsed.runs[0], history.runs[0]);
        assert_eq!(parsed.statistics.total_runs, 1);
    }

    #[test]
    fn test_source_changed() {
        let mut history = History::new();
        history.record(sample_run("calc.py", "abc123"));
        history.record(sample_run("calc.py", "def456"));

        let source = PathBuf::from("calc.py");
        assert!(!history.source_changed(&source, "def456"));
        assert!(history.source_changed(&source, "abc123"));
        assert!(history.source_changed(Path::new("other.py"), "def456"));
        assert_eq!(history.runs_for(&source).len(), 2);
        assert_eq!(
            history.last_run_for(&source).unwrap().source_sha256,
            "def456"
        );
    }

    #[test]
    fn test_truncate_keeps_newest() {
        let mut history = History::new();
        for sha in ["1", "2", "3"] {
            history.record(sample_run("calc.py", sha));
        }
        history.truncate(2);

        let shas: Vec<&str> = history.runs.iter().map(|r| r.source_sha256.as_str()).collect();
        assert_eq!(shas, vec!["2", "3"]);
        assert_eq!(history.statistics.total_runs, 2);
    }

    #[test]
    fn test_remove_stale() {
        let mut history = History::new();
        let mut old = sample_run("old.py", "1");
        old.finished_at = Utc::now() - chrono::Duration::hours(48);
        history.record(old);
        history.record(sample_run("new.py", "2"));

        assert_eq!(history.remove_stale(24), 1);
        assert_eq!(history.runs.len(), 1);
        assert_eq!(history.runs[0].source_path, PathBuf::from("new.py"));

        assert_eq!(history.remove_stale(u64::MAX), 0);
        assert_eq!(history.runs.len(), 1);
    }
}
