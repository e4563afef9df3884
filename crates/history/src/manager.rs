//! History manager for handling history file operations

use crate::history::History;
use crate::types::RunRecord;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// History manager for handling history file operations
pub struct HistoryManager {
    history_path: PathBuf,
    max_entries: Option<usize>,
}

impl HistoryManager {
    /// Create a new history manager
    pub fn new(history_path: PathBuf) -> Self {
        Self {
            history_path,
            max_entries: None,
        }
    }

    /// Cap the number of runs kept on disk
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Load or create history
    pub fn load_or_create(&self) -> Result<History> {
        if self.history_path.exists() {
            History::from_file(&self.history_path)
        } else {
            Ok(History::new())
        }
    }

    /// Get the history path
    pub fn path(&self) -> &PathBuf {
        &self.history_path
    }

    /// Save history
    pub fn save(&self, history: &History) -> Result<()> {
        history.save_to_file(&self.history_path)
    }

    /// Append a run and save
    pub fn record(&self, run: RunRecord) -> Result<()> {
        let mut history = self.load_or_create()?;
        history.record(run);
        if let Some(max_entries) = self.max_entries {
            history.truncate(max_entries);
        }
        self.save(&history)
    }

    /// All runs for a source file, oldest first
    pub fn runs_for(&self, source_path: &Path) -> Result<Vec<RunRecord>> {
        let history = self.load_or_create()?;
        Ok(history.runs_for(source_path).into_iter().cloned().collect())
    }

    /// Most recent run for a source file
    pub fn last_run_for(&self, source_path: &Path) -> Result<Option<RunRecord>> {
        let history = self.load_or_create()?;
        Ok(history.last_run_for(source_path).cloned())
    }

    /// Check if a source differs from its last recorded run
    pub fn source_changed(&self, source_path: &Path, current_sha256: &str) -> Result<bool> {
        if !self.history_path.exists() {
            return Ok(true);
        }

        let history = History::from_file(&self.history_path)?;
        Ok(history.source_changed(source_path, current_sha256))
    }

    /// Remove runs older than `max_age_hours`, returning how many were removed
    pub fn cleanup_stale(&self, max_age_hours: u64) -> Result<usize> {
        let mut history = self.load_or_create()?;
        let removed = history.remove_stale(max_age_hours);

        if removed > 0 {
            self.save(&history)?;
        }

        Ok(removed)
    }

    /// Get the default history path
    pub fn default_path() -> PathBuf {
        PathBuf::from(".ugen/history.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_run;
    use tempfile::TempDir;

    #[test]
    fn test_record_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".ugen").join("history.yaml");
        let manager = HistoryManager::new(path.clone());

        manager.record(sample_run("calc.py", "abc")).unwrap();

        assert!(path.exists());
        let runs = manager.runs_for(Path::new("calc.py")).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(manager.load_or_create().unwrap().statistics.total_runs, 1);
    }

    #[test]
    fn test_source_changed_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = HistoryManager::new(temp_dir.path().join("history.yaml"));
        assert!(manager
            .source_changed(Path::new("calc.py"), "abc")
            .unwrap());
    }

    #[test]
    fn test_max_entries() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            HistoryManager::new(temp_dir.path().join("history.yaml")).with_max_entries(2);

        for sha in ["1", "2", "3"] {
            manager.record(sample_run("calc.py", sha)).unwrap();
        }

        let history = manager.load_or_create().unwrap();
        assert_eq!(history.runs.len(), 2);
        assert_eq!(
            manager
                .last_run_for(Path::new("calc.py"))
                .unwrap()
                .unwrap()
                .source_sha256,
            "3"
        );
        assert!(!manager.source_changed(Path::new("calc.py"), "3").unwrap());
    }

    #[test]
    fn test_cleanup_stale() {
        let temp_dir = TempDir::new().unwrap();
        let manager = HistoryManager::new(temp_dir.path().join("history.yaml"));

        let mut old = sample_run("old.py", "1");
        old.finished_at = chrono::Utc::now() - chrono::Duration::hours(10);
        manager.record(old).unwrap();
        manager.record(sample_run("new.py", "2")).unwrap();

        assert_eq!(manager.cleanup_stale(5).unwrap(), 1);
        assert_eq!(manager.cleanup_stale(5).unwrap(), 0);
        assert_eq!(manager.load_or_create().unwrap().runs.len(), 1);
    }

    #[test]
    fn test_default_path() {
        assert_eq!(
            HistoryManager::default_path(),
            PathBuf::from(".ugen/history.yaml")
        );
    }
}
