//! History types and data structures

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// One cover run for a source and test file pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Source file under test
    pub source_path: PathBuf,

    /// SHA256 of the source content when the run started
    pub source_sha256: String,

    /// Test file the run wrote to
    pub test_file_path: PathBuf,

    /// Language plugin id
    pub language: String,

    /// Test framework
    pub framework: String,

    /// Model used for generation
    pub model: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Number of generate/validate iterations
    pub iterations: usize,

    /// Tests proposed by the model
    pub tests_generated: usize,

    /// Tests kept in the test file
    pub tests_passed: usize,

    /// Coverage before the first iteration (0.0 to 1.0)
    pub initial_coverage: f64,

    /// Coverage after the last iteration (0.0 to 1.0)
    pub final_coverage: f64,

    /// Target coverage in percent
    pub desired_coverage: f64,

    /// Whether the target was reached
    pub success: bool,

    #[serde(default)]
    pub input_tokens: usize,

    #[serde(default)]
    pub output_tokens: usize,
}

impl RunRecord {
    /// Coverage gained by the run, in fractional points
    pub fn coverage_gain(&self) -> f64 {
        self.final_coverage - self.initial_coverage
    }

    /// Check if the run is older than the given number of hours
    pub fn is_stale(&self, max_age_hours: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.finished_at);
        age.num_hours() > i64::try_from(max_age_hours).unwrap_or(i64::MAX)
    }
}

/// Aggregate statistics over all recorded runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HistoryStatistics {
    pub total_runs: usize,
    pub successful_runs: usize,
    pub tests_generated: usize,
    pub tests_passed: usize,

    /// Mean coverage gain per run (0.0 to 1.0)
    pub average_coverage_gain: f64,

    /// Share of generated tests that were kept (0.0 to 1.0)
    pub acceptance_rate: f64,
}

impl HistoryStatistics {
    /// Compute statistics from a set of runs
    pub fn from_runs(runs: &[RunRecord]) -> Self {
        let total_runs = runs.len();
        let successful_runs = runs.iter().filter(|run| run.success).count();
        let tests_generated: usize = runs.iter().map(|run| run.tests_generated).sum();
        let tests_passed: usize = runs.iter().map(|run| run.tests_passed).sum();

        let average_coverage_gain = if total_runs == 0 {
            0.0
        } else {
            runs.iter().map(RunRecord::coverage_gain).sum::<f64>() / total_runs as f64
        };
        let acceptance_rate = if tests_generated == 0 {
            0.0
        } else {
            tests_passed as f64 / tests_generated as f64
        };

        Self {
            total_runs,
            successful_runs,
            tests_generated,
            tests_passed,
            average_coverage_gain,
            acceptance_rate,
        }
    }
}

/// SHA256 hex digest of a string
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// SHA256 hex digest of a file
pub fn hash_file(path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
pub(crate) fn sample_run(source: &str, sha: &str) -> RunRecord {
    let now = Utc::now();
    RunRecord {
        source_path: PathBuf::from(source),
        source_sha256: sha.to_string(),
        test_file_path: PathBuf::from(format!("tests/test_{source}")),
        language: "python".to_string(),
        framework: "pytest".to_string(),
        model: "deepseek-coder".to_string(),
        started_at: now,
        finished_at: now,
        iterations: 2,
        tests_generated: 4,
        tests_passed: 1,
        initial_coverage: 0.5,
        final_coverage: 0.75,
        desired_coverage: 70.0,
        success: true,
        input_tokens: 100,
        output_tokens: 50,
    }
}
