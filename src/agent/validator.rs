//! Running generated tests and keeping the ones that help

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};
use ugen_coverage::{CoverageProcessor, FileCoverage};
use ugen_language::LanguageSupport;

use crate::ai::GeneratedTest;
use crate::runner::{CommandOutcome, TestRunner};
use crate::utils::format_coverage;

/// Test run together with the coverage it produced
#[derive(Debug, Clone)]
pub struct CoverageSnapshot {
    pub outcome: CommandOutcome,
    pub coverage: FileCoverage,
}

/// Why a generated test was not kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub reason: String,

    /// Test command output, empty when the run itself succeeded
    pub error_output: String,
}

impl Rejected {
    fn new(reason: impl Into<String>, error_output: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            error_output: error_output.into(),
        }
    }

    /// Message shown to the model in the next prompt
    pub fn message(&self) -> String {
        if self.error_output.trim().is_empty() {
            self.reason.clone()
        } else {
            format!("{}\n{}", self.reason, self.error_output.trim_end())
        }
    }
}

/// Outcome of validating one generated test
#[derive(Debug, Clone)]
pub enum Validation {
    /// The test stays in the test file
    Accepted(CoverageSnapshot),

    /// The test file was restored
    Rejected(Rejected),
}

/// Inserts generated tests into the test file and checks them
pub struct UnitTestValidator {
    runner: TestRunner,
    processor: CoverageProcessor,
    test_path: PathBuf,
    language: Box<dyn LanguageSupport>,
}

impl UnitTestValidator {
    pub fn new(
        runner: TestRunner,
        processor: CoverageProcessor,
        test_path: PathBuf,
        language: Box<dyn LanguageSupport>,
    ) -> Self {
        Self {
            runner,
            processor,
            test_path,
            language,
        }
    }

    pub fn test_path(&self) -> &Path {
        &self.test_path
    }

    /// Run the test command and read the source file's coverage
    ///
    /// A failed run is returned as is; only an unreadable report is an error.
    pub async fn measure(&self) -> Result<CoverageSnapshot> {
        let outcome = self.runner.run().await?;
        let coverage = self
            .processor
            .process(SystemTime::from(outcome.started_at))
            .map_err(|e| {
                anyhow!(
                    "{} (test command exited with {}):\n{}",
                    e,
                    outcome.exit_code,
                    outcome.output().trim_end()
                )
            })?;
        debug!(
            "Measured {} coverage of {}",
            format_coverage(coverage.percentage()),
            coverage.path
        );
        Ok(CoverageSnapshot { outcome, coverage })
    }

    async fn restore(&self, original: &[u8]) -> Result<()> {
        tokio::fs::write(&self.test_path, original)
            .await
            .with_context(|| format!("Failed to restore test file {:?}", self.test_path))
    }

    /// Insert a test, run it, and keep it only if it passes and raises coverage
    pub async fn validate_test(
        &self,
        test: &GeneratedTest,
        baseline: &FileCoverage,
    ) -> Result<Validation> {
        let original = tokio::fs::read(&self.test_path)
            .await
            .with_context(|| format!("Failed to read test file {:?}", self.test_path))?;
        let content = String::from_utf8(original.clone())
            .with_context(|| format!("Test file {:?} is not valid UTF-8", self.test_path))?;

        let mut updated = content;
        if !test.new_imports_code.trim().is_empty() {
            updated = self.language.insert_imports(&updated, &test.new_imports_code);
        }
        updated = self.language.insert_test(&updated, &test.test_code);
        tokio::fs::write(&self.test_path, &updated)
            .await
            .with_context(|| format!("Failed to write test file {:?}", self.test_path))?;

        let outcome = match self.runner.run().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.restore(&original).await?;
                return Err(e);
            }
        };

        let rejected = if outcome.timed_out {
            Some(Rejected::new(
                format!("Test run timed out after {}s", self.runner.timeout.as_secs()),
                outcome.output(),
            ))
        } else if !outcome.success() {
            Some(Rejected::new(
                format!("Test run failed with exit code {}", outcome.exit_code),
                outcome.output(),
            ))
        } else {
            None
        };
        if let Some(rejected) = rejected {
            self.restore(&original).await?;
            return Ok(Validation::Rejected(rejected));
        }

        let coverage = match self.processor.process(SystemTime::from(outcome.started_at)) {
            Ok(coverage) => coverage,
            Err(e) => {
                self.restore(&original).await?;
                return Ok(Validation::Rejected(Rejected::new(
                    format!("Coverage report unusable: {e}"),
                    String::new(),
                )));
            }
        };

        if coverage.percentage() <= baseline.percentage() {
            self.restore(&original).await?;
            return Ok(Validation::Rejected(Rejected::new(
                format!(
                    "Coverage did not increase ({} -> {})",
                    format_coverage(baseline.percentage()),
                    format_coverage(coverage.percentage())
                ),
                String::new(),
            )));
        }

        info!(
            "Kept test {}: coverage {} -> {}",
            test.test_name,
            format_coverage(baseline.percentage()),
            format_coverage(coverage.percentage())
        );
        Ok(Validation::Accepted(CoverageSnapshot { outcome, coverage }))
    }
}
