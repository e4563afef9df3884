//! Coverage-driven test generation loop
//!
//! A cover run seeds the test file when it is missing, measures the baseline,
//! then alternates between asking the model for tests and validating them
//! until the coverage target or the iteration limit is reached.

pub mod generator;
pub mod validator;

pub use generator::UnitTestGenerator;
pub use validator::{CoverageSnapshot, Rejected, UnitTestValidator, Validation};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use ugen_coverage::{CoverageProcessor, CoverageType};
use ugen_language::{LanguageSupport, SourceFile};

use crate::ai::{FailedTest, ModelClient};
use crate::runner::TestRunner;
use crate::utils::{format_coverage, read_included_files};
use crate::UgenError;

/// Failed tests shown to the model are limited to the most recent ones
const MAX_FAILED_TESTS_IN_PROMPT: usize = 8;

/// Everything a cover run needs to know
#[derive(Debug, Clone)]
pub struct CoverRequest {
    pub source_path: PathBuf,

    pub test_path: PathBuf,

    /// Root that prompt paths and included files are relative to
    pub project_root: PathBuf,

    pub test_command: String,

    /// Working directory of the test command
    pub test_command_dir: PathBuf,

    pub report_path: PathBuf,

    pub coverage_type: CoverageType,

    pub diff_report_path: Option<PathBuf>,

    /// Target line coverage in percent
    pub desired_coverage: f64,

    pub max_iterations: u32,

    pub max_run_time: Duration,

    pub max_tests_per_run: usize,

    pub included_files: Vec<PathBuf>,

    pub additional_instructions: String,
}

/// Summary of a cover run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentReport {
    /// Line coverage fraction before any test was generated
    pub initial_coverage: f64,

    pub final_coverage: f64,

    pub iterations: u32,

    pub tests_generated: usize,

    pub tests_passed: usize,

    pub input_tokens: u64,

    pub output_tokens: u64,

    pub success: bool,
}

/// Drives one cover run
pub struct CoverAgent {
    request: CoverRequest,
    language: Box<dyn LanguageSupport>,
    client: Arc<dyn ModelClient>,
}

impl CoverAgent {
    pub fn new(
        request: CoverRequest,
        language: Box<dyn LanguageSupport>,
        client: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            request,
            language,
            client,
        }
    }

    pub fn request(&self) -> &CoverRequest {
        &self.request
    }

    fn target_reached(&self, coverage: f64) -> bool {
        coverage * 100.0 >= self.request.desired_coverage
    }

    /// Write the plugin stub when the test file does not exist yet
    async fn ensure_test_file(&self) -> Result<()> {
        let test_path = &self.request.test_path;
        if test_path.exists() {
            return Ok(());
        }

        let source = SourceFile::read(&self.request.source_path)
            .with_context(|| format!("Failed to read source file {:?}", self.request.source_path))?;
        let stub = self.language.generate_test_for(&source)?;
        if let Some(parent) = test_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {parent:?}"))?;
        }
        tokio::fs::write(test_path, stub)
            .await
            .with_context(|| format!("Failed to write test file {test_path:?}"))?;
        info!("Created test file {:?} from the {} stub", test_path, self.language.test_framework());
        Ok(())
    }

    fn validator(&self) -> UnitTestValidator {
        let request = &self.request;
        UnitTestValidator::new(
            TestRunner::new(
                request.test_command.clone(),
                request.test_command_dir.clone(),
                request.max_run_time,
            ),
            CoverageProcessor::new(
                request.report_path.clone(),
                request.source_path.clone(),
                request.coverage_type,
            )
            .with_diff_report(request.diff_report_path.clone()),
            request.test_path.clone(),
            self.language.clone(),
        )
    }

    fn generator(&self) -> UnitTestGenerator {
        let request = &self.request;
        let metadata = self.language.metadata();
        UnitTestGenerator::new(
            self.client.clone(),
            request.source_path.clone(),
            request.test_path.clone(),
            request.project_root.clone(),
            metadata.name,
            self.language.test_framework(),
            read_included_files(&request.included_files, &request.project_root),
            request.additional_instructions.clone(),
            request.max_tests_per_run,
        )
    }

    /// Run the generate and validate loop
    pub async fn run(&self) -> Result<AgentReport> {
        if !self.request.source_path.is_file() {
            return Err(UgenError::SourceNotFound(self.request.source_path.clone()).into());
        }
        self.ensure_test_file().await?;

        let validator = self.validator();
        let mut generator = self.generator();

        let baseline = validator.measure().await?;
        if !baseline.outcome.success() {
            return Err(UgenError::Agent(format!(
                "The test command fails before any test is added (exit code {}):\n{}",
                baseline.outcome.exit_code,
                baseline.outcome.output().trim_end()
            ))
            .into());
        }

        let mut coverage = baseline.coverage;
        let mut report = AgentReport {
            initial_coverage: coverage.percentage(),
            final_coverage: coverage.percentage(),
            ..AgentReport::default()
        };
        info!(
            "Initial coverage of {:?}: {} (target {:.2}%)",
            self.request.source_path,
            format_coverage(coverage.percentage()),
            self.request.desired_coverage
        );

        let mut failed_tests: Vec<FailedTest> = Vec::new();
        'iterations: while !self.target_reached(coverage.percentage())
            && report.iterations < self.request.max_iterations
        {
            report.iterations += 1;
            info!("Iteration {}/{}", report.iterations, self.request.max_iterations);

            let tests = match generator.generate(Some(&coverage), &failed_tests).await {
                Ok(tests) => tests,
                Err(e) => {
                    error!("Test generation failed: {:#}", e);
                    continue;
                }
            };
            if tests.is_empty() {
                warn!("The model proposed no usable tests");
                continue;
            }
            report.tests_generated += tests.len();

            for test in tests {
                match validator.validate_test(&test, &coverage).await? {
                    Validation::Accepted(snapshot) => {
                        report.tests_passed += 1;
                        coverage = snapshot.coverage;
                        if self.target_reached(coverage.percentage()) {
                            break 'iterations;
                        }
                    }
                    Validation::Rejected(rejected) => {
                        info!("Rejected test {}: {}", test.test_name, rejected.reason);
                        failed_tests.push(FailedTest {
                            error_message: rejected.message(),
                            test,
                        });
                    }
                }
            }

            if failed_tests.len() > MAX_FAILED_TESTS_IN_PROMPT {
                let excess = failed_tests.len() - MAX_FAILED_TESTS_IN_PROMPT;
                failed_tests.drain(..excess);
            }
        }

        report.final_coverage = coverage.percentage();
        report.success = self.target_reached(coverage.percentage());
        report.input_tokens = generator.input_tokens();
        report.output_tokens = generator.output_tokens();

        if report.success {
            info!(
                "Reached {} coverage after {} iterations",
                format_coverage(report.final_coverage),
                report.iterations
            );
        } else {
            warn!(
                "Stopped at {} coverage after {} iterations, target was {:.2}%",
                format_coverage(report.final_coverage),
                report.iterations,
                self.request.desired_coverage
            );
        }
        Ok(report)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedClient;
    use crate::language::PythonLanguage;
    use std::path::Path;
    use tempfile::TempDir;

    /// Fails when the test file mentions FAIL, otherwise reports one covered
    /// line per `def test_` out of four
    const TEST_COMMAND: &str = r#"if grep -q FAIL test_calc.py; then echo "1 failed" >&2; exit 1; fi
n=$(grep -c "def test_" test_calc.py || true)
{ echo "SF:calc.py"; for i in 1 2 3 4; do if [ "$i" -le "$n" ]; then echo "DA:$i,1"; else echo "DA:$i,0"; fi; done; echo "end_of_record"; } > lcov.info"#;

    const SOURCE: &str = "def add(a, b):\n    return a + b\n\n\ndef sub(a, b):\n    return a - b\n";

    const FIRST_ANSWER: &str = r#"language: python
new_tests:
- test_name: test_broken
  test_code: |
    def test_broken():
        assert "FAIL"
- test_name: test_add_negative
  test_code: |
    def test_add_negative():
        assert add(-1, -1) == -2
"#;

    const SECOND_ANSWER: &str = r#"```yaml
language: python
new_tests:
- test_name: test_sub_zero
  test_code: |
    def test_sub_zero():
        assert sub(1, 0) == 1
```"#;

    fn request(dir: &Path, desired_coverage: f64, max_iterations: u32) -> CoverRequest {
        CoverRequest {
            source_path: dir.join("calc.py"),
            test_path: dir.join("test_calc.py"),
            project_root: dir.to_path_buf(),
            test_command: TEST_COMMAND.to_string(),
            test_command_dir: dir.to_path_buf(),
            report_path: dir.join("lcov.info"),
            coverage_type: CoverageType::Lcov,
            diff_report_path: None,
            desired_coverage,
            max_iterations,
            max_run_time: Duration::from_secs(10),
            max_tests_per_run: 4,
            included_files: Vec::new(),
            additional_instructions: String::new(),
        }
    }

    #[tokio::test]
    async fn test_reaches_target_with_scripted_model() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("calc.py"), SOURCE).unwrap();

        let client = Arc::new(ScriptedClient::new([FIRST_ANSWER, SECOND_ANSWER]));
        let agent = CoverAgent::new(
            request(temp_dir.path(), 100.0, 5),
            Box::new(PythonLanguage::default()),
            client.clone(),
        );

        let report = agent.run().await.unwrap();
        assert!(report.success);
        assert_eq!(report.initial_coverage, 0.5);
        assert_eq!(report.final_coverage, 1.0);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.tests_generated, 3);
        assert_eq!(report.tests_passed, 2);
        assert!(report.input_tokens > 0);

        let test_file = std::fs::read_to_string(temp_dir.path().join("test_calc.py")).unwrap();
        assert!(test_file.starts_with("import pytest\nfrom calc import add, sub\n"));
        assert!(test_file.contains("def test_add_negative():"));
        assert!(test_file.contains("def test_sub_zero():"));
        assert!(!test_file.contains("FAIL"));

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].user.contains("## Previously Failed Tests"));
        assert!(prompts[1].user.contains("## Previously Failed Tests"));
        assert!(prompts[1].user.contains("1 failed"));
    }

    #[tokio::test]
    async fn test_target_already_met_skips_model() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("calc.py"), SOURCE).unwrap();

        let client = Arc::new(ScriptedClient::new(Vec::<String>::new()));
        let agent = CoverAgent::new(
            request(temp_dir.path(), 50.0, 5),
            Box::new(PythonLanguage::default()),
            client.clone(),
        );

        let report = agent.run().await.unwrap();
        assert!(report.success);
        assert_eq!(report.iterations, 0);
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_iterations() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("calc.py"), SOURCE).unwrap();

        let client = Arc::new(ScriptedClient::new(["no yaml here", "still nothing"]));
        let agent = CoverAgent::new(
            request(temp_dir.path(), 100.0, 2),
            Box::new(PythonLanguage::default()),
            client,
        );

        let report = agent.run().await.unwrap();
        assert!(!report.success);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.tests_generated, 0);
        assert_eq!(report.final_coverage, 0.5);
    }

    #[tokio::test]
    async fn test_failing_suite_aborts() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("calc.py"), SOURCE).unwrap();
        std::fs::write(temp_dir.path().join("test_calc.py"), "# FAIL\n").unwrap();

        let agent = CoverAgent::new(
            request(temp_dir.path(), 100.0, 2),
            Box::new(PythonLanguage::default()),
            Arc::new(ScriptedClient::new(Vec::<String>::new())),
        );
        let error = agent.run().await.unwrap_err();
        assert!(format!("{error:#}").contains("exited with 1"));
    }

    #[tokio::test]
    async fn test_missing_source_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let agent = CoverAgent::new(
            request(temp_dir.path(), 100.0, 2),
            Box::new(PythonLanguage::default()),
            Arc::new(ScriptedClient::new(Vec::<String>::new())),
        );
        let error = agent.run().await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<UgenError>(),
            Some(UgenError::SourceNotFound(_))
        ));
    }
}
