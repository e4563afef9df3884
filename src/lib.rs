//! Unit Test Generator Library
//!
//! Per-language plugins classify files, map sources to test paths and write
//! skeletal tests. A coverage loop on top of them asks a local LLM for new
//! tests and keeps the ones that pass and raise line coverage.

pub mod agent;
pub mod ai;
pub mod cli;
pub mod config;
pub mod language;
pub mod runner;
pub mod utils;

pub use agent::{AgentReport, CoverAgent, CoverRequest};
pub use ai::{ModelClient, OllamaClient};
pub use config::Config;
pub use language::{LanguageRegistry, LanguageSupport};
pub use runner::{CommandOutcome, TestRunner};

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use ugen_history::{hash_file, HistoryManager, RunRecord};
use ugen_language::SourceFile;

/// Main application context that ties configuration, plugins and history together
pub struct Ugen {
    config: Config,
    registry: LanguageRegistry,
    history: Option<HistoryManager>,
}

/// Options of a stub generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Write here instead of the conventional test path
    pub output: Option<PathBuf>,

    /// Language id, detected from the extension when absent
    pub language: Option<String>,

    /// Overwrite an existing test file
    pub force: bool,

    /// Render the stub without writing it
    pub dry_run: bool,
}

/// A rendered test stub
#[derive(Debug, Clone)]
pub struct GeneratedStub {
    pub language: String,
    pub test_path: PathBuf,
    pub content: String,

    /// Whether the stub was written to `test_path`
    pub written: bool,
}

/// Result of a cover request
#[derive(Debug, Clone)]
pub enum CoverOutcome {
    Completed(AgentReport),

    /// The source is unchanged since this run
    Skipped(Box<RunRecord>),
}

impl Ugen {
    /// Create a new context with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let registry = LanguageRegistry::with_builtins(&config.languages)
            .context("Failed to configure language plugins")?;
        let history = config.history.enabled.then(|| config.history.manager());

        Ok(Self {
            config,
            registry,
            history,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// History manager, `None` when history is disabled
    pub fn history(&self) -> Option<&HistoryManager> {
        self.history.as_ref()
    }

    /// Plugin for a path, either named explicitly or detected
    pub fn language_for(&self, language: Option<&str>, path: &Path) -> Result<&dyn LanguageSupport> {
        Ok(self.registry.resolve(language, path)?)
    }

    /// Conventional test path of a source file
    pub fn test_path_for(&self, source: &Path, language: Option<&str>) -> Result<PathBuf> {
        Ok(self.language_for(language, source)?.test_file_path(source)?)
    }

    /// Render a test stub for a source file and write it unless this is a dry run
    pub fn generate(&self, source: &Path, options: &GenerateOptions) -> Result<GeneratedStub> {
        if !source.is_file() {
            return Err(UgenError::SourceNotFound(source.to_path_buf()).into());
        }

        let language = self.language_for(options.language.as_deref(), source)?;
        let test_path = match &options.output {
            Some(output) => output.clone(),
            None => language.test_file_path(source)?,
        };

        let source_file = SourceFile::read(source)
            .with_context(|| format!("Failed to read source file {source:?}"))?;
        let content = language.generate_test_for(&source_file)?;

        let mut stub = GeneratedStub {
            language: language.metadata().id,
            test_path,
            content,
            written: false,
        };
        if options.dry_run {
            return Ok(stub);
        }

        if stub.test_path.exists() && !options.force {
            return Err(UgenError::TestFileExists(stub.test_path).into());
        }
        if let Some(parent) = stub.test_path.parent() {
            utils::ensure_directory(parent)?;
        }
        std::fs::write(&stub.test_path, &stub.content)
            .with_context(|| format!("Failed to write test file {:?}", stub.test_path))?;
        stub.written = true;

        info!("Wrote {} test stub to {:?}", stub.language, stub.test_path);
        Ok(stub)
    }

    /// Last recorded run of a source whose content has not changed since
    ///
    /// `None` when history is disabled, the source was never covered, or its
    /// hash differs from the last run.
    pub fn unchanged_since_last_run(&self, source: &Path) -> Result<Option<RunRecord>> {
        let Some(history) = &self.history else {
            return Ok(None);
        };
        let source_sha256 = hash_file(source)?;
        if history.source_changed(source, &source_sha256)? {
            return Ok(None);
        }

        let last = history.last_run_for(source)?;
        if let Some(last) = &last {
            info!(
                "{:?} is unchanged since the run of {}, skipping",
                source, last.finished_at
            );
        }
        Ok(last)
    }

    /// Run the coverage loop for one source file and record it in the history
    ///
    /// With `skip_unchanged`, a source whose hash matches its last recorded run
    /// is not processed again.
    pub async fn cover(
        &self,
        request: CoverRequest,
        language: Option<&str>,
        client: Arc<dyn ModelClient>,
        skip_unchanged: bool,
    ) -> Result<CoverOutcome> {
        if !request.source_path.is_file() {
            return Err(UgenError::SourceNotFound(request.source_path.clone()).into());
        }

        let plugin = self.language_for(language, &request.source_path)?;
        let source_sha256 = hash_file(&request.source_path)?;

        if skip_unchanged {
            if let Some(last) = self.unchanged_since_last_run(&request.source_path)? {
                return Ok(CoverOutcome::Skipped(Box::new(last)));
            }
        }

        let started_at = Utc::now();
        let language_id = plugin.metadata().id;
        let framework = plugin.test_framework().to_string();
        let model = client.model().to_string();
        let agent = CoverAgent::new(request, plugin.clone_box(), client);
        let report = agent.run().await?;

        if let Some(history) = &self.history {
            let request = agent.request();
            let record = RunRecord {
                source_path: request.source_path.clone(),
                source_sha256,
                test_file_path: request.test_path.clone(),
                language: language_id,
                framework,
                model,
                started_at,
                finished_at: Utc::now(),
                iterations: report.iterations as usize,
                tests_generated: report.tests_generated,
                tests_passed: report.tests_passed,
                initial_coverage: report.initial_coverage,
                final_coverage: report.final_coverage,
                desired_coverage: request.desired_coverage,
                success: report.success,
                input_tokens: report.input_tokens as usize,
                output_tokens: report.output_tokens as usize,
            };
            if let Err(e) = history.record(record) {
                warn!("Failed to record run in {:?}: {:#}", history.path(), e);
            }
        }

        Ok(CoverOutcome::Completed(report))
    }
}

/// Application error types
#[derive(thiserror::Error, Debug)]
pub enum UgenError {
    #[error("Source file not found: {0:?}")]
    SourceNotFound(PathBuf),

    #[error("Test file already exists: {0:?} (use --force to overwrite)")]
    TestFileExists(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cover run failed: {0}")]
    Agent(String),
}

/// Result type for the main application
pub type UgenResult<T> = Result<T, UgenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ugen(temp_dir: &TempDir) -> Ugen {
        let mut config = Config::default();
        config.history.path = temp_dir.path().join("history.yaml");
        Ugen::new(config).unwrap()
    }

    #[test]
    fn test_generate_writes_stub() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("calc.py");
        std::fs::write(&source, "def add(a, b):\n    return a + b\n").unwrap();

        let stub = ugen(&temp_dir)
            .generate(&source, &GenerateOptions::default())
            .unwrap();
        assert!(stub.written);
        assert_eq!(stub.language, "python");
        assert_eq!(stub.test_path, temp_dir.path().join("test_calc.py"));
        assert_eq!(std::fs::read_to_string(&stub.test_path).unwrap(), stub.content);
        assert!(stub.content.contains("def test_add():"));
    }

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("calc.py");
        std::fs::write(&source, "def add(a, b):\n    return a + b\n").unwrap();
        std::fs::write(temp_dir.path().join("test_calc.py"), "# mine\n").unwrap();

        let ugen = ugen(&temp_dir);
        let error = ugen.generate(&source, &GenerateOptions::default()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<UgenError>(),
            Some(UgenError::TestFileExists(_))
        ));

        let dry_run = GenerateOptions {
            dry_run: true,
            ..GenerateOptions::default()
        };
        let stub = ugen.generate(&source, &dry_run).unwrap();
        assert!(!stub.written);
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("test_calc.py")).unwrap(),
            "# mine\n"
        );

        let force = GenerateOptions {
            force: true,
            ..GenerateOptions::default()
        };
        assert!(ugen.generate(&source, &force).unwrap().written);
    }

    #[test]
    fn test_generate_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let error = ugen(&temp_dir)
            .generate(&temp_dir.path().join("missing.py"), &GenerateOptions::default())
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<UgenError>(),
            Some(UgenError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_path_for_explicit_language() {
        let temp_dir = TempDir::new().unwrap();
        let ugen = ugen(&temp_dir);
        assert_eq!(
            ugen.test_path_for(Path::new("pkg/server.go"), None).unwrap(),
            PathBuf::from("pkg/server_test.go")
        );
        assert!(ugen.test_path_for(Path::new("pkg/server.go"), Some("python")).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cover_records_history_and_skips_unchanged() {
        use crate::ai::testing::ScriptedClient;
        use std::time::Duration;
        use ugen_coverage::CoverageType;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        std::fs::write(dir.join("calc.py"), "def add(a, b):\n    return a + b\n").unwrap();

        let request = CoverRequest {
            source_path: dir.join("calc.py"),
            test_path: dir.join("test_calc.py"),
            project_root: dir.to_path_buf(),
            test_command: "printf 'SF:calc.py\\nDA:1,1\\nDA:2,1\\nend_of_record\\n' > lcov.info"
                .to_string(),
            test_command_dir: dir.to_path_buf(),
            report_path: dir.join("lcov.info"),
            coverage_type: CoverageType::Lcov,
            diff_report_path: None,
            desired_coverage: 70.0,
            max_iterations: 3,
            max_run_time: Duration::from_secs(10),
            max_tests_per_run: 4,
            included_files: Vec::new(),
            additional_instructions: String::new(),
        };

        let ugen = ugen(&temp_dir);
        let client = Arc::new(ScriptedClient::new(Vec::<String>::new()));
        let outcome = ugen
            .cover(request.clone(), None, client.clone(), true)
            .await
            .unwrap();
        let CoverOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };
        assert!(report.success);

        let history = ugen.history().unwrap();
        let runs = history.runs_for(&dir.join("calc.py")).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].language, "python");
        assert_eq!(runs[0].model, "scripted");

        let outcome = ugen.cover(request, None, client, true).await.unwrap();
        assert!(matches!(outcome, CoverOutcome::Skipped(_)));

        let last = ugen.unchanged_since_last_run(&dir.join("calc.py")).unwrap();
        assert_eq!(last.map(|run| run.model), Some("scripted".to_string()));

        std::fs::write(dir.join("calc.py"), "def add(a, b):\n    return b + a\n").unwrap();
        assert!(ugen
            .unchanged_since_last_run(&dir.join("calc.py"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unchanged_without_history() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("calc.py");
        std::fs::write(&source, "def add(a, b):\n    return a + b\n").unwrap();

        let mut config = Config::default();
        config.history.enabled = false;
        let ugen = Ugen::new(config).unwrap();
        assert!(ugen.unchanged_since_last_run(&source).unwrap().is_none());
    }
}
