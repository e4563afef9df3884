//! Test generation through the model client

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use ugen_coverage::FileCoverage;

use crate::ai::{parse_tests, FailedTest, GeneratedTest, ModelClient, PromptBuilder};
use crate::utils::display_relative;

/// Asks the model for new tests for one source and test file pair
pub struct UnitTestGenerator {
    client: Arc<dyn ModelClient>,

    source_path: PathBuf,

    test_path: PathBuf,

    /// Paths in the prompt are shown relative to this directory
    project_root: PathBuf,

    language: String,

    testing_framework: String,

    /// Rendered extra context files
    included_files: String,

    additional_instructions: String,

    max_tests: usize,

    input_tokens: u64,

    output_tokens: u64,
}

impl UnitTestGenerator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: Arc<dyn ModelClient>,
        source_path: PathBuf,
        test_path: PathBuf,
        project_root: PathBuf,
        language: impl Into<String>,
        testing_framework: impl Into<String>,
        included_files: String,
        additional_instructions: String,
        max_tests: usize,
    ) -> Self {
        Self {
            client,
            source_path,
            test_path,
            project_root,
            language: language.into(),
            testing_framework: testing_framework.into(),
            included_files,
            additional_instructions,
            max_tests,
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    /// Prompt tokens used so far
    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    /// Answer tokens used so far
    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    async fn prompt_builder(
        &self,
        coverage: Option<&FileCoverage>,
        failed_tests: &[FailedTest],
    ) -> Result<PromptBuilder> {
        let source_content = tokio::fs::read_to_string(&self.source_path)
            .await
            .with_context(|| format!("Failed to read source file {:?}", self.source_path))?;
        let test_content = tokio::fs::read_to_string(&self.test_path)
            .await
            .with_context(|| format!("Failed to read test file {:?}", self.test_path))?;

        Ok(PromptBuilder {
            source_file_name: display_relative(&self.source_path, &self.project_root),
            source_content,
            test_file_name: display_relative(&self.test_path, &self.project_root),
            test_content,
            language: self.language.clone(),
            testing_framework: self.testing_framework.clone(),
            coverage: coverage.cloned(),
            failed_tests: failed_tests.to_vec(),
            included_files: self.included_files.clone(),
            additional_instructions: self.additional_instructions.clone(),
            max_tests: self.max_tests,
        })
    }

    /// Ask the model for up to `max_tests` new tests
    pub async fn generate(
        &mut self,
        coverage: Option<&FileCoverage>,
        failed_tests: &[FailedTest],
    ) -> Result<Vec<GeneratedTest>> {
        let prompt = self.prompt_builder(coverage, failed_tests).await?.build();
        debug!("Prompt is {} characters", prompt.user.len());

        let completion = self.client.complete(&prompt).await?;
        self.input_tokens += completion.prompt_tokens;
        self.output_tokens += completion.completion_tokens;

        let mut tests = parse_tests(&completion.text).new_tests;
        tests.truncate(self.max_tests);
        info!(
            "Model {} proposed {} tests ({} prompt tokens, {} answer tokens)",
            self.client.model(),
            tests.len(),
            completion.prompt_tokens,
            completion.completion_tokens
        );
        Ok(tests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedClient;
    use tempfile::TempDir;

    const ANSWER: &str = r#"language: python
new_tests:
- test_name: one
  test_code: "def test_one():\n    assert True\n"
- test_name: two
  test_code: "def test_two():\n    assert True\n"
- test_name: three
  test_code: "def test_three():\n    assert True\n"
"#;

    #[tokio::test]
    async fn test_generate_caps_tests_and_counts_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("calc.py");
        let test = temp_dir.path().join("test_calc.py");
        std::fs::write(&source, "def add(a, b):\n    return a + b\n").unwrap();
        std::fs::write(&test, "import pytest\n").unwrap();

        let client = Arc::new(ScriptedClient::new([ANSWER]));
        let mut generator = UnitTestGenerator::new(
            client.clone(),
            source,
            test,
            temp_dir.path().to_path_buf(),
            "python",
            "pytest",
            String::new(),
            String::new(),
            2,
        );

        let tests = generator.generate(None, &[]).await.unwrap();
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].test_name, "one");
        assert!(generator.input_tokens() > 0);
        assert!(generator.output_tokens() > 0);

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].user.contains("Source file `calc.py`"));
        assert!(prompts[0].user.contains("Write up to 2 new unit tests"));
    }

    #[tokio::test]
    async fn test_generate_propagates_client_errors() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("calc.py");
        let test = temp_dir.path().join("test_calc.py");
        std::fs::write(&source, "x = 1\n").unwrap();
        std::fs::write(&test, "").unwrap();

        let mut generator = UnitTestGenerator::new(
            Arc::new(ScriptedClient::new(Vec::<String>::new())),
            source,
            test,
            temp_dir.path().to_path_buf(),
            "python",
            "pytest",
            String::new(),
            String::new(),
            4,
        );
        assert!(generator.generate(None, &[]).await.is_err());
    }
}
