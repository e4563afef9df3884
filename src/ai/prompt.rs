//! Prompt construction for test generation

use ugen_coverage::FileCoverage;

use super::{GeneratedTest, Prompt};
use crate::utils::numbered_lines;

/// A test rejected in an earlier iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTest {
    pub test: GeneratedTest,

    /// Test output or the reason the test was rejected
    pub error_message: String,
}

const SYSTEM_PROMPT: &str = "You are a code assistant that writes unit tests. \
You extend an existing test suite with new tests that raise line coverage of the source file. \
Answer with YAML only.";

const ANSWER_FORMAT: &str = r#"Answer with a YAML object of this shape and nothing else:

language: <language of the tests>
new_tests:
- test_name: <short unique name>
  test_behavior: <one sentence on what the test checks>
  test_code: |
    <complete test code, indented as it will appear in the test file>
  new_imports_code: |
    <import lines the test needs that the test file lacks, or "">
  test_tags: <happy path | edge case | error handling | other>"#;

/// Inputs of a test generation prompt
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    /// Source path as shown to the model, relative to the project root
    pub source_file_name: String,

    pub source_content: String,

    /// Test path as shown to the model, relative to the project root
    pub test_file_name: String,

    pub test_content: String,

    pub language: String,

    pub testing_framework: String,

    /// Coverage of the source file from the last run
    pub coverage: Option<FileCoverage>,

    pub failed_tests: Vec<FailedTest>,

    /// Rendered extra context files
    pub included_files: String,

    pub additional_instructions: String,

    pub max_tests: usize,
}

impl PromptBuilder {
    fn coverage_section(&self) -> String {
        let Some(coverage) = &self.coverage else {
            return String::new();
        };
        let missed = coverage
            .lines_missed
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "## Code Coverage\nThe existing tests cover {:.2}% of the source file ({} of {} lines).\nLines not covered yet: [{}]\nFocus the new tests on these lines.\n",
            coverage.percentage() * 100.0,
            coverage.lines_covered.len(),
            coverage.total_lines(),
            missed
        )
    }

    fn failed_tests_section(&self) -> String {
        if self.failed_tests.is_empty() {
            return String::new();
        }
        let mut section = String::from(
            "## Previously Failed Tests\nThese tests were rejected. Do not repeat them; learn from the errors.\n\n",
        );
        for failed in &self.failed_tests {
            let code = serde_yaml::to_string(&failed.test).unwrap_or_else(|_| failed.test.test_code.clone());
            section.push_str(&format!("Failed Test:\n```\n{}\n```\n", code.trim_end()));
            if failed.error_message.trim().is_empty() {
                section.push_str("\n\n");
            } else {
                section.push_str(&format!(
                    "Test execution error analysis:\n{}\n\n\n",
                    failed.error_message.trim_end()
                ));
            }
        }
        section
    }

    /// Render the prompt
    pub fn build(&self) -> Prompt {
        let mut user = String::new();

        user.push_str(&format!(
            "## Overview\nYou are given a {} source file and its {} test file. \
Write up to {} new unit tests, using {}, that exercise behaviour the existing tests miss.\n\n",
            self.language, self.testing_framework, self.max_tests, self.testing_framework
        ));

        user.push_str(&format!(
            "## Source File\nSource file `{}`, with line numbers added:\n```\n{}\n```\n\n",
            self.source_file_name,
            numbered_lines(&self.source_content)
        ));

        user.push_str(&format!(
            "## Test File\nTest file `{}`:\n```\n{}\n```\n\n",
            self.test_file_name,
            self.test_content.trim_end()
        ));

        if !self.included_files.trim().is_empty() {
            user.push_str(&format!(
                "## Additional Files\n{}\n\n",
                self.included_files.trim_end()
            ));
        }

        let coverage = self.coverage_section();
        if !coverage.is_empty() {
            user.push_str(&coverage);
            user.push('\n');
        }

        user.push_str(&self.failed_tests_section());

        if !self.additional_instructions.trim().is_empty() {
            user.push_str(&format!(
                "## Additional Instructions\n{}\n\n",
                self.additional_instructions.trim()
            ));
        }

        user.push_str("## Response\n");
        user.push_str(ANSWER_FORMAT);
        user.push('\n');

        Prompt {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}
