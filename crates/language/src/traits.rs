//! Language plugin traits

use std::path::{Path, PathBuf};

use crate::error::{LanguageError, LanguageResult};
use crate::types::{LanguageMetadata, LanguageSettings, SourceFile, Symbol};

/// Capabilities a language plugin provides
pub trait LanguageSupport: Send + Sync {
    /// Get plugin metadata
    fn metadata(&self) -> LanguageMetadata;

    /// Generate a skeletal test file for the given source content
    fn generate_test(&self, source_content: &str) -> LanguageResult<String>;

    /// Generate a skeletal test file for a source file on disk
    ///
    /// Unlike [`LanguageSupport::generate_test`], the stub can import the
    /// module under test because both the source and test paths are known.
    fn generate_test_for(&self, source: &SourceFile) -> LanguageResult<String> {
        self.ensure_source(&source.path)?;
        self.generate_test(&source.content)
    }

    /// Whether the path is a source file in this language
    fn is_source_file(&self, path: &Path) -> bool;

    /// Whether the path is a test file in this language
    fn is_test_file(&self, path: &Path) -> bool;

    /// Expected test file path for a source file
    fn test_file_path(&self, source_path: &Path) -> LanguageResult<PathBuf>;

    /// Test framework the generated tests target
    fn test_framework(&self) -> &str;

    /// Find the testable top-level symbols in source content
    fn extract_symbols(&self, source_content: &str) -> LanguageResult<Vec<Symbol>>;

    /// Add import lines that the test file does not already contain
    fn insert_imports(&self, test_content: &str, imports: &str) -> String {
        insert_missing_lines(test_content, imports, |line| line.starts_with("package "))
    }

    /// Add a test to an existing test file
    fn insert_test(&self, test_content: &str, test_code: &str) -> String {
        append_block(test_content, test_code)
    }

    /// Fail with [`LanguageError::NotASourceFile`] unless the path is a source file
    fn ensure_source(&self, path: &Path) -> LanguageResult<()> {
        if self.is_source_file(path) {
            Ok(())
        } else {
            Err(LanguageError::NotASourceFile {
                path: path.to_path_buf(),
                language: self.metadata().id,
            })
        }
    }

    /// Clone the plugin
    fn clone_box(&self) -> Box<dyn LanguageSupport>;
}

impl Clone for Box<dyn LanguageSupport> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Builds configured language plugins
pub trait LanguageFactory: Send + Sync {
    /// Identifier of the language this factory builds
    fn language_id(&self) -> &str;

    /// Create a plugin from settings
    fn create(&self, settings: &LanguageSettings) -> LanguageResult<Box<dyn LanguageSupport>>;

    /// Clone the factory
    fn clone_box(&self) -> Box<dyn LanguageFactory>;
}

impl Clone for Box<dyn LanguageFactory> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Insert the lines of `imports` that `content` lacks
///
/// New lines go after the leading run of lines matching `header`, or at the top
/// when there is none.
pub fn insert_missing_lines<F>(content: &str, imports: &str, header: F) -> String
where
    F: Fn(&str) -> bool,
{
    let existing: Vec<&str> = content.lines().map(str::trim).collect();
    let missing: Vec<&str> = imports
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !existing.contains(&line.trim()))
        .collect();

    if missing.is_empty() {
        return content.to_string();
    }

    let lines: Vec<&str> = content.lines().collect();
    let header_end = lines
        .iter()
        .take_while(|line| header(line.trim()) || line.trim().is_empty())
        .count();
    // Keep blank lines that follow the header below the inserted imports
    let split = lines[..header_end]
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map(|index| index + 1)
        .unwrap_or(0);

    let mut out = String::new();
    for line in &lines[..split] {
        out.push_str(line);
        out.push('\n');
    }
    for line in &missing {
        out.push_str(line);
        out.push('\n');
    }
    for line in &lines[split..] {
        out.push_str(line);
        out.push('\n');
    }
    if !content.ends_with('\n') && !content.is_empty() {
        out.pop();
    }
    out
}

/// Append a block to the end of a file, separated by a blank line
pub fn append_block(content: &str, block: &str) -> String {
    let mut out = content.trim_end().to_string();
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(block.trim_end());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_missing_lines_skips_existing() {
        let content = "import os\n\ndef test_a():\n    pass\n";
        let result = insert_missing_lines(content, "import os\nimport sys", |_| false);
        assert_eq!(result, "import sys\nimport os\n\ndef test_a():\n    pass\n");
    }

    #[test]
    fn test_insert_missing_lines_after_header() {
        let content = "package calc\n\nimport \"testing\"\n";
        let result = insert_missing_lines(content, "import \"fmt\"", |line| {
            line.starts_with("package ")
        });
        assert_eq!(result, "package calc\nimport \"fmt\"\n\nimport \"testing\"\n");
    }

    #[test]
    fn test_insert_missing_lines_nothing_missing() {
        let content = "import os\n";
        assert_eq!(insert_missing_lines(content, "import os\n\n", |_| false), content);
    }

    #[test]
    fn test_append_block() {
        assert_eq!(append_block("a\n\n\n", "b\n"), "a\n\nb\n");
        assert_eq!(append_block("", "b"), "b\n");
    }
}
