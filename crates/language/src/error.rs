//! Language plugin errors

use std::path::PathBuf;

/// Errors raised by language plugins
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LanguageError {
    #[error("{path:?} is not a {language} source file")]
    NotASourceFile { path: PathBuf, language: String },

    #[error("{language} source does not parse (first error at line {line}, column {column})")]
    Unparseable {
        language: String,
        line: usize,
        column: usize,
    },

    #[error("{language} has no test framework named '{framework}'")]
    UnsupportedFramework { language: String, framework: String },

    #[error("no language plugin handles '{0}'")]
    UnsupportedLanguage(String),

    #[error("grammar error: {0}")]
    Grammar(String),
}

/// Result type for language plugin operations
pub type LanguageResult<T> = Result<T, LanguageError>;
