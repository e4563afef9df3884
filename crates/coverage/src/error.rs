//! Coverage errors

use std::path::PathBuf;

use crate::types::CoverageType;

/// Errors raised while reading coverage reports
#[derive(thiserror::Error, Debug)]
pub enum CoverageError {
    #[error("coverage report not found: {0:?}")]
    ReportNotFound(PathBuf),

    #[error(
        "coverage report {path:?} was not updated by the test run (modified at {modified}s, run started at {since}s)"
    )]
    StaleReport {
        path: PathBuf,
        modified: u64,
        since: u64,
    },

    #[error("invalid {format} report: {message}")]
    Parse {
        format: CoverageType,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoverageError {
    pub(crate) fn parse(format: CoverageType, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            message: message.into(),
        }
    }
}

/// Result type for coverage operations
pub type CoverageResult<T> = Result<T, CoverageError>;
