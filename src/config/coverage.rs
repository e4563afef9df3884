//! Coverage report configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use ugen_coverage::CoverageType;

/// Where the test command writes coverage and in which format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Report written by the test command
    pub report_path: PathBuf,

    pub coverage_type: CoverageType,

    /// diff-cover JSON report, read instead of `report_path` for `diff_cover_json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_report_path: Option<PathBuf>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("coverage.xml"),
            coverage_type: CoverageType::Cobertura,
            diff_report_path: None,
        }
    }
}
