//! diff-cover JSON reports

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{CoverageError, CoverageResult};
use crate::types::{CoverageReport, CoverageType, FileCoverage};

#[derive(Debug, Deserialize)]
struct DiffCoverReport {
    #[serde(default)]
    src_stats: BTreeMap<String, SourceStats>,
}

#[derive(Debug, Deserialize)]
struct SourceStats {
    #[serde(default)]
    covered_lines: Vec<u32>,

    #[serde(default, alias = "missing_lines")]
    violation_lines: Vec<u32>,
}

/// Parse a diff-cover JSON report
pub fn parse(content: &str) -> CoverageResult<CoverageReport> {
    let raw: DiffCoverReport = serde_json::from_str(content)
        .map_err(|e| CoverageError::parse(CoverageType::DiffCoverJson, e.to_string()))?;

    let mut report = CoverageReport::new();
    for (path, stats) in raw.src_stats {
        let mut covered = stats.covered_lines;
        let mut missed = stats.violation_lines;
        covered.sort_unstable();
        covered.dedup();
        missed.sort_unstable();
        missed.dedup();
        report.insert(FileCoverage {
            path,
            lines_covered: covered,
            lines_missed: missed,
        });
    }
    Ok(report)
}
