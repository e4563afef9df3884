//! Coverage data model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::matching;

/// Supported coverage report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageType {
    #[default]
    Cobertura,
    Lcov,
    Jacoco,
    DiffCoverJson,
}

impl CoverageType {
    pub fn all() -> [CoverageType; 4] {
        [
            CoverageType::Cobertura,
            CoverageType::Lcov,
            CoverageType::Jacoco,
            CoverageType::DiffCoverJson,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageType::Cobertura => "cobertura",
            CoverageType::Lcov => "lcov",
            CoverageType::Jacoco => "jacoco",
            CoverageType::DiffCoverJson => "diff_cover_json",
        }
    }
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoverageType::all()
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown coverage type '{s}' (expected one of: cobertura, lcov, jacoco, diff_cover_json)"
                )
            })
    }
}

/// Line coverage of one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCoverage {
    /// Path as written in the report
    pub path: String,

    /// Executed lines, ascending
    pub lines_covered: Vec<u32>,

    /// Executable lines never hit, ascending
    pub lines_missed: Vec<u32>,
}

impl FileCoverage {
    /// Empty coverage for a path
    pub fn empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Build from per-line hit counts
    pub fn from_hits(path: impl Into<String>, hits: &BTreeMap<u32, u64>) -> Self {
        let mut coverage = Self::empty(path);
        for (&line, &count) in hits {
            if count > 0 {
                coverage.lines_covered.push(line);
            } else {
                coverage.lines_missed.push(line);
            }
        }
        coverage
    }

    pub fn total_lines(&self) -> usize {
        self.lines_covered.len() + self.lines_missed.len()
    }

    /// Covered share of executable lines (0.0 to 1.0)
    pub fn percentage(&self) -> f64 {
        match self.total_lines() {
            0 => 0.0,
            total => self.lines_covered.len() as f64 / total as f64,
        }
    }
}

/// Coverage for every file in a report, keyed by report path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub files: BTreeMap<String, FileCoverage>,
}

impl CoverageReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coverage: FileCoverage) {
        self.files.insert(coverage.path.clone(), coverage);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn lines_covered(&self) -> usize {
        self.files.values().map(|f| f.lines_covered.len()).sum()
    }

    pub fn lines_missed(&self) -> usize {
        self.files.values().map(|f| f.lines_missed.len()).sum()
    }

    /// Covered share of all executable lines in the report (0.0 to 1.0)
    pub fn percentage(&self) -> f64 {
        let covered = self.lines_covered();
        match covered + self.lines_missed() {
            0 => 0.0,
            total => covered as f64 / total as f64,
        }
    }

    /// Find the entry for a source file
    pub fn find(&self, source_path: &str) -> Option<&FileCoverage> {
        matching::find_match(self.files.keys().map(String::as_str), source_path)
            .and_then(|key| self.files.get(key))
    }
}

/// Merge per-line hits, summing counts for lines seen more than once
pub(crate) fn merge_hits(target: &mut BTreeMap<u32, u64>, line: u32, count: u64) {
    *target.entry(line).or_insert(0) += count;
}
