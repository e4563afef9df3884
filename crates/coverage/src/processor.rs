//! Coverage report processor

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::error::{CoverageError, CoverageResult};
use crate::types::{CoverageReport, CoverageType, FileCoverage};
use crate::{cobertura, diff_cover, jacoco, lcov};

/// Reads the coverage report written by a test run
#[derive(Debug, Clone)]
pub struct CoverageProcessor {
    /// Report written by the test command
    pub report_path: PathBuf,

    /// Source file whose coverage is tracked
    pub source_path: PathBuf,

    pub coverage_type: CoverageType,

    /// diff-cover JSON output; defaults to `report_path`
    pub diff_report_path: Option<PathBuf>,
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl CoverageProcessor {
    pub fn new(
        report_path: impl Into<PathBuf>,
        source_path: impl Into<PathBuf>,
        coverage_type: CoverageType,
    ) -> Self {
        Self {
            report_path: report_path.into(),
            source_path: source_path.into(),
            coverage_type,
            diff_report_path: None,
        }
    }

    pub fn with_diff_report(mut self, diff_report_path: Option<PathBuf>) -> Self {
        self.diff_report_path = diff_report_path;
        self
    }

    /// Report file read for the configured format
    pub fn effective_report_path(&self) -> &Path {
        match (&self.coverage_type, &self.diff_report_path) {
            (CoverageType::DiffCoverJson, Some(path)) => path,
            _ => &self.report_path,
        }
    }

    /// Check that the report was written at or after `since`
    ///
    /// File systems differ in timestamp resolution, so both times are
    /// truncated to whole seconds before comparing.
    pub fn verify_report_update(&self, since: SystemTime) -> CoverageResult<()> {
        let path = self.effective_report_path();
        if !path.exists() {
            return Err(CoverageError::ReportNotFound(path.to_path_buf()));
        }

        let modified = unix_seconds(std::fs::metadata(path)?.modified()?);
        let since = unix_seconds(since);
        if modified < since {
            return Err(CoverageError::StaleReport {
                path: path.to_path_buf(),
                modified,
                since,
            });
        }
        Ok(())
    }

    /// Parse the whole report
    pub fn parse_report(&self) -> CoverageResult<CoverageReport> {
        let path = self.effective_report_path();
        if !path.exists() {
            return Err(CoverageError::ReportNotFound(path.to_path_buf()));
        }

        debug!("Parsing {} report: {:?}", self.coverage_type, path);
        let content = std::fs::read_to_string(path)?;
        parse_content(&content, self.coverage_type)
    }

    /// Coverage of the source file from a report written at or after `since`
    ///
    /// A source file absent from the report has empty coverage.
    pub fn process(&self, since: SystemTime) -> CoverageResult<FileCoverage> {
        let report = self.process_all(since)?;
        Ok(self.select(&report))
    }

    /// Every file in a report written at or after `since`
    pub fn process_all(&self, since: SystemTime) -> CoverageResult<CoverageReport> {
        self.verify_report_update(since)?;
        self.parse_report()
    }

    /// Entry for the source file in an already parsed report
    pub fn select(&self, report: &CoverageReport) -> FileCoverage {
        let source = self.source_path.to_string_lossy();
        match report.find(&source) {
            Some(coverage) => coverage.clone(),
            None => {
                warn!(
                    "Source file {:?} not found in coverage report {:?}",
                    self.source_path,
                    self.effective_report_path()
                );
                FileCoverage::empty(source.into_owned())
            }
        }
    }
}

/// Parse report content of the given format
pub fn parse_content(content: &str, coverage_type: CoverageType) -> CoverageResult<CoverageReport> {
    match coverage_type {
        CoverageType::Cobertura => cobertura::parse(content),
        CoverageType::Lcov => lcov::parse(content),
        CoverageType::Jacoco => jacoco::parse(content),
        CoverageType::DiffCoverJson => diff_cover::parse(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    const LCOV: &str = "SF:/work/app/src/calc.py\nDA:1,1\nDA:2,0\nend_of_record\n";

    fn write_report(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_process_finds_source() {
        let temp_dir = TempDir::new().unwrap();
        let report = write_report(&temp_dir, "lcov.info", LCOV);
        let processor = CoverageProcessor::new(report, "src/calc.py", CoverageType::Lcov);

        let since = SystemTime::now() - Duration::from_secs(5);
        let coverage = processor.process(since).unwrap();
        assert_eq!(coverage.lines_covered, vec![1]);
        assert_eq!(coverage.lines_missed, vec![2]);
        assert_eq!(coverage.percentage(), 0.5);
    }

    #[test]
    fn test_missing_source_yields_empty_coverage() {
        let temp_dir = TempDir::new().unwrap();
        let report = write_report(&temp_dir, "lcov.info", LCOV);
        let processor = CoverageProcessor::new(report, "src/other.py", CoverageType::Lcov);

        let coverage = processor.process(UNIX_EPOCH).unwrap();
        assert_eq!(coverage.total_lines(), 0);
        assert_eq!(coverage.percentage(), 0.0);
    }

    #[test]
    fn test_missing_report() {
        let temp_dir = TempDir::new().unwrap();
        let processor = CoverageProcessor::new(
            temp_dir.path().join("coverage.xml"),
            "calc.py",
            CoverageType::Cobertura,
        );
        assert!(matches!(
            processor.verify_report_update(UNIX_EPOCH),
            Err(CoverageError::ReportNotFound(_))
        ));
        assert!(matches!(
            processor.parse_report(),
            Err(CoverageError::ReportNotFound(_))
        ));
    }

    #[test]
    fn test_stale_report() {
        let temp_dir = TempDir::new().unwrap();
        let report = write_report(&temp_dir, "lcov.info", LCOV);
        let processor = CoverageProcessor::new(report, "calc.py", CoverageType::Lcov);

        let future = SystemTime::now() + Duration::from_secs(120);
        assert!(matches!(
            processor.process(future),
            Err(CoverageError::StaleReport { .. })
        ));
        let just_before = SystemTime::now() - Duration::from_secs(1);
        assert!(processor.verify_report_update(just_before).is_ok());
    }

    #[test]
    fn test_diff_cover_reads_diff_report() {
        let temp_dir = TempDir::new().unwrap();
        let xml = write_report(&temp_dir, "coverage.xml", "<coverage/>");
        let json = write_report(
            &temp_dir,
            "diff.json",
            r#"{"src_stats": {"calc.py": {"covered_lines": [1, 2, 3], "violation_lines": [4]}}}"#,
        );
        let processor = CoverageProcessor::new(xml, "calc.py", CoverageType::DiffCoverJson)
            .with_diff_report(Some(json.clone()));

        assert_eq!(processor.effective_report_path(), json.as_path());
        assert_eq!(processor.process(UNIX_EPOCH).unwrap().percentage(), 0.75);
    }
}
