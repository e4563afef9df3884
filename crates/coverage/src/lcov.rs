//! LCOV tracefiles

use std::collections::BTreeMap;

use crate::error::{CoverageError, CoverageResult};
use crate::types::{merge_hits, CoverageReport, CoverageType, FileCoverage};

/// Parse an LCOV tracefile
///
/// Records for the same `SF:` path are merged. A record cut off before
/// `end_of_record` is still kept.
pub fn parse(content: &str) -> CoverageResult<CoverageReport> {
    let mut files: BTreeMap<String, BTreeMap<u32, u64>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if let Some(path) = line.strip_prefix("SF:") {
            let path = path.trim().to_string();
            files.entry(path.clone()).or_default();
            current = Some(path);
        } else if let Some(data) = line.strip_prefix("DA:") {
            let Some(path) = current.as_ref() else {
                return Err(CoverageError::parse(
                    CoverageType::Lcov,
                    format!("line {}: DA record outside of a file record", index + 1),
                ));
            };
            let (number, count) = parse_da(data).ok_or_else(|| {
                CoverageError::parse(
                    CoverageType::Lcov,
                    format!("line {}: malformed DA record '{line}'", index + 1),
                )
            })?;
            if let Some(hits) = files.get_mut(path) {
                merge_hits(hits, number, count);
            }
        } else if line == "end_of_record" {
            current = None;
        }
    }

    let mut report = CoverageReport::new();
    for (path, hits) in &files {
        report.insert(FileCoverage::from_hits(path.as_str(), hits));
    }
    Ok(report)
}

/// `DA:<line>,<hits>[,<checksum>]`
fn parse_da(data: &str) -> Option<(u32, u64)> {
    let mut parts = data.split(',');
    let number = parts.next()?.trim().parse().ok()?;
    // Some tools emit negative or fractional counts for unreachable lines
    let count = parts.next()?.trim();
    let count = match count.parse::<u64>() {
        Ok(count) => count,
        Err(_) => count.parse::<f64>().ok().map(|c| c.max(0.0) as u64)?,
    };
    Some((number, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACEFILE: &str = "TN:
SF:src/math.js
FN:1,add
FNDA:2,add
DA:1,2
DA:2,2
DA:5,0
LF:3
LH:2
end_of_record
SF:src/util.js
DA:1,0
end_of_record
SF:src/math.js
DA:5,1,abc123
DA:7,0
end_of_record
";

    #[test]
    fn test_parse_merges_records() {
        let report = parse(TRACEFILE).unwrap();
        assert_eq!(report.len(), 2);

        let math = &report.files["src/math.js"];
        assert_eq!(math.lines_covered, vec![1, 2, 5]);
        assert_eq!(math.lines_missed, vec![7]);

        let util = &report.files["src/util.js"];
        assert_eq!(util.percentage(), 0.0);
        assert_eq!(report.lines_covered(), 3);
        assert_eq!(report.lines_missed(), 2);
    }

    #[test]
    fn test_parse_malformed_da() {
        assert!(parse("SF:a.js\nDA:one,1\nend_of_record\n").is_err());
        assert!(parse("DA:1,1\n").is_err());
    }

    #[test]
    fn test_parse_da_variants() {
        assert_eq!(parse_da("3,4"), Some((3, 4)));
        assert_eq!(parse_da("3,-1"), Some((3, 0)));
        assert_eq!(parse_da("3"), None);
    }

    #[test]
    fn test_unterminated_record_is_kept() {
        let report = parse("SF:a.js\nDA:1,1\n").unwrap();
        assert_eq!(report.files["a.js"].lines_covered, vec![1]);
    }
}
