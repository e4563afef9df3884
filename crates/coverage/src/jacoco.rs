//! JaCoCo XML reports

use std::collections::BTreeMap;

use crate::cobertura::{numeric_attribute, parse_xml};
use crate::error::CoverageResult;
use crate::types::{merge_hits, CoverageReport, CoverageType, FileCoverage};

/// Parse a JaCoCo XML report
///
/// Files are keyed `<package>/<sourcefile>`. A line counts as covered when any
/// of its instructions ran.
pub fn parse(content: &str) -> CoverageResult<CoverageReport> {
    let doc = parse_xml(content, CoverageType::Jacoco)?;
    let mut report = CoverageReport::new();

    for package in doc.descendants().filter(|n| n.has_tag_name("package")) {
        let package_name = package.attribute("name").unwrap_or_default();

        for source in package.children().filter(|n| n.has_tag_name("sourcefile")) {
            let Some(file_name) = source.attribute("name") else {
                continue;
            };
            let path = if package_name.is_empty() {
                file_name.to_string()
            } else {
                format!("{package_name}/{file_name}")
            };

            let mut hits = BTreeMap::new();
            for line in source.children().filter(|n| n.has_tag_name("line")) {
                let number: u32 = numeric_attribute(line, "nr", CoverageType::Jacoco)?;
                let covered: u64 = numeric_attribute(line, "ci", CoverageType::Jacoco)?;
                merge_hits(&mut hits, number, covered);
            }
            report.insert(FileCoverage::from_hits(path, &hits));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<!DOCTYPE report PUBLIC "-//JACOCO//DTD Report 1.1//EN" "report.dtd">
<report name="calc">
  <package name="com/example">
    <class name="com/example/Calculator" sourcefilename="Calculator.java"/>
    <sourcefile name="Calculator.java">
      <line nr="3" mi="0" ci="3" mb="0" cb="0"/>
      <line nr="6" mi="2" ci="0" mb="0" cb="0"/>
      <line nr="9" mi="1" ci="4" mb="1" cb="1"/>
      <counter type="LINE" missed="1" covered="2"/>
    </sourcefile>
  </package>
</report>
"#;

    #[test]
    fn test_parse() {
        let report = parse(REPORT).unwrap();
        let calc = &report.files["com/example/Calculator.java"];
        assert_eq!(calc.lines_covered, vec![3, 9]);
        assert_eq!(calc.lines_missed, vec![6]);
        assert!(report
            .find("src/main/java/com/example/Calculator.java")
            .is_some());
    }
}
