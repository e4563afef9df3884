//! Cobertura XML reports

use roxmltree::{Document, Node, ParsingOptions};
use std::collections::BTreeMap;

use crate::error::{CoverageError, CoverageResult};
use crate::types::{merge_hits, CoverageReport, CoverageType, FileCoverage};

pub(crate) fn parse_xml(content: &str, format: CoverageType) -> CoverageResult<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(content, options)
        .map_err(|e| CoverageError::parse(format, format!("failed to parse XML: {e}")))
}

pub(crate) fn numeric_attribute<T: std::str::FromStr>(
    node: Node<'_, '_>,
    name: &str,
    format: CoverageType,
) -> CoverageResult<T> {
    let value = node.attribute(name).ok_or_else(|| {
        CoverageError::parse(
            format,
            format!("<{}> is missing '{name}'", node.tag_name().name()),
        )
    })?;
    value.trim().parse().map_err(|_| {
        CoverageError::parse(
            format,
            format!("<{}> has a non-numeric '{name}': {value}", node.tag_name().name()),
        )
    })
}

/// Parse a Cobertura report; classes sharing a file are merged
pub fn parse(content: &str) -> CoverageResult<CoverageReport> {
    let doc = parse_xml(content, CoverageType::Cobertura)?;
    let mut files: BTreeMap<String, BTreeMap<u32, u64>> = BTreeMap::new();

    for class in doc.descendants().filter(|n| n.has_tag_name("class")) {
        let Some(filename) = class.attribute("filename") else {
            continue;
        };
        let hits = files.entry(filename.to_string()).or_default();

        for line in class.descendants().filter(|n| n.has_tag_name("line")) {
            let number: u32 = numeric_attribute(line, "number", CoverageType::Cobertura)?;
            let count: u64 = numeric_attribute(line, "hits", CoverageType::Cobertura)?;
            merge_hits(hits, number, count);
        }
    }

    let mut report = CoverageReport::new();
    for (path, hits) in &files {
        report.insert(FileCoverage::from_hits(path.as_str(), hits));
    }
    Ok(report)
}
