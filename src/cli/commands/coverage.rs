//! Coverage command implementation

use crate::cli::utils;
use crate::utils::format_coverage;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};
use ugen_coverage::{CoverageProcessor, CoverageType};

pub fn command() -> Command {
    Command::new("coverage")
        .about("Summarize a coverage report")
        .arg(
            clap::Arg::new("report")
                .short('r')
                .long("report")
                .help("Coverage report file")
                .value_name("FILE")
                .required(true),
        )
        .arg(
            clap::Arg::new("type")
                .short('t')
                .long("type")
                .help("Report format: cobertura, lcov, jacoco or diff_cover_json")
                .value_name("TYPE")
                .value_parser(clap::value_parser!(CoverageType)),
        )
        .arg(
            clap::Arg::new("source")
                .short('s')
                .long("source")
                .help("Only show this source file")
                .value_name("FILE"),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;

    let report_path = utils::path_arg(matches, "report").ok_or_else(|| anyhow!("--report is required"))?;
    let coverage_type = matches
        .get_one::<CoverageType>("type")
        .copied()
        .unwrap_or(config.coverage.coverage_type);
    let source = utils::path_arg(matches, "source");

    let processor = CoverageProcessor::new(
        report_path.clone(),
        source.clone().unwrap_or_default(),
        coverage_type,
    );
    let report = processor.parse_report()?;

    if source.is_some() {
        let coverage = processor.select(&report);
        println!(
            "{}: {} ({} of {} lines)",
            coverage.path,
            format_coverage(coverage.percentage()),
            coverage.lines_covered.len(),
            coverage.total_lines()
        );
        if !coverage.lines_missed.is_empty() {
            let missed: Vec<String> = coverage.lines_missed.iter().map(u32::to_string).collect();
            println!("Missed lines: {}", missed.join(", "));
        }
        return Ok(());
    }

    println!("Report: {} ({})", report_path.display(), coverage_type);
    for (path, coverage) in &report.files {
        println!(
            "  {}: {} ({}/{})",
            path,
            format_coverage(coverage.percentage()),
            coverage.lines_covered.len(),
            coverage.total_lines()
        );
    }
    println!(
        "Total: {} over {} files ({} covered, {} missed)",
        format_coverage(report.percentage()),
        report.len(),
        report.lines_covered(),
        report.lines_missed()
    );

    Ok(())
}
