//! History command implementation

use crate::cli::utils;
use crate::utils::format_coverage;
use anyhow::Result;
use clap::{ArgMatches, Command};
use tracing::info;
use ugen_history::RunRecord;

pub fn command() -> Command {
    Command::new("history")
        .about("Show recorded cover runs")
        .arg(
            clap::Arg::new("source")
                .short('s')
                .long("source")
                .help("Only show runs for this source file")
                .value_name("FILE"),
        )
        .arg(
            clap::Arg::new("limit")
                .short('n')
                .long("limit")
                .help("Show at most this many runs, newest first")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .default_value("20"),
        )
        .arg(
            clap::Arg::new("cleanup")
                .long("cleanup")
                .help("Remove runs older than this many hours")
                .value_name("HOURS")
                .value_parser(clap::value_parser!(u64)),
        )
}

fn print_run(run: &RunRecord) {
    println!(
        "{}  {} -> {}  {} -> {}  {}/{} tests kept  {} iterations  {}",
        run.finished_at.format("%Y-%m-%d %H:%M:%S"),
        run.source_path.display(),
        run.test_file_path.display(),
        format_coverage(run.initial_coverage),
        format_coverage(run.final_coverage),
        run.tests_passed,
        run.tests_generated,
        run.iterations,
        if run.success { "ok" } else { "below target" }
    );
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let manager = config.history.manager();

    if let Some(hours) = matches.get_one::<u64>("cleanup") {
        let removed = manager.cleanup_stale(*hours)?;
        info!("Removed {} runs older than {} hours", removed, hours);
        println!("Removed {removed} runs older than {hours} hours");
        return Ok(());
    }

    if !manager.path().exists() {
        println!("No runs recorded yet ({})", manager.path().display());
        return Ok(());
    }

    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(20);
    let history = manager.load_or_create()?;

    let runs: Vec<&RunRecord> = match utils::path_arg(matches, "source") {
        Some(source) => history.runs_for(&source),
        None => history.runs.iter().collect(),
    };
    for run in runs.iter().rev().take(limit) {
        print_run(run);
    }

    let stats = &history.statistics;
    println!("\nHistory: {}", manager.path().display());
    println!("  Runs: {} ({} reached the target)", stats.total_runs, stats.successful_runs);
    println!(
        "  Tests kept: {} of {} ({:.1}%)",
        stats.tests_passed,
        stats.tests_generated,
        stats.acceptance_rate * 100.0
    );
    println!(
        "  Average coverage gain: {:.2} points",
        stats.average_coverage_gain * 100.0
    );

    Ok(())
}
