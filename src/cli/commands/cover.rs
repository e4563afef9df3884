//! Cover command implementation

use crate::agent::{AgentReport, CoverRequest};
use crate::cli::utils;
use crate::utils::{expand_path, format_coverage};
use crate::{Config, CoverOutcome, OllamaClient, UgenError};
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use ugen_coverage::CoverageType;
use ugen_history::RunRecord;

pub fn command() -> Command {
    Command::new("cover")
        .about("Generate tests with the LLM until the coverage target is reached")
        .arg(
            clap::Arg::new("source-file-path")
                .long("source-file-path")
                .help("Source file to cover")
                .value_name("FILE")
                .required(true),
        )
        .arg(
            clap::Arg::new("test-file-path")
                .long("test-file-path")
                .help("Test file to extend, created from a stub when missing")
                .value_name("FILE")
                .required(true),
        )
        .arg(
            clap::Arg::new("test-command")
                .long("test-command")
                .help("Shell command that runs the tests and writes the coverage report")
                .value_name("CMD")
                .required(true),
        )
        .arg(
            clap::Arg::new("test-command-dir")
                .long("test-command-dir")
                .help("Working directory of the test command")
                .value_name("DIR"),
        )
        .arg(
            clap::Arg::new("code-coverage-report-path")
                .long("code-coverage-report-path")
                .help("Coverage report written by the test command")
                .value_name("FILE"),
        )
        .arg(
            clap::Arg::new("coverage-type")
                .long("coverage-type")
                .help("Report format: cobertura, lcov, jacoco or diff_cover_json")
                .value_name("TYPE")
                .value_parser(clap::value_parser!(CoverageType)),
        )
        .arg(
            clap::Arg::new("desired-coverage")
                .long("desired-coverage")
                .help("Target line coverage in percent")
                .value_name("PERCENT")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            clap::Arg::new("max-iterations")
                .long("max-iterations")
                .help("Maximum number of generation rounds")
                .value_name("N")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            clap::Arg::new("max-run-time-sec")
                .long("max-run-time-sec")
                .help("Kill the test command after this many seconds")
                .value_name("SECS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            clap::Arg::new("model")
                .long("model")
                .help("Ollama model name")
                .value_name("MODEL"),
        )
        .arg(
            clap::Arg::new("api-base")
                .long("api-base")
                .help("Ollama server URL")
                .value_name("URL"),
        )
        .arg(
            clap::Arg::new("project-root")
                .long("project-root")
                .help("Root that prompt paths are shown relative to")
                .value_name("DIR"),
        )
        .arg(
            clap::Arg::new("included-files")
                .long("included-files")
                .help("Extra files given to the model as context")
                .value_name("FILE")
                .num_args(1..)
                .action(clap::ArgAction::Append),
        )
        .arg(
            clap::Arg::new("additional-instructions")
                .long("additional-instructions")
                .help("Extra instructions appended to the prompt")
                .value_name("TEXT"),
        )
        .arg(
            clap::Arg::new("language")
                .short('l')
                .long("language")
                .help("Language id, detected from the extension by default")
                .value_name("ID"),
        )
        .arg(
            clap::Arg::new("skip-unchanged")
                .long("skip-unchanged")
                .help("Skip the run when the source is unchanged since its last recorded run")
                .action(clap::ArgAction::SetTrue),
        )
}

fn print_report(report: &AgentReport) {
    println!("Initial coverage: {}", format_coverage(report.initial_coverage));
    println!("Final coverage: {}", format_coverage(report.final_coverage));
    println!("Iterations: {}", report.iterations);
    println!(
        "Tests kept: {} of {} generated",
        report.tests_passed, report.tests_generated
    );
    println!(
        "Tokens: {} prompt, {} answer",
        report.input_tokens, report.output_tokens
    );
}

fn print_skipped(last: &RunRecord) {
    println!(
        "Source unchanged since the run of {}, skipping",
        last.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Last final coverage: {}", format_coverage(last.final_coverage));
}

/// Apply command line overrides to the configuration
fn apply_overrides(matches: &ArgMatches, config: &mut Config) {
    if let Some(model) = matches.get_one::<String>("model") {
        config.llm.model = model.clone();
    }
    if let Some(api_base) = matches.get_one::<String>("api-base") {
        config.llm.api_base = api_base.clone();
    }
    if let Some(desired) = matches.get_one::<f64>("desired-coverage") {
        config.generation.desired_coverage = *desired;
    }
    if let Some(iterations) = matches.get_one::<u32>("max-iterations") {
        config.generation.max_iterations = *iterations;
    }
    if let Some(secs) = matches.get_one::<u64>("max-run-time-sec") {
        config.generation.max_run_time_sec = *secs;
    }
    if let Some(instructions) = matches.get_one::<String>("additional-instructions") {
        config.generation.additional_instructions = instructions.clone();
    }
}

/// Build the cover request from the arguments and the configuration
///
/// Paths expand `~` and `$VARS`. The project root and the test command
/// directory default to the working directory.
fn build_request(matches: &ArgMatches, config: &Config) -> Result<CoverRequest> {
    let current_dir = std::env::current_dir()?;
    let required = |name: &str| {
        utils::path_arg(matches, name)
            .ok_or_else(|| anyhow!("--{} is required", name))
            .and_then(|path| expand_path(&path))
    };
    let optional = |name: &str| utils::path_arg(matches, name).map(|path| expand_path(&path)).transpose();

    let included_files = matches
        .get_many::<String>("included-files")
        .into_iter()
        .flatten()
        .map(|path| expand_path(Path::new(path)))
        .collect::<Result<Vec<_>>>()?;

    Ok(CoverRequest {
        source_path: required("source-file-path")?,
        test_path: required("test-file-path")?,
        project_root: optional("project-root")?.unwrap_or_else(|| current_dir.clone()),
        test_command: matches
            .get_one::<String>("test-command")
            .cloned()
            .ok_or_else(|| anyhow!("--test-command is required"))?,
        test_command_dir: optional("test-command-dir")?.unwrap_or(current_dir),
        report_path: optional("code-coverage-report-path")?
            .unwrap_or_else(|| config.coverage.report_path.clone()),
        coverage_type: matches
            .get_one::<CoverageType>("coverage-type")
            .copied()
            .unwrap_or(config.coverage.coverage_type),
        diff_report_path: config.coverage.diff_report_path.clone(),
        desired_coverage: config.generation.desired_coverage,
        max_iterations: config.generation.max_iterations,
        max_run_time: Duration::from_secs(config.generation.max_run_time_sec),
        max_tests_per_run: config.generation.max_tests_per_run,
        included_files,
        additional_instructions: config.generation.additional_instructions.clone(),
    })
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let mut config = utils::load_config(matches)?;
    apply_overrides(matches, &mut config);
    config.validate()?;

    let request = build_request(matches, &config)?;
    let llm = config.llm.clone();
    let app = utils::create_app(config)?;
    let language = matches.get_one::<String>("language").map(String::as_str);

    // An unchanged source needs no model server
    if matches.get_flag("skip-unchanged") && request.source_path.is_file() {
        if let Some(last) = app.unchanged_since_last_run(&request.source_path)? {
            print_skipped(&last);
            return Ok(());
        }
    }

    let client = OllamaClient::new(llm)?;
    client.verify_model().await?;

    info!("Covering {:?} with tests in {:?}", request.source_path, request.test_path);
    let desired = request.desired_coverage;
    match app.cover(request, language, Arc::new(client), false).await? {
        CoverOutcome::Skipped(last) => {
            print_skipped(&last);
            Ok(())
        }
        CoverOutcome::Completed(report) => {
            print_report(&report);
            if report.success {
                println!("Coverage target of {desired:.2}% reached");
                Ok(())
            } else {
                Err(UgenError::Agent(format!(
                    "coverage target of {:.2}% not reached, stopped at {}",
                    desired,
                    format_coverage(report.final_coverage)
                ))
                .into())
            }
        }
    }
}
