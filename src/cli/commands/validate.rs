//! Validate command implementation

use crate::cli::utils;
use crate::Config;
use anyhow::Result;
use clap::{ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("validate").about("Validate the configuration in effect")
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    info!("Validating configuration");

    let (config, path) = Config::load(utils::get_config_path(matches).as_deref())?;
    let app = utils::create_app(config)?;
    let config = app.config();

    println!("Configuration is valid!");
    match path {
        Some(path) => println!("File: {}", path.display()),
        None => println!("File: none, using defaults"),
    }
    println!("Version: {}", config.version);
    println!("Model: {} at {}", config.llm.model, config.llm.api_base);
    println!(
        "Generation: {} iterations, {} tests per run, {:.1}% target",
        config.generation.max_iterations,
        config.generation.max_tests_per_run,
        config.generation.desired_coverage
    );
    println!(
        "Coverage report: {} ({})",
        config.coverage.report_path.display(),
        config.coverage.coverage_type
    );

    for metadata in app.registry().languages() {
        if let Some(language) = app.registry().get(&metadata.id) {
            println!("  - {} ({})", metadata.id, language.test_framework());
        }
    }

    Ok(())
}
