//! CLI command implementations

use anyhow::Result;
use clap::{ArgMatches, Command};

pub mod commands;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        Command::new("ugen")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Generate unit tests and grow line coverage with a local LLM")
            .subcommand_negates_reqs(true)
            .arg(
                clap::Arg::new("config")
                    .short('c')
                    .long("config")
                    .help("Configuration file path")
                    .value_name("FILE")
                    .global(true),
            )
            .arg(
                clap::Arg::new("log-level")
                    .long("log-level")
                    .help("Log level (error, warn, info, debug, trace)")
                    .value_name("LEVEL")
                    .value_parser(["error", "warn", "info", "debug", "trace"])
                    .global(true),
            )
            .subcommand(commands::init::command())
            .subcommand(commands::generate::command())
            .subcommand(commands::classify::command())
            .subcommand(commands::test_path::command())
            .subcommand(commands::languages::command())
            .subcommand(commands::scan::command())
            .subcommand(commands::cover::command())
            .subcommand(commands::coverage::command())
            .subcommand(commands::history::command())
            .subcommand(commands::validate::command())
            .subcommand(commands::info::command())
    }

    /// Run the CLI application
    pub async fn run(matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("init", sub_matches)) => commands::init::run(sub_matches).await,
            Some(("generate", sub_matches)) => commands::generate::run(sub_matches).await,
            Some(("classify", sub_matches)) => commands::classify::run(sub_matches).await,
            Some(("test-path", sub_matches)) => commands::test_path::run(sub_matches).await,
            Some(("languages", sub_matches)) => commands::languages::run(sub_matches).await,
            Some(("scan", sub_matches)) => commands::scan::run(sub_matches).await,
            Some(("cover", sub_matches)) => commands::cover::run(sub_matches).await,
            Some(("coverage", sub_matches)) => commands::coverage::run(sub_matches).await,
            Some(("history", sub_matches)) => commands::history::run(sub_matches).await,
            Some(("validate", sub_matches)) => commands::validate::run(sub_matches).await,
            Some(("info", sub_matches)) => commands::info::run(sub_matches).await,
            _ => {
                // No subcommand provided, show help
                let _ = Self::app().print_help();
                Ok(())
            }
        }
    }
}

/// Common CLI utilities
pub mod utils {
    use anyhow::Result;
    use std::path::PathBuf;

    /// Configuration file path given with `--config`
    pub fn get_config_path(matches: &clap::ArgMatches) -> Option<PathBuf> {
        matches.get_one::<String>("config").map(PathBuf::from)
    }

    /// Load the configuration in effect, defaults when no file is found
    pub fn load_config(matches: &clap::ArgMatches) -> Result<crate::Config> {
        let config_path = get_config_path(matches);
        let (config, _) = crate::Config::load(config_path.as_deref())?;
        Ok(config)
    }

    /// Create Ugen instance
    pub fn create_app(config: crate::Config) -> Result<crate::Ugen> {
        crate::Ugen::new(config)
    }

    /// Value of a string argument as a path
    pub fn path_arg(matches: &clap::ArgMatches, name: &str) -> Option<PathBuf> {
        matches.get_one::<String>(name).map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_is_well_formed() {
        CliApp::app().debug_assert();
    }

    #[test]
    fn test_global_config_reaches_subcommands() {
        let matches = CliApp::app()
            .try_get_matches_from(["ugen", "-c", "custom.yaml", "languages"])
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "languages");
        assert_eq!(
            utils::get_config_path(sub_matches),
            Some(std::path::PathBuf::from("custom.yaml"))
        );
    }

    #[test]
    fn test_cover_requires_paths() {
        let result = CliApp::app().try_get_matches_from(["ugen", "cover", "--source-file-path", "a.py"]);
        assert!(result.is_err());
    }
}
