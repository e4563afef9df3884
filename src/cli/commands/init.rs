//! Init command implementation

use crate::Config;
use anyhow::Result;
use clap::{ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

use crate::UgenError;

pub fn command() -> Command {
    Command::new("init")
        .about("Initialize a new configuration file")
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file path")
                .value_name("FILE")
                .default_value(".ugen.yaml"),
        )
        .arg(
            clap::Arg::new("force")
                .short('f')
                .long("force")
                .help("Overwrite an existing file")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let output_path = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".ugen.yaml"));

    if output_path.exists() && !matches.get_flag("force") {
        return Err(UgenError::Config(format!(
            "{output_path:?} already exists, use --force to overwrite it"
        ))
        .into());
    }

    info!("Initializing configuration file: {:?}", output_path);
    Config::default().save_to_file(&output_path)?;

    println!("Configuration file created: {}", output_path.display());
    println!("Edit the llm section to point at your Ollama server and model.");

    Ok(())
}
