//! Test path command implementation

use crate::cli::utils;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("test-path")
        .about("Print the conventional test file path of a source file")
        .arg(
            clap::Arg::new("source")
                .help("Source file")
                .value_name("SOURCE")
                .required(true),
        )
        .arg(
            clap::Arg::new("language")
                .short('l')
                .long("language")
                .help("Language id, detected from the extension by default")
                .value_name("ID"),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let app = utils::create_app(config)?;

    let source = utils::path_arg(matches, "source").ok_or_else(|| anyhow!("SOURCE is required"))?;
    let language = matches.get_one::<String>("language").map(String::as_str);

    let test_path = app.test_path_for(&source, language)?;
    println!("{}", test_path.display());

    Ok(())
}
