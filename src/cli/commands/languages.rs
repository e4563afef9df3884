//! Languages command implementation

use crate::cli::utils;
use anyhow::Result;
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("languages").about("List the language plugins").arg(
        clap::Arg::new("detailed")
            .short('d')
            .long("detailed")
            .help("Show extensions and frameworks")
            .action(clap::ArgAction::SetTrue),
    )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let app = utils::create_app(config)?;
    let detailed = matches.get_flag("detailed");

    for metadata in app.registry().languages() {
        let framework = app
            .registry()
            .get(&metadata.id)
            .map(|language| language.test_framework().to_string())
            .unwrap_or_default();
        println!("{} ({}): {}", metadata.id, metadata.name, framework);

        if detailed {
            println!("  Extensions: {}", metadata.extensions.join(", "));
            println!("  Frameworks: {}", metadata.frameworks.join(", "));
        }
    }

    Ok(())
}
