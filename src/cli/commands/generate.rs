//! Generate command implementation

use crate::cli::utils;
use crate::GenerateOptions;
use anyhow::Result;
use clap::{ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

pub fn command() -> Command {
    Command::new("generate")
        .about("Write a skeletal test file for a source file")
        .arg(
            clap::Arg::new("source")
                .help("Source file")
                .value_name("SOURCE")
                .required(true),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Test file path, defaults to the language convention")
                .value_name("PATH"),
        )
        .arg(
            clap::Arg::new("language")
                .short('l')
                .long("language")
                .help("Language id, detected from the extension by default")
                .value_name("ID"),
        )
        .arg(
            clap::Arg::new("force")
                .short('f')
                .long("force")
                .help("Overwrite an existing test file")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("dry-run")
                .long("dry-run")
                .help("Print the stub instead of writing it")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let app = utils::create_app(config)?;

    let source = utils::path_arg(matches, "source").unwrap_or_else(|| PathBuf::from("."));
    let options = GenerateOptions {
        output: utils::path_arg(matches, "output"),
        language: matches.get_one::<String>("language").cloned(),
        force: matches.get_flag("force"),
        dry_run: matches.get_flag("dry-run"),
    };

    info!("Generating test stub for {:?}", source);
    let stub = app.generate(&source, &options)?;

    if stub.written {
        println!("Test stub written to {}", stub.test_path.display());
        println!("Language: {}", stub.language);
        println!("Framework: {}", app.language_for(Some(stub.language.as_str()), &source)?.test_framework());
    } else {
        println!("# {}", stub.test_path.display());
        print!("{}", stub.content);
    }

    Ok(())
}
