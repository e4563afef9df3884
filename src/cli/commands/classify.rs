//! Classify command implementation

use crate::cli::utils;
use anyhow::Result;
use clap::{ArgMatches, Command};
use std::path::Path;
use ugen_language::FileClass;

pub fn command() -> Command {
    Command::new("classify")
        .about("Tell whether paths are source files, test files or neither")
        .arg(
            clap::Arg::new("paths")
                .help("Paths to classify")
                .value_name("PATH")
                .num_args(1..)
                .required(true),
        )
        .arg(
            clap::Arg::new("language")
                .short('l')
                .long("language")
                .help("Only consult this language")
                .value_name("ID"),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let app = utils::create_app(config)?;
    let language = matches.get_one::<String>("language");

    for path in matches.get_many::<String>("paths").into_iter().flatten() {
        let path = Path::new(path);
        let class = match language {
            Some(id) => {
                let plugin = app.registry().require(id)?;
                if plugin.is_test_file(path) {
                    FileClass::Test(id.clone())
                } else if plugin.is_source_file(path) {
                    FileClass::Source(id.clone())
                } else {
                    FileClass::Unknown
                }
            }
            None => app.registry().classify(path),
        };
        println!("{}: {}", path.display(), class);
    }

    Ok(())
}
