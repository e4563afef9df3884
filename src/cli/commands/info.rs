//! Info command implementation

use anyhow::Result;
use clap::{ArgMatches, Command};

use crate::config::Config;

pub fn command() -> Command {
    Command::new("info").about("Show tool information").arg(
        clap::Arg::new("detailed")
            .short('d')
            .long("detailed")
            .help("Show detailed information")
            .action(clap::ArgAction::SetTrue),
    )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let detailed = matches.get_flag("detailed");

    println!("Ugen - Unit Test Generator");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));

    if detailed {
        println!("\nDetailed Information:");
        println!("  - Test stubs for Python, JavaScript, TypeScript, Go, Java and Rust");
        println!("  - Coverage loop driven by a local Ollama model");
        println!("  - Cobertura, LCOV, JaCoCo and diff-cover JSON reports");
        println!("  - Run history with source hashes");
        match Config::global_path() {
            Some(path) => println!("  - Global configuration: {}", path.display()),
            None => println!("  - Global configuration: unavailable on this platform"),
        }
    }

    Ok(())
}
