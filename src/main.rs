//! Ugen CLI binary

use anyhow::Result;

use ugen::cli::CliApp;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = CliApp::app().get_matches();

    // Initialize logging, --log-level wins over RUST_LOG
    let filter = match matches.get_one::<String>("log-level") {
        Some(level) => tracing_subscriber::EnvFilter::new(format!("ugen={level}")),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ugen=info".into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Run the CLI application
    CliApp::run(&matches).await
}
