//! Main entry point for the cgfetch CLI application.
//!
//! Downloads the fixed archive and extracts its CG images into `./cg`,
//! printing progress on stdout and at most one error line.

use clap::Parser;
use std::process::ExitCode;

use cgfetch::{Cli, HttpFetcher, Setup, SetupConfig, SetupError};

/// Application entry point.
///
/// The run is strictly sequential, so a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), SetupError> {
    let fetcher = HttpFetcher::new()?;
    let report = Setup::new(SetupConfig::default(), fetcher)
        .quiet(cli.is_quiet())
        .run()
        .await?;

    tracing::info!(
        files = report.extracted.len(),
        dir = %report.output_dir.display(),
        "done"
    );
    Ok(())
}
