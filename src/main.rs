use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ownifie_admin::cli::Cli;
use ownifie_admin::notify::Notice;

/// Log filter variable, e.g. `OWNIFIE_LOG=ownifie_admin=debug`.
const LOG_ENV: &str = "OWNIFIE_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", Notice::error(e.to_string()).render());
            ExitCode::FAILURE
        }
    }
}
