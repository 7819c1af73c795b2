//! `lan-https-serve` entry point.
//!
//! Startup sequence:
//! 1. Merge defaults, the optional TOML file and flags into a [`ServerConfig`].
//! 2. Initialise logging.
//! 3. Resolve the document root, load the certificate, bind the listener.
//! 4. Print the banner and serve until Ctrl+C / SIGTERM.
//!
//! [`ServerConfig`]: lan_https_serve::ServerConfig

use std::process::ExitCode;

use clap::Parser;

use lan_https_serve::cli::Cli;
use lan_https_serve::{lifecycle, observability};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet; write to stderr directly.
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = observability::logging::init(&config.observability) {
        eprintln!("Error: cannot initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        port = config.listener.port,
        document_root = %config.files.document_root.display(),
        "lan-https-serve starting"
    );

    match lifecycle::run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("Error: {e}");
            if let Some(hint) = e.hint(&config) {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}
