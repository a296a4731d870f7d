//! jitp: AWS IoT just-in-time provisioning toolkit

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;
use jitp_cli::cli::Cli;
use jitp_cli::output::json::format_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    // Logs go to stderr; stdout carries command results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.run().await {
        let message = format!("{e:#}");
        if json {
            match format_error(&message, "error") {
                Ok(obj) => println!("{obj}"),
                Err(_) => eprintln!("Error: {message}"),
            }
        } else {
            eprintln!("Error: {message}");
        }
        std::process::exit(1);
    }
}
