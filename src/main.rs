use clap::Parser;
use pdfstage::cli::Cli;
use pdfstage::logging::{LogConfig, init_logging};
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match Cli::parse().to_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(err.exit_code());
        }
    };

    if let Err(err) = init_logging(&LogConfig::from_config(&config)) {
        eprintln!("Warning: logging unavailable: {err}");
    }

    if let Err(err) = pdfstage::run(config).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}
