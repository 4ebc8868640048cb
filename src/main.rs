use anyhow::Result;
use clap::Parser;
use scrape_relay::infrastructure::{
    app::ScrapeRelay, cli::Cli, config::Config, logging::Logging,
};
use std::process;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };
    cli.apply(&mut config);

    Logging::new(config.logging.clone()).init()?;

    info!("Starting scrape-relay");

    let relay = match ScrapeRelay::new(config) {
        Ok(relay) => relay,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    tokio::select! {
        result = relay.run(&cli.input) => match result {
            Ok(report) => {
                info!(
                    "Done: {} messages sent, {} retries, {} validation warnings",
                    report.messages_sent, report.retries, report.validation_warnings
                );
            }
            Err(e) => {
                error!("Publishing failed: {}", e);
                process::exit(1);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping before all objects were published");
            process::exit(130);
        }
    }

    Ok(())
}
