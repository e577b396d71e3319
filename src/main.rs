//! ==============================================================================
//! main.rs - vehicle reporter entry point
//! ==============================================================================
//!
//! purpose:
//!     stands in for the vehicle-tracking pipeline and pushes a simulated
//!     observation record to the backend api every few seconds.
//!
//! responsibilities:
//!     - load configuration (config/reporter.toml or defaults)
//!     - install the tracing subscriber
//!     - wire ctrl+c to the reporter's shutdown flag
//!     - run the reporting loop until interrupted
//!
//! relationships:
//!     - uses: config.rs, logging.rs, runtime.rs, sender.rs, source.rs
//!
//! ==============================================================================

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};
use vehicle_reporter::config::ReporterConfig;
use vehicle_reporter::{logging, Reporter, Sender, SimulatedSource};

#[tokio::main]
async fn main() -> Result<()> {
    // step 1: load configuration
    let (config, origin) = ReporterConfig::load_or_default();
    logging::init(&config.logging.level);
    origin.log();
    config.log_summary();

    // step 2: build the sender up front so a bad url fails fast
    let sender = Sender::new(&config.endpoint.url)?;

    // step 3: every ctrl+c raises the shutdown flag, a repeat press
    // abandons a send that was already under way on the first one
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        loop {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C signal.");
                    if shutdown_tx.send(true).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                    break;
                }
            }
        }
    });

    // step 4: report until interrupted
    println!("Sending vehicle data to backend... (press Ctrl+C to stop)");

    let mut reporter = Reporter::new(SimulatedSource, sender, config.interval());
    let summary = reporter.run_forever(shutdown_rx).await;

    println!("\n[!] Stopped sending data");
    info!(
        iterations = summary.iterations,
        delivered = summary.delivered,
        failed = summary.failed,
        "shutdown complete"
    );
    Ok(())
}
