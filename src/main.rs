// src/main.rs

use color_eyre::eyre::Result;
use tracing::{info, warn};

mod app;
mod config;
mod core;
mod logging;

use crate::app::Driver;
use crate::config::RunConfig;
use crate::core::catalog::{BASE_CASES, total_executions};

// A single-threaded runtime: requests are issued strictly one after another.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let diagnostics = logging::init_diagnostics();
    info!(
        executions = total_executions(),
        diagnostics = ?diagnostics,
        "Starting nmap flag combination run."
    );

    let mut driver = Driver::new(RunConfig::default()).await?;
    driver.run(BASE_CASES).await?;
    info!(state = ?driver.state(), "Driver stopped.");

    let failed = driver.outcome().failed.len();
    if failed > 0 {
        warn!(failed, log = %driver.log_path().display(), "Some test cases failed, see the run log.");
    }
    Ok(())
}
