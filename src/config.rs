// src/config.rs

use std::path::PathBuf;
use std::time::Duration;

/// Host every payload asks the scanning endpoint to scan.
pub const TARGET: &str = "scanme.nmap.org";
/// The scanning endpoint under test.
pub const SCAN_ENDPOINT: &str = "http://localhost:8081/scan-open-ports";
/// Directory that receives one JSON file per successful test case.
pub const RESULTS_DIR: &str = "test_results";
/// Name of the summary written into the results directory at the end of a run.
pub const SUMMARY_FILE: &str = "test_summary.txt";
/// Pause taken after every successful test case.
pub const REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Settings for a single run of the driver.
///
/// The binary always runs with [`RunConfig::default`]; nothing is read from the
/// command line or the environment.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: String,
    pub endpoint: String,
    pub results_dir: PathBuf,
    /// Where the timestamped run log is created. Empty means the working
    /// directory, with the log shown by its bare file name.
    pub log_dir: PathBuf,
    pub request_delay: Duration,
    /// `None` leaves the HTTP client without a timeout, so a hung endpoint blocks the run.
    pub request_timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target: TARGET.to_string(),
            endpoint: SCAN_ENDPOINT.to_string(),
            results_dir: PathBuf::from(RESULTS_DIR),
            log_dir: PathBuf::new(),
            request_delay: REQUEST_DELAY,
            request_timeout: None,
        }
    }
}

impl RunConfig {
    pub fn summary_path(&self) -> PathBuf {
        self.results_dir.join(SUMMARY_FILE)
    }
}
