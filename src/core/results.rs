// src/core/results.rs

use chrono::{DateTime, Local};
use color_eyre::eyre::{Result, WrapErr};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::models::ResultRecord;

/// File name of the run log for a run started at `started`.
pub fn log_file_name(started: &DateTime<Local>) -> String {
    format!("nmap_test_results_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// The opening banner shared by the console and the run log.
pub fn banner(target: &str, results_dir: &Path, log_path: &Path) -> String {
    format!(
        "🚀 Starting Nmap Flag Combinations Test\n\
         Target: {}\n\
         Results will be saved to: {}/\n\
         Log file: {}\n\
         ========================================\n",
        target,
        results_dir.display(),
        log_path.display(),
    )
}

/// The block describing a completed exchange, as written to the run log.
pub fn progress_block(payload_json: &str, record: &ResultRecord, output: &Path) -> String {
    format!(
        "Testing: {}\nPayload: {}\nHTTP Code: {}\nTime: {:.2}s\nOutput saved to: {}\n---\n",
        record.test_name,
        payload_json,
        record.http_code,
        record.time_taken,
        output.display(),
    )
}

/// The line recorded when a test case fails.
pub fn error_line(test_name: &str, error: &str) -> String {
    format!("Error in {}: {}\n", test_name, error)
}

/// Append-only, human-readable log of a run.
///
/// The file is created (truncating any previous one) when the run starts and
/// stays open until the driver is dropped.
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Creates `<dir>/<log_file_name>` and writes the banner into it.
    pub fn create(dir: &Path, started: &DateTime<Local>, target: &str, results_dir: &Path) -> Result<Self> {
        let path = dir.join(log_file_name(started));
        File::create(&path)
            .wrap_err_with(|| format!("Failed to create run log {}", path.display()))?;
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .wrap_err_with(|| format!("Failed to open run log {}", path.display()))?;

        let mut log = Self { path, file };
        let header = banner(target, results_dir, &log.path);
        log.append(&header)?;
        debug!(path = %log.path.display(), "Run log created.");
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, text: &str) -> Result<()> {
        self.file
            .write_all(text.as_bytes())
            .and_then(|_| self.file.flush())
            .wrap_err_with(|| format!("Failed to append to run log {}", self.path.display()))
    }
}

/// Path of the result file for `test_name` inside `results_dir`.
pub fn result_path(results_dir: &Path, test_name: &str) -> PathBuf {
    results_dir.join(format!("{}.json", test_name))
}

/// Writes `record` pretty-printed to `<results_dir>/<test_name>.json`, replacing any earlier file.
pub async fn write_result(results_dir: &Path, record: &ResultRecord) -> Result<PathBuf> {
    let path = result_path(results_dir, &record.test_name);
    let json = serde_json::to_vec_pretty(record).wrap_err("Failed to serialize result record")?;
    tokio::fs::write(&path, json)
        .await
        .wrap_err_with(|| format!("Failed to write result file {}", path.display()))?;
    Ok(path)
}
