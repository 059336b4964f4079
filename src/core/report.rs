// src/core/report.rs

use chrono::NaiveDateTime;
use color_eyre::eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::info;

/// The end-of-run summary written next to the result files.
#[derive(Debug)]
pub struct SummaryReport {
    pub path: PathBuf,
    /// Every `.json` file found in the results directory, sorted by name.
    pub json_files: Vec<String>,
}

impl SummaryReport {
    pub fn total(&self) -> usize {
        self.json_files.len()
    }
}

/// Lists the names of all `.json` files directly inside `dir`.
///
/// Files left over from earlier runs are included; nothing distinguishes them
/// from the ones written by the current run.
pub async fn list_json_files(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .wrap_err_with(|| format!("Failed to list {}", dir.display()))?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn render(target: &str, generated_at: &NaiveDateTime, json_files: &[String]) -> String {
    let mut text = String::new();
    text.push_str("Nmap Flag Combinations Test Summary\n");
    text.push_str("=================================\n");
    text.push_str(&format!("Target: {}\n", target));
    text.push_str(&format!("Test Date: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S%.6f")));
    text.push_str("\nTest Files Created:\n");
    for name in json_files {
        text.push_str(name);
        text.push('\n');
    }
    text.push_str(&format!("\nTotal JSON files: {}\n", json_files.len()));
    text
}

/// Scans `results_dir` and writes the summary to `summary_path`.
pub async fn write_summary(
    results_dir: &Path,
    summary_path: &Path,
    target: &str,
    generated_at: &NaiveDateTime,
) -> Result<SummaryReport> {
    let json_files = list_json_files(results_dir).await?;
    tokio::fs::write(summary_path, render(target, generated_at, &json_files))
        .await
        .wrap_err_with(|| format!("Failed to write summary {}", summary_path.display()))?;

    info!(path = %summary_path.display(), files = json_files.len(), "Summary report written.");
    Ok(SummaryReport {
        path: summary_path.to_path_buf(),
        json_files,
    })
}
