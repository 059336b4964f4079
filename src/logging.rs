// src/logging.rs

use color_eyre::eyre::{Result, WrapErr};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::fs::File;
use std::path::{Path, PathBuf};
use time::UtcOffset;
use time::macros::format_description;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

lazy_static! {
    /// Environment variable consulted for the diagnostics filter when `RUST_LOG` is unset.
    pub static ref LOG_LEVEL_ENV: String = format!("{}_LOGLEVEL", env!("CARGO_CRATE_NAME").to_uppercase());
    static ref DIAGNOSTICS_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
    static ref DEFAULT_FILTER: String = format!("{}=info", env!("CARGO_CRATE_NAME"));
}

/// Directory holding the diagnostics log, `./.data` when no home directory is known.
pub fn diagnostics_dir() -> PathBuf {
    ProjectDirs::from("org", "nmap-flag-matrix", env!("CARGO_PKG_NAME"))
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
}

fn filter_directive() -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_LEVEL_ENV.as_str()))
        .unwrap_or_else(|_| DEFAULT_FILTER.clone())
}

/// Routes `tracing` events to a diagnostics file, separate from the run log.
///
/// Diagnostics are optional: when the file or subscriber cannot be set up the
/// reason goes to stderr, no subscriber is installed and `None` is returned.
/// Must be called before any other thread is spawned, otherwise the local
/// UTC offset cannot be determined and timestamps fall back to UTC.
pub fn init_diagnostics() -> Option<PathBuf> {
    init_diagnostics_in(&diagnostics_dir())
}

fn init_diagnostics_in(directory: &Path) -> Option<PathBuf> {
    match try_init_diagnostics(directory) {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("Diagnostics logging disabled: {:#}", e);
            None
        }
    }
}

fn try_init_diagnostics(directory: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)
        .wrap_err_with(|| format!("Failed to create diagnostics directory {}", directory.display()))?;
    let path = directory.join(DIAGNOSTICS_FILE.as_str());
    let file = File::create(&path)
        .wrap_err_with(|| format!("Failed to create diagnostics log {}", path.display()))?;

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_timer(timer)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter_directive()));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    Ok(path)
}
