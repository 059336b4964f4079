// src/core/mod.rs

// The `mod.rs` file acts as the root of the `core` module, exposing its
// sub-modules to the rest of the crate.

/// Data structures shared across the crate: payloads, timing templates,
/// scan flags, test cases and result records.
pub mod models;

/// The static catalog of flag combinations and their timing expansion.
pub mod catalog;

/// HTTP client for the scanning endpoint.
pub mod client;

/// Per-test result files and the human-readable run log.
pub mod results;

/// End-of-run summary of the results directory.
pub mod report;
