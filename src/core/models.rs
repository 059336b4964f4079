// src/core/models.rs

use chrono::NaiveDateTime;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::Formatter;
use std::io;
use strum::{AsRefStr, Display, EnumIter, EnumString};

// --- Timing Templates ---

/// An nmap timing template, sent as the `timing` field of a payload.
///
/// The set is closed: anything other than `T0`..`T5` fails to deserialize,
/// so a payload that parsed successfully always carries a valid template.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString, AsRefStr,
)]
pub enum Timing {
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
}

impl Timing {
    /// The nickname nmap uses for this template.
    pub fn nickname(self) -> &'static str {
        match self {
            Timing::T0 => "paranoid",
            Timing::T1 => "sneaky",
            Timing::T2 => "polite",
            Timing::T3 => "normal",
            Timing::T4 => "aggressive",
            Timing::T5 => "insane",
        }
    }
}

// --- Scan Flags ---

/// A boolean scan option understood by the scanning endpoint.
///
/// The `Display` form is the short label used in base case names
/// (`O`, `sC`, `sV`, `traceroute`, `A`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum ScanFlag {
    #[strum(serialize = "O")]
    OsDetection,
    #[strum(serialize = "sC")]
    DefaultScripts,
    #[strum(serialize = "sV")]
    ServiceVersion,
    #[strum(serialize = "traceroute")]
    Traceroute,
    #[strum(serialize = "A")]
    Aggressive,
}

// --- Payload ---

/// The JSON body posted to the scanning endpoint.
///
/// Flags that are not set and a missing timing template are left out of the
/// encoding entirely, so the no-timing variant never carries a `timing` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_o: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_sc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_sv: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_traceroute: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_a: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
}

impl Payload {
    /// A payload for `target` with no flags and no timing.
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            flag_o: None,
            flag_sc: None,
            flag_sv: None,
            flag_traceroute: None,
            flag_a: None,
            timing: None,
        }
    }

    /// Returns the payload with `flag` set to `true`.
    pub fn with_flag(mut self, flag: ScanFlag) -> Self {
        let slot = match flag {
            ScanFlag::OsDetection => &mut self.flag_o,
            ScanFlag::DefaultScripts => &mut self.flag_sc,
            ScanFlag::ServiceVersion => &mut self.flag_sv,
            ScanFlag::Traceroute => &mut self.flag_traceroute,
            ScanFlag::Aggressive => &mut self.flag_a,
        };
        *slot = Some(true);
        self
    }

    /// Returns the payload with the given timing template injected.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Encodes the payload on one line with `", "` and `": "` separators,
    /// the form written to the console and the run log.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(serde_json::Error::custom)
    }
}

/// Single-line JSON with a space after every `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

// --- Test Cases & Results ---

/// One named request to execute against the scanning endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub payload: Payload,
}

/// The record persisted to `<results dir>/<test_name>.json` after a successful exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub test_name: String,
    pub payload: Payload,
    pub response: Value,
    pub http_code: u16,
    /// Wall-clock seconds between sending the request and receiving the full body.
    pub time_taken: f64,
    pub timestamp: NaiveDateTime,
}

/// Tally of a finished run, used for the closing console lines.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl RunOutcome {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
