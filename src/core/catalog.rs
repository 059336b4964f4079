//! The fixed catalog of flag combinations exercised against the scanning endpoint.
//!
//! Every base case is expanded into seven timing variants: one without a
//! `timing` field followed by one per template, `T0` through `T5`.

use crate::core::models::{Payload, ScanFlag, TestCase, Timing};
use std::fmt;
use strum::IntoEnumIterator;

use crate::core::models::ScanFlag::{
    Aggressive as A, DefaultScripts as SC, OsDetection as O, ServiceVersion as SV, Traceroute as TR,
};

/// Number of executions produced by a single base case.
pub const VARIANTS_PER_CASE: usize = 7;

/// Groups base cases by how many flags they combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CaseGroup {
    Single,
    TwoFlag,
    ThreeFlag,
    FourFlag,
    Blank,
}

/// The banner printed before the first base case of each group.
impl fmt::Display for CaseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseGroup::Single => write!(f, "Single Flag Tests"),
            CaseGroup::TwoFlag => write!(f, "Two Flag Combination Tests"),
            CaseGroup::ThreeFlag => write!(f, "Three Flag Combination Tests"),
            CaseGroup::FourFlag => write!(f, "Four Flag Combination Test"),
            CaseGroup::Blank => write!(f, "Blank Scan Test"),
        }
    }
}

/// A flag combination before timing expansion.
#[derive(Debug)]
pub struct BaseCase {
    pub name: &'static str,
    pub group: CaseGroup,
    pub flags: &'static [ScanFlag],
}

impl BaseCase {
    /// The payload for this combination without any timing template.
    pub fn payload(&self, target: &str) -> Payload {
        self.flags
            .iter()
            .fold(Payload::new(target), |payload, flag| payload.with_flag(*flag))
    }

    /// Expands the base case into its seven timing variants, in execution order.
    pub fn expand(&self, target: &str) -> Vec<TestCase> {
        let base = self.payload(target);
        let mut cases = Vec::with_capacity(VARIANTS_PER_CASE);
        cases.push(TestCase {
            name: format!("{}_no_timing", self.name),
            payload: base.clone(),
        });
        cases.extend(Timing::iter().map(|timing| TestCase {
            name: format!("{}_{}", self.name, timing.as_ref()),
            payload: base.clone().with_timing(timing),
        }));
        cases
    }
}

/// All base cases, in the order they are executed.
pub static BASE_CASES: &[BaseCase] = &[
    // --- Single flags ---
    BaseCase { name: "single_O", group: CaseGroup::Single, flags: &[O] },
    BaseCase { name: "single_sC", group: CaseGroup::Single, flags: &[SC] },
    BaseCase { name: "single_sV", group: CaseGroup::Single, flags: &[SV] },
    BaseCase { name: "single_traceroute", group: CaseGroup::Single, flags: &[TR] },
    BaseCase { name: "single_A", group: CaseGroup::Single, flags: &[A] },
    // --- Two flags ---
    BaseCase { name: "combo_O_sC", group: CaseGroup::TwoFlag, flags: &[O, SC] },
    BaseCase { name: "combo_O_sV", group: CaseGroup::TwoFlag, flags: &[O, SV] },
    BaseCase { name: "combo_O_traceroute", group: CaseGroup::TwoFlag, flags: &[O, TR] },
    BaseCase { name: "combo_sC_sV", group: CaseGroup::TwoFlag, flags: &[SC, SV] },
    BaseCase { name: "combo_sC_traceroute", group: CaseGroup::TwoFlag, flags: &[SC, TR] },
    BaseCase { name: "combo_sV_traceroute", group: CaseGroup::TwoFlag, flags: &[SV, TR] },
    BaseCase { name: "combo_A_traceroute", group: CaseGroup::TwoFlag, flags: &[A, TR] },
    // --- Three flags ---
    BaseCase { name: "combo_O_sC_sV", group: CaseGroup::ThreeFlag, flags: &[O, SC, SV] },
    BaseCase { name: "combo_O_sC_traceroute", group: CaseGroup::ThreeFlag, flags: &[O, SC, TR] },
    BaseCase { name: "combo_O_sV_traceroute", group: CaseGroup::ThreeFlag, flags: &[O, SV, TR] },
    BaseCase { name: "combo_sC_sV_traceroute", group: CaseGroup::ThreeFlag, flags: &[SC, SV, TR] },
    // --- Four flags ---
    BaseCase { name: "combo_O_sC_sV_traceroute", group: CaseGroup::FourFlag, flags: &[O, SC, SV, TR] },
    // --- No flags ---
    BaseCase { name: "blank_scan", group: CaseGroup::Blank, flags: &[] },
];

/// Total number of executions the catalog produces.
pub fn total_executions() -> usize {
    BASE_CASES.len() * VARIANTS_PER_CASE
}
