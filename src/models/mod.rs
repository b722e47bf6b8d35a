// Core data structures of the allotment engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An academic branch (department) for one year cohort. The weight is
/// relative, not normalized: a branch receives `weight / sum(weights)` of the
/// seat pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub branch: String,
    pub year: String,
    pub seat_allocation_weight: f64,
}

/// A reservation category with a percentage entitlement (0-100). For a given
/// year the percentages across all castes are expected to sum to 100; that
/// rule is enforced where castes are edited, not inside the calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caste {
    pub caste: String,
    pub year: String,
    pub seat_matrix_percentage: f64,
}

/// Informational reserved pools. These are stored with the matrix but never
/// distributed by the calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedSeats {
    #[serde(default)]
    pub goi_jk_seats: u32,
    #[serde(default)]
    pub nri_fn_pio_gulf_seats: u32,
}

/// Seats for one branch of the matrix.
///
/// `seats` always holds the fully expanded per-caste counts — these are the
/// authoritative numbers. `common` maps a merged-group name (e.g. "SC-ST")
/// to its constituent castes; a group owns no seats of its own, its pooled
/// count is the sum of its members. The heterogeneous map shape (caste keys
/// holding numbers next to a `common` key holding definitions) exists only
/// in the persisted document, never in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEntry {
    pub seats: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub common: BTreeMap<String, Vec<String>>,
}

impl BranchEntry {
    /// Sum over every expanded per-caste cell.
    pub fn total(&self) -> u32 {
        self.seats.values().sum()
    }

    /// True if the caste belongs to some merged group of this branch.
    pub fn is_merged(&self, caste: &str) -> bool {
        self.common.values().any(|group| group.iter().any(|c| c == caste))
    }
}

/// Per-branch EWS / All-India overlay seats. Independent of `branch_seats`,
/// never subtracted from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchAllocation {
    pub ews_seats: u32,
    pub all_india_seats: u32,
}

/// The full seat matrix for one (year, gender) cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMatrix {
    pub year: String,
    pub gender: String,
    pub total_seats: u32,
    pub ews_seats: u32,
    pub all_india_seats: u32,
    pub branch_seats: BTreeMap<String, BranchEntry>,
    #[serde(default)]
    pub reserved_seats: ReservedSeats,
}

impl SeatMatrix {
    /// Sum of every expanded cell across all branches. Equals `total_seats`
    /// right after a computation; manual cell edits are expected to re-derive
    /// `total_seats` from this.
    pub fn derived_total(&self) -> u32 {
        self.branch_seats.values().map(|e| e.total()).sum()
    }
}

/// A student roster entry as the allocation core sees it. `seat_alloted`
/// holds a slot name ("OPEN-2"), a waiting name ("WAITING-1"), or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub roll_no: String,
    pub name: String,
    pub year: String,
    pub gender: String,
    pub branch: String,
    pub caste: String,
    pub admission_category: String,
    #[serde(default)]
    pub entrance_exam: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub cgpa: Option<f64>,
    #[serde(default)]
    pub backlogs: Option<u32>,
    #[serde(default)]
    pub branch_rank: Option<u32>,
    #[serde(default)]
    pub seat_alloted: Option<String>,
}
