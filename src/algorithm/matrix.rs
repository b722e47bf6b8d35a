// Seat-matrix computation: split a total seat pool across branches by
// weight, then split each branch's share across castes by percentage.

use std::collections::BTreeMap;

use crate::error::AllotError;
use crate::models::{Branch, BranchAllocation, BranchEntry, Caste};

/// Result of one full matrix computation: the expanded per-caste seats and
/// the EWS / All-India overlays, both keyed by branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixComputation {
    pub branch_seats: BTreeMap<String, BranchEntry>,
    pub branch_allocations: BTreeMap<String, BranchAllocation>,
}

/// Rounding rule used everywhere in the matrix: half away from zero. The
/// persisted matrices were produced with this rule, so it is pinned by tests
/// and must not drift to banker's rounding.
fn round_seats(x: f64) -> u32 {
    if x <= 0.0 { 0 } else { x.round() as u32 }
}

/// Split `total_seats` across branches proportionally to their weights.
///
/// Every branch except the last gets `round(total * weight / W)`; the last
/// branch absorbs whatever remains so the split sums to `total_seats` exactly
/// regardless of rounding drift. The resulting bias toward (or against) the
/// last-listed branch is order-dependent and intentional.
pub fn split_by_weight(total_seats: u32, branches: &[Branch]) -> Result<Vec<u32>, AllotError> {
    if total_seats == 0 {
        return Err(AllotError::validation("total seats must be greater than 0"));
    }
    if branches.is_empty() {
        return Err(AllotError::validation("no branches available"));
    }
    let total_weight: f64 = branches.iter().map(|b| b.seat_allocation_weight.max(0.0)).sum();
    if total_weight <= 0.0 {
        return Err(AllotError::validation("total branch weight must be greater than 0"));
    }

    let seats_per_weight = total_seats as f64 / total_weight;
    let mut remaining = total_seats as i64;
    let mut out = Vec::with_capacity(branches.len());
    for (i, branch) in branches.iter().enumerate() {
        let seats = if i == branches.len() - 1 {
            remaining.max(0) as u32
        } else {
            round_seats(seats_per_weight * branch.seat_allocation_weight.max(0.0))
        };
        remaining -= seats as i64;
        out.push(seats);
    }
    Ok(out)
}

/// Distribute one branch's seats across castes by percentage.
///
/// Every caste except the last gets `round(branch_seats * pct / P)`, floored
/// to 1 when a nonzero percentage would round to 0, and never more than what
/// is still unallocated. The last caste takes the entire remainder. Seats
/// still left over (the pool drained before the last caste was reached) go
/// to OPEN when present, otherwise to the first caste.
pub fn split_by_percentage(branch_seats: u32, castes: &[Caste]) -> Result<Vec<u32>, AllotError> {
    if castes.is_empty() {
        return Err(AllotError::validation("no castes available"));
    }
    let total_percentage: f64 = castes.iter().map(|c| c.seat_matrix_percentage.max(0.0)).sum();
    if total_percentage <= 0.0 {
        return Err(AllotError::validation("total caste percentage must be greater than 0"));
    }

    let mut out = vec![0u32; castes.len()];
    let mut remaining = branch_seats;
    for (i, caste) in castes.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let pct = caste.seat_matrix_percentage.max(0.0);
        let mut seats = if i == castes.len() - 1 {
            remaining
        } else {
            let mut s = round_seats(branch_seats as f64 * pct / total_percentage);
            if pct > 0.0 && s == 0 {
                s = 1;
            }
            s
        };
        seats = seats.min(remaining);
        out[i] = seats;
        remaining -= seats;
    }

    if remaining > 0 {
        let idx = castes
            .iter()
            .position(|c| c.caste.eq_ignore_ascii_case("OPEN"))
            .unwrap_or(0);
        out[idx] += remaining;
    }
    Ok(out)
}

/// Compute the full matrix for one (year, gender) cohort.
///
/// Pure function of its inputs: calling it twice with the same arguments
/// yields the same matrix, so a recompute action is always safe to repeat.
/// All preconditions are checked before any distribution happens; no partial
/// result is ever returned.
pub fn compute_seat_matrix(
    total_seats: u32,
    ews_seats: u32,
    all_india_seats: u32,
    branches: &[Branch],
    castes: &[Caste],
) -> Result<MatrixComputation, AllotError> {
    if total_seats == 0 {
        return Err(AllotError::validation("total seats must be greater than 0"));
    }
    if branches.is_empty() {
        return Err(AllotError::validation("no branches available"));
    }
    if castes.is_empty() {
        return Err(AllotError::validation("no castes available"));
    }
    let total_weight: f64 = branches.iter().map(|b| b.seat_allocation_weight.max(0.0)).sum();
    if total_weight <= 0.0 {
        return Err(AllotError::validation("total branch weight must be greater than 0"));
    }
    let total_percentage: f64 = castes.iter().map(|c| c.seat_matrix_percentage.max(0.0)).sum();
    if total_percentage <= 0.0 {
        return Err(AllotError::validation("total caste percentage must be greater than 0"));
    }

    let per_branch = split_by_weight(total_seats, branches)?;
    let ews_per_branch = overlay_split(ews_seats, branches)?;
    let ai_per_branch = overlay_split(all_india_seats, branches)?;

    let mut branch_seats = BTreeMap::new();
    let mut branch_allocations = BTreeMap::new();
    for (i, branch) in branches.iter().enumerate() {
        let mut entry = BranchEntry::default();
        let caste_seats = if per_branch[i] > 0 {
            split_by_percentage(per_branch[i], castes)?
        } else {
            vec![0; castes.len()]
        };
        for (caste, &n) in castes.iter().zip(caste_seats.iter()) {
            entry.seats.insert(caste.caste.clone(), n);
        }
        branch_seats.insert(branch.branch.clone(), entry);
        branch_allocations.insert(
            branch.branch.clone(),
            BranchAllocation {
                ews_seats: ews_per_branch[i],
                all_india_seats: ai_per_branch[i],
            },
        );
    }

    Ok(MatrixComputation { branch_seats, branch_allocations })
}

// EWS and All-India pools use the same weighted split as the main pool, last
// branch absorbing the remainder, so the per-branch overlays always sum back
// to the pool exactly. An empty pool splits to all zeros.
fn overlay_split(total: u32, branches: &[Branch]) -> Result<Vec<u32>, AllotError> {
    if total == 0 {
        return Ok(vec![0; branches.len()]);
    }
    split_by_weight(total, branches)
}
