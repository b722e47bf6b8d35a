// Branch-rank assignment. Senior years rank by CGPA (descending); first
// years rank by entrance-exam rank, interleaving the MHT-CET and JEE streams
// in proportion to their sizes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::Student;

pub const EXAM_CET: &str = "mht_cet";
pub const EXAM_JEE: &str = "jee_mains";
pub const FIRST_YEAR: &str = "fy";

/// Assign 1-based `branch_rank` values within each branch group of the
/// roster. Returns how many students changed rank. First-year students with
/// neither a CET nor a JEE record are left unranked.
pub fn assign_branch_ranks(students: &mut [Student]) -> usize {
    let mut by_branch: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, s) in students.iter().enumerate() {
        by_branch.entry(s.branch.clone()).or_default().push(i);
    }

    let mut updated = 0;
    for idxs in by_branch.values() {
        let first_year = idxs.iter().any(|&i| students[i].year == FIRST_YEAR);
        let ordered = if first_year {
            interleave_entrance_ranks(students, idxs)
        } else {
            order_by_cgpa(students, idxs)
        };
        for (pos, &i) in ordered.iter().enumerate() {
            let rank = pos as u32 + 1;
            if students[i].branch_rank != Some(rank) {
                students[i].branch_rank = Some(rank);
                updated += 1;
            }
        }
    }
    updated
}

// Higher CGPA gets the lower (better) rank number; a missing CGPA counts as 0.
fn order_by_cgpa(students: &[Student], idxs: &[usize]) -> Vec<usize> {
    let mut ordered = idxs.to_vec();
    ordered.sort_by(|&a, &b| {
        let ca = students[a].cgpa.unwrap_or(0.0);
        let cb = students[b].cgpa.unwrap_or(0.0);
        cb.partial_cmp(&ca).unwrap_or(Ordering::Equal)
    });
    ordered
}

// First-year ordering: both exam streams sort by entrance rank ascending,
// then interleave `ceil(cet / jee)` CET entries per JEE entry so the merged
// order reflects the streams' relative sizes.
fn interleave_entrance_ranks(students: &[Student], idxs: &[usize]) -> Vec<usize> {
    let mut cet: Vec<usize> = idxs
        .iter()
        .copied()
        .filter(|&i| students[i].entrance_exam.as_deref() == Some(EXAM_CET))
        .collect();
    let mut jee: Vec<usize> = idxs
        .iter()
        .copied()
        .filter(|&i| students[i].entrance_exam.as_deref() == Some(EXAM_JEE))
        .collect();
    cet.sort_by_key(|&i| students[i].rank.unwrap_or(u32::MAX));
    jee.sort_by_key(|&i| students[i].rank.unwrap_or(u32::MAX));

    if cet.is_empty() {
        return jee;
    }
    if jee.is_empty() {
        return cet;
    }

    let interval = cet.len().div_ceil(jee.len());
    let mut out = Vec::with_capacity(cet.len() + jee.len());
    let mut ci = 0;
    let mut ji = 0;
    while ci < cet.len() || ji < jee.len() {
        for _ in 0..interval {
            if ci < cet.len() {
                out.push(cet[ci]);
                ci += 1;
            }
        }
        if ji < jee.len() {
            out.push(jee[ji]);
            ji += 1;
        }
        if ji >= jee.len() && ci < cet.len() {
            out.extend_from_slice(&cet[ci..]);
            ci = cet.len();
        }
    }
    out
}
