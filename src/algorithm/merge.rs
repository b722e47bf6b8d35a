// Merged caste groups: pooled editing of two or more castes within a branch,
// and the collapse/expand transforms applied at the persistence boundary.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::AllotError;
use crate::models::{BranchEntry, ReservedSeats, SeatMatrix};

/// Reserved key inside a persisted branch map that holds the merge
/// definitions (group name -> constituent castes).
pub const COMMON_KEY: &str = "common";

/// Group two or more castes under a single pooled name for one branch. The
/// group name is the caste names joined with `-` in selection order.
pub fn merge_castes(entry: &mut BranchEntry, castes: &[String]) -> Result<String, AllotError> {
    if castes.len() < 2 {
        return Err(AllotError::validation("select at least two castes to merge"));
    }
    for caste in castes {
        if entry.is_merged(caste) {
            return Err(AllotError::validation(format!(
                "caste {} is already merged for this branch",
                caste
            )));
        }
    }
    let name = castes.join("-");
    entry.common.insert(name.clone(), castes.to_vec());
    Ok(name)
}

/// Remove a merge group. The expanded per-caste counts stay exactly as they
/// are; only the grouping metadata goes away.
pub fn unmerge_castes(entry: &mut BranchEntry, group: &str) -> Result<(), AllotError> {
    if entry.common.remove(group).is_none() {
        return Err(AllotError::state(format!("no merged group named {}", group)));
    }
    Ok(())
}

/// Distribute a pooled seat count evenly across the group members: floor
/// division, with the first `total % n` members taking one extra seat each.
pub fn expand_group(total: u32, members: &[String]) -> Vec<(String, u32)> {
    let n = members.len() as u32;
    if n == 0 {
        return Vec::new();
    }
    let per = total / n;
    let rem = total % n;
    members
        .iter()
        .enumerate()
        .map(|(i, m)| (m.clone(), per + if (i as u32) < rem { 1 } else { 0 }))
        .collect()
}

/// Pooled seat count of a group: the sum of its members' expanded counts.
pub fn group_total(entry: &BranchEntry, group: &str) -> Result<u32, AllotError> {
    let members = entry
        .common
        .get(group)
        .ok_or_else(|| AllotError::state(format!("no merged group named {}", group)))?;
    Ok(members.iter().map(|m| entry.seats.get(m).copied().unwrap_or(0)).sum())
}

/// Collapse one branch entry into the persisted map shape: merged members
/// fold into a single pooled count under the group name, and the group
/// definitions go under the reserved `common` key.
pub fn collapse_branch_entry(entry: &BranchEntry) -> Value {
    let mut map = Map::new();
    for (caste, &seats) in &entry.seats {
        if !entry.is_merged(caste) {
            map.insert(caste.clone(), json!(seats));
        }
    }
    for (group, members) in &entry.common {
        let total: u32 = members.iter().map(|m| entry.seats.get(m).copied().unwrap_or(0)).sum();
        map.insert(group.clone(), json!(total));
    }
    if !entry.common.is_empty() {
        map.insert(COMMON_KEY.to_string(), json!(entry.common));
    }
    Value::Object(map)
}

/// Inverse of `collapse_branch_entry`: pooled group counts are re-expanded
/// into individual caste counts via `expand_group`.
pub fn expand_branch_entry(value: &Value) -> Result<BranchEntry, AllotError> {
    let map = value
        .as_object()
        .ok_or_else(|| AllotError::validation("branch entry must be a JSON object"))?;

    let mut entry = BranchEntry::default();
    if let Some(common) = map.get(COMMON_KEY) {
        let defs: BTreeMap<String, Vec<String>> = serde_json::from_value(common.clone())
            .map_err(|e| AllotError::validation(format!("bad merge definitions: {}", e)))?;
        // group members start at 0 in case their pooled count is absent
        for members in defs.values() {
            for m in members {
                entry.seats.insert(m.clone(), 0);
            }
        }
        entry.common = defs;
    }

    for (key, val) in map {
        if key == COMMON_KEY {
            continue;
        }
        let seats = val.as_u64().ok_or_else(|| {
            AllotError::validation(format!("seat count for {} must be a non-negative integer", key))
        })? as u32;
        if let Some(members) = entry.common.get(key).cloned() {
            for (caste, n) in expand_group(seats, &members) {
                entry.seats.insert(caste, n);
            }
        } else {
            entry.seats.insert(key.clone(), seats);
        }
    }
    Ok(entry)
}

/// Serialize a matrix into the persisted document shape, collapsing every
/// branch's merged groups.
pub fn matrix_to_document(matrix: &SeatMatrix) -> Value {
    let mut branch_seats = Map::new();
    for (branch, entry) in &matrix.branch_seats {
        branch_seats.insert(branch.clone(), collapse_branch_entry(entry));
    }
    json!({
        "year": matrix.year,
        "gender": matrix.gender,
        "total_seats": matrix.total_seats,
        "ews_seats": matrix.ews_seats,
        "all_india_seats": matrix.all_india_seats,
        "branch_seats": branch_seats,
        "reserved_seats": matrix.reserved_seats,
    })
}

/// Parse a persisted document back into a matrix, re-expanding every pooled
/// group so the in-memory entries hold individual caste counts again.
pub fn matrix_from_document(doc: &Value) -> Result<SeatMatrix, AllotError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| AllotError::validation("seat matrix document must be a JSON object"))?;

    let field = |name: &str| -> Result<&Value, AllotError> {
        obj.get(name)
            .ok_or_else(|| AllotError::validation(format!("seat matrix document missing {}", name)))
    };
    let int_field = |name: &str| -> Result<u32, AllotError> {
        field(name)?
            .as_u64()
            .map(|v| v as u32)
            .ok_or_else(|| AllotError::validation(format!("{} must be a non-negative integer", name)))
    };
    let str_field = |name: &str| -> Result<String, AllotError> {
        field(name)?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AllotError::validation(format!("{} must be a string", name)))
    };

    let mut branch_seats = BTreeMap::new();
    let branches = field("branch_seats")?
        .as_object()
        .ok_or_else(|| AllotError::validation("branch_seats must be a JSON object"))?;
    for (branch, entry) in branches {
        branch_seats.insert(branch.clone(), expand_branch_entry(entry)?);
    }

    let reserved_seats: ReservedSeats = match obj.get("reserved_seats") {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| AllotError::validation(format!("bad reserved_seats: {}", e)))?,
        None => ReservedSeats::default(),
    };

    Ok(SeatMatrix {
        year: str_field("year")?,
        gender: str_field("gender")?,
        total_seats: int_field("total_seats")?,
        ews_seats: int_field("ews_seats")?,
        all_india_seats: int_field("all_india_seats")?,
        branch_seats,
        reserved_seats,
    })
}
