use std::collections::BTreeMap;

use quickallot::algorithm::{
    collapse_branch_entry, expand_branch_entry, expand_group, group_total, matrix_from_document,
    matrix_to_document, merge_castes, unmerge_castes,
};
use quickallot::error::AllotError;
use quickallot::models::{BranchEntry, SeatMatrix};

fn entry(cells: &[(&str, u32)]) -> BranchEntry {
    let mut e = BranchEntry::default();
    for (caste, n) in cells {
        e.seats.insert(caste.to_string(), *n);
    }
    e
}

#[test]
fn merge_needs_at_least_two_castes() {
    let mut e = entry(&[("OPEN", 6), ("SC", 3)]);
    let err = merge_castes(&mut e, &["SC".to_string()]).unwrap_err();
    assert!(matches!(err, AllotError::Validation(_)));
}

#[test]
fn merge_rejects_already_merged_member() {
    let mut e = entry(&[("OPEN", 6), ("SC", 3), ("ST", 2), ("OBC", 4)]);
    merge_castes(&mut e, &["SC".to_string(), "ST".to_string()]).expect("first merge");
    let err = merge_castes(&mut e, &["ST".to_string(), "OBC".to_string()]).unwrap_err();
    assert!(matches!(err, AllotError::Validation(_)));
}

#[test]
fn merged_group_is_named_by_its_members() {
    let mut e = entry(&[("SC", 3), ("ST", 2)]);
    let name = merge_castes(&mut e, &["SC".to_string(), "ST".to_string()]).expect("merge");
    assert_eq!(name, "SC-ST");
    assert_eq!(group_total(&e, "SC-ST").expect("group total"), 5);
}

#[test]
fn expansion_floor_divides_with_remainder_to_first() {
    let members = vec!["SC".to_string(), "ST".to_string()];
    let expanded = expand_group(5, &members);
    assert_eq!(expanded, vec![("SC".to_string(), 3), ("ST".to_string(), 2)]);

    let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    assert_eq!(
        expand_group(7, &three),
        vec![("a".to_string(), 3), ("b".to_string(), 2), ("c".to_string(), 2)]
    );
    assert_eq!(expand_group(0, &members), vec![("SC".to_string(), 0), ("ST".to_string(), 0)]);
}

#[test]
fn collapse_pools_merged_members_under_group_name() {
    let mut e = entry(&[("OPEN", 6), ("SC", 3), ("ST", 2)]);
    merge_castes(&mut e, &["SC".to_string(), "ST".to_string()]).expect("merge");

    let collapsed = collapse_branch_entry(&e);
    assert_eq!(collapsed["OPEN"], 6);
    assert_eq!(collapsed["SC-ST"], 5);
    assert!(collapsed.get("SC").is_none(), "merged members must not appear standalone");
    assert_eq!(collapsed["common"]["SC-ST"][0], "SC");
}

#[test]
fn collapse_then_expand_recovers_per_caste_counts() {
    let mut e = entry(&[("OPEN", 6), ("SC", 3), ("ST", 2)]);
    merge_castes(&mut e, &["SC".to_string(), "ST".to_string()]).expect("merge");

    let restored = expand_branch_entry(&collapse_branch_entry(&e)).expect("expand");
    assert_eq!(restored.seats["OPEN"], 6);
    // 5 pooled seats over [SC, ST]: floor division, remainder to the first
    assert_eq!(restored.seats["SC"], 3);
    assert_eq!(restored.seats["ST"], 2);
    assert_eq!(restored.common["SC-ST"], vec!["SC".to_string(), "ST".to_string()]);
    assert_eq!(restored.total(), e.total());
}

#[test]
fn unmerge_keeps_expanded_counts() {
    let mut e = entry(&[("SC", 3), ("ST", 2)]);
    merge_castes(&mut e, &["SC".to_string(), "ST".to_string()]).expect("merge");
    unmerge_castes(&mut e, "SC-ST").expect("unmerge");
    assert!(e.common.is_empty());
    assert_eq!(e.seats["SC"], 3);
    assert_eq!(e.seats["ST"], 2);
}

#[test]
fn unmerge_of_unknown_group_is_a_state_error() {
    let mut e = entry(&[("SC", 3)]);
    let err = unmerge_castes(&mut e, "SC-ST").unwrap_err();
    assert!(matches!(err, AllotError::State(_)));
}

#[test]
fn matrix_document_round_trips_through_the_wire_shape() {
    let mut comp = entry(&[("OPEN", 10), ("SC", 3), ("ST", 2)]);
    merge_castes(&mut comp, &["SC".to_string(), "ST".to_string()]).expect("merge");
    let it = entry(&[("OPEN", 8), ("SC", 2), ("ST", 1)]);

    let mut branch_seats = BTreeMap::new();
    branch_seats.insert("comp".to_string(), comp);
    branch_seats.insert("it".to_string(), it);
    let matrix = SeatMatrix {
        year: "fy".to_string(),
        gender: "male".to_string(),
        total_seats: 26,
        ews_seats: 2,
        all_india_seats: 4,
        branch_seats,
        reserved_seats: Default::default(),
    };

    let restored = matrix_from_document(&matrix_to_document(&matrix)).expect("parse");
    assert_eq!(restored, matrix);
    assert_eq!(restored.derived_total(), 26);
}

#[test]
fn documents_with_bad_cells_are_rejected() {
    let doc = serde_json::json!({
        "year": "fy",
        "gender": "male",
        "total_seats": 10,
        "ews_seats": 0,
        "all_india_seats": 0,
        "branch_seats": {"comp": {"OPEN": "six"}}
    });
    let err = matrix_from_document(&doc).unwrap_err();
    assert!(matches!(err, AllotError::Validation(_)));
}
