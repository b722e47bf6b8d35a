use quickallot::algorithm::{compute_seat_matrix, split_by_percentage, split_by_weight};
use quickallot::models::{Branch, Caste};

fn branch(name: &str, weight: f64) -> Branch {
    Branch {
        branch: name.to_string(),
        year: "fy".to_string(),
        seat_allocation_weight: weight,
    }
}

fn caste(name: &str, pct: f64) -> Caste {
    Caste {
        caste: name.to_string(),
        year: "fy".to_string(),
        seat_matrix_percentage: pct,
    }
}

#[test]
fn weights_split_proportionally() {
    let branches = vec![branch("comp", 1.0), branch("it", 1.0), branch("mech", 2.0)];
    let split = split_by_weight(100, &branches).expect("split should succeed");
    assert_eq!(split, vec![25, 25, 50]);
}

#[test]
fn half_rounds_away_from_zero() {
    // 5 seats over equal weights: the first branch sees 2.5 and must get 3,
    // not 2. Persisted matrices were produced under this rule.
    let branches = vec![branch("comp", 1.0), branch("it", 1.0)];
    let split = split_by_weight(5, &branches).expect("split should succeed");
    assert_eq!(split, vec![3, 2]);
}

#[test]
fn last_branch_absorbs_rounding_drift() {
    let branches = vec![branch("comp", 1.0), branch("it", 1.0), branch("mech", 1.0)];
    let split = split_by_weight(100, &branches).expect("split should succeed");
    assert_eq!(split.iter().sum::<u32>(), 100);
    // 33.33 rounds to 33 twice, the last branch takes 34
    assert_eq!(split, vec![33, 33, 34]);
}

#[test]
fn tiny_percentage_gets_floored_to_one_seat() {
    // 5% of 10 seats rounds to 1 (0.5 -> 1 via the rounding rule); but 4% of
    // 10 rounds to 0 and still must produce a seat while seats remain.
    let castes = vec![caste("OPEN", 88.0), caste("SC", 4.0), caste("ST", 4.0), caste("OBC", 4.0)];
    let split = split_by_percentage(10, &castes).expect("split should succeed");
    assert_eq!(split[1], 1, "nonzero percentage must never round to zero seats");
    assert_eq!(split.iter().sum::<u32>(), 10);
}

#[test]
fn drained_pool_leaves_later_castes_empty() {
    let castes = vec![caste("OPEN", 85.0), caste("SC", 5.0), caste("ST", 5.0), caste("OBC", 5.0)];
    let split = split_by_percentage(10, &castes).expect("split should succeed");
    // OPEN takes round(8.5) = 9, SC takes the final seat, the rest get none
    assert_eq!(split, vec![9, 1, 0, 0]);
}

#[test]
fn percentage_split_always_sums_to_branch_seats() {
    let castes = vec![caste("sc", 50.0), caste("open", 25.0), caste("st", 25.0)];
    for seats in [1, 2, 7, 8, 13, 100] {
        let split = split_by_percentage(seats, &castes).expect("split should succeed");
        assert_eq!(split.iter().sum::<u32>(), seats, "sum broke at {} seats", seats);
    }
}

#[test]
fn matrix_total_matches_input_exactly() {
    let branches = vec![branch("comp", 1.5), branch("it", 1.0), branch("mech", 0.7)];
    let castes = vec![caste("OPEN", 50.0), caste("SC", 13.0), caste("ST", 7.0), caste("OBC", 30.0)];
    let result = compute_seat_matrix(127, 0, 0, &branches, &castes).expect("compute should succeed");
    let total: u32 = result.branch_seats.values().map(|e| e.total()).sum();
    assert_eq!(total, 127);
}

#[test]
fn computation_is_idempotent() {
    let branches = vec![branch("comp", 2.0), branch("it", 3.0)];
    let castes = vec![caste("OPEN", 60.0), caste("SC", 40.0)];
    let a = compute_seat_matrix(99, 10, 5, &branches, &castes).expect("first run");
    let b = compute_seat_matrix(99, 10, 5, &branches, &castes).expect("second run");
    assert_eq!(a, b);
}

#[test]
fn overlays_sum_back_to_their_pools() {
    let branches = vec![branch("comp", 1.0), branch("it", 2.0), branch("mech", 1.0)];
    let castes = vec![caste("OPEN", 100.0)];
    let result = compute_seat_matrix(80, 10, 15, &branches, &castes).expect("compute should succeed");
    let ews: u32 = result.branch_allocations.values().map(|a| a.ews_seats).sum();
    let ai: u32 = result.branch_allocations.values().map(|a| a.all_india_seats).sum();
    assert_eq!(ews, 10);
    assert_eq!(ai, 15);
}

#[test]
fn zero_overlay_pools_split_to_zeros() {
    let branches = vec![branch("comp", 1.0), branch("it", 1.0)];
    let castes = vec![caste("OPEN", 100.0)];
    let result = compute_seat_matrix(10, 0, 0, &branches, &castes).expect("compute should succeed");
    assert!(result.branch_allocations.values().all(|a| a.ews_seats == 0 && a.all_india_seats == 0));
}

#[test]
fn bad_inputs_are_rejected_before_any_distribution() {
    let branches = vec![branch("comp", 1.0)];
    let castes = vec![caste("OPEN", 100.0)];

    assert!(compute_seat_matrix(0, 0, 0, &branches, &castes).is_err());
    assert!(compute_seat_matrix(10, 0, 0, &[], &castes).is_err());
    assert!(compute_seat_matrix(10, 0, 0, &branches, &[]).is_err());

    let weightless = vec![branch("comp", 0.0)];
    assert!(compute_seat_matrix(10, 0, 0, &weightless, &castes).is_err());

    let pctless = vec![caste("OPEN", 0.0)];
    assert!(compute_seat_matrix(10, 0, 0, &branches, &pctless).is_err());
}
