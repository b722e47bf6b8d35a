use rusqlite::Connection;

use quickallot::algorithm::merge_castes;
use quickallot::error::AllotError;
use quickallot::models::{Branch, BranchEntry, Caste, SeatMatrix, Student};
use quickallot::storage;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    storage::init_db(&conn).expect("schema");
    conn
}

fn branch(name: &str, weight: f64) -> Branch {
    Branch {
        branch: name.to_string(),
        year: "fy".to_string(),
        seat_allocation_weight: weight,
    }
}

fn student(roll_no: &str, branch: &str) -> Student {
    Student {
        roll_no: roll_no.to_string(),
        name: format!("Student {}", roll_no),
        year: "fy".to_string(),
        gender: "male".to_string(),
        branch: branch.to_string(),
        caste: "OPEN".to_string(),
        admission_category: "mht_cet".to_string(),
        entrance_exam: Some("mht_cet".to_string()),
        rank: Some(100),
        cgpa: None,
        backlogs: None,
        branch_rank: None,
        seat_alloted: None,
    }
}

fn matrix() -> SeatMatrix {
    let mut comp = BranchEntry::default();
    comp.seats.insert("OPEN".to_string(), 6);
    comp.seats.insert("SC".to_string(), 3);
    comp.seats.insert("ST".to_string(), 2);
    merge_castes(&mut comp, &["SC".to_string(), "ST".to_string()]).expect("merge");

    let mut branch_seats = std::collections::BTreeMap::new();
    branch_seats.insert("comp".to_string(), comp);
    SeatMatrix {
        year: "fy".to_string(),
        gender: "male".to_string(),
        total_seats: 11,
        ews_seats: 1,
        all_india_seats: 2,
        branch_seats,
        reserved_seats: Default::default(),
    }
}

#[test]
fn branches_list_in_creation_order_and_update_in_place() {
    let conn = conn();
    storage::upsert_branch(&conn, &branch("mech", 2.0)).expect("insert");
    storage::upsert_branch(&conn, &branch("comp", 1.0)).expect("insert");
    storage::upsert_branch(&conn, &branch("it", 1.5)).expect("insert");

    // updating a weight must not move the branch to the end of the list;
    // list position decides who absorbs the rounding remainder
    storage::upsert_branch(&conn, &branch("mech", 3.0)).expect("update");

    let branches = storage::list_branches(&conn, "fy").expect("list");
    let names: Vec<&str> = branches.iter().map(|b| b.branch.as_str()).collect();
    assert_eq!(names, vec!["mech", "comp", "it"]);
    assert_eq!(branches[0].seat_allocation_weight, 3.0);
}

#[test]
fn castes_scope_by_year() {
    let conn = conn();
    let open = Caste {
        caste: "OPEN".to_string(),
        year: "fy".to_string(),
        seat_matrix_percentage: 60.0,
    };
    let sc = Caste {
        caste: "SC".to_string(),
        year: "sy".to_string(),
        seat_matrix_percentage: 40.0,
    };
    storage::upsert_caste(&conn, &open).expect("insert");
    storage::upsert_caste(&conn, &sc).expect("insert");

    let fy = storage::list_castes(&conn, "fy").expect("list");
    assert_eq!(fy.len(), 1);
    assert_eq!(fy[0].caste, "OPEN");

    assert!(storage::delete_caste(&conn, "OPEN", "fy").expect("delete"));
    assert!(!storage::delete_caste(&conn, "OPEN", "fy").expect("second delete"));
}

#[test]
fn students_upsert_and_filter_by_branch() {
    let conn = conn();
    let roster = vec![student("s1", "comp"), student("s2", "it"), student("s3", "comp")];
    assert_eq!(storage::upsert_students(&conn, &roster).expect("import"), 3);

    // reimport with a changed name replaces, never duplicates
    let mut changed = student("s1", "comp");
    changed.name = "Renamed".to_string();
    storage::upsert_students(&conn, &[changed]).expect("reimport");

    let all = storage::list_students(&conn, "fy", "male", None).expect("list");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].name, "Renamed");

    let comp = storage::list_students(&conn, "fy", "male", Some("comp")).expect("filter");
    assert_eq!(comp.len(), 2);
}

#[test]
fn allocation_updates_write_seat_assignments() {
    let conn = conn();
    storage::upsert_students(&conn, &[student("s1", "comp"), student("s2", "comp")])
        .expect("import");
    let assignments = vec![
        ("s1".to_string(), Some("OPEN-1".to_string())),
        ("s2".to_string(), Some("WAITING".to_string())),
    ];
    assert_eq!(storage::save_allocations(&conn, &assignments).expect("save"), 2);

    let students = storage::list_students(&conn, "fy", "male", None).expect("list");
    assert_eq!(students[0].seat_alloted.as_deref(), Some("OPEN-1"));
    assert_eq!(students[1].seat_alloted.as_deref(), Some("WAITING"));
}

#[test]
fn seat_matrix_round_trips_with_merged_groups() {
    let conn = conn();
    let m = matrix();
    let version = storage::save_seat_matrix(&conn, &m, None).expect("save");
    assert_eq!(version, 1);

    let (loaded, loaded_version) = storage::load_seat_matrix(&conn, "fy", "male")
        .expect("load")
        .expect("present");
    assert_eq!(loaded_version, 1);
    assert_eq!(loaded, m);
    assert_eq!(loaded.branch_seats["comp"].seats["SC"], 3);
    assert_eq!(loaded.branch_seats["comp"].common["SC-ST"].len(), 2);
}

#[test]
fn missing_matrix_loads_as_none() {
    let conn = conn();
    assert!(storage::load_seat_matrix(&conn, "fy", "male").expect("load").is_none());
}

#[test]
fn stale_saves_conflict_instead_of_overwriting() {
    let conn = conn();
    let m = matrix();
    storage::save_seat_matrix(&conn, &m, None).expect("first save");
    let v2 = storage::save_seat_matrix(&conn, &m, Some(1)).expect("second save");
    assert_eq!(v2, 2);

    // a writer still holding version 1 must be rejected
    let err = storage::save_seat_matrix(&conn, &m, Some(1)).unwrap_err();
    match err.downcast_ref::<AllotError>() {
        Some(AllotError::Conflict(_)) => {}
        other => panic!("expected a conflict, got {:?}", other),
    }

    // and a save that never loaded a version at all is rejected too
    assert!(storage::save_seat_matrix(&conn, &m, None).is_err());

    let (_, version) = storage::load_seat_matrix(&conn, "fy", "male")
        .expect("load")
        .expect("present");
    assert_eq!(version, 2);
}
