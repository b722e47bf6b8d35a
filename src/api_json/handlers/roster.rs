// Roster and allocation handlers: student listing and import, branch-rank
// assignment, allocation runs and manual slot edits.

use actix_web::{HttpResponse, Responder, web};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::algorithm::{Allocation, assign_branch_ranks};
use crate::api_json::handlers::error_response;
use crate::api_json::{AllocateRequest, ImportRequest, RanksRequest, SlotEditRequest};
use crate::excel::read_roster_xlsx;
use crate::models::{BranchEntry, Student};
use crate::storage;

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub year: String,
    #[serde(default = "male")]
    pub gender: String,
    #[serde(default)]
    pub branch: Option<String>,
}

fn male() -> String {
    "male".to_string()
}

pub async fn list_students_handler(query: web::Query<RosterQuery>) -> impl Responder {
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::list_students(&conn, &query.year, &query.gender, query.branch.as_deref()) {
        Ok(students) => HttpResponse::Ok().json(students),
        Err(e) => error_response(e),
    }
}

/// POST /students/import — parse an uploaded roster .xlsx (already on disk)
/// and upsert its rows into the students table.
pub async fn import_students_handler(body: web::Json<ImportRequest>) -> impl Responder {
    let req = body.into_inner();
    let students = match read_roster_xlsx(&req.path, &req.year, &req.gender) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    if students.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "roster sheet has no student rows"}));
    }
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::upsert_students(&conn, &students) {
        Ok(stored) => HttpResponse::Ok().json(json!({"status": "ok", "imported": stored})),
        Err(e) => error_response(e),
    }
}

/// POST /allot-branch-ranks — rank every branch group of the cohort and
/// persist the resulting ranks.
pub async fn allot_branch_ranks_handler(body: web::Json<RanksRequest>) -> impl Responder {
    let req = body.into_inner();
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    let mut students = match storage::list_students(&conn, &req.year, &req.gender, None) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    if students.is_empty() {
        return HttpResponse::NotFound()
            .json(json!({"error": format!("no students for {} {}", req.year, req.gender)}));
    }
    let changed = assign_branch_ranks(&mut students);
    match storage::save_branch_ranks(&conn, &students) {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "students": students.len(),
            "ranks_changed": changed,
        })),
        Err(e) => error_response(e),
    }
}

// Shared setup for every allocation handler: the branch's matrix entry, the
// caste order for the year, and the branch roster.
fn allocation_context(
    conn: &Connection,
    year: &str,
    gender: &str,
    branch: &str,
) -> Result<(BranchEntry, Vec<String>, Vec<Student>), Box<dyn std::error::Error>> {
    let (matrix, _) = storage::load_seat_matrix(conn, year, gender)?.ok_or_else(|| {
        crate::error::AllotError::state(format!("no seat matrix saved for {} {}", year, gender))
    })?;
    let entry = matrix.branch_seats.get(branch).cloned().ok_or_else(|| {
        crate::error::AllotError::state(format!("branch {} is not in the seat matrix", branch))
    })?;
    let caste_order: Vec<String> = storage::list_castes(conn, year)?
        .into_iter()
        .map(|c| c.caste)
        .collect();
    let students = storage::list_students(conn, year, gender, Some(branch))?;
    Ok((entry, caste_order, students))
}

fn allocation_to_json(alloc: &Allocation, entry: &BranchEntry, caste_order: &[String]) -> Value {
    let slots: Vec<Value> = alloc
        .slot_names()
        .iter()
        .map(|name| json!({"slot": name, "student": alloc.occupant(name)}))
        .collect();
    let waiting: Vec<Value> = alloc
        .waiting_slots()
        .into_iter()
        .map(|(name, student)| json!({"slot": name, "student": student}))
        .collect();
    json!({
        "slots": slots,
        "waiting": waiting,
        "occupied": alloc.occupied_count(),
        "available_seats": alloc.available_seats(entry, caste_order),
    })
}

/// POST /allocations/run — greedy allocation of the branch roster into the
/// branch's slots, in branch-rank order. Nothing is persisted; the result is
/// a proposal for review.
pub async fn run_allocation_handler(body: web::Json<AllocateRequest>) -> impl Responder {
    let req = body.into_inner();
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    let (entry, caste_order, students) =
        match allocation_context(&conn, &req.year, &req.gender, &req.branch) {
            Ok(ctx) => ctx,
            Err(e) => return error_response(e),
        };
    let alloc = Allocation::allocate(&students, &entry, &caste_order);
    HttpResponse::Ok().json(allocation_to_json(&alloc, &entry, &caste_order))
}

/// POST /allocations/save — run the greedy pass and persist the resulting
/// `seat_alloted` values (slot names for seated students, the waiting marker
/// for everyone else).
pub async fn save_allocation_handler(body: web::Json<AllocateRequest>) -> impl Responder {
    let req = body.into_inner();
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    let (entry, caste_order, students) =
        match allocation_context(&conn, &req.year, &req.gender, &req.branch) {
            Ok(ctx) => ctx,
            Err(e) => return error_response(e),
        };
    let alloc = Allocation::allocate(&students, &entry, &caste_order);
    match storage::save_allocations(&conn, &alloc.assignments()) {
        Ok(updated) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "seated": alloc.occupied_count(),
            "waiting": alloc.waiting().len(),
            "updated": updated,
        })),
        Err(e) => error_response(e),
    }
}

/// POST /allocations/slot/remove — vacate one slot. The removed student
/// rejoins the waiting list in rank order and the change is persisted
/// immediately.
pub async fn remove_slot_handler(body: web::Json<SlotEditRequest>) -> impl Responder {
    let req = body.into_inner();
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    let (entry, caste_order, students) =
        match allocation_context(&conn, &req.year, &req.gender, &req.branch) {
            Ok(ctx) => ctx,
            Err(e) => return error_response(e),
        };
    let mut alloc = Allocation::from_assignments(&students, &entry, &caste_order);
    if let Err(e) = alloc.remove(&req.slot) {
        return error_response(Box::new(e));
    }
    match storage::save_allocations(&conn, &alloc.assignments()) {
        Ok(_) => HttpResponse::Ok().json(allocation_to_json(&alloc, &entry, &caste_order)),
        Err(e) => error_response(e),
    }
}

/// POST /allocations/slot/add — seat a waiting student into an empty slot.
/// Occupied slots are never overwritten; vacate first.
pub async fn add_slot_handler(body: web::Json<SlotEditRequest>) -> impl Responder {
    let req = body.into_inner();
    let roll_no = match req.roll_no.as_deref() {
        Some(r) if !r.trim().is_empty() => r.to_string(),
        _ => return HttpResponse::BadRequest().json(json!({"error": "roll_no is required"})),
    };
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    let (entry, caste_order, students) =
        match allocation_context(&conn, &req.year, &req.gender, &req.branch) {
            Ok(ctx) => ctx,
            Err(e) => return error_response(e),
        };
    let mut alloc = Allocation::from_assignments(&students, &entry, &caste_order);
    if let Err(e) = alloc.add(&roll_no, &req.slot) {
        return error_response(Box::new(e));
    }
    match storage::save_allocations(&conn, &alloc.assignments()) {
        Ok(_) => HttpResponse::Ok().json(allocation_to_json(&alloc, &entry, &caste_order)),
        Err(e) => error_response(e),
    }
}
