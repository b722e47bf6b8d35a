// Branch and caste administration. Branches carry the seat-allocation
// weights, castes the matrix percentages; both are scoped per year and their
// creation order is load-bearing for the computation.

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;

use crate::api_json::YearQuery;
use crate::api_json::handlers::error_response;
use crate::models::{Branch, Caste};
use crate::storage;

pub async fn list_branches_handler(query: web::Query<YearQuery>) -> impl Responder {
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::list_branches(&conn, &query.year) {
        Ok(branches) => HttpResponse::Ok().json(branches),
        Err(e) => error_response(e),
    }
}

/// POST /branches — create or replace a branch for a year.
pub async fn upsert_branch_handler(body: web::Json<Branch>) -> impl Responder {
    let branch = body.into_inner();
    if branch.branch.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "branch name is required"}));
    }
    if branch.seat_allocation_weight <= 0.0 {
        return HttpResponse::BadRequest()
            .json(json!({"error": "seat allocation weight must be greater than 0"}));
    }
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::upsert_branch(&conn, &branch) {
        Ok(()) => HttpResponse::Ok().json(json!({"status": "ok", "branch": branch.branch})),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct BranchUpdate {
    pub year: String,
    pub seat_allocation_weight: f64,
}

/// PUT /branches/{branch} — change an existing branch's weight.
pub async fn update_branch_handler(
    path: web::Path<String>,
    body: web::Json<BranchUpdate>,
) -> impl Responder {
    let name = path.into_inner();
    let update = body.into_inner();
    if update.seat_allocation_weight <= 0.0 {
        return HttpResponse::BadRequest()
            .json(json!({"error": "seat allocation weight must be greater than 0"}));
    }
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    let existing = match storage::list_branches(&conn, &update.year) {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };
    if !existing.iter().any(|b| b.branch == name) {
        return HttpResponse::NotFound()
            .json(json!({"error": format!("no branch {} for year {}", name, update.year)}));
    }
    let branch = Branch {
        branch: name.clone(),
        year: update.year,
        seat_allocation_weight: update.seat_allocation_weight,
    };
    match storage::upsert_branch(&conn, &branch) {
        Ok(()) => HttpResponse::Ok().json(json!({"status": "ok", "branch": name})),
        Err(e) => error_response(e),
    }
}

/// DELETE /branches/{branch}?year=..
pub async fn delete_branch_handler(
    path: web::Path<String>,
    query: web::Query<YearQuery>,
) -> impl Responder {
    let name = path.into_inner();
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::delete_branch(&conn, &name, &query.year) {
        Ok(true) => HttpResponse::Ok().json(json!({"status": "ok", "branch": name})),
        Ok(false) => HttpResponse::NotFound()
            .json(json!({"error": format!("no branch {} for year {}", name, query.year)})),
        Err(e) => error_response(e),
    }
}

pub async fn list_castes_handler(query: web::Query<YearQuery>) -> impl Responder {
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::list_castes(&conn, &query.year) {
        Ok(castes) => HttpResponse::Ok().json(castes),
        Err(e) => error_response(e),
    }
}

/// POST /castes — create or replace a caste for a year. Creation is allowed
/// to leave the year's percentages short of 100 while the list is still being
/// built up; edits are not (see `update_caste_handler`).
pub async fn upsert_caste_handler(body: web::Json<Caste>) -> impl Responder {
    let caste = body.into_inner();
    if caste.caste.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "caste name is required"}));
    }
    if caste.seat_matrix_percentage < 0.0 || caste.seat_matrix_percentage > 100.0 {
        return HttpResponse::BadRequest()
            .json(json!({"error": "seat matrix percentage must be between 0 and 100"}));
    }
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::upsert_caste(&conn, &caste) {
        Ok(()) => HttpResponse::Ok().json(json!({"status": "ok", "caste": caste.caste})),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CasteUpdate {
    pub year: String,
    pub seat_matrix_percentage: f64,
}

/// PUT /castes/{caste} — change an existing caste's percentage. The edit is
/// rejected unless the year's percentages still sum to 100 afterwards; the
/// calculator itself only requires a positive total, the 100 rule lives here
/// at the admin boundary.
pub async fn update_caste_handler(
    path: web::Path<String>,
    body: web::Json<CasteUpdate>,
) -> impl Responder {
    let name = path.into_inner();
    let update = body.into_inner();
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    let existing = match storage::list_castes(&conn, &update.year) {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    if !existing.iter().any(|c| c.caste == name) {
        return HttpResponse::NotFound()
            .json(json!({"error": format!("no caste {} for year {}", name, update.year)}));
    }
    let new_total: f64 = existing
        .iter()
        .map(|c| {
            if c.caste == name {
                update.seat_matrix_percentage
            } else {
                c.seat_matrix_percentage
            }
        })
        .sum();
    if (new_total - 100.0).abs() > 1e-6 {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("caste percentages for {} would sum to {}, not 100", update.year, new_total)
        }));
    }
    let caste = Caste {
        caste: name.clone(),
        year: update.year,
        seat_matrix_percentage: update.seat_matrix_percentage,
    };
    match storage::upsert_caste(&conn, &caste) {
        Ok(()) => HttpResponse::Ok().json(json!({"status": "ok", "caste": name})),
        Err(e) => error_response(e),
    }
}

/// DELETE /castes/{caste}?year=..
pub async fn delete_caste_handler(
    path: web::Path<String>,
    query: web::Query<YearQuery>,
) -> impl Responder {
    let name = path.into_inner();
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::delete_caste(&conn, &name, &query.year) {
        Ok(true) => HttpResponse::Ok().json(json!({"status": "ok", "caste": name})),
        Ok(false) => HttpResponse::NotFound()
            .json(json!({"error": format!("no caste {} for year {}", name, query.year)})),
        Err(e) => error_response(e),
    }
}
