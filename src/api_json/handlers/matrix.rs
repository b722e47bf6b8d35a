use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::algorithm::{compute_seat_matrix, matrix_to_document};
use crate::api_json::handlers::error_response;
use crate::api_json::{ComputeMatrixRequest, MatrixQuery, parse_save_matrix};
use crate::models::SeatMatrix;
use crate::storage;

/// GET /seat-matrix?year=..&gender=.. — the saved matrix document plus its
/// version, or 404 when no matrix has been saved for that cohort yet.
pub async fn get_matrix_handler(query: web::Query<MatrixQuery>) -> impl Responder {
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::load_seat_matrix(&conn, &query.year, &query.gender) {
        Ok(Some((matrix, version))) => {
            let mut doc = matrix_to_document(&matrix);
            doc["version"] = json!(version);
            HttpResponse::Ok().json(doc)
        }
        Ok(None) => HttpResponse::NotFound().json(json!({
            "error": format!("no seat matrix saved for {} {}", query.year, query.gender)
        })),
        Err(e) => error_response(e),
    }
}

/// POST /seat-matrix/compute — run the computation over the branches and
/// castes configured for the year. Nothing is saved; the manager reviews and
/// edits the result, then POSTs it to /seat-matrix.
pub async fn compute_matrix_handler(body: web::Json<ComputeMatrixRequest>) -> impl Responder {
    let req = body.into_inner();
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    let branches = match storage::list_branches(&conn, &req.year) {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };
    let castes = match storage::list_castes(&conn, &req.year) {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };

    let computation = match compute_seat_matrix(
        req.total_seats,
        req.ews_seats,
        req.all_india_seats,
        &branches,
        &castes,
    ) {
        Ok(c) => c,
        Err(e) => return error_response(Box::new(e)),
    };

    let matrix = SeatMatrix {
        year: req.year,
        gender: req.gender,
        total_seats: req.total_seats,
        ews_seats: req.ews_seats,
        all_india_seats: req.all_india_seats,
        branch_seats: computation.branch_seats,
        reserved_seats: req.reserved_seats,
    };
    let mut doc = matrix_to_document(&matrix);
    doc["branch_allocations"] = json!(computation.branch_allocations);
    doc["saved"] = json!(false);
    HttpResponse::Ok().json(doc)
}

/// POST /seat-matrix — save an edited matrix document. The body is the wire
/// document (merged groups collapsed) plus an optional `expected_version`;
/// a stale version yields 409 instead of overwriting.
pub async fn save_matrix_handler(body: web::Json<serde_json::Value>) -> impl Responder {
    let (matrix, expected_version) = match parse_save_matrix(&body.into_inner()) {
        Ok(parsed) => parsed,
        Err(e) => return error_response(Box::new(e)),
    };
    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match storage::save_seat_matrix(&conn, &matrix, expected_version) {
        Ok(version) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "year": matrix.year,
            "gender": matrix.gender,
            "version": version,
            "total_seats": matrix.derived_total(),
        })),
        Err(e) => error_response(e),
    }
}
