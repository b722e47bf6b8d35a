use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use serde_json::json;

use crate::api_json::handlers::{
    add_slot_handler, allot_branch_ranks_handler, compute_matrix_handler, delete_branch_handler,
    delete_caste_handler, get_matrix_handler, import_students_handler, list_branches_handler,
    list_castes_handler, list_students_handler, remove_slot_handler, run_allocation_handler,
    save_allocation_handler, save_matrix_handler, update_branch_handler, update_caste_handler,
    upsert_branch_handler, upsert_caste_handler,
};

/// GET /help — endpoint index with example bodies for the POST routes.
async fn help_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "endpoints": {
            "GET /seat-matrix?year=fy&gender=male": "saved matrix document with version",
            "POST /seat-matrix/compute": {
                "year": "fy", "gender": "male",
                "total_seats": 100, "ews_seats": 10, "all_india_seats": 15,
                "reserved_seats": {"goi_jk_seats": 2, "nri_fn_pio_gulf_seats": 3}
            },
            "POST /seat-matrix": "matrix document (+ expected_version) to save",
            "GET /branches?year=fy": "branches with seat allocation weights",
            "POST /branches": {"branch": "comp", "year": "fy", "seat_allocation_weight": 1.5},
            "PUT /branches/{branch}": {"year": "fy", "seat_allocation_weight": 2.0},
            "DELETE /branches/{branch}?year=fy": "remove a branch",
            "GET /castes?year=fy": "castes with matrix percentages",
            "POST /castes": {"caste": "OPEN", "year": "fy", "seat_matrix_percentage": 50.0},
            "PUT /castes/{caste}": {"year": "fy", "seat_matrix_percentage": 45.0},
            "DELETE /castes/{caste}?year=fy": "remove a caste",
            "GET /students?year=fy&gender=male&branch=comp": "roster (branch optional)",
            "POST /students/import": {"path": "data/roster.xlsx", "year": "fy", "gender": "male"},
            "POST /allot-branch-ranks": {"year": "fy", "gender": "male"},
            "POST /allocations/run": {"year": "fy", "gender": "male", "branch": "comp"},
            "POST /allocations/save": {"year": "fy", "gender": "male", "branch": "comp"},
            "POST /allocations/slot/remove": {"year": "fy", "gender": "male", "branch": "comp", "slot": "OPEN-3"},
            "POST /allocations/slot/add": {"year": "fy", "gender": "male", "branch": "comp", "slot": "OPEN-3", "roll_no": "231042"},
        }
    }))
}

pub async fn run_server(bind_addr: &str) -> std::io::Result<()> {
    HttpServer::new(|| {
        App::new()
            // admin UI runs on a separate origin during development
            .wrap(Cors::permissive())
            .route("/seat-matrix", web::get().to(get_matrix_handler))
            .route("/seat-matrix", web::post().to(save_matrix_handler))
            .route("/seat-matrix/compute", web::post().to(compute_matrix_handler))
            .route("/branches", web::get().to(list_branches_handler))
            .route("/branches", web::post().to(upsert_branch_handler))
            .route("/branches/{branch}", web::put().to(update_branch_handler))
            .route("/branches/{branch}", web::delete().to(delete_branch_handler))
            .route("/castes", web::get().to(list_castes_handler))
            .route("/castes", web::post().to(upsert_caste_handler))
            .route("/castes/{caste}", web::put().to(update_caste_handler))
            .route("/castes/{caste}", web::delete().to(delete_caste_handler))
            .route("/students", web::get().to(list_students_handler))
            .route("/students/import", web::post().to(import_students_handler))
            .route("/allot-branch-ranks", web::post().to(allot_branch_ranks_handler))
            .route("/allocations/run", web::post().to(run_allocation_handler))
            .route("/allocations/save", web::post().to(save_allocation_handler))
            .route("/allocations/slot/remove", web::post().to(remove_slot_handler))
            .route("/allocations/slot/add", web::post().to(add_slot_handler))
            .route("/help", web::get().to(help_handler))
    })
    .bind(bind_addr)?
    .run()
    .await
}
