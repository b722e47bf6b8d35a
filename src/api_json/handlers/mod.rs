pub mod admin;
pub mod matrix;
pub mod roster;

pub use admin::*;
pub use matrix::*;
pub use roster::*;

use actix_web::HttpResponse;
use serde_json::json;

use crate::error::AllotError;

/// Map an error bubbled up from storage or the algorithms to an HTTP
/// response: validation errors are the caller's fault, conflicts mean the
/// state moved underneath them, state errors name a missing or unusable
/// target. Anything else is a server-side failure.
pub fn error_response(err: Box<dyn std::error::Error>) -> HttpResponse {
    match err.downcast_ref::<AllotError>() {
        Some(AllotError::Validation(msg)) => {
            HttpResponse::BadRequest().json(json!({"error": msg}))
        }
        Some(AllotError::Conflict(msg)) => HttpResponse::Conflict().json(json!({"error": msg})),
        Some(AllotError::State(msg)) => HttpResponse::NotFound().json(json!({"error": msg})),
        None => HttpResponse::InternalServerError().json(json!({"error": format!("{}", err)})),
    }
}
