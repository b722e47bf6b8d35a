pub mod handlers;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::algorithm::matrix_from_document;
use crate::error::AllotError;
use crate::models::SeatMatrix;

fn default_gender() -> String {
    "male".to_string()
}

/// Query parameter selecting a year's configuration: `?year=fy`.
#[derive(Debug, Serialize, Deserialize)]
pub struct YearQuery {
    pub year: String,
}

/// Query parameters selecting one matrix: `?year=fy&gender=male`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixQuery {
    pub year: String,
    #[serde(default = "default_gender")]
    pub gender: String,
}

/// Input for a matrix computation.
///
/// # Expected JSON:
/// ```json
/// {
///   "year": "fy",
///   "gender": "male",
///   "total_seats": 100,
///   "ews_seats": 10,
///   "all_india_seats": 15,
///   "reserved_seats": { "goi_jk_seats": 2, "nri_fn_pio_gulf_seats": 3 }
/// }
/// ```
/// `ews_seats`, `all_india_seats` and `reserved_seats` default to zero when
/// absent. Branches and castes are not part of the request; the computation
/// uses the ones configured for the year.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComputeMatrixRequest {
    pub year: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    pub total_seats: u32,
    #[serde(default)]
    pub ews_seats: u32,
    #[serde(default)]
    pub all_india_seats: u32,
    #[serde(default)]
    pub reserved_seats: crate::models::ReservedSeats,
}

/// Selects one branch's roster and matrix column for allocation runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct AllocateRequest {
    pub year: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    pub branch: String,
}

/// Manual slot edit: remove needs only `slot`; add also needs `roll_no`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SlotEditRequest {
    pub year: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    pub branch: String,
    pub slot: String,
    #[serde(default)]
    pub roll_no: Option<String>,
}

/// Input for a branch-rank assignment pass over a roster.
#[derive(Debug, Serialize, Deserialize)]
pub struct RanksRequest {
    pub year: String,
    #[serde(default = "default_gender")]
    pub gender: String,
}

/// Input for a roster import from an uploaded .xlsx already on disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRequest {
    pub path: String,
    pub year: String,
    #[serde(default = "default_gender")]
    pub gender: String,
}

/// Parse a save-matrix body: the matrix document itself plus an optional
/// `expected_version` sibling used for the optimistic-concurrency check.
pub fn parse_save_matrix(body: &Value) -> Result<(SeatMatrix, Option<i64>), AllotError> {
    let expected_version = match body.get("expected_version") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_i64().ok_or_else(|| {
            AllotError::validation("expected_version must be an integer")
        })?),
    };
    let matrix = matrix_from_document(body)?;
    Ok((matrix, expected_version))
}
