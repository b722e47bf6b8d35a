// Root of the `quickallot` crate: seat-matrix computation, caste merging and
// student-to-seat allocation for hostel admissions, behind a JSON API.
mod excel;
pub mod algorithm;
pub mod api_json;
pub mod error;
pub mod models;
pub mod server;
pub mod storage;

/// Run the HTTP server (re-export for convenience from `main`).
pub use server::run_server;
