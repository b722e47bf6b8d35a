// --- Hostel Admission Allotment (API) — main entry point ---

use quickallot::run_server;
use quickallot::storage;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    println!("=== Hostel Admission Allotment (API) ===");

    let conn = match storage::open_connection() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to open database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = storage::init_db(&conn) {
        eprintln!("failed to initialize database: {}", e);
        std::process::exit(1);
    }
    drop(conn);

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    println!("Starting server at http://{}", bind);
    run_server(&bind).await
}
