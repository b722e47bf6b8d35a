// SQLite persistence for branches, castes, students and the seat-matrix
// document. Connections are short-lived: handlers open one, use it, drop it.
// The matrix row carries an integer version so that two managers editing the
// same (year, gender) cannot silently overwrite each other.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use rusqlite::{Connection, OptionalExtension, params};

use crate::algorithm::{matrix_from_document, matrix_to_document};
use crate::error::AllotError;
use crate::models::{Branch, Caste, SeatMatrix, Student};

fn load_dotenv() {
    let _ = dotenv::dotenv();
}

/// Path of the allotment DB. Honors `ALLOTMENT_DB_PATH` (via .env or the
/// environment), defaulting to `data/allotment.db`.
pub fn db_path() -> PathBuf {
    load_dotenv();
    match env::var("ALLOTMENT_DB_PATH") {
        Ok(p) => PathBuf::from(p),
        Err(_) => PathBuf::from("data/allotment.db"),
    }
}

pub fn open_connection() -> Result<Connection, Box<dyn Error>> {
    let path = db_path();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(Connection::open(path)?)
}

/// Create the schema if it does not exist yet.
pub fn init_db(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS branches (
            branch TEXT NOT NULL,
            year TEXT NOT NULL,
            seat_allocation_weight REAL NOT NULL,
            PRIMARY KEY (branch, year)
        );

        CREATE TABLE IF NOT EXISTS castes (
            caste TEXT NOT NULL,
            year TEXT NOT NULL,
            seat_matrix_percentage REAL NOT NULL,
            PRIMARY KEY (caste, year)
        );

        CREATE TABLE IF NOT EXISTS students (
            roll_no TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            year TEXT NOT NULL,
            gender TEXT NOT NULL,
            branch TEXT NOT NULL,
            caste TEXT NOT NULL,
            admission_category TEXT NOT NULL,
            entrance_exam TEXT,
            rank INTEGER,
            cgpa REAL,
            backlogs INTEGER,
            branch_rank INTEGER,
            seat_alloted TEXT
        );

        CREATE TABLE IF NOT EXISTS seat_matrix (
            year TEXT NOT NULL,
            gender TEXT NOT NULL,
            version INTEGER NOT NULL,
            document TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (year, gender)
        );",
    )?;
    Ok(())
}

// --- branches ---

pub fn upsert_branch(conn: &Connection, branch: &Branch) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT INTO branches (branch, year, seat_allocation_weight) VALUES (?1, ?2, ?3)
         ON CONFLICT(branch, year) DO UPDATE SET seat_allocation_weight = excluded.seat_allocation_weight",
        params![branch.branch, branch.year, branch.seat_allocation_weight],
    )?;
    Ok(())
}

pub fn delete_branch(conn: &Connection, branch: &str, year: &str) -> Result<bool, Box<dyn Error>> {
    let n = conn.execute(
        "DELETE FROM branches WHERE branch = ?1 AND year = ?2",
        params![branch, year],
    )?;
    Ok(n > 0)
}

/// Branches for a year, in creation order. Creation order matters: the last
/// branch of this list absorbs the rounding remainder during computation.
pub fn list_branches(conn: &Connection, year: &str) -> Result<Vec<Branch>, Box<dyn Error>> {
    let mut stmt = conn.prepare(
        "SELECT branch, year, seat_allocation_weight FROM branches WHERE year = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![year], |row| {
        Ok(Branch {
            branch: row.get(0)?,
            year: row.get(1)?,
            seat_allocation_weight: row.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// --- castes ---

pub fn upsert_caste(conn: &Connection, caste: &Caste) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT INTO castes (caste, year, seat_matrix_percentage) VALUES (?1, ?2, ?3)
         ON CONFLICT(caste, year) DO UPDATE SET seat_matrix_percentage = excluded.seat_matrix_percentage",
        params![caste.caste, caste.year, caste.seat_matrix_percentage],
    )?;
    Ok(())
}

pub fn delete_caste(conn: &Connection, caste: &str, year: &str) -> Result<bool, Box<dyn Error>> {
    let n = conn.execute(
        "DELETE FROM castes WHERE caste = ?1 AND year = ?2",
        params![caste, year],
    )?;
    Ok(n > 0)
}

/// Castes for a year, in creation order. This order defines the matrix
/// columns, the last-caste remainder rule and the slot enumeration order.
pub fn list_castes(conn: &Connection, year: &str) -> Result<Vec<Caste>, Box<dyn Error>> {
    let mut stmt = conn.prepare(
        "SELECT caste, year, seat_matrix_percentage FROM castes WHERE year = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![year], |row| {
        Ok(Caste {
            caste: row.get(0)?,
            year: row.get(1)?,
            seat_matrix_percentage: row.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// --- students ---

pub fn upsert_students(conn: &Connection, students: &[Student]) -> Result<usize, Box<dyn Error>> {
    let mut stored = 0;
    for s in students {
        conn.execute(
            "INSERT INTO students (roll_no, name, year, gender, branch, caste, admission_category,
                                   entrance_exam, rank, cgpa, backlogs, branch_rank, seat_alloted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(roll_no) DO UPDATE SET
                 name = excluded.name,
                 year = excluded.year,
                 gender = excluded.gender,
                 branch = excluded.branch,
                 caste = excluded.caste,
                 admission_category = excluded.admission_category,
                 entrance_exam = excluded.entrance_exam,
                 rank = excluded.rank,
                 cgpa = excluded.cgpa,
                 backlogs = excluded.backlogs,
                 branch_rank = excluded.branch_rank,
                 seat_alloted = excluded.seat_alloted",
            params![
                s.roll_no,
                s.name,
                s.year,
                s.gender,
                s.branch,
                s.caste,
                s.admission_category,
                s.entrance_exam,
                s.rank,
                s.cgpa,
                s.backlogs,
                s.branch_rank,
                s.seat_alloted,
            ],
        )?;
        stored += 1;
    }
    Ok(stored)
}

pub fn list_students(
    conn: &Connection,
    year: &str,
    gender: &str,
    branch: Option<&str>,
) -> Result<Vec<Student>, Box<dyn Error>> {
    let mut sql = String::from(
        "SELECT roll_no, name, year, gender, branch, caste, admission_category,
                entrance_exam, rank, cgpa, backlogs, branch_rank, seat_alloted
         FROM students WHERE year = ?1 AND gender = ?2",
    );
    if branch.is_some() {
        sql.push_str(" AND branch = ?3");
    }
    sql.push_str(" ORDER BY roll_no");

    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Student> {
        Ok(Student {
            roll_no: row.get(0)?,
            name: row.get(1)?,
            year: row.get(2)?,
            gender: row.get(3)?,
            branch: row.get(4)?,
            caste: row.get(5)?,
            admission_category: row.get(6)?,
            entrance_exam: row.get(7)?,
            rank: row.get(8)?,
            cgpa: row.get(9)?,
            backlogs: row.get(10)?,
            branch_rank: row.get(11)?,
            seat_alloted: row.get(12)?,
        })
    };

    let mut out = Vec::new();
    let mut stmt = conn.prepare(&sql)?;
    match branch {
        Some(b) => {
            let rows = stmt.query_map(params![year, gender, b], map_row)?;
            for r in rows {
                out.push(r?);
            }
        }
        None => {
            let rows = stmt.query_map(params![year, gender], map_row)?;
            for r in rows {
                out.push(r?);
            }
        }
    }
    Ok(out)
}

/// Persist branch ranks after an assignment pass.
pub fn save_branch_ranks(conn: &Connection, students: &[Student]) -> Result<usize, Box<dyn Error>> {
    let mut updated = 0;
    for s in students {
        updated += conn.execute(
            "UPDATE students SET branch_rank = ?1 WHERE roll_no = ?2",
            params![s.branch_rank, s.roll_no],
        )?;
    }
    Ok(updated)
}

/// Write `(roll_no, seat_alloted)` pairs from a confirmed allocation.
pub fn save_allocations(
    conn: &Connection,
    assignments: &[(String, Option<String>)],
) -> Result<usize, Box<dyn Error>> {
    let mut updated = 0;
    for (roll_no, seat) in assignments {
        updated += conn.execute(
            "UPDATE students SET seat_alloted = ?1 WHERE roll_no = ?2",
            params![seat, roll_no],
        )?;
    }
    Ok(updated)
}

// --- seat matrix ---

/// Load the matrix document for (year, gender), re-expanded into individual
/// caste counts, together with its version.
pub fn load_seat_matrix(
    conn: &Connection,
    year: &str,
    gender: &str,
) -> Result<Option<(SeatMatrix, i64)>, Box<dyn Error>> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT document, version FROM seat_matrix WHERE year = ?1 AND gender = ?2",
            params![year, gender],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    match row {
        Some((document, version)) => {
            let doc: serde_json::Value = serde_json::from_str(&document)?;
            let matrix = matrix_from_document(&doc)?;
            Ok(Some((matrix, version)))
        }
        None => Ok(None),
    }
}

/// Save a matrix document, collapsing merged groups first.
///
/// `expected_version` must be the version the caller loaded (or `None` when
/// no matrix exists yet). A mismatch means someone else saved in between and
/// returns a `Conflict` instead of overwriting. Returns the new version.
pub fn save_seat_matrix(
    conn: &Connection,
    matrix: &SeatMatrix,
    expected_version: Option<i64>,
) -> Result<i64, Box<dyn Error>> {
    let current: Option<i64> = conn
        .query_row(
            "SELECT version FROM seat_matrix WHERE year = ?1 AND gender = ?2",
            params![matrix.year, matrix.gender],
            |row| row.get(0),
        )
        .optional()?;

    let new_version = match (current, expected_version) {
        (None, _) => 1,
        (Some(v), Some(e)) if v == e => v + 1,
        (Some(v), _) => {
            return Err(Box::new(AllotError::conflict(format!(
                "seat matrix for {} {} changed (version {}); reload and retry",
                matrix.year, matrix.gender, v
            ))));
        }
    };

    let document = serde_json::to_string(&matrix_to_document(matrix))?;
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO seat_matrix (year, gender, version, document, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(year, gender) DO UPDATE SET
             version = excluded.version,
             document = excluded.document,
             updated_at = excluded.updated_at",
        params![matrix.year, matrix.gender, new_version, document, now],
    )?;
    Ok(new_version)
}
