// Roster intake: parse a student list out of an .xlsx export. The first row
// is the header; columns are located by normalized name, so column order in
// the source file does not matter.

use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

use crate::error::AllotError;
use crate::excel::io::{normalize_header, read_sheet};
use crate::models::Student;

const REQUIRED: [&str; 4] = ["rollno", "name", "branch", "caste"];

/// Read a roster sheet into `Student` records. Rows with an empty roll number
/// are skipped; a missing required column fails the whole import.
pub fn read_roster_xlsx<P: AsRef<Path>>(
    path: P,
    year: &str,
    gender: &str,
) -> Result<Vec<Student>, Box<dyn Error>> {
    let rows = read_sheet(path, "")?;
    let mut iter = rows.into_iter();
    let header = iter
        .next()
        .ok_or_else(|| AllotError::validation("roster sheet is empty"))?;

    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect();
    for required in REQUIRED {
        if !columns.contains_key(required) {
            return Err(Box::new(AllotError::validation(format!(
                "roster sheet is missing the {} column",
                required
            ))));
        }
    }

    let cell = |row: &[String], key: &str| -> String {
        columns
            .get(key)
            .and_then(|&i| row.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let opt = |row: &[String], key: &str| -> Option<String> {
        let v = cell(row, key);
        if v.is_empty() { None } else { Some(v) }
    };

    let mut students = Vec::new();
    for row in iter {
        let roll_no = cell(&row, "rollno");
        if roll_no.is_empty() {
            continue;
        }
        students.push(Student {
            roll_no,
            name: cell(&row, "name"),
            year: opt(&row, "year").unwrap_or_else(|| year.to_string()),
            gender: opt(&row, "gender")
                .map(|g| g.to_lowercase())
                .unwrap_or_else(|| gender.to_string()),
            branch: cell(&row, "branch"),
            caste: cell(&row, "caste"),
            admission_category: opt(&row, "admissioncategory").unwrap_or_default(),
            entrance_exam: opt(&row, "entranceexam").map(|e| e.to_lowercase()),
            rank: opt(&row, "rank").and_then(|v| v.parse().ok()),
            cgpa: opt(&row, "cgpa").and_then(|v| v.parse().ok()),
            backlogs: opt(&row, "backlogs").and_then(|v| v.parse().ok()),
            branch_rank: opt(&row, "branchrank").and_then(|v| v.parse().ok()),
            seat_alloted: opt(&row, "seatalloted"),
        });
    }
    Ok(students)
}
