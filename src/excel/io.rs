use calamine::{Data, open_workbook_auto};
use std::path::Path;

/// Convert a calamine `Data` cell into a plain String. Floats holding whole
/// numbers (how Excel stores roll numbers and ranks) print without the
/// trailing `.0`.
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Normalize a header cell: lowercase, whitespace and underscores dropped, so
/// "Roll No", "roll_no" and "RollNo" all map to the same key.
pub fn normalize_header(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

/// Read one sheet of an Excel file as rows of strings. An empty `sheet_name`
/// picks the first sheet; an unknown name falls back to the first sheet too.
pub fn read_sheet<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
) -> Result<Vec<Vec<String>>, Box<dyn std::error::Error>> {
    use calamine::Reader;
    let mut workbook = open_workbook_auto(path)?;

    let names = workbook.sheet_names().to_owned();
    let sheet_to_use = if sheet_name.is_empty() {
        names.first().cloned().unwrap_or_default()
    } else {
        names
            .iter()
            .find(|s| *s == sheet_name)
            .cloned()
            .unwrap_or_else(|| names.first().cloned().unwrap_or_default())
    };

    if sheet_to_use.is_empty() {
        return Ok(Vec::new());
    }

    match workbook.worksheet_range(&sheet_to_use) {
        Ok(range) => {
            let mut rows: Vec<Vec<String>> = Vec::new();
            for r in range.rows() {
                rows.push(r.iter().map(cell_to_string).collect());
            }
            Ok(rows)
        }
        Err(_) => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_normalize_to_one_key() {
        assert_eq!(normalize_header("Roll No"), "rollno");
        assert_eq!(normalize_header("roll_no"), "rollno");
        assert_eq!(normalize_header("  RollNo "), "rollno");
        assert_eq!(normalize_header("Branch Rank"), "branchrank");
    }

    #[test]
    fn whole_floats_print_without_decimal() {
        assert_eq!(cell_to_string(&Data::Float(231042.0)), "231042");
        assert_eq!(cell_to_string(&Data::Float(8.75)), "8.75");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
