use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::reports::{ReportSummary, ReportTable};

/// Prepend the school name as a header line if non-empty.
pub fn with_header(school_name: &str, body: String) -> String {
    if school_name.is_empty() {
        body
    } else {
        format!("{school_name}\n{body}")
    }
}

fn grade_cell(grade: &str, styled: bool) -> Cell {
    if !styled {
        return Cell::new(grade);
    }
    match grade {
        "A" | "B" => Cell::new(grade.green().bold()),
        "C" | "D" => Cell::new(grade.yellow()),
        "F" => Cell::new(grade.red().bold()),
        _ => Cell::new(grade),
    }
}

/// Ranked table followed by the summary line. `styled` turns on terminal
/// colors; file exports pass false.
pub fn format_report(
    title: &str,
    table: &ReportTable,
    summary: &ReportSummary,
    styled: bool,
) -> String {
    if table.rows.is_empty() {
        return format!("{title}\nNo exams recorded for this term.");
    }

    let mut out = Table::new();
    out.set_header(table.headers.clone());
    for row in &table.rows {
        let (grade, rest) = match row.split_last() {
            Some((g, rest)) => (g.as_str(), rest),
            None => ("", &row[..]),
        };
        let mut cells: Vec<Cell> = rest.iter().map(Cell::new).collect();
        cells.push(grade_cell(grade, styled));
        out.add_row(cells);
    }

    let top = summary.top_student.as_deref().unwrap_or("-");
    let footer = format!(
        "Top student: {top}   Class average: {:.1}%   Students: {}",
        summary.class_average, summary.total_students
    );
    format!("{title}\n{out}\n{footer}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReportTable {
        ReportTable {
            headers: vec!["Rank".into(), "Student Name".into(), "MATH".into(), "Total Avg".into(), "Grade".into()],
            rows: vec![vec!["1".into(), "Amina Farah".into(), "92".into(), "92.0%".into(), "A".into()]],
        }
    }

    fn summary() -> ReportSummary {
        ReportSummary {
            top_student: Some("Amina Farah".into()),
            class_average: 92.0,
            total_students: 1,
        }
    }

    #[test]
    fn test_format_report_plain() {
        let s = format_report("Term 1 - All Classes", &table(), &summary(), false);
        assert!(s.starts_with("Term 1 - All Classes\n"));
        assert!(s.contains("Amina Farah"));
        assert!(s.contains("Class average: 92.0%"));
        assert!(!s.contains('\u{1b}'));
    }

    #[test]
    fn test_format_empty_report() {
        let empty = ReportTable { headers: table().headers, rows: vec![] };
        let s = format_report("Term 9", &empty, &summary(), false);
        assert!(s.contains("No exams recorded"));
    }

    #[test]
    fn test_with_header() {
        assert_eq!(with_header("", "body".into()), "body");
        assert_eq!(with_header("Dugsiga Sare", "body".into()), "Dugsiga Sare\nbody");
    }
}
