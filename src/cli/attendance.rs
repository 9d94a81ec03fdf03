use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::auth::View;
use crate::cli::{open_for, parse_date, today};
use crate::error::Result;
use crate::models::{AttendanceStatus, Student};

fn status_cell(status: Option<AttendanceStatus>) -> Cell {
    match status {
        Some(AttendanceStatus::Present) => Cell::new("P".green()),
        Some(AttendanceStatus::Absent) => Cell::new("A".red()),
        Some(AttendanceStatus::Late) => Cell::new("L".yellow()),
        None => Cell::new("-".dimmed()),
    }
}

fn day_or_today(date: Option<String>) -> Result<String> {
    let day = match date {
        Some(d) => parse_date(&d)?,
        None => today(),
    };
    Ok(day.format("%Y-%m-%d").to_string())
}

pub fn mark(student: &str, status: &str, date: Option<String>) -> Result<()> {
    let (mut school, _) = open_for(View::Attendance)?;
    let name = school.students.require(student)?.full_name.clone();
    let status: AttendanceStatus = status.parse()?;
    let date = day_or_today(date)?;
    school.attendance.mark(student, &date, status)?;
    println!("{name}: {status} on {date}");
    Ok(())
}

pub fn stats(date: Option<String>) -> Result<()> {
    let (school, _) = open_for(View::Attendance)?;
    let date = day_or_today(date)?;
    let stats = school.attendance.stats_for_date(&date);
    let total = school.students.all().len();
    let unmarked = total.saturating_sub(stats.present + stats.absent + stats.late);

    println!("Attendance for {date}");
    println!("  Present:   {}", stats.present.to_string().green());
    println!("  Absent:    {}", stats.absent.to_string().red());
    println!("  Late:      {}", stats.late.to_string().yellow());
    println!("  Unmarked:  {unmarked}");
    Ok(())
}

pub fn week(class: Option<&str>, end: Option<String>) -> Result<()> {
    let (school, _) = open_for(View::Attendance)?;
    let end = match end {
        Some(d) => parse_date(&d)?,
        None => today(),
    };
    let students: Vec<&Student> = match class {
        Some(c) => school.students.in_class(c).collect(),
        None => school.students.all().iter().collect(),
    };
    let matrix = school.attendance.week_matrix(&students, end);

    let mut header = vec!["Student".to_string()];
    header.extend(matrix.dates.iter().map(|d| d.format("%a %d").to_string()));
    let mut table = Table::new();
    table.set_header(header);
    for row in &matrix.rows {
        let mut cells = vec![Cell::new(&row.student.full_name)];
        cells.extend(row.statuses.iter().map(|s| status_cell(*s)));
        table.add_row(cells);
    }
    println!("Week ending {}\n{table}", end.format("%Y-%m-%d"));
    Ok(())
}
