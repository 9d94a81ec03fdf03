use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::auth::View;
use crate::cli::today;
use crate::dashboard::{student_overview, summarize, ActivityKind};
use crate::error::{DugsiError, Result};
use crate::fmt::{money, percent};
use crate::models::Role;
use crate::school::open_school;
use crate::settings::{get_data_dir, load_settings};

/// Admins and teachers get the school summary; students get their own
/// overview.
pub fn run() -> Result<()> {
    let school = open_school(&get_data_dir())?;
    let user = school.session.current_user()?.ok_or(DugsiError::NotLoggedIn)?;
    if user.role == Role::Student {
        school.session.require_view(View::StudentOverview)?;
        return overview(&school, &user);
    }
    school.session.require_view(View::Dashboard)?;

    let settings = load_settings();
    let s = summarize(
        school.students.all(),
        school.fees.records(),
        school.attendance.records(),
        today(),
    );

    println!("{}", settings.school_name.bold());
    println!("Dashboard for {} ({})", s.today, user.name);
    println!();
    println!("Students:    {} ({} active)", s.total_students, s.active_students);
    let estimate = if s.fees.estimated { " (estimate)" } else { "" };
    println!(
        "Fees {}: {} of {}{estimate}  {}",
        s.month,
        money(s.fees.collected).bold(),
        money(s.fees.expected),
        percent(s.fees.progress)
    );
    println!(
        "Attendance:  {} present, {} absent, {} late  ({}% of roster present)",
        s.attendance.present, s.attendance.absent, s.attendance.late, s.attendance_rate
    );

    let mut table = Table::new();
    table.set_header(vec!["Date", "Student", "Activity"]);
    for a in &s.recent_activity {
        let details = match a.kind {
            ActivityKind::Payment => a.details.green().to_string(),
            ActivityKind::Enrollment => a.details.cyan().to_string(),
        };
        table.add_row(vec![
            Cell::new(a.date.get(..10).unwrap_or(&a.date)),
            Cell::new(&a.student_name),
            Cell::new(details),
        ]);
    }
    println!("\nRecent activity\n{table}");
    Ok(())
}

fn overview(school: &crate::school::School, user: &crate::models::User) -> Result<()> {
    let o = student_overview(school, user)?;
    println!("Welcome back, {}!", user.name.bold());
    println!("Class: {} | Student ID: {}", o.class_id, o.student_id);
    println!();
    println!(
        "Attendance:  {}% (present {} of {} days)",
        o.attendance_percentage, o.present_days, o.marked_days
    );
    println!("Paid:        {}", money(o.total_paid));
    println!("Balance:     {}", money(o.balance));

    if !o.recent_results.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Exam", "Subject", "Score"]);
        for r in &o.recent_results {
            let exam = school.exams.find(r.exam_id).map(|e| e.name.as_str()).unwrap_or("?");
            let subject = school.subjects.find(r.subject_id).map(|s| s.name.as_str()).unwrap_or("?");
            table.add_row(vec![Cell::new(exam), Cell::new(subject), Cell::new(r.score)]);
        }
        println!("\nRecent results\n{table}");
    }

    if !o.schedule.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Day", "Period", "Subject", "Teacher"]);
        let mut slots = o.schedule.clone();
        slots.sort_by_key(|e| (e.day, e.period));
        for e in slots {
            table.add_row(vec![
                Cell::new(e.day),
                Cell::new(e.period),
                Cell::new(&e.subject),
                Cell::new(&e.teacher),
            ]);
        }
        println!("\nTimetable\n{table}");
    }

    if !o.homework.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Due", "Subject", "Title", "Status"]);
        for a in &o.homework {
            table.add_row(vec![
                Cell::new(&a.due_date),
                Cell::new(&a.subject),
                Cell::new(&a.title),
                Cell::new(a.status),
            ]);
        }
        println!("\nHomework\n{table}");
    }
    Ok(())
}
