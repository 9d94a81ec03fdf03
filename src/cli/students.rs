use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::attendance::present_percentage;
use crate::auth::View;
use crate::cli::{confirm, open_for, StatusArg};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{Guardian, Student, StudentStatus};
use crate::students::{NewStudent, StudentUpdate};

impl From<StatusArg> for StudentStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => StudentStatus::Active,
            StatusArg::Suspended => StudentStatus::Suspended,
        }
    }
}

fn status_cell(status: StudentStatus) -> Cell {
    match status {
        StudentStatus::Active => Cell::new("Active".green()),
        StudentStatus::Suspended => Cell::new("Suspended".red()),
    }
}

pub fn add(name: &str, class: &str, guardian: &str, phone: &str, relationship: &str) -> Result<()> {
    let (mut school, _) = open_for(View::Students)?;
    let student = school.students.add(NewStudent {
        full_name: name.to_string(),
        class_id: class.to_string(),
        guardian: Guardian {
            name: guardian.to_string(),
            phone: phone.to_string(),
            relationship: relationship.to_string(),
        },
    })?;
    println!("Registered {} ({})", student.full_name.bold(), student.id);
    Ok(())
}

pub fn list(search: Option<&str>, class: Option<&str>) -> Result<()> {
    let (school, _) = open_for(View::Students)?;
    let mut rows: Vec<&Student> = match search {
        Some(term) => school.students.search(term),
        None => school.students.all().iter().collect(),
    };
    if let Some(class) = class {
        rows.retain(|s| s.class_id == class);
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Class", "Guardian", "Phone", "Status"]);
    for s in &rows {
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(&s.full_name),
            Cell::new(&s.class_id),
            Cell::new(format!("{} ({})", s.guardian.name, s.guardian.relationship)),
            Cell::new(&s.guardian.phone),
            status_cell(s.status),
        ]);
    }
    println!("Students ({})\n{table}", rows.len());
    Ok(())
}

pub fn show(id: &str) -> Result<()> {
    let (school, _) = open_for(View::Students)?;
    let s = school.students.require(id)?;

    println!("{}", s.full_name.bold());
    println!("ID:        {}", s.id);
    println!("Class:     {}", s.class_id);
    println!("Status:    {:?}", s.status);
    println!("Enrolled:  {}", s.enrollment_date.get(..10).unwrap_or(&s.enrollment_date));
    println!("Guardian:  {} ({}), {}", s.guardian.name, s.guardian.relationship, s.guardian.phone);

    let attendance = school.attendance.for_student(&s.id);
    println!();
    println!(
        "Attendance: {}% present over {} marked days",
        present_percentage(&attendance),
        attendance.len()
    );

    let fees = school.fees.records_for_student(&s.id);
    let paid: f64 = fees.iter().map(|r| r.amount_paid).sum();
    let due: f64 = fees.iter().map(|r| r.amount_due).sum();
    println!("Fees:       {} paid of {} due across {} months", money(paid), money(due), fees.len());

    let results = school.exams.results_for_student(&s.id);
    if !results.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Exam", "Subject", "Score"]);
        for r in results {
            let exam = school.exams.find(r.exam_id).map(|e| e.name.as_str()).unwrap_or("?");
            let subject = school.subjects.find(r.subject_id).map(|s| s.code.as_str()).unwrap_or("?");
            table.add_row(vec![Cell::new(exam), Cell::new(subject), Cell::new(r.score)]);
        }
        println!("\nResults\n{table}");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    id: &str,
    name: Option<String>,
    class: Option<String>,
    guardian: Option<String>,
    phone: Option<String>,
    relationship: Option<String>,
    status: Option<StatusArg>,
) -> Result<()> {
    let (mut school, _) = open_for(View::Students)?;
    let student = school.students.update(
        id,
        StudentUpdate {
            full_name: name,
            class_id: class,
            guardian_name: guardian,
            guardian_phone: phone,
            guardian_relationship: relationship,
            status: status.map(Into::into),
        },
    )?;
    println!("Updated {} ({})", student.full_name, student.id);
    Ok(())
}

pub fn delete(id: &str, yes: bool) -> Result<()> {
    let (mut school, _) = open_for(View::Students)?;
    let name = school.students.require(id)?.full_name.clone();
    if !confirm(&format!("Delete {name}? Fee and attendance history is kept."), yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    school.students.delete(id)?;
    println!("Deleted {name}");
    Ok(())
}
