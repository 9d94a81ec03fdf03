use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::auth::View;
use crate::cli::{open_for, parse_date};
use crate::error::Result;
use crate::homework::NewAssignment;
use crate::models::{Assignment, AssignmentStatus};

pub fn add(title: &str, class: &str, subject: &str, due: &str, description: &str) -> Result<()> {
    let (mut school, _) = open_for(View::Homework)?;
    parse_date(due)?;
    let a = school.homework.add(NewAssignment {
        class_id: class.to_string(),
        subject: subject.to_string(),
        title: title.to_string(),
        due_date: due.to_string(),
        description: description.to_string(),
    })?;
    println!("Posted assignment {} for {}: {}", a.id, a.class_id, a.title);
    Ok(())
}

pub fn list(class: Option<&str>) -> Result<()> {
    let (school, _) = open_for(View::Homework)?;
    let rows: Vec<&Assignment> = match class {
        Some(c) => school.homework.for_class(c),
        None => school.homework.all().iter().collect(),
    };

    let mut table = Table::new();
    table.set_header(vec!["ID", "Class", "Subject", "Title", "Due", "Status"]);
    for a in rows {
        let status = match a.status {
            AssignmentStatus::Pending => Cell::new("Pending".yellow()),
            AssignmentStatus::Submitted => Cell::new("Submitted".green()),
        };
        table.add_row(vec![
            Cell::new(a.id),
            Cell::new(&a.class_id),
            Cell::new(&a.subject),
            Cell::new(&a.title),
            Cell::new(&a.due_date),
            status,
        ]);
    }
    println!("Homework\n{table}");
    Ok(())
}

pub fn status(id: i64, status: &str) -> Result<()> {
    let (mut school, _) = open_for(View::Homework)?;
    let a = school.homework.update_status(id, status.parse()?)?;
    println!("{}: {}", a.title, a.status);
    Ok(())
}
