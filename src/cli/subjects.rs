use comfy_table::{Cell, Table};

use crate::auth::View;
use crate::cli::{confirm, open_for};
use crate::error::{DugsiError, Result};
use crate::subjects::SubjectUpdate;

pub fn add(name: &str, code: &str, teacher: &str) -> Result<()> {
    let (mut school, _) = open_for(View::Subjects)?;
    let s = school.subjects.add(name, code, teacher)?;
    println!("Added subject {} ({})", s.name, s.code);
    Ok(())
}

pub fn list() -> Result<()> {
    let (school, _) = open_for(View::Subjects)?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Code", "Name", "Teacher"]);
    for s in school.subjects.all() {
        table.add_row(vec![
            Cell::new(s.id),
            Cell::new(&s.code),
            Cell::new(&s.name),
            Cell::new(&s.teacher),
        ]);
    }
    println!("Subjects\n{table}");
    Ok(())
}

pub fn edit(id: i64, name: Option<String>, code: Option<String>, teacher: Option<String>) -> Result<()> {
    let (mut school, _) = open_for(View::Subjects)?;
    let s = school.subjects.update(id, SubjectUpdate { name, code, teacher })?;
    println!("Updated subject {} ({})", s.name, s.code);
    Ok(())
}

pub fn delete(id: i64, yes: bool) -> Result<()> {
    let (mut school, _) = open_for(View::Subjects)?;
    let name = school
        .subjects
        .find(id)
        .ok_or_else(|| DugsiError::UnknownSubject(id.to_string()))?
        .name
        .clone();
    if !confirm(&format!("Delete {name}? Recorded scores are kept."), yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    school.subjects.delete(id)?;
    println!("Deleted {name}");
    Ok(())
}
