use comfy_table::{Cell, Table};

use crate::auth::View;
use crate::cli::{confirm, open_for, parse_date};
use crate::error::{DugsiError, Result};
use crate::reports::letter_grade;

pub fn add(name: &str, date: &str, term: &str) -> Result<()> {
    let (mut school, _) = open_for(View::Exams)?;
    parse_date(date)?;
    let exam = school.exams.add_exam(name, date, term)?;
    println!("Added exam {} ({}, {})", exam.id, exam.name, exam.term);
    Ok(())
}

pub fn list() -> Result<()> {
    let (school, _) = open_for(View::Exams)?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Date", "Term", "Scores"]);
    for e in school.exams.exams() {
        let scores = school.exams.results().iter().filter(|r| r.exam_id == e.id).count();
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(&e.name),
            Cell::new(&e.date),
            Cell::new(&e.term),
            Cell::new(scores),
        ]);
    }
    println!("Exams\n{table}");
    Ok(())
}

pub fn delete(id: i64, yes: bool) -> Result<()> {
    let (mut school, _) = open_for(View::Exams)?;
    let name = school.exams.find(id).ok_or(DugsiError::UnknownExam(id))?.name.clone();
    if !confirm(&format!("Delete {name} and all of its scores?"), yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    school.exams.delete_exam(id)?;
    println!("Deleted {name}");
    Ok(())
}

pub fn grade(exam: i64, student: &str, subject: &str, score: f64) -> Result<()> {
    let (mut school, _) = open_for(View::Exams)?;
    let exam_name = school.exams.find(exam).ok_or(DugsiError::UnknownExam(exam))?.name.clone();
    let student_name = school.students.require(student)?.full_name.clone();
    let subject = school.subjects.resolve(subject)?.clone();
    school.exams.record_grade(exam, student, subject.id, score)?;
    println!(
        "{student_name}: {} {score} in {exam_name} ({})",
        subject.code,
        letter_grade(Some(score))
    );
    Ok(())
}

/// Every student's score for one exam and subject, blanks included.
pub fn grades(exam: i64, subject: &str) -> Result<()> {
    let (school, _) = open_for(View::Exams)?;
    let exam = school.exams.find(exam).ok_or(DugsiError::UnknownExam(exam))?;
    let subject = school.subjects.resolve(subject)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Class", "Score", "Grade"]);
    for s in school.students.all() {
        let score = school.exams.get_grade(exam.id, &s.id, subject.id);
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(&s.full_name),
            Cell::new(&s.class_id),
            Cell::new(score.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(letter_grade(score)),
        ]);
    }
    println!("{} - {}\n{table}", exam.name, subject.name);
    Ok(())
}
