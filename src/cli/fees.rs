use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::auth::View;
use crate::cli::{current_month, open_for, parse_month};
use crate::error::Result;
use crate::fees::FeeUpdate;
use crate::fmt::money;
use crate::models::{FeeStatus, Student};

fn status_cell(status: FeeStatus) -> Cell {
    match status {
        FeeStatus::Paid => Cell::new("Paid".green()),
        FeeStatus::Partial => Cell::new("Partial".yellow()),
        FeeStatus::Unpaid => Cell::new("Unpaid".red()),
    }
}

pub fn list(month: Option<String>, search: Option<&str>) -> Result<()> {
    let (school, _) = open_for(View::Fees)?;
    let month = match month {
        Some(m) => parse_month(&m)?,
        None => current_month(),
    };
    let students: Vec<&Student> = match search {
        Some(term) => school.students.search(term),
        None => school.students.all().iter().collect(),
    };

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Class", "Due", "Paid", "Status"]);
    let (mut due, mut paid) = (0.0, 0.0);
    for s in students {
        let rec = school.fees.get_or_default(&s.id, &month);
        due += rec.amount_due;
        paid += rec.amount_paid;
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(&s.full_name),
            Cell::new(&s.class_id),
            Cell::new(money(rec.amount_due)),
            Cell::new(money(rec.amount_paid)),
            status_cell(rec.status),
        ]);
    }
    println!("Fees for {month}\n{table}");
    println!("Collected {} of {}", money(paid).bold(), money(due));
    Ok(())
}

pub fn pay(student: &str, amount: f64, month: Option<String>, method: &str, reference: &str) -> Result<()> {
    let (mut school, _) = open_for(View::Fees)?;
    let name = school.students.require(student)?.full_name.clone();
    let month = match month {
        Some(m) => parse_month(&m)?,
        None => current_month(),
    };
    let rec = school.fees.record_payment(student, &month, amount, method, reference)?;
    println!(
        "Recorded {} from {name} for {month}: {} of {} paid ({})",
        money(amount),
        money(rec.amount_paid),
        money(rec.amount_due),
        rec.status
    );
    Ok(())
}

pub fn update(student: &str, month: &str, due: Option<f64>, paid: Option<f64>) -> Result<()> {
    let (mut school, _) = open_for(View::Fees)?;
    school.students.require(student)?;
    let month = parse_month(month)?;
    let rec = school.fees.update_fee_record(
        student,
        &month,
        FeeUpdate {
            amount_due: due,
            amount_paid: paid,
        },
    )?;
    println!(
        "{month}: due {}, paid {} ({})",
        money(rec.amount_due),
        money(rec.amount_paid),
        rec.status
    );
    Ok(())
}

pub fn history(student: &str) -> Result<()> {
    let (school, _) = open_for(View::Fees)?;
    let s = school.students.require(student)?;
    let mut records = school.fees.records_for_student(&s.id);
    records.sort_by(|a, b| b.month.cmp(&a.month));

    let mut table = Table::new();
    table.set_header(vec!["Month", "Date", "Amount", "Method", "Reference"]);
    for rec in &records {
        table.add_row(vec![
            Cell::new(rec.month.as_str().bold()),
            Cell::new(""),
            Cell::new(format!("{} / {}", money(rec.amount_paid), money(rec.amount_due))),
            status_cell(rec.status),
            Cell::new(""),
        ]);
        for p in &rec.payments {
            table.add_row(vec![
                Cell::new(""),
                Cell::new(p.date.get(..10).unwrap_or(&p.date)),
                Cell::new(money(p.amount)),
                Cell::new(&p.method),
                Cell::new(&p.reference),
            ]);
        }
    }
    println!("Payment history: {}\n{table}", s.full_name);
    Ok(())
}
