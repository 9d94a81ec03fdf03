use comfy_table::{Cell, Table};

use crate::auth::View;
use crate::cli::open_for;
use crate::error::Result;
use crate::models::{Weekday, PERIODS};
use crate::settings::load_settings;
use crate::timetable::NewEntry;

pub fn add(class: &str, day: &str, period: u8, subject: &str, teacher: &str) -> Result<()> {
    let (mut school, _) = open_for(View::Timetable)?;
    let classes = school.known_classes(&load_settings());
    let entry = NewEntry {
        class_id: class.to_string(),
        day: day.parse()?,
        period,
        subject: subject.to_string(),
        teacher: teacher.to_string(),
    };
    let e = school.timetable.add(entry, &classes, &school.subjects)?;
    println!("{} {} period {}: {} ({})", e.class_id, e.day, e.period, e.subject, e.teacher);
    Ok(())
}

/// Periods down the side, school days across the top.
pub fn list(class: &str) -> Result<()> {
    let (school, _) = open_for(View::Timetable)?;
    let mut header = vec!["Period".to_string()];
    header.extend(Weekday::ALL.iter().map(|d| d.to_string()));

    let mut table = Table::new();
    table.set_header(header);
    for period in PERIODS {
        let mut row = vec![Cell::new(period)];
        for day in Weekday::ALL {
            let cell = match school.timetable.slot(class, day, period) {
                Some(e) => format!("{}\n{}\n#{}", e.subject, e.teacher, e.id),
                None => "-".to_string(),
            };
            row.push(Cell::new(cell));
        }
        table.add_row(row);
    }
    println!("Timetable: {class}\n{table}");
    Ok(())
}

pub fn remove(id: i64) -> Result<()> {
    let (mut school, _) = open_for(View::Timetable)?;
    let e = school.timetable.remove(id)?;
    println!("Removed {} {} period {} ({})", e.class_id, e.day, e.period, e.subject);
    Ok(())
}
