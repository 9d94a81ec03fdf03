use std::rc::Rc;

use chrono::NaiveDate;
use tracing::info;

use crate::db::Storage;
use crate::error::Result;
use crate::models::{AttendanceRecord, AttendanceStatus, Student};
use crate::store::{new_uuid, Collection, Subscribers};

pub const ATTENDANCE_KEY: &str = "attendance";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayStats {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

/// One roster line of the seven-day attendance grid.
pub struct WeekRow<'a> {
    pub student: &'a Student,
    pub statuses: Vec<Option<AttendanceStatus>>,
}

pub struct WeekMatrix<'a> {
    /// Oldest first, ending on the requested day.
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<WeekRow<'a>>,
}

pub struct AttendanceLog {
    records: Collection<AttendanceRecord>,
}

impl AttendanceLog {
    pub fn load(storage: Rc<dyn Storage>, subscribers: Rc<Subscribers>) -> Result<Self> {
        let records = Collection::load(ATTENDANCE_KEY, storage, subscribers, Vec::new)?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        self.records.items()
    }

    pub fn get(&self, student_id: &str, date: &str) -> Option<&AttendanceRecord> {
        self.records
            .items()
            .iter()
            .find(|r| r.student_id == student_id && r.date == date)
    }

    pub fn for_student(&self, student_id: &str) -> Vec<&AttendanceRecord> {
        self.records
            .items()
            .iter()
            .filter(|r| r.student_id == student_id)
            .collect()
    }

    /// Upsert: an existing (student, date) row keeps its id and only the
    /// status changes.
    pub fn mark(&mut self, student_id: &str, date: &str, status: AttendanceStatus) -> Result<AttendanceRecord> {
        let record = self.records.update(|records| {
            match records
                .iter_mut()
                .find(|r| r.student_id == student_id && r.date == date)
            {
                Some(existing) => {
                    existing.status = status;
                    existing.clone()
                }
                None => {
                    let rec = AttendanceRecord {
                        id: new_uuid(),
                        student_id: student_id.to_string(),
                        date: date.to_string(),
                        status,
                    };
                    records.push(rec.clone());
                    rec
                }
            }
        })?;
        info!(student_id, date, status = %status, "attendance marked");
        Ok(record)
    }

    pub fn stats_for_date(&self, date: &str) -> DayStats {
        day_stats(self.records.items(), date)
    }

    pub fn week_matrix<'a>(&self, students: &[&'a Student], end: NaiveDate) -> WeekMatrix<'a> {
        let dates: Vec<NaiveDate> = (0..7)
            .rev()
            .map(|back| end - chrono::Duration::days(back))
            .collect();
        let rows = students
            .iter()
            .map(|&student| WeekRow {
                student,
                statuses: dates
                    .iter()
                    .map(|d| {
                        self.get(&student.id, &d.format("%Y-%m-%d").to_string())
                            .map(|r| r.status)
                    })
                    .collect(),
            })
            .collect();
        WeekMatrix { dates, rows }
    }
}

/// Status counts for one day. Only students with a row for `date` are
/// counted; nobody is assumed absent.
pub fn day_stats(records: &[AttendanceRecord], date: &str) -> DayStats {
    let mut stats = DayStats::default();
    for r in records.iter().filter(|r| r.date == date) {
        match r.status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Late => stats.late += 1,
        }
    }
    stats
}

/// Share of a student's marked days that were Present, rounded to a whole
/// percent. No marked days gives 0.
pub fn present_percentage(records: &[&AttendanceRecord]) -> u32 {
    if records.is_empty() {
        return 0;
    }
    let present = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    (present as f64 / records.len() as f64 * 100.0).round() as u32
}
