use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::attendance::{day_stats, present_percentage, DayStats};
use crate::error::{DugsiError, Result};
use crate::fees::{records_for_month, DEFAULT_MONTHLY_FEE};
use crate::models::{
    AttendanceRecord, Assignment, ExamResult, FeeRecord, ScheduleEntry, Student, StudentStatus, User,
};
use crate::school::School;

/// Yearly fee a student's balance is measured against.
pub const YEARLY_FEE: f64 = 500.0;

const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct FeeProgress {
    pub collected: f64,
    pub expected: f64,
    /// True when no record exists for the month and `expected` is the
    /// active-roster estimate.
    pub estimated: bool,
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Payment,
    Enrollment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub kind: ActivityKind,
    pub date: String,
    pub student_id: String,
    pub student_name: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_students: usize,
    pub active_students: usize,
    pub month: String,
    pub fees: FeeProgress,
    pub today: String,
    pub attendance: DayStats,
    pub attendance_rate: u32,
    pub recent_activity: Vec<Activity>,
}

pub fn fee_progress(records: &[FeeRecord], month: &str, active_students: usize) -> FeeProgress {
    let month_records = records_for_month(records, month);
    let collected: f64 = month_records.iter().map(|r| r.amount_paid).sum();
    let (expected, estimated) = if month_records.is_empty() {
        (active_students as f64 * DEFAULT_MONTHLY_FEE, true)
    } else {
        (month_records.iter().map(|r| r.amount_due).sum(), false)
    };
    let progress = if expected != 0.0 {
        collected / expected * 100.0
    } else {
        0.0
    };
    FeeProgress {
        collected,
        expected,
        estimated,
        progress,
    }
}

fn parse_when(date: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset())
}

/// Payments and enrollments merged newest first, capped at five. Dates that
/// don't parse sort last.
pub fn recent_activity(students: &[Student], fees: &[FeeRecord]) -> Vec<Activity> {
    let payments = fees.iter().flat_map(|r| {
        r.payments.iter().map(move |p| (ActivityKind::Payment, p.date.as_str(), r.student_id.as_str(), format!("Paid ${}", p.amount)))
    });
    let enrollments = students.iter().map(|s| {
        (
            ActivityKind::Enrollment,
            s.enrollment_date.as_str(),
            s.id.as_str(),
            format!("Enrolled {}", s.full_name),
        )
    });

    let mut events: Vec<_> = payments
        .chain(enrollments)
        .map(|(kind, date, student_id, details)| (parse_when(date), kind, date, student_id, details))
        .collect();
    events.sort_by(|a, b| b.0.cmp(&a.0));

    events
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|(_, kind, date, student_id, details)| Activity {
            kind,
            date: date.to_string(),
            student_id: student_id.to_string(),
            student_name: students
                .iter()
                .find(|s| s.id == student_id)
                .map(|s| s.full_name.clone())
                .unwrap_or_else(|| "Unknown Student".to_string()),
            details,
        })
        .collect()
}

/// `today` picks both the attendance day and the fee month. Callers pass
/// the local date, so near midnight this can differ from the UTC date.
pub fn summarize(
    students: &[Student],
    fees: &[FeeRecord],
    attendance: &[AttendanceRecord],
    today: NaiveDate,
) -> DashboardSummary {
    let total_students = students.len();
    let active_students = students
        .iter()
        .filter(|s| s.status == StudentStatus::Active)
        .count();
    let month = today.format("%Y-%m").to_string();
    let today_str = today.format("%Y-%m-%d").to_string();
    let stats = day_stats(attendance, &today_str);
    let attendance_rate = if total_students == 0 {
        0
    } else {
        (stats.present as f64 / total_students as f64 * 100.0).round() as u32
    };

    DashboardSummary {
        total_students,
        active_students,
        fees: fee_progress(fees, &month, active_students),
        month,
        today: today_str,
        attendance: stats,
        attendance_rate,
        recent_activity: recent_activity(students, fees),
    }
}

// ---------------------------------------------------------------------------
// Personal overview for a logged-in student
// ---------------------------------------------------------------------------

pub struct StudentOverview<'a> {
    pub student_id: String,
    pub class_id: String,
    pub present_days: usize,
    pub marked_days: usize,
    pub attendance_percentage: u32,
    pub total_paid: f64,
    pub balance: f64,
    pub recent_results: Vec<&'a ExamResult>,
    pub schedule: Vec<&'a ScheduleEntry>,
    pub homework: Vec<&'a Assignment>,
}

pub fn student_overview<'a>(school: &'a School, user: &User) -> Result<StudentOverview<'a>> {
    let student_id = user.student_id.clone().ok_or_else(|| {
        DugsiError::Other(format!("{} is not linked to a student record", user.email))
    })?;
    let class_id = user.class_id.clone().unwrap_or_else(|| "Form 4".to_string());

    let attendance = school.attendance.for_student(&student_id);
    let present_days = attendance
        .iter()
        .filter(|r| r.status == crate::models::AttendanceStatus::Present)
        .count();

    let total_paid: f64 = school
        .fees
        .records_for_student(&student_id)
        .iter()
        .flat_map(|r| r.payments.iter())
        .map(|p| p.amount)
        .sum();

    let recent_results = school
        .exams
        .results_for_student(&student_id)
        .into_iter()
        .take(5)
        .collect();

    Ok(StudentOverview {
        present_days,
        marked_days: attendance.len(),
        attendance_percentage: present_percentage(&attendance),
        total_paid,
        balance: YEARLY_FEE - total_paid,
        recent_results,
        schedule: school.timetable.for_class(&class_id),
        homework: school.homework.for_class(&class_id),
        student_id,
        class_id,
    })
}
