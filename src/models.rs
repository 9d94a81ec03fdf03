use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DugsiError, Result};

/// serde_json writes NaN and infinities as `null`; read them back as NaN.
fn f64_or_nan<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentStatus {
    Active,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub full_name: String,
    pub class_id: String,
    pub guardian: Guardian,
    /// RFC 3339 timestamp.
    pub enrollment_date: String,
    pub status: StudentStatus,
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStatus {
    Unpaid,
    Partial,
    Paid,
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeeStatus::Unpaid => "Unpaid",
            FeeStatus::Partial => "Partial",
            FeeStatus::Paid => "Paid",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    /// RFC 3339 timestamp of when the payment was recorded.
    pub date: String,
    #[serde(deserialize_with = "f64_or_nan")]
    pub amount: f64,
    pub method: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecord {
    pub id: String,
    pub student_id: String,
    /// YYYY-MM
    pub month: String,
    #[serde(deserialize_with = "f64_or_nan")]
    pub amount_due: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub amount_paid: f64,
    pub status: FeeStatus,
    pub payments: Vec<Payment>,
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl FromStr for AttendanceStatus {
    type Err = DugsiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "present" | "p" => Ok(AttendanceStatus::Present),
            "absent" | "a" => Ok(AttendanceStatus::Absent),
            "late" | "l" => Ok(AttendanceStatus::Late),
            other => Err(DugsiError::Other(format!(
                "Unknown attendance status '{other}' (use present, absent or late)"
            ))),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    /// YYYY-MM-DD
    pub date: String,
    pub status: AttendanceStatus,
}

// ---------------------------------------------------------------------------
// Exams, results, subjects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: String,
    pub exam_id: i64,
    pub student_id: String,
    pub subject_id: i64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub teacher: String,
}

// ---------------------------------------------------------------------------
// Homework
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Pending,
    Submitted,
}

impl FromStr for AssignmentStatus {
    type Err = DugsiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(AssignmentStatus::Pending),
            "submitted" => Ok(AssignmentStatus::Submitted),
            other => Err(DugsiError::Other(format!(
                "Unknown assignment status '{other}' (use pending or submitted)"
            ))),
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Pending => f.write_str("Pending"),
            AssignmentStatus::Submitted => f.write_str("Submitted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub class_id: String,
    pub subject: String,
    pub title: String,
    pub due_date: String,
    pub description: String,
    pub status: AssignmentStatus,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Who a message goes out to. Serialized as its display label
/// ("All Parents", "Form 4 Parents", "Teachers").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    AllParents,
    ClassParents(String),
    Teachers,
}

impl FromStr for Recipient {
    type Err = DugsiError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("All Parents") {
            return Ok(Recipient::AllParents);
        }
        if trimmed.eq_ignore_ascii_case("Teachers") {
            return Ok(Recipient::Teachers);
        }
        if let Some(class) = trimmed.strip_suffix(" Parents") {
            let class = class.trim();
            if !class.is_empty() {
                return Ok(Recipient::ClassParents(class.to_string()));
            }
        }
        Err(DugsiError::InvalidRecipient(s.to_string()))
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::AllParents => f.write_str("All Parents"),
            Recipient::ClassParents(class) => write!(f, "{class} Parents"),
            Recipient::Teachers => f.write_str("Teachers"),
        }
    }
}

impl Serialize for Recipient {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Recipient {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageMethod {
    #[serde(rename = "SMS")]
    Sms,
    WhatsApp,
}

impl FromStr for MessageMethod {
    type Err = DugsiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sms" => Ok(MessageMethod::Sms),
            "whatsapp" => Ok(MessageMethod::WhatsApp),
            other => Err(DugsiError::Other(format!(
                "Unknown delivery method '{other}' (use sms or whatsapp)"
            ))),
        }
    }
}

impl fmt::Display for MessageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageMethod::Sms => f.write_str("SMS"),
            MessageMethod::WhatsApp => f.write_str("WhatsApp"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    Sent,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub recipient: Recipient,
    pub message: String,
    /// YYYY-MM-DD
    pub date: String,
    pub status: MessageStatus,
    pub method: MessageMethod,
}

// ---------------------------------------------------------------------------
// Timetable
// ---------------------------------------------------------------------------

/// School week, Saturday through Thursday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Saturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Saturday,
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
    ];
}

impl FromStr for Weekday {
    type Err = DugsiError;

    fn from_str(s: &str) -> Result<Self> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DugsiError::Other(format!("Not a school day: {s}")))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub const PERIODS: std::ops::RangeInclusive<u8> = 1..=7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: i64,
    pub class_id: String,
    pub day: Weekday,
    pub period: u8,
    pub subject: String,
    pub teacher: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Teacher => f.write_str("teacher"),
            Role::Student => f.write_str("student"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
}
