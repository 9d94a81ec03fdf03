pub mod attendance;
pub mod auth;
pub mod backup;
pub mod dashboard;
pub mod exams;
pub mod export;
pub mod fees;
pub mod homework;
pub mod init;
pub mod messages;
pub mod report;
pub mod settings;
pub mod status;
pub mod students;
pub mod subjects;
pub mod timetable;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::auth::View;
use crate::error::{DugsiError, Result};
use crate::models::User;
use crate::school::{open_school, School};
use crate::settings::get_data_dir;

/// Validate a YYYY-MM month.
pub(crate) fn parse_month(month: &str) -> Result<String> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|_| month.to_string())
        .map_err(|_| DugsiError::InvalidMonth(month.to_string()))
}

pub(crate) fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| DugsiError::InvalidDate(date.to_string()))
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn current_month() -> String {
    today().format("%Y-%m").to_string()
}

/// Open the school and check that the signed-in user may use `view`.
pub(crate) fn open_for(view: View) -> Result<(School, User)> {
    let school = open_school(&get_data_dir())?;
    let user = school.session.require_view(view)?;
    Ok((school, user))
}

/// Destructive commands ask first unless `--yes` was given.
pub(crate) fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| DugsiError::Other(format!("{e} (pass --yes to skip the prompt)")))
}

#[derive(Parser)]
#[command(name = "dugsi", version, about = "School administration: roster, fees, attendance, exams and term reports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for school data (default: ~/Documents/dugsi)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show the data directory, database and stored collections.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/dugsi-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Sign in as admin, teacher or student.
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Manage the student roster.
    Students {
        #[command(subcommand)]
        command: StudentsCommands,
    },
    /// Monthly fees and payments.
    Fees {
        #[command(subcommand)]
        command: FeesCommands,
    },
    /// Daily attendance.
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommands,
    },
    /// Exams and grades.
    Exams {
        #[command(subcommand)]
        command: ExamsCommands,
    },
    /// Subject catalog.
    Subjects {
        #[command(subcommand)]
        command: SubjectsCommands,
    },
    /// Term reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Summary of students, fees, attendance and recent activity.
    Dashboard,
    /// Homework assignments.
    Homework {
        #[command(subcommand)]
        command: HomeworkCommands,
    },
    /// Messages to parents and staff.
    Messages {
        #[command(subcommand)]
        command: MessagesCommands,
    },
    /// Class timetables.
    Timetable {
        #[command(subcommand)]
        command: TimetableCommands,
    },
    /// School settings.
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum StudentsCommands {
    /// Register a student.
    Add {
        /// Full name
        name: String,
        #[arg(long)]
        class: String,
        /// Guardian name
        #[arg(long)]
        guardian: String,
        /// Guardian phone
        #[arg(long)]
        phone: String,
        /// Guardian relationship, e.g. Father
        #[arg(long, default_value = "Parent")]
        relationship: String,
    },
    /// List students.
    List {
        /// Name or guardian phone to search for
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        class: Option<String>,
    },
    /// Show one student with fees, attendance and results.
    Show {
        id: String,
    },
    /// Change a student's details.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        guardian: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        relationship: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Remove a student from the roster.
    Delete {
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Active,
    Suspended,
}

#[derive(Subcommand)]
pub enum FeesCommands {
    /// Fee status of every student for a month.
    List {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Record a payment.
    Pay {
        #[arg(long)]
        student: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        #[arg(long, default_value = "Cash")]
        method: String,
        #[arg(long, default_value = "")]
        reference: String,
    },
    /// Correct the amount due or paid for a month.
    Update {
        #[arg(long)]
        student: String,
        #[arg(long)]
        month: String,
        #[arg(long, allow_negative_numbers = true)]
        due: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        paid: Option<f64>,
    },
    /// Every fee record and payment for a student.
    History {
        #[arg(long)]
        student: String,
    },
}

#[derive(Subcommand)]
pub enum AttendanceCommands {
    /// Mark a student present, absent or late.
    Mark {
        #[arg(long)]
        student: String,
        /// present | absent | late
        status: String,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Counts for one day.
    Stats {
        #[arg(long)]
        date: Option<String>,
    },
    /// Seven-day grid ending on a date.
    Week {
        #[arg(long)]
        class: Option<String>,
        /// Last day shown (default: today)
        #[arg(long)]
        end: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ExamsCommands {
    /// Define an exam.
    Add {
        name: String,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        term: String,
    },
    /// List exams.
    List,
    /// Delete an exam and its results.
    Delete {
        id: i64,
        #[arg(long, short)]
        yes: bool,
    },
    /// Record a score.
    Grade {
        #[arg(long)]
        exam: i64,
        #[arg(long)]
        student: String,
        /// Subject id, name or code
        #[arg(long)]
        subject: String,
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
    },
    /// Score sheet for one exam and subject.
    Grades {
        #[arg(long)]
        exam: i64,
        #[arg(long)]
        subject: String,
    },
}

#[derive(Subcommand)]
pub enum SubjectsCommands {
    Add {
        name: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        teacher: String,
    },
    List,
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        teacher: Option<String>,
    },
    Delete {
        id: i64,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Pdf,
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "txt",
        }
    }
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Ranked term report.
    View {
        #[arg(long)]
        term: String,
        /// Class name or All
        #[arg(long, default_value = "All")]
        class: String,
    },
    /// Write the term report to a file.
    Export {
        #[arg(long)]
        term: String,
        #[arg(long, default_value = "All")]
        class: String,
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum HomeworkCommands {
    Add {
        title: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        subject: String,
        /// Due date: YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List {
        #[arg(long)]
        class: Option<String>,
    },
    /// Mark an assignment pending or submitted.
    Status {
        id: i64,
        status: String,
    },
}

#[derive(Subcommand)]
pub enum MessagesCommands {
    /// Log a message to a recipient group.
    Send {
        /// "All Parents", "<class> Parents" or "Teachers"
        #[arg(long)]
        to: String,
        message: String,
        /// sms | whatsapp
        #[arg(long, default_value = "sms")]
        method: String,
    },
    List,
}

#[derive(Subcommand)]
pub enum TimetableCommands {
    Add {
        #[arg(long)]
        class: String,
        /// Saturday through Thursday
        #[arg(long)]
        day: String,
        /// 1 to 7
        #[arg(long)]
        period: u8,
        /// Subject id, name or code
        #[arg(long)]
        subject: String,
        #[arg(long)]
        teacher: String,
    },
    List {
        #[arg(long)]
        class: String,
    },
    Remove {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    Show,
    Set {
        key: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-02").unwrap(), "2025-02");
        assert!(matches!(parse_month("2025-13"), Err(DugsiError::InvalidMonth(_))));
        assert!(parse_month("Feb").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-05-01").is_ok());
        assert!(matches!(parse_date("05/01/2025"), Err(DugsiError::InvalidDate(_))));
    }

    #[test]
    fn test_negative_amount_parses() {
        let cli = Cli::try_parse_from(["dugsi", "fees", "pay", "--student", "1", "--amount", "-5"]).unwrap();
        match cli.command {
            Commands::Fees { command: FeesCommands::Pay { amount, .. } } => assert_eq!(amount, -5.0),
            _ => panic!("wrong command"),
        }
    }
}
