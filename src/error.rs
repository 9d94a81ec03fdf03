use thiserror::Error;

#[derive(Error, Debug)]
pub enum DugsiError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Corrupt stored data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown student: {0}")]
    UnknownStudent(String),

    #[error("Unknown exam: {0}")]
    UnknownExam(i64),

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Unknown class: {0}")]
    InvalidClass(String),

    #[error("Invalid email or password")]
    InvalidLogin,

    #[error("Not logged in. Run `dugsi login` first.")]
    NotLoggedIn,

    #[error("The {role} role cannot open {view}")]
    Forbidden { role: String, view: String },

    #[error("Invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),

    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Period must be between 1 and 7, got {0}")]
    InvalidPeriod(u8),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DugsiError>;
