use chrono::NaiveDate;
use thiserror::Error;

/// Failure of a single day's availability lookup.
///
/// Never fatal to a run: the orchestrator reports it and moves on to the next date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("HTTP {status_code} on {date}")]
    RequestFailure { status_code: u16, date: NaiveDate },

    #[error("Request for {date} failed: {reason}")]
    TransportFailure { date: NaiveDate, reason: String },
}

impl DateError {
    /// The stay date the failed request was for
    pub fn date(&self) -> NaiveDate {
        match self {
            DateError::RequestFailure { date, .. } | DateError::TransportFailure { date, .. } => {
                *date
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Please enter a valid cookie to continue.")]
    MissingCredential,

    #[error("Failed to build the report: {0}")]
    Export(#[from] ExportError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Refusing to export an empty report")]
    EmptyReport,

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
