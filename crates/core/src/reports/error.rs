//! Failures while deriving statements from the journal.

use chrono::NaiveDate;
use ledgerline_shared::AppError;
use thiserror::Error;

use crate::accounts::AccountNo;

/// Why a report could not be produced.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A ledger card was requested for an account outside the chart.
    #[error("No account {0} in the chart")]
    AccountNotFound(AccountNo),

    /// The period ends before it starts.
    #[error("Report period {start}..{end} is inverted")]
    InvalidDateRange {
        /// First day of the period.
        start: NaiveDate,
        /// Last day of the period.
        end: NaiveDate,
    },
}

impl ReportError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        let message = err.to_string();
        match err {
            ReportError::AccountNotFound(_) => Self::NotFound(message),
            ReportError::InvalidDateRange { .. } => Self::Validation(message),
        }
    }
}
