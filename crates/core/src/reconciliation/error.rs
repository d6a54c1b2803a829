//! Statement reconciliation error types.

use ledgerline_shared::AppError;
use thiserror::Error;

use super::types::MatchStatus;
use crate::ledger::LedgerError;

/// Errors raised by statement import and matching.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    // ========== Import Errors ==========
    /// Payload contains no text.
    #[error("Statement payload is empty")]
    EmptyPayload,

    /// No header row with the required columns.
    #[error("Statement header not found; expected a date column and debit/credit or amount columns")]
    HeaderNotFound,

    /// Header present but no row produced a line.
    #[error("Statement contains no valid rows ({skipped} rows skipped)")]
    NoValidRows {
        /// Rows skipped for bad dates, blank or zero amounts.
        skipped: usize,
    },

    /// Delimited text could not be read.
    #[error("Malformed statement payload: {0}")]
    Malformed(String),

    // ========== Matching Errors ==========
    /// Line state does not allow the requested action.
    #[error("Cannot {action} a statement line in status {from}")]
    InvalidTransition {
        /// Current status.
        from: MatchStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// Approval needs a suggested voucher.
    #[error("Statement line has no matched voucher to approve")]
    NoMatchedVoucher,

    /// Auto-post needs a contra account.
    #[error("A contra account is required to post this statement line")]
    ContraAccountRequired,

    /// Contra account equals the bank GL account.
    #[error("Contra account must differ from the bank GL account")]
    ContraIsBank,

    /// Manual match target does not fit the line.
    #[error("Journal entry {entry_id} does not match the statement line: {reason}")]
    EntryMismatch {
        /// The journal entry.
        entry_id: i64,
        /// Why it does not fit.
        reason: &'static str,
    },

    /// Journal entry already reconciled against another line.
    #[error("Journal entry {0} is already reconciled against another statement line")]
    EntryAlreadyClaimed(i64),

    /// Posting validation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPayload => "EMPTY_STATEMENT",
            Self::HeaderNotFound => "STATEMENT_HEADER_NOT_FOUND",
            Self::NoValidRows { .. } => "NO_VALID_ROWS",
            Self::Malformed(_) => "MALFORMED_STATEMENT",
            Self::InvalidTransition { .. } => "INVALID_LINE_TRANSITION",
            Self::NoMatchedVoucher => "NO_MATCHED_VOUCHER",
            Self::ContraAccountRequired => "CONTRA_ACCOUNT_REQUIRED",
            Self::ContraIsBank => "CONTRA_IS_BANK",
            Self::EntryMismatch { .. } => "ENTRY_MISMATCH",
            Self::EntryAlreadyClaimed(_) => "ENTRY_ALREADY_CLAIMED",
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Whether the error stems from the payload structure.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::EmptyPayload | Self::HeaderNotFound | Self::NoValidRows { .. } | Self::Malformed(_)
        )
    }
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        match err {
            ReconciliationError::Ledger(e) => e.into(),
            ReconciliationError::InvalidTransition { .. } => Self::BusinessRule(err.to_string()),
            ReconciliationError::EntryAlreadyClaimed(_) => Self::Conflict(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
