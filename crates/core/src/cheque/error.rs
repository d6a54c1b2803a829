//! Cheque lifecycle error types.

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::ChequeStatus;
use crate::accounts::AccountError;
use crate::ledger::LedgerError;

/// Errors raised by cheque books and the cheque state machine.
#[derive(Debug, Error)]
pub enum ChequeError {
    // ========== Book Errors ==========
    /// Book range is not `0 < start <= end`.
    #[error("Invalid cheque book range {start}..={end}; start must be positive and not after end")]
    InvalidBookRange {
        /// First leaf.
        start: i64,
        /// Last leaf.
        end: i64,
    },

    /// Book is deactivated.
    #[error("Cheque book is inactive")]
    BookInactive,

    /// Every leaf has been issued.
    #[error("Cheque book is exhausted; last leaf {end_no} already issued")]
    BookExhausted {
        /// Last leaf of the book.
        end_no: i64,
    },

    /// Outgoing cheques draw from a book.
    #[error("An outgoing cheque requires a cheque book")]
    BookRequired,

    /// Incoming cheques carry the drawer's number.
    #[error("An incoming cheque requires the cheque number printed by the drawer")]
    ChequeNumberRequired,

    // ========== Cheque Errors ==========
    /// Transition not allowed from the current status.
    #[error("Invalid cheque transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ChequeStatus,
        /// Requested status.
        to: ChequeStatus,
    },

    /// Amount must be positive.
    #[error("Cheque amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Bank charge must be positive when given.
    #[error("Bank charge must be positive, got {0}")]
    InvalidBankCharge(Decimal),

    /// Post-dated cheques are dated after issue.
    #[error("A post-dated cheque must be dated after its issue date")]
    PostDatedNotInFuture,

    /// Instrument routes through a clearing account that was not supplied.
    #[error("This cheque requires a clearing account")]
    ClearingAccountRequired,

    /// Void reason is required but not provided.
    #[error("Void reason is required")]
    VoidReasonRequired,

    /// Role mapping failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Posting validation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ChequeError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBookRange { .. } => "INVALID_BOOK_RANGE",
            Self::BookInactive => "CHEQUE_BOOK_INACTIVE",
            Self::BookExhausted { .. } => "CHEQUE_BOOK_EXHAUSTED",
            Self::BookRequired => "CHEQUE_BOOK_REQUIRED",
            Self::ChequeNumberRequired => "CHEQUE_NUMBER_REQUIRED",
            Self::InvalidTransition { .. } => "INVALID_CHEQUE_TRANSITION",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidBankCharge(_) => "INVALID_BANK_CHARGE",
            Self::PostDatedNotInFuture => "POST_DATED_NOT_IN_FUTURE",
            Self::ClearingAccountRequired => "CLEARING_ACCOUNT_REQUIRED",
            Self::VoidReasonRequired => "VOID_REASON_REQUIRED",
            Self::Account(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
        }
    }
}

impl From<ChequeError> for AppError {
    fn from(err: ChequeError) -> Self {
        match err {
            ChequeError::Account(e) => e.into(),
            ChequeError::Ledger(e) => e.into(),
            ChequeError::InvalidTransition { .. } => Self::BusinessRule(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
