//! Ledger error types for posting validation.
//!
//! Every variant here is a validation or not-found condition; duplicate
//! voucher replays are never errors and are handled by the callers.

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::accounts::AccountNo;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A posting needs at least one line.
    #[error("Posting must contain at least one line")]
    NoLines,

    /// A single-line post was given several lines.
    #[error("Single-line post received {0} lines; use a multi-line post")]
    MultipleLines(usize),

    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// Debit and credit account are the same.
    #[error("Debit and credit account must differ (both are {0})")]
    SameAccount(AccountNo),

    /// Account number is zero or negative.
    #[error("Account number {0} is invalid")]
    InvalidAccountNumber(AccountNo),

    /// Voucher number is blank.
    #[error("Voucher number cannot be empty")]
    EmptyVoucherNo,

    /// Voucher type code is malformed.
    #[error("Invalid voucher type '{0}'; expected 1-10 uppercase letters or digits")]
    InvalidVoucherType(String),

    /// Report or query period is inverted.
    #[error("Period start {from} is after period end {to}")]
    InvalidPeriod {
        /// Period start.
        from: chrono::NaiveDate,
        /// Period end.
        to: chrono::NaiveDate,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account {0} not found")]
    AccountNotFound(AccountNo),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountNo),
}

impl LedgerError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINES",
            Self::MultipleLines(_) => "MULTIPLE_LINES",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::SameAccount(_) => "SAME_ACCOUNT",
            Self::InvalidAccountNumber(_) => "INVALID_ACCOUNT_NUMBER",
            Self::EmptyVoucherNo => "EMPTY_VOUCHER_NO",
            Self::InvalidVoucherType(_) => "INVALID_VOUCHER_TYPE",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
        }
    }

    /// Whether the error names a missing account rather than a bad request.
    #[must_use]
    pub const fn is_missing_account(&self) -> bool {
        matches!(self, Self::AccountNotFound(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        if err.is_missing_account() {
            Self::NotFound(err.to_string())
        } else {
            Self::Validation(err.to_string())
        }
    }
}
