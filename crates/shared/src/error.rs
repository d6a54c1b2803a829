//! Application-wide error taxonomy.
//!
//! Domain errors from the engine crates convert into [`AppError`] so callers
//! can render user-facing messages without matching on every module's enum.

use thiserror::Error;

/// Shorthand for results carrying an [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// Coarse error classes shared by every engine module.
#[derive(Debug, Error)]
pub enum AppError {
    /// The tenant has no such account, document, line or cheque.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input such as a zero amount or blank voucher number.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Well-formed input refused by a state machine or ledger rule.
    #[error("Rule violated: {0}")]
    BusinessRule(String),

    /// Lost a race or collided with an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store failed; nothing was committed.
    #[error("Storage failure: {0}")]
    Database(String),

    /// A bug or broken invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status number an outer surface can report, in the familiar 4xx/5xx ranges.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for the not-found class of errors.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether retrying with different input could succeed.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }
}
