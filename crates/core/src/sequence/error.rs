//! Sequence allocator error types.

use ledgerline_shared::AppError;
use thiserror::Error;

/// Errors raised while allocating document numbers.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// Document type key is blank or malformed.
    #[error("Invalid document type '{0}'; expected 1-20 uppercase letters, digits or underscores")]
    InvalidDocType(String),

    /// Prefix is blank or contains whitespace.
    #[error("Invalid voucher prefix '{0}'")]
    InvalidPrefix(String),

    /// Pad width outside the supported range.
    #[error("Pad width {0} is outside 1..=18")]
    InvalidPadWidth(usize),

    /// Counter cannot advance further.
    #[error("Sequence {doc_type} is exhausted at {next_number}")]
    Overflow {
        /// Document type.
        doc_type: String,
        /// Counter value that could not be issued.
        next_number: i64,
    },

    /// Stored counter is below the first valid number.
    #[error("Sequence {doc_type} has invalid counter {next_number}")]
    CorruptCounter {
        /// Document type.
        doc_type: String,
        /// Stored counter.
        next_number: i64,
    },
}

impl SequenceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDocType(_) => "INVALID_DOC_TYPE",
            Self::InvalidPrefix(_) => "INVALID_PREFIX",
            Self::InvalidPadWidth(_) => "INVALID_PAD_WIDTH",
            Self::Overflow { .. } => "SEQUENCE_OVERFLOW",
            Self::CorruptCounter { .. } => "SEQUENCE_CORRUPT",
        }
    }
}

impl From<SequenceError> for AppError {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::CorruptCounter { .. } => Self::Internal(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
