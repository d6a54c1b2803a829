//! Double-entry bookkeeping logic.
//!
//! This module implements the journal store rules:
//! - Journal entries and voucher types
//! - Posting validation (single and multi-line)
//! - Balance calculations folded from entries
//! - Error types for ledger operations

pub mod balance;
pub mod entry;
pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::{AccountBalance, NormalBalance, RunningBalance, balance_as_of, balance_before, totals_between};
pub use entry::{JournalEntry, VoucherType, codes};
pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{AccountInfo, NewJournalEntry, PostingLine, PostingRequest};
