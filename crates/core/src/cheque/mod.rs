//! Cheque lifecycle.
//!
//! Numbered cheque books, the cheque state machine, and the journal
//! postings each transition makes.

pub mod book;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use book::ChequeBookService;
pub use error::ChequeError;
pub use service::{ChequeService, PreparedCheque};
pub use types::{
    BankCharge, ChequeAccounts, ChequeBook, ChequeDirection, ChequeStatus, ChequeTransaction,
    ChequeTransition, ChequeType, LeafAllocation, NewCheque, PostingStage, uses_clearing,
};
