//! Repository abstractions for data access.
//!
//! Repositories run the pure rules of `ledgerline-core` inside tenant-scoped
//! transactions and hide the `SeaORM` details from callers.

pub mod account;
pub mod cheque;
pub mod journal;
pub mod sequence;
pub mod statement;
pub mod trade_document;

pub use account::{AccountRepoError, AccountRepository};
pub use cheque::{ChequeRepoError, ChequeRepository};
pub use journal::{JournalError, JournalRepository};
pub use sequence::{SequenceRepoError, SequenceRepository};
pub use statement::{AutoPostRequest, StatementError, StatementRepository};
pub use trade_document::{NewTradeDocument, TradeDocumentRepository};
