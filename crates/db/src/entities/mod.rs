//! `SeaORM` entities for the ledger schema.
//!
//! Each module maps one table; `From`/`TryFrom` impls convert rows into the
//! domain types of `ledgerline-core`.

pub mod account_role_mappings;
pub mod accounts;
pub mod bank_accounts;
pub mod bank_statement_imports;
pub mod bank_statement_lines;
pub mod cheque_books;
pub mod cheque_transactions;
pub mod doc_sequences;
pub mod journal_entries;
pub mod sea_orm_active_enums;
pub mod trade_documents;
