//! Core business logic for Ledgerline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here; the `db`
//! crate feeds them stored rows and persists what they return.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts, roles and reporting tags
//! - `ledger` - Double-entry journal rules and balances
//! - `sequence` - Per-tenant document numbering
//! - `reconciliation` - Bank statement parsing and matching
//! - `cheque` - Cheque books and the cheque lifecycle
//! - `reports` - Ledger card, profit and loss, cash flow, trial balance

pub mod accounts;
pub mod cheque;
pub mod ledger;
pub mod reconciliation;
pub mod reports;
pub mod sequence;
