//! Chart of accounts registry.
//!
//! Per-tenant account metadata, role mappings (AR, AP, BANK, clearing
//! accounts) and the reporting tags the cash-flow statement depends on.

pub mod error;
pub mod registry;
pub mod types;

pub use error::AccountError;
pub use registry::{AccountRegistry, RoleMap, RoleResolution};
pub use types::{
    Account, AccountNo, AccountRole, AccountType, BankAccount, CashFlowGroup, NewAccount,
    StatementClass, TagCounts,
};
