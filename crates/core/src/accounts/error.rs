//! Chart of accounts error types.

use ledgerline_shared::AppError;
use thiserror::Error;

use super::types::{AccountNo, AccountRole, AccountType, StatementClass};

/// Errors raised by the chart of accounts registry.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account numbers must be positive.
    #[error("Account number {0} is invalid; account numbers must be positive")]
    InvalidAccountNumber(AccountNo),

    /// Account name is blank.
    #[error("Account name cannot be empty")]
    EmptyName,

    /// Statement classification disagrees with the account type.
    #[error("A {account_type} account cannot be classified as {statement_class}")]
    StatementClassMismatch {
        /// The account type.
        account_type: AccountType,
        /// The requested classification.
        statement_class: StatementClass,
    },

    /// Account number already used by this tenant.
    #[error("Account {0} already exists")]
    DuplicateAccount(AccountNo),

    /// Account does not exist.
    #[error("Account {0} not found")]
    AccountNotFound(AccountNo),

    /// Account is inactive.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountNo),

    /// Role has no account mapped and cannot be provisioned.
    #[error(
        "No account is mapped to role {0}; map an account to {0} in the chart of accounts settings and retry"
    )]
    RoleUnmapped(AccountRole),

    /// Role code is not recognised.
    #[error("Unknown account role '{0}'")]
    UnknownRole(String),

    /// Bank account registration input is incomplete.
    #[error("Bank account {0} is required")]
    BankAccountFieldRequired(&'static str),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAccountNumber(_) => "INVALID_ACCOUNT_NUMBER",
            Self::EmptyName => "EMPTY_ACCOUNT_NAME",
            Self::StatementClassMismatch { .. } => "STATEMENT_CLASS_MISMATCH",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::RoleUnmapped(_) => "ROLE_UNMAPPED",
            Self::UnknownRole(_) => "UNKNOWN_ROLE",
            Self::BankAccountFieldRequired(_) => "BANK_ACCOUNT_FIELD_REQUIRED",
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::AccountNotFound(_) => Self::NotFound(err.to_string()),
            AccountError::DuplicateAccount(_) => Self::Conflict(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
