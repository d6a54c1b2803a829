//! Journal entries and voucher types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use ledgerline_shared::types::TenantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use crate::accounts::AccountNo;

/// Well-known voucher type codes.
pub mod codes {
    /// Sales invoice.
    pub const INV: &str = "INV";
    /// Purchase invoice.
    pub const PINV: &str = "PINV";
    /// Payroll.
    pub const PAY: &str = "PAY";
    /// Purchase payment.
    pub const PPAY: &str = "PPAY";
    /// Petty-cash voucher.
    pub const PCV: &str = "PCV";
    /// Construction progress billing.
    pub const CPB: &str = "CPB";
    /// Payment certificate.
    pub const PC: &str = "PC";
    /// Cheque lifecycle postings.
    pub const CHQ: &str = "CHQ";
    /// Manual journal.
    pub const JV: &str = "JV";
    /// Bank statement auto-posts.
    pub const BNK: &str = "BNK";

    /// Codes recognised as reference tokens in bank narrations, longest first.
    pub const REFERENCE_CODES: [&str; 9] = [PINV, PPAY, INV, PAY, PCV, CPB, CHQ, JV, PC];
}

/// Short code identifying the workflow that produced an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoucherType(String);

impl VoucherType {
    /// Validates and wraps a voucher type code.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidVoucherType` unless the code is 1-10
    /// uppercase ASCII letters or digits.
    pub fn new(code: impl Into<String>) -> Result<Self, LedgerError> {
        let code = code.into();
        let valid = !code.is_empty()
            && code.len() <= 10
            && code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if valid {
            Ok(Self(code))
        } else {
            Err(LedgerError::InvalidVoucherType(code))
        }
    }

    /// Voucher type for cheque lifecycle postings.
    #[must_use]
    pub fn cheque() -> Self {
        Self(codes::CHQ.to_string())
    }

    /// Voucher type for bank statement auto-posts.
    #[must_use]
    pub fn bank() -> Self {
        Self(codes::BNK.to_string())
    }

    /// Returns the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VoucherType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim().to_ascii_uppercase())
    }
}

impl TryFrom<String> for VoucherType {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VoucherType> for String {
    fn from(value: VoucherType) -> Self {
        value.0
    }
}

/// An immutable, stored journal entry.
///
/// Each entry is one balanced debit/credit pair; `id` is the monotonic
/// insertion order used to break same-date ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Insertion-ordered surrogate id.
    pub id: i64,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Originating workflow.
    pub voucher_type: VoucherType,
    /// Voucher number.
    pub voucher_no: String,
    /// Back-link to the originating business document.
    pub ref_id: Option<Uuid>,
    /// Debited account.
    pub debit_account_no: AccountNo,
    /// Credited account.
    pub credit_account_no: AccountNo,
    /// Positive amount.
    pub amount: Decimal,
    /// Optional narration.
    pub narration: Option<String>,
}

impl JournalEntry {
    /// Whether the entry debits or credits the account.
    #[must_use]
    pub fn touches(&self, account_no: AccountNo) -> bool {
        self.debit_account_no == account_no || self.credit_account_no == account_no
    }

    /// Debit and credit amounts this entry contributes to `account_no`.
    #[must_use]
    pub fn amounts_for(&self, account_no: AccountNo) -> (Decimal, Decimal) {
        let debit = if self.debit_account_no == account_no {
            self.amount
        } else {
            Decimal::ZERO
        };
        let credit = if self.credit_account_no == account_no {
            self.amount
        } else {
            Decimal::ZERO
        };
        (debit, credit)
    }

    /// The other side of the entry, seen from `account_no`.
    #[must_use]
    pub fn contra_of(&self, account_no: AccountNo) -> Option<AccountNo> {
        if self.debit_account_no == account_no {
            Some(self.credit_account_no)
        } else if self.credit_account_no == account_no {
            Some(self.debit_account_no)
        } else {
            None
        }
    }
}
