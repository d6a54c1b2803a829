//! Ledger domain types for posting.

use chrono::NaiveDate;
use ledgerline_shared::types::TenantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::VoucherType;
use crate::accounts::AccountNo;

/// One debit/credit pair within a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingLine {
    /// Account to debit.
    pub debit_account_no: AccountNo,
    /// Account to credit.
    pub credit_account_no: AccountNo,
    /// Positive amount.
    pub amount: Decimal,
    /// Optional narration.
    pub narration: Option<String>,
}

impl PostingLine {
    /// Creates a line without narration.
    #[must_use]
    pub fn new(debit: AccountNo, credit: AccountNo, amount: Decimal) -> Self {
        Self {
            debit_account_no: debit,
            credit_account_no: credit,
            amount,
            narration: None,
        }
    }

    /// Attaches a narration.
    #[must_use]
    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }

    /// Returns the exact offsetting line: same accounts and amount, sides swapped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            debit_account_no: self.credit_account_no,
            credit_account_no: self.debit_account_no,
            amount: self.amount,
            narration: self
                .narration
                .as_ref()
                .map(|n| format!("Reversal: {n}")),
        }
    }
}

/// A request to post one business event to the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRequest {
    /// Tenant the entries belong to.
    pub tenant_id: TenantId,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Originating workflow.
    pub voucher_type: VoucherType,
    /// Voucher number shared by all lines.
    pub voucher_no: String,
    /// Back-link to the originating document.
    pub ref_id: Option<Uuid>,
    /// Lines; committed together or not at all.
    pub lines: Vec<PostingLine>,
}

impl PostingRequest {
    /// Creates a single-line posting request.
    #[must_use]
    pub fn single(
        tenant_id: TenantId,
        transaction_date: NaiveDate,
        voucher_type: VoucherType,
        voucher_no: impl Into<String>,
        line: PostingLine,
    ) -> Self {
        Self {
            tenant_id,
            transaction_date,
            voucher_type,
            voucher_no: voucher_no.into(),
            ref_id: None,
            lines: vec![line],
        }
    }

    /// Sets the reference id.
    #[must_use]
    pub const fn with_ref(mut self, ref_id: Uuid) -> Self {
        self.ref_id = Some(ref_id);
        self
    }

    /// Sum of all line amounts.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }
}

/// A validated entry ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    /// Tenant.
    pub tenant_id: TenantId,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher number.
    pub voucher_no: String,
    /// Reference id.
    pub ref_id: Option<Uuid>,
    /// Debited account.
    pub debit_account_no: AccountNo,
    /// Credited account.
    pub credit_account_no: AccountNo,
    /// Positive amount.
    pub amount: Decimal,
    /// Narration.
    pub narration: Option<String>,
}

/// Account details needed to validate a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    /// The account number.
    pub account_no: AccountNo,
    /// Whether the account accepts postings.
    pub is_active: bool,
}
