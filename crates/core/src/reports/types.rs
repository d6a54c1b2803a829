//! Report data types.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{AccountNo, AccountType, TagCounts};
use crate::ledger::{JournalEntry, VoucherType};

/// Label used when a control-account row has no originating document.
pub const UNRESOLVED_COUNTERPARTY: &str = "(unresolved)";

/// One row of a ledger card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCardRow {
    /// Journal entry id.
    pub entry_id: i64,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher number.
    pub voucher_no: String,
    /// Reference id.
    pub ref_id: Option<Uuid>,
    /// Narration.
    pub narration: Option<String>,
    /// Account on the other side of the entry.
    pub contra_account_no: AccountNo,
    /// Debit to the card's account.
    pub debit: Decimal,
    /// Credit to the card's account.
    pub credit: Decimal,
    /// Balance after this row.
    pub running_balance: Decimal,
    /// Customer or vendor, for AR/AP cards.
    pub counterparty: Option<String>,
}

/// Account history with opening and running balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCard {
    /// Account.
    pub account_no: AccountNo,
    /// Account name.
    pub account_name: String,
    /// Period start.
    pub from: NaiveDate,
    /// Period end.
    pub to: NaiveDate,
    /// Balance of everything before `from`.
    pub opening_balance: Decimal,
    /// Rows in date then insertion order.
    pub rows: Vec<LedgerCardRow>,
    /// Debits within the period.
    pub total_debit: Decimal,
    /// Credits within the period.
    pub total_credit: Decimal,
    /// Balance after the last row.
    pub closing_balance: Decimal,
}

/// Customer and vendor names keyed by originating document.
///
/// Populated from the sales and purchase document directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterpartyIndex {
    by_ref: HashMap<Uuid, String>,
    by_voucher: HashMap<(String, String), String>,
}

impl CounterpartyIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document.
    pub fn insert(
        &mut self,
        document_id: Uuid,
        voucher_type: &str,
        voucher_no: &str,
        party_name: impl Into<String>,
    ) {
        let name = party_name.into();
        self.by_voucher
            .insert((voucher_type.to_string(), voucher_no.to_string()), name.clone());
        self.by_ref.insert(document_id, name);
    }

    /// Finds the party behind an entry, by `ref_id` first, then by voucher.
    #[must_use]
    pub fn resolve(&self, entry: &JournalEntry) -> Option<String> {
        entry
            .ref_id
            .and_then(|id| self.by_ref.get(&id))
            .or_else(|| {
                self.by_voucher.get(&(
                    entry.voucher_type.as_str().to_string(),
                    entry.voucher_no.clone(),
                ))
            })
            .cloned()
    }

    /// Number of registered documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty()
    }
}

/// One account line of the profit and loss statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlRow {
    /// Account.
    pub account_no: AccountNo,
    /// Account name.
    pub name: String,
    /// Net movement in the account's natural sign.
    pub amount: Decimal,
}

/// Profit and loss for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    /// Period start.
    pub from: NaiveDate,
    /// Period end.
    pub to: NaiveDate,
    /// Revenue accounts with movement.
    pub revenue: Vec<PnlRow>,
    /// Expense accounts with movement.
    pub expenses: Vec<PnlRow>,
    /// Sum of revenue rows.
    pub total_revenue: Decimal,
    /// Sum of expense rows.
    pub total_expenses: Decimal,
    /// Revenue minus expenses.
    pub net_result: Decimal,
}

/// A single adjustment line in the cash flow statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowLine {
    /// Account.
    pub account_no: AccountNo,
    /// Account name.
    pub name: String,
    /// Effect on cash.
    pub amount: Decimal,
}

/// Change in a working-capital account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingCapitalLine {
    /// Account.
    pub account_no: AccountNo,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Natural balance at period start.
    pub opening: Decimal,
    /// Natural balance at period end.
    pub closing: Decimal,
    /// Effect on operating cash.
    pub cash_effect: Decimal,
}

/// Indirect-method cash flow statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    /// Period start.
    pub from: NaiveDate,
    /// Period end.
    pub to: NaiveDate,
    /// Net income for the period.
    pub net_income: Decimal,
    /// Non-cash expenses added back.
    pub non_cash_addbacks: Vec<CashFlowLine>,
    /// Working-capital movements.
    pub working_capital: Vec<WorkingCapitalLine>,
    /// Net income plus add-backs plus working-capital effects.
    pub operating: Decimal,
    /// Cash movements against investing accounts.
    pub investing_lines: Vec<CashFlowLine>,
    /// Investing total.
    pub investing: Decimal,
    /// Cash movements against financing accounts.
    pub financing_lines: Vec<CashFlowLine>,
    /// Financing total.
    pub financing: Decimal,
    /// Operating plus investing plus financing.
    pub net_cash_flow: Decimal,
    /// Cash balance before the period.
    pub opening_cash: Decimal,
    /// Cash balance at the end of the period.
    pub closing_cash: Decimal,
    /// Actual change in cash minus computed net cash flow.
    pub unexplained_difference: Decimal,
    /// How many accounts carry each tag.
    pub diagnostics: TagCounts,
    /// Human-readable hints about the chart of accounts.
    pub warnings: Vec<String>,
}

/// One account line of a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account.
    pub account_no: AccountNo,
    /// Account name.
    pub name: String,
    /// Account type, when the account is known.
    pub account_type: Option<AccountType>,
    /// Total debits.
    pub debit_total: Decimal,
    /// Total credits.
    pub credit_total: Decimal,
    /// Debits minus credits.
    pub balance: Decimal,
}

/// Trial balance as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Cut-off date, inclusive.
    pub as_of: NaiveDate,
    /// Accounts with activity.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}
