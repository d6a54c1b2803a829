//! Account balance calculations.
//!
//! Balances are never stored: every figure is folded from journal entries on
//! demand. The raw balance of an account is `Σdebit − Σcredit`; reports that
//! want a positive "natural" figure convert via [`NormalBalance`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::JournalEntry;
use crate::accounts::{AccountNo, AccountType};

/// Side on which an account's balance normally sits.
///
/// - Asset/Expense: balance += debit - credit (debit-normal)
/// - Liability/Equity/Revenue: balance += credit - debit (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense)
    DebitNormal,
    /// Credit-normal accounts (Liability, Equity, Revenue)
    CreditNormal,
}

impl NormalBalance {
    /// Determines the normal side from the account type.
    #[must_use]
    pub const fn of(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Asset | AccountType::Expense => Self::DebitNormal,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
                Self::CreditNormal
            }
        }
    }

    /// Calculates the natural-sign balance change for debit/credit amounts.
    #[must_use]
    pub fn signed(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::DebitNormal => debit - credit,
            Self::CreditNormal => credit - debit,
        }
    }
}

/// Debit and credit totals for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account.
    pub account_no: AccountNo,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountBalance {
    /// Creates a zero balance.
    #[must_use]
    pub const fn new(account_no: AccountNo) -> Self {
        Self {
            account_no,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Adds an entry's contribution to this account.
    pub fn apply(&mut self, entry: &JournalEntry) {
        let (debit, credit) = entry.amounts_for(self.account_no);
        self.debit_total += debit;
        self.credit_total += credit;
    }

    /// Raw balance: debits minus credits.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.debit_total - self.credit_total
    }

    /// Balance in the account's natural sign.
    #[must_use]
    pub fn natural(&self, normal: NormalBalance) -> Decimal {
        normal.signed(self.debit_total, self.credit_total)
    }
}

/// Raw balance of `account_no` from entries dated on or before `as_of`.
#[must_use]
pub fn balance_as_of(entries: &[JournalEntry], account_no: AccountNo, as_of: NaiveDate) -> Decimal {
    totals_between(entries, account_no, None, Some(as_of)).balance()
}

/// Raw balance of `account_no` from entries dated strictly before `date`.
#[must_use]
pub fn balance_before(entries: &[JournalEntry], account_no: AccountNo, date: NaiveDate) -> Decimal {
    date.pred_opt()
        .map_or(Decimal::ZERO, |prev| balance_as_of(entries, account_no, prev))
}

/// Debit/credit totals for an account within an optional inclusive window.
#[must_use]
pub fn totals_between(
    entries: &[JournalEntry],
    account_no: AccountNo,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AccountBalance {
    let mut totals = AccountBalance::new(account_no);
    entries
        .iter()
        .filter(|e| from.is_none_or(|f| e.transaction_date >= f))
        .filter(|e| to.is_none_or(|t| e.transaction_date <= t))
        .for_each(|e| totals.apply(e));
    totals
}

/// Running balance after one ledger row.
///
/// - current_balance[N] = previous_balance[N] + change
/// - previous_balance[N] = current_balance[N-1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Position in the fold, starting at 1.
    pub sequence: u64,
    /// Balance before this row.
    pub previous_balance: Decimal,
    /// Balance after this row.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Starts a fold from an opening balance.
    #[must_use]
    pub const fn opening(balance: Decimal) -> Self {
        Self {
            sequence: 0,
            previous_balance: balance,
            current_balance: balance,
        }
    }

    /// Advances the fold by one row.
    #[must_use]
    pub fn next(&self, change: Decimal) -> Self {
        Self {
            sequence: self.sequence + 1,
            previous_balance: self.current_balance,
            current_balance: self.current_balance + change,
        }
    }
}
