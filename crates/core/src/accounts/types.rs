//! Chart of accounts domain types.

use std::fmt;
use std::str::FromStr;

use ledgerline_shared::types::{BankAccountId, TenantId};
use serde::{Deserialize, Serialize};

use super::error::AccountError;

/// Tenant-unique account number (e.g. `1100` for receivables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNo(pub i32);

impl AccountNo {
    /// Returns the raw number.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Account numbers must be strictly positive.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for AccountNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for AccountNo {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Account type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account (debit normal).
    Asset,
    /// Liability account (credit normal).
    Liability,
    /// Equity account (credit normal).
    Equity,
    /// Revenue account (credit normal).
    Revenue,
    /// Expense account (debit normal).
    Expense,
}

impl AccountType {
    /// Returns the statement an account of this type belongs on.
    #[must_use]
    pub const fn default_statement_class(self) -> StatementClass {
        match self {
            Self::Asset | Self::Liability | Self::Equity => StatementClass::BalanceSheet,
            Self::Revenue | Self::Expense => StatementClass::IncomeStatement,
        }
    }

    /// Returns the lowercase name used in storage and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Financial statement an account reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementClass {
    /// Balance sheet (permanent) account.
    BalanceSheet,
    /// Income statement (temporary) account.
    IncomeStatement,
}

impl fmt::Display for StatementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BalanceSheet => f.write_str("balance_sheet"),
            Self::IncomeStatement => f.write_str("income_statement"),
        }
    }
}

/// Cash-flow statement section an account's cash movements belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowGroup {
    /// Operating activities.
    Operating,
    /// Investing activities.
    Investing,
    /// Financing activities.
    Financing,
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Tenant-unique account number.
    pub account_no: AccountNo,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Statement classification.
    pub statement_class: StatementClass,
    /// Cash-flow group tag, if any.
    pub cash_flow_group: Option<CashFlowGroup>,
    /// Cash or cash-equivalent account.
    pub is_cash_account: bool,
    /// Expense without a cash outflow (depreciation, amortisation).
    pub is_non_cash_expense: bool,
    /// Account whose change feeds the working-capital adjustment.
    pub is_working_capital: bool,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Account number.
    pub account_no: AccountNo,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Statement classification; derived from the type when omitted.
    pub statement_class: Option<StatementClass>,
    /// Cash-flow group tag.
    pub cash_flow_group: Option<CashFlowGroup>,
    /// Cash account flag.
    pub is_cash_account: bool,
    /// Non-cash expense flag.
    pub is_non_cash_expense: bool,
    /// Working-capital flag.
    pub is_working_capital: bool,
}

impl NewAccount {
    /// Creates an untagged account input.
    #[must_use]
    pub fn new(account_no: impl Into<AccountNo>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            account_no: account_no.into(),
            name: name.into(),
            account_type,
            statement_class: None,
            cash_flow_group: None,
            is_cash_account: false,
            is_non_cash_expense: false,
            is_working_capital: false,
        }
    }

    /// Marks the account as a cash account.
    #[must_use]
    pub const fn cash(mut self) -> Self {
        self.is_cash_account = true;
        self
    }

    /// Marks the account as a working-capital account.
    #[must_use]
    pub const fn working_capital(mut self) -> Self {
        self.is_working_capital = true;
        self
    }

    /// Marks the account as a non-cash expense.
    #[must_use]
    pub const fn non_cash_expense(mut self) -> Self {
        self.is_non_cash_expense = true;
        self
    }

    /// Sets the cash-flow group.
    #[must_use]
    pub const fn with_cash_flow_group(mut self, group: CashFlowGroup) -> Self {
        self.cash_flow_group = Some(group);
        self
    }

    /// Builds the stored account for a tenant. Call after validation.
    #[must_use]
    pub fn into_account(self, tenant_id: TenantId) -> Account {
        Account {
            tenant_id,
            account_no: self.account_no,
            name: self.name.trim().to_string(),
            account_type: self.account_type,
            statement_class: self
                .statement_class
                .unwrap_or_else(|| self.account_type.default_statement_class()),
            cash_flow_group: self.cash_flow_group,
            is_cash_account: self.is_cash_account,
            is_non_cash_expense: self.is_non_cash_expense,
            is_working_capital: self.is_working_capital,
            is_active: true,
        }
    }
}

/// A bank account registered against a GL account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Bank account id.
    pub id: BankAccountId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// Account number or IBAN at the bank.
    pub bank_reference: String,
    /// GL account that mirrors this bank account.
    pub gl_account_no: AccountNo,
    /// Whether the bank account is in use.
    pub is_active: bool,
}

/// How many accounts carry each reporting tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    /// Total accounts inspected.
    pub total: usize,
    /// Accounts flagged as cash.
    pub cash: usize,
    /// Accounts flagged as non-cash expense.
    pub non_cash_expense: usize,
    /// Accounts flagged as working capital.
    pub working_capital: usize,
    /// Accounts tagged Operating.
    pub operating: usize,
    /// Accounts tagged Investing.
    pub investing: usize,
    /// Accounts tagged Financing.
    pub financing: usize,
}

/// Abstract account roles resolved per tenant to concrete accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountRole {
    /// Cash on hand.
    Cash,
    /// Default bank account.
    Bank,
    /// Accounts receivable control account.
    Ar,
    /// Accounts payable control account.
    Ap,
    /// Cheques in hand awaiting deposit clearance.
    PdcReceivable,
    /// Issued post-dated cheques awaiting bank clearance.
    PdcPayableClearing,
    /// Bank charges expense.
    BankCharges,
    /// Output VAT.
    VatPayable,
    /// Input VAT.
    VatReceivable,
    /// Suspense account for unidentified items.
    Suspense,
}

impl AccountRole {
    /// Every role, in display order.
    pub const ALL: [Self; 10] = [
        Self::Cash,
        Self::Bank,
        Self::Ar,
        Self::Ap,
        Self::PdcReceivable,
        Self::PdcPayableClearing,
        Self::BankCharges,
        Self::VatPayable,
        Self::VatReceivable,
        Self::Suspense,
    ];

    /// Returns the stable role code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Bank => "BANK",
            Self::Ar => "AR",
            Self::Ap => "AP",
            Self::PdcReceivable => "PDC_RECEIVABLE",
            Self::PdcPayableClearing => "PDC_PAYABLE_CLEARING",
            Self::BankCharges => "BANK_CHARGES",
            Self::VatPayable => "VAT_PAYABLE",
            Self::VatReceivable => "VAT_RECEIVABLE",
            Self::Suspense => "SUSPENSE",
        }
    }

    /// Template used to create the account on first use, for roles that allow it.
    #[must_use]
    pub fn provision_template(self) -> Option<NewAccount> {
        match self {
            Self::PdcReceivable => Some(
                NewAccount::new(1150, "Cheques in Hand", AccountType::Asset).working_capital(),
            ),
            Self::PdcPayableClearing => Some(
                NewAccount::new(2150, "PDC Payable Clearing", AccountType::Liability)
                    .working_capital(),
            ),
            Self::BankCharges => Some(
                NewAccount::new(6150, "Bank Charges", AccountType::Expense)
                    .with_cash_flow_group(CashFlowGroup::Operating),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AccountRole {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|role| role.code() == code)
            .ok_or_else(|| AccountError::UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes_round_trip() {
        for role in AccountRole::ALL {
            assert_eq!(role.code().parse::<AccountRole>().unwrap(), role);
        }
        assert_eq!("pdc_receivable".parse::<AccountRole>().unwrap(), AccountRole::PdcReceivable);
        assert!("PETTY".parse::<AccountRole>().is_err());
    }

    #[test]
    fn test_only_clearing_roles_have_templates() {
        assert!(AccountRole::PdcReceivable.provision_template().is_some());
        assert!(AccountRole::PdcPayableClearing.provision_template().is_some());
        assert!(AccountRole::BankCharges.provision_template().is_some());
        assert!(AccountRole::Ar.provision_template().is_none());
        assert!(AccountRole::Ap.provision_template().is_none());
        assert!(AccountRole::Bank.provision_template().is_none());
    }

    #[test]
    fn test_into_account_derives_statement_class() {
        let tenant = TenantId::new();
        let account = NewAccount::new(4000, " Sales ", AccountType::Revenue).into_account(tenant);
        assert_eq!(account.statement_class, StatementClass::IncomeStatement);
        assert_eq!(account.name, "Sales");
        assert!(account.is_active);
    }
}
