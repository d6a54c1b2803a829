//! Chart of accounts registry rules.
//!
//! Stateless: callers load the tenant's accounts and role mappings and pass
//! them in; the registry decides what to write.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::AccountError;
use super::types::{Account, AccountNo, AccountRole, NewAccount, TagCounts};

/// Per-tenant resolution of roles to account numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMap {
    mappings: BTreeMap<AccountRole, AccountNo>,
}

impl RoleMap {
    /// Creates an empty role map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a role to an account, replacing any existing mapping.
    pub fn set(&mut self, role: AccountRole, account_no: AccountNo) {
        self.mappings.insert(role, account_no);
    }

    /// Returns the mapped account, if any.
    #[must_use]
    pub fn get(&self, role: AccountRole) -> Option<AccountNo> {
        self.mappings.get(&role).copied()
    }

    /// Returns the mapped account or a descriptive error.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::RoleUnmapped` when the role has no account.
    pub fn require(&self, role: AccountRole) -> Result<AccountNo, AccountError> {
        self.get(role).ok_or(AccountError::RoleUnmapped(role))
    }

    /// Returns the roles mapped to the given account.
    pub fn roles_for(&self, account_no: AccountNo) -> impl Iterator<Item = AccountRole> + '_ {
        self.mappings
            .iter()
            .filter(move |(_, no)| **no == account_no)
            .map(|(role, _)| *role)
    }

    /// Whether the account is a receivable or payable control account.
    #[must_use]
    pub fn is_control_account(&self, account_no: AccountNo) -> bool {
        self.roles_for(account_no)
            .any(|role| matches!(role, AccountRole::Ar | AccountRole::Ap))
    }

    /// Iterates mappings in role order.
    pub fn iter(&self) -> impl Iterator<Item = (AccountRole, AccountNo)> + '_ {
        self.mappings.iter().map(|(role, no)| (*role, *no))
    }
}

impl FromIterator<(AccountRole, AccountNo)> for RoleMap {
    fn from_iter<T: IntoIterator<Item = (AccountRole, AccountNo)>>(iter: T) -> Self {
        Self {
            mappings: iter.into_iter().collect(),
        }
    }
}

/// What the caller must do to satisfy a role lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleResolution {
    /// Role already mapped to an active account.
    Mapped(AccountNo),
    /// Template account exists but is not mapped yet; map it.
    MapExisting(AccountNo),
    /// Create the account from the template, then map it.
    Provision(NewAccount),
}

impl RoleResolution {
    /// The account number the role resolves to.
    #[must_use]
    pub fn account_no(&self) -> AccountNo {
        match self {
            Self::Mapped(no) | Self::MapExisting(no) => *no,
            Self::Provision(new) => new.account_no,
        }
    }
}

/// Stateless chart of accounts rules.
pub struct AccountRegistry;

impl AccountRegistry {
    /// Validates a new account against the tenant's existing chart.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive numbers, blank names, a statement
    /// class inconsistent with the type, or a duplicate number.
    pub fn validate_new_account(
        input: &NewAccount,
        existing: Option<&Account>,
    ) -> Result<(), AccountError> {
        if !input.account_no.is_valid() {
            return Err(AccountError::InvalidAccountNumber(input.account_no));
        }
        if input.name.trim().is_empty() {
            return Err(AccountError::EmptyName);
        }
        if let Some(class) = input.statement_class
            && class != input.account_type.default_statement_class()
        {
            return Err(AccountError::StatementClassMismatch {
                account_type: input.account_type,
                statement_class: class,
            });
        }
        if existing.is_some() {
            return Err(AccountError::DuplicateAccount(input.account_no));
        }
        Ok(())
    }

    /// Checks that an account can receive postings.
    ///
    /// # Errors
    ///
    /// Returns not-found for unknown accounts and a validation error for
    /// inactive ones.
    pub fn ensure_postable(
        account_no: AccountNo,
        account: Option<&Account>,
    ) -> Result<&Account, AccountError> {
        let account = account.ok_or(AccountError::AccountNotFound(account_no))?;
        if !account.is_active {
            return Err(AccountError::AccountInactive(account_no));
        }
        Ok(account)
    }

    /// Decides how to satisfy a role, auto-provisioning clearing accounts.
    ///
    /// `lookup` finds an existing account by number.
    ///
    /// # Errors
    ///
    /// Returns `RoleUnmapped` when the role is unmapped and either has no
    /// template or provisioning is disabled, and `AccountInactive` when the
    /// mapped account has been deactivated.
    pub fn resolve_role<'a, L>(
        role: AccountRole,
        roles: &RoleMap,
        auto_provision: bool,
        lookup: L,
    ) -> Result<RoleResolution, AccountError>
    where
        L: Fn(AccountNo) -> Option<&'a Account>,
    {
        if let Some(mapped) = roles.get(role) {
            Self::ensure_postable(mapped, lookup(mapped))?;
            return Ok(RoleResolution::Mapped(mapped));
        }

        if !auto_provision {
            return Err(AccountError::RoleUnmapped(role));
        }
        let template = role
            .provision_template()
            .ok_or(AccountError::RoleUnmapped(role))?;

        match lookup(template.account_no) {
            Some(existing) if existing.account_type == template.account_type => {
                Self::ensure_postable(existing.account_no, Some(existing))?;
                Ok(RoleResolution::MapExisting(existing.account_no))
            }
            // Template number taken by an unrelated account: never hijack it.
            Some(_) => Err(AccountError::RoleUnmapped(role)),
            None => Ok(RoleResolution::Provision(template)),
        }
    }

    /// Counts how many accounts carry each reporting tag.
    #[must_use]
    pub fn tag_counts(accounts: &[Account]) -> TagCounts {
        use super::types::CashFlowGroup;

        accounts.iter().fold(
            TagCounts {
                total: accounts.len(),
                ..TagCounts::default()
            },
            |mut counts, account| {
                counts.cash += usize::from(account.is_cash_account);
                counts.non_cash_expense += usize::from(account.is_non_cash_expense);
                counts.working_capital += usize::from(account.is_working_capital);
                match account.cash_flow_group {
                    Some(CashFlowGroup::Operating) => counts.operating += 1,
                    Some(CashFlowGroup::Investing) => counts.investing += 1,
                    Some(CashFlowGroup::Financing) => counts.financing += 1,
                    None => {}
                }
                counts
            },
        )
    }

    /// Validates bank account registration input.
    ///
    /// # Errors
    ///
    /// Returns an error when the name or bank reference is blank, or when the
    /// GL account is missing or inactive.
    pub fn validate_bank_account(
        name: &str,
        bank_reference: &str,
        gl_account_no: AccountNo,
        gl_account: Option<&Account>,
    ) -> Result<(), AccountError> {
        if name.trim().is_empty() {
            return Err(AccountError::BankAccountFieldRequired("name"));
        }
        if bank_reference.trim().is_empty() {
            return Err(AccountError::BankAccountFieldRequired("reference"));
        }
        Self::ensure_postable(gl_account_no, gl_account)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::types::{AccountType, CashFlowGroup, StatementClass};
    use ledgerline_shared::types::TenantId;

    fn account(no: i32, account_type: AccountType) -> Account {
        NewAccount::new(no, format!("Account {no}"), account_type).into_account(TenantId::new())
    }

    #[test]
    fn test_validate_rejects_mismatched_statement_class() {
        let mut input = NewAccount::new(1000, "Cash", AccountType::Asset);
        input.statement_class = Some(StatementClass::IncomeStatement);
        assert!(matches!(
            AccountRegistry::validate_new_account(&input, None),
            Err(AccountError::StatementClassMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_numbers() {
        let existing = account(1000, AccountType::Asset);
        let input = NewAccount::new(1000, "Cash", AccountType::Asset);
        assert!(matches!(
            AccountRegistry::validate_new_account(&input, Some(&existing)),
            Err(AccountError::DuplicateAccount(_))
        ));

        let input = NewAccount::new(0, "Cash", AccountType::Asset);
        assert!(matches!(
            AccountRegistry::validate_new_account(&input, None),
            Err(AccountError::InvalidAccountNumber(_))
        ));

        let input = NewAccount::new(1001, "  ", AccountType::Asset);
        assert!(matches!(
            AccountRegistry::validate_new_account(&input, None),
            Err(AccountError::EmptyName)
        ));
    }

    #[test]
    fn test_resolve_role_prefers_existing_mapping() {
        let ap = account(2000, AccountType::Liability);
        let roles: RoleMap = [(AccountRole::Ap, AccountNo(2000))].into_iter().collect();
        let resolution =
            AccountRegistry::resolve_role(AccountRole::Ap, &roles, true, |no| (no == ap.account_no).then_some(&ap))
                .unwrap();
        assert_eq!(resolution, RoleResolution::Mapped(AccountNo(2000)));
    }

    #[test]
    fn test_resolve_role_never_provisions_control_accounts() {
        let roles = RoleMap::new();
        let err = AccountRegistry::resolve_role(AccountRole::Ar, &roles, true, |_| None).unwrap_err();
        assert!(matches!(err, AccountError::RoleUnmapped(AccountRole::Ar)));
    }

    #[test]
    fn test_resolve_role_provisions_clearing_template() {
        let roles = RoleMap::new();
        let resolution =
            AccountRegistry::resolve_role(AccountRole::PdcPayableClearing, &roles, true, |_| None).unwrap();
        match resolution {
            RoleResolution::Provision(template) => {
                assert_eq!(template.account_no, AccountNo(2150));
                assert_eq!(template.account_type, AccountType::Liability);
            }
            other => panic!("expected provisioning, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_role_maps_existing_template_account() {
        let existing = account(1150, AccountType::Asset);
        let resolution = AccountRegistry::resolve_role(AccountRole::PdcReceivable, &RoleMap::new(), true, |no| {
            (no == existing.account_no).then_some(&existing)
        })
        .unwrap();
        assert_eq!(resolution, RoleResolution::MapExisting(AccountNo(1150)));
    }

    #[test]
    fn test_resolve_role_respects_disabled_provisioning() {
        let err = AccountRegistry::resolve_role(AccountRole::BankCharges, &RoleMap::new(), false, |_| None)
            .unwrap_err();
        assert!(matches!(err, AccountError::RoleUnmapped(AccountRole::BankCharges)));
    }

    #[test]
    fn test_resolve_role_rejects_inactive_mapping() {
        let mut bank = account(1010, AccountType::Asset);
        bank.is_active = false;
        let roles: RoleMap = [(AccountRole::Bank, AccountNo(1010))].into_iter().collect();
        let err = AccountRegistry::resolve_role(AccountRole::Bank, &roles, true, |_| Some(&bank)).unwrap_err();
        assert!(matches!(err, AccountError::AccountInactive(_)));
    }

    #[test]
    fn test_tag_counts() {
        let accounts = vec![
            NewAccount::new(1000, "Cash", AccountType::Asset)
                .cash()
                .into_account(TenantId::new()),
            NewAccount::new(1100, "AR", AccountType::Asset)
                .working_capital()
                .with_cash_flow_group(CashFlowGroup::Operating)
                .into_account(TenantId::new()),
            NewAccount::new(1500, "Equipment", AccountType::Asset)
                .with_cash_flow_group(CashFlowGroup::Investing)
                .into_account(TenantId::new()),
            NewAccount::new(6500, "Depreciation", AccountType::Expense)
                .non_cash_expense()
                .into_account(TenantId::new()),
        ];
        let counts = AccountRegistry::tag_counts(&accounts);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.cash, 1);
        assert_eq!(counts.working_capital, 1);
        assert_eq!(counts.non_cash_expense, 1);
        assert_eq!(counts.operating, 1);
        assert_eq!(counts.investing, 1);
        assert_eq!(counts.financing, 0);
    }

    #[test]
    fn test_control_account_detection() {
        let roles: RoleMap = [
            (AccountRole::Ar, AccountNo(1100)),
            (AccountRole::Bank, AccountNo(1010)),
        ]
        .into_iter()
        .collect();
        assert!(roles.is_control_account(AccountNo(1100)));
        assert!(!roles.is_control_account(AccountNo(1010)));
    }
}
