//! Account repository for chart of accounts, role mappings and bank accounts.

use std::collections::HashMap;

use chrono::Utc;
use ledgerline_core::accounts::{
    Account, AccountError, AccountNo, AccountRegistry, AccountRole, BankAccount, NewAccount, RoleMap,
    RoleResolution, TagCounts,
};
use ledgerline_shared::AppError;
use ledgerline_shared::types::{BankAccountId, TenantId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    DbBackend, QueryOrder, Set, Statement,
};
use tracing::info;

use crate::entities::{account_role_mappings, accounts, bank_accounts};
use crate::rls::RlsConnection;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountRepoError {
    /// Registry rule violated.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Bank account not found.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(BankAccountId),

    /// Stored role code no longer recognised.
    #[error("Stored role mapping is corrupt: {0}")]
    CorruptRole(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Account(e) => e.error_code(),
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::CorruptRole(_) => "CORRUPT_ROLE_MAPPING",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<AccountRepoError> for AppError {
    fn from(err: AccountRepoError) -> Self {
        match err {
            AccountRepoError::Account(e) => e.into(),
            AccountRepoError::BankAccountNotFound(_) => Self::NotFound(err.to_string()),
            AccountRepoError::CorruptRole(_) => Self::Internal(err.to_string()),
            AccountRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account after checking the registry rules.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input, a duplicate number, or a database failure.
    pub async fn create_account(&self, tenant_id: TenantId, input: NewAccount) -> Result<Account, AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let account = insert_account(rls.transaction(), tenant_id, input).await?;
        rls.commit().await?;
        Ok(account)
    }

    /// Deactivates an account. Accounts are never deleted.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub async fn deactivate_account(
        &self,
        tenant_id: TenantId,
        account_no: AccountNo,
    ) -> Result<Account, AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let model = accounts::Entity::find_by_id((tenant_id.into_inner(), account_no.value()))
            .one(rls.transaction())
            .await?
            .ok_or(AccountError::AccountNotFound(account_no))?;

        let mut active: accounts::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(rls.transaction()).await?;
        rls.commit().await?;

        info!(tenant_id = %tenant_id, account_no = %account_no, "account deactivated");
        Ok(updated.into())
    }

    /// Lists the chart of accounts in number order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self, tenant_id: TenantId) -> Result<Vec<Account>, AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let accounts = load_accounts(rls.transaction(), tenant_id).await?;
        rls.commit().await?;
        Ok(accounts)
    }

    /// Finds one account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(
        &self,
        tenant_id: TenantId,
        account_no: AccountNo,
    ) -> Result<Option<Account>, AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let account = accounts::Entity::find_by_id((tenant_id.into_inner(), account_no.value()))
            .one(rls.transaction())
            .await?
            .map(Account::from);
        rls.commit().await?;
        Ok(account)
    }

    /// Maps a role to an active account, replacing any previous mapping.
    ///
    /// # Errors
    ///
    /// Returns an error when the account is unknown or inactive.
    pub async fn set_role_mapping(
        &self,
        tenant_id: TenantId,
        role: AccountRole,
        account_no: AccountNo,
    ) -> Result<(), AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let account = accounts::Entity::find_by_id((tenant_id.into_inner(), account_no.value()))
            .one(rls.transaction())
            .await?
            .map(Account::from);
        AccountRegistry::ensure_postable(account_no, account.as_ref())?;
        upsert_role(rls.transaction(), tenant_id, role, account_no).await?;
        rls.commit().await?;
        Ok(())
    }

    /// Returns the tenant's role mappings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a stored role is unknown.
    pub async fn role_map(&self, tenant_id: TenantId) -> Result<RoleMap, AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let roles = load_role_map(rls.transaction(), tenant_id).await?;
        rls.commit().await?;
        Ok(roles)
    }

    /// Resolves a role, creating and mapping its template account when allowed.
    ///
    /// # Errors
    ///
    /// Returns `RoleUnmapped` for roles that cannot be provisioned.
    pub async fn ensure_role_account(
        &self,
        tenant_id: TenantId,
        role: AccountRole,
        auto_provision: bool,
    ) -> Result<AccountNo, AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let account_no = ensure_role(rls.transaction(), tenant_id, role, auto_provision).await?;
        rls.commit().await?;
        Ok(account_no)
    }

    /// Counts how many accounts carry each reporting tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn tag_counts(&self, tenant_id: TenantId) -> Result<TagCounts, AccountRepoError> {
        Ok(AccountRegistry::tag_counts(&self.list_accounts(tenant_id).await?))
    }

    /// Registers a bank account against an active GL account.
    ///
    /// # Errors
    ///
    /// Returns an error for blank fields or an unusable GL account.
    pub async fn register_bank_account(
        &self,
        tenant_id: TenantId,
        name: &str,
        bank_reference: &str,
        gl_account_no: AccountNo,
    ) -> Result<BankAccount, AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let gl = accounts::Entity::find_by_id((tenant_id.into_inner(), gl_account_no.value()))
            .one(rls.transaction())
            .await?
            .map(Account::from);
        AccountRegistry::validate_bank_account(name, bank_reference, gl_account_no, gl.as_ref())?;

        let id = BankAccountId::new();
        let model = bank_accounts::ActiveModel {
            id: Set(id.into_inner()),
            tenant_id: Set(tenant_id.into_inner()),
            name: Set(name.trim().to_string()),
            bank_reference: Set(bank_reference.trim().to_string()),
            gl_account_no: Set(gl_account_no.value()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(rls.transaction())
        .await?;
        rls.commit().await?;

        info!(tenant_id = %tenant_id, bank_account_id = %id, gl_account_no = %gl_account_no, "bank account registered");
        Ok(model.into())
    }

    /// Finds a bank account.
    ///
    /// # Errors
    ///
    /// Returns `BankAccountNotFound` when it does not exist for the tenant.
    pub async fn find_bank_account(
        &self,
        tenant_id: TenantId,
        id: BankAccountId,
    ) -> Result<BankAccount, AccountRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let bank = load_bank_account(rls.transaction(), tenant_id, id).await?;
        rls.commit().await?;
        Ok(bank)
    }
}

// ============================================================
// Connection-level helpers shared with the other repositories
// ============================================================

pub(crate) async fn insert_account<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    input: NewAccount,
) -> Result<Account, AccountRepoError> {
    let existing = accounts::Entity::find_by_id((tenant_id.into_inner(), input.account_no.value()))
        .one(conn)
        .await?
        .map(Account::from);
    AccountRegistry::validate_new_account(&input, existing.as_ref())?;

    let account = input.into_account(tenant_id);
    let now = Utc::now().into();
    accounts::ActiveModel {
        tenant_id: Set(tenant_id.into_inner()),
        account_no: Set(account.account_no.value()),
        name: Set(account.name.clone()),
        account_type: Set(account.account_type.into()),
        statement_class: Set(account.statement_class.into()),
        cash_flow_group: Set(account.cash_flow_group.map(Into::into)),
        is_cash_account: Set(account.is_cash_account),
        is_non_cash_expense: Set(account.is_non_cash_expense),
        is_working_capital: Set(account.is_working_capital),
        is_active: Set(account.is_active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    info!(tenant_id = %tenant_id, account_no = %account.account_no, account_type = %account.account_type, "account created");
    Ok(account)
}

pub(crate) async fn load_accounts<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
) -> Result<Vec<Account>, DbErr> {
    Ok(accounts::Entity::find()
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .order_by_asc(accounts::Column::AccountNo)
        .all(conn)
        .await?
        .into_iter()
        .map(Account::from)
        .collect())
}

/// Loads the named accounts keyed by number.
pub(crate) async fn load_accounts_by_no<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    numbers: impl IntoIterator<Item = AccountNo>,
) -> Result<HashMap<AccountNo, Account>, DbErr> {
    let numbers: Vec<i32> = numbers.into_iter().map(AccountNo::value).collect();
    Ok(accounts::Entity::find()
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(accounts::Column::AccountNo.is_in(numbers))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (AccountNo(m.account_no), Account::from(m)))
        .collect())
}

pub(crate) async fn load_role_map<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
) -> Result<RoleMap, AccountRepoError> {
    account_role_mappings::Entity::find()
        .filter(account_role_mappings::Column::TenantId.eq(tenant_id.into_inner()))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| {
            m.role
                .parse::<AccountRole>()
                .map(|role| (role, AccountNo(m.account_no)))
                .map_err(|_| AccountRepoError::CorruptRole(m.role))
        })
        .collect()
}

pub(crate) async fn load_bank_account<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    id: BankAccountId,
) -> Result<BankAccount, AccountRepoError> {
    bank_accounts::Entity::find_by_id(id.into_inner())
        .filter(bank_accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .one(conn)
        .await?
        .map(BankAccount::from)
        .ok_or(AccountRepoError::BankAccountNotFound(id))
}

/// Resolves a role within the caller's transaction, provisioning if needed.
pub(crate) async fn ensure_role<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    role: AccountRole,
    auto_provision: bool,
) -> Result<AccountNo, AccountRepoError> {
    let mut roles = load_role_map(conn, tenant_id).await?;
    if roles.get(role).is_none() && auto_provision {
        // Concurrent first users queue here; the winner's mapping is visible
        // to the re-read once it commits.
        lock_role(conn, tenant_id, role).await?;
        roles = load_role_map(conn, tenant_id).await?;
    }
    let candidates = roles
        .get(role)
        .into_iter()
        .chain(role.provision_template().map(|t| t.account_no));
    let known = load_accounts_by_no(conn, tenant_id, candidates).await?;

    match AccountRegistry::resolve_role(role, &roles, auto_provision, |no| known.get(&no))? {
        RoleResolution::Mapped(account_no) => Ok(account_no),
        RoleResolution::MapExisting(account_no) => {
            upsert_role(conn, tenant_id, role, account_no).await?;
            Ok(account_no)
        }
        RoleResolution::Provision(template) => {
            let account = insert_account(conn, tenant_id, template).await?;
            upsert_role(conn, tenant_id, role, account.account_no).await?;
            info!(tenant_id = %tenant_id, role = %role, account_no = %account.account_no, "role account provisioned");
            Ok(account.account_no)
        }
    }
}

/// Takes a transaction-scoped advisory lock on `(tenant, role)`.
async fn lock_role<C: ConnectionTrait>(conn: &C, tenant_id: TenantId, role: AccountRole) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))",
        [format!("role:{tenant_id}:{}", role.code()).into()],
    ))
    .await?;
    Ok(())
}

async fn upsert_role<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    role: AccountRole,
    account_no: AccountNo,
) -> Result<(), DbErr> {
    let model = account_role_mappings::ActiveModel {
        tenant_id: Set(tenant_id.into_inner()),
        role: Set(role.code().to_string()),
        account_no: Set(account_no.value()),
        updated_at: Set(Utc::now().into()),
    };
    account_role_mappings::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                account_role_mappings::Column::TenantId,
                account_role_mappings::Column::Role,
            ])
            .update_columns([
                account_role_mappings::Column::AccountNo,
                account_role_mappings::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    info!(tenant_id = %tenant_id, role = %role, account_no = %account_no, "role mapped");
    Ok(())
}
