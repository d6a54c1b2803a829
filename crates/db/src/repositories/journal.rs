//! Journal repository for posting and ledger queries.
//!
//! Entries are insert-only. Every read aggregate loads its entry set inside a
//! single tenant-scoped transaction, so a report never sees half of a
//! multi-line post.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use ledgerline_core::accounts::{Account, AccountNo, AccountRole};
use ledgerline_core::ledger::{
    AccountBalance, AccountInfo, JournalEntry, LedgerError, LedgerService, NewJournalEntry, PostingRequest,
    VoucherType,
};
use ledgerline_core::reports::{
    CashFlowStatement, CounterpartyResolver, LedgerCard, ProfitAndLoss, ReportError, ReportService, TrialBalance,
};
use ledgerline_shared::AppError;
use ledgerline_shared::types::TenantId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};
use tracing::info;
use uuid::Uuid;

use super::account::{AccountRepoError, load_accounts, load_accounts_by_no, load_role_map};
use super::trade_document::load_counterparty_index;
use crate::entities::journal_entries;
use crate::rls::RlsConnection;

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Posting rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Report request rejected.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Chart of accounts lookup failed.
    #[error(transparent)]
    Account(#[from] AccountRepoError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Account(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Ledger(e) => e.into(),
            JournalError::Report(e) => e.into(),
            JournalError::Account(e) => e.into(),
            JournalError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    debit_total: Decimal,
    credit_total: Decimal,
}

const BALANCE_SQL: &str = r"
SELECT
    COALESCE(SUM(CASE WHEN debit_account_no = $1 THEN amount ELSE 0 END), 0) AS debit_total,
    COALESCE(SUM(CASE WHEN credit_account_no = $1 THEN amount ELSE 0 END), 0) AS credit_total
FROM journal_entries
WHERE tenant_id = $2
  AND transaction_date <= $3
  AND (debit_account_no = $1 OR credit_account_no = $1)
";

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a single-line entry.
    ///
    /// Not idempotent: call once per logical event.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad amounts, identical accounts or
    /// unknown/inactive accounts.
    pub async fn post(&self, request: &PostingRequest) -> Result<JournalEntry, JournalError> {
        let rls = RlsConnection::new(&self.db, request.tenant_id).await?;
        let accounts = posting_accounts(rls.transaction(), request).await?;
        let entry = LedgerService::prepare_post(request, |no| account_info(&accounts, no))?;
        let mut written = insert_entries(rls.transaction(), vec![entry]).await?;
        rls.commit().await?;
        written.pop().ok_or(JournalError::Ledger(LedgerError::NoLines))
    }

    /// Posts several lines under one voucher. All lines commit or none do.
    ///
    /// # Errors
    ///
    /// Returns the first validation error; nothing is written in that case.
    pub async fn post_many(&self, request: &PostingRequest) -> Result<Vec<JournalEntry>, JournalError> {
        let rls = RlsConnection::new(&self.db, request.tenant_id).await?;
        let written = insert_posting(rls.transaction(), request).await?;
        rls.commit().await?;
        Ok(written)
    }

    /// Whether an entry with this voucher type and number exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn voucher_exists(
        &self,
        tenant_id: TenantId,
        voucher_type: &VoucherType,
        voucher_no: &str,
    ) -> Result<bool, JournalError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let count = journal_entries::Entity::find()
            .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(journal_entries::Column::VoucherType.eq(voucher_type.as_str()))
            .filter(journal_entries::Column::VoucherNo.eq(voucher_no))
            .count(rls.transaction())
            .await?;
        rls.commit().await?;
        Ok(count > 0)
    }

    /// Entries pointing back at a business document, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn entries_by_ref(&self, tenant_id: TenantId, ref_id: Uuid) -> Result<Vec<JournalEntry>, JournalError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let entries = load_entries_by_ref(rls.transaction(), tenant_id, ref_id).await?;
        rls.commit().await?;
        Ok(entries)
    }

    /// Raw `debit − credit` balance including entries dated `as_of`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balance(
        &self,
        tenant_id: TenantId,
        account_no: AccountNo,
        as_of: NaiveDate,
    ) -> Result<Decimal, JournalError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let row = TotalsRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            BALANCE_SQL,
            [account_no.value().into(), tenant_id.into_inner().into(), as_of.into()],
        ))
        .one(rls.transaction())
        .await?;
        rls.commit().await?;

        let mut balance = AccountBalance::new(account_no);
        if let Some(row) = row {
            balance.debit_total = row.debit_total;
            balance.credit_total = row.credit_total;
        }
        Ok(balance.balance())
    }

    /// Ledger card of one account with running balance. Receivable and
    /// payable control accounts also name the counterparty on each row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` for an inverted period and
    /// `AccountNotFound` for an unknown account.
    pub async fn ledger_card(
        &self,
        tenant_id: TenantId,
        account_no: AccountNo,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<LedgerCard, JournalError> {
        if from > to {
            return Err(ReportError::InvalidDateRange { start: from, end: to }.into());
        }

        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let account = load_accounts_by_no(txn, tenant_id, [account_no])
            .await?
            .remove(&account_no)
            .ok_or(ReportError::AccountNotFound(account_no))?;

        let entries = load_entries_touching(txn, tenant_id, account_no, None, to).await?;

        let roles = load_role_map(txn, tenant_id).await?;
        let is_trade_control = roles
            .roles_for(account_no)
            .any(|role| matches!(role, AccountRole::Ar | AccountRole::Ap));
        let index = if is_trade_control {
            Some(load_counterparty_index(txn, tenant_id).await?)
        } else {
            None
        };
        rls.commit().await?;

        let resolve: CounterpartyResolver<'_> = &|entry| index.as_ref().and_then(|idx| idx.resolve(entry));
        let counterparty = index.is_some().then_some(resolve);
        Ok(ReportService::ledger_card(&account, &entries, from, to, counterparty)?)
    }

    /// Profit and loss over a period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from > to`.
    pub async fn profit_and_loss(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ProfitAndLoss, JournalError> {
        let (accounts, entries) = self.snapshot(tenant_id, Some(from), to).await?;
        Ok(ReportService::profit_and_loss(&accounts, &entries, from, to)?)
    }

    /// Indirect-method cash flow statement.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from > to`.
    pub async fn cash_flow(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CashFlowStatement, JournalError> {
        // Opening working-capital and cash balances need the full history.
        let (accounts, entries) = self.snapshot(tenant_id, None, to).await?;
        let statement = ReportService::cash_flow(&accounts, &entries, from, to)?;
        if !statement.warnings.is_empty() {
            info!(tenant_id = %tenant_id, warnings = statement.warnings.len(), "cash flow built with untagged chart");
        }
        Ok(statement)
    }

    /// Trial balance as of a date, inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trial_balance(&self, tenant_id: TenantId, as_of: NaiveDate) -> Result<TrialBalance, JournalError> {
        let (accounts, entries) = self.snapshot(tenant_id, None, as_of).await?;
        let trial = ReportService::trial_balance(&accounts, &entries, as_of);
        if !trial.is_balanced {
            tracing::error!(
                tenant_id = %tenant_id,
                total_debit = %trial.total_debit,
                total_credit = %trial.total_credit,
                "trial balance does not balance"
            );
        }
        Ok(trial)
    }

    async fn snapshot(
        &self,
        tenant_id: TenantId,
        from: Option<NaiveDate>,
        to: NaiveDate,
    ) -> Result<(Vec<Account>, Vec<JournalEntry>), JournalError> {
        if let Some(from) = from
            && from > to
        {
            return Err(ReportError::InvalidDateRange { start: from, end: to }.into());
        }

        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let accounts = load_accounts(txn, tenant_id).await?;

        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(journal_entries::Column::TransactionDate.lte(to));
        if let Some(from) = from {
            query = query.filter(journal_entries::Column::TransactionDate.gte(from));
        }
        let entries = convert(
            query
                .order_by_asc(journal_entries::Column::TransactionDate)
                .order_by_asc(journal_entries::Column::Id)
                .all(txn)
                .await?,
        )?;
        rls.commit().await?;
        Ok((accounts, entries))
    }
}

// ============================================================
// Connection-level helpers shared with the other repositories
// ============================================================

/// Validates and writes a multi-line posting on the caller's connection.
pub(crate) async fn insert_posting<C: ConnectionTrait>(
    conn: &C,
    request: &PostingRequest,
) -> Result<Vec<JournalEntry>, JournalError> {
    let accounts = posting_accounts(conn, request).await?;
    let prepared = LedgerService::prepare_post_many(request, |no| account_info(&accounts, no))?;
    insert_entries(conn, prepared).await
}

pub(crate) async fn load_entries_by_ref<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    ref_id: Uuid,
) -> Result<Vec<JournalEntry>, JournalError> {
    convert(
        journal_entries::Entity::find()
            .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(journal_entries::Column::RefId.eq(ref_id))
            .order_by_asc(journal_entries::Column::Id)
            .all(conn)
            .await?,
    )
}

/// Entries touching an account up to `to`, optionally from `from`, inclusive.
pub(crate) async fn load_entries_touching<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    account_no: AccountNo,
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Result<Vec<JournalEntry>, JournalError> {
    let mut query = journal_entries::Entity::find()
        .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(journal_entries::Column::TransactionDate.lte(to));
    if let Some(from) = from {
        query = query.filter(journal_entries::Column::TransactionDate.gte(from));
    }
    convert(
        query
            .filter(
                Condition::any()
                    .add(journal_entries::Column::DebitAccountNo.eq(account_no.value()))
                    .add(journal_entries::Column::CreditAccountNo.eq(account_no.value())),
            )
            .order_by_asc(journal_entries::Column::TransactionDate)
            .order_by_asc(journal_entries::Column::Id)
            .all(conn)
            .await?,
    )
}

pub(crate) async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    entry_id: i64,
) -> Result<Option<JournalEntry>, JournalError> {
    journal_entries::Entity::find_by_id(entry_id)
        .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
        .one(conn)
        .await?
        .map(|m| JournalEntry::try_from(m).map_err(JournalError::from))
        .transpose()
}

async fn posting_accounts<C: ConnectionTrait>(
    conn: &C,
    request: &PostingRequest,
) -> Result<HashMap<AccountNo, AccountInfo>, JournalError> {
    let numbers = request
        .lines
        .iter()
        .flat_map(|line| [line.debit_account_no, line.credit_account_no]);
    Ok(load_accounts_by_no(conn, request.tenant_id, numbers)
        .await?
        .into_iter()
        .map(|(no, account)| {
            (
                no,
                AccountInfo {
                    account_no: no,
                    is_active: account.is_active,
                },
            )
        })
        .collect())
}

fn account_info(accounts: &HashMap<AccountNo, AccountInfo>, account_no: AccountNo) -> Result<AccountInfo, LedgerError> {
    accounts
        .get(&account_no)
        .cloned()
        .ok_or(LedgerError::AccountNotFound(account_no))
}

async fn insert_entries<C: ConnectionTrait>(
    conn: &C,
    prepared: Vec<NewJournalEntry>,
) -> Result<Vec<JournalEntry>, JournalError> {
    let mut written = Vec::with_capacity(prepared.len());
    for entry in prepared {
        let model = journal_entries::ActiveModel {
            tenant_id: Set(entry.tenant_id.into_inner()),
            transaction_date: Set(entry.transaction_date),
            voucher_type: Set(entry.voucher_type.as_str().to_string()),
            voucher_no: Set(entry.voucher_no),
            ref_id: Set(entry.ref_id),
            debit_account_no: Set(entry.debit_account_no.value()),
            credit_account_no: Set(entry.credit_account_no.value()),
            amount: Set(entry.amount),
            narration: Set(entry.narration),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(
            tenant_id = %model.tenant_id,
            entry_id = model.id,
            voucher_type = %model.voucher_type,
            voucher_no = %model.voucher_no,
            debit_account_no = model.debit_account_no,
            credit_account_no = model.credit_account_no,
            amount = %model.amount,
            "journal entry posted"
        );
        written.push(JournalEntry::try_from(model)?);
    }
    Ok(written)
}

fn convert(models: Vec<journal_entries::Model>) -> Result<Vec<JournalEntry>, JournalError> {
    models
        .into_iter()
        .map(|m| JournalEntry::try_from(m).map_err(JournalError::from))
        .collect()
}
