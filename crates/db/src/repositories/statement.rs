//! Statement repository for bank statement import and reconciliation.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use ledgerline_core::accounts::{AccountNo, BankAccount};
use ledgerline_core::ledger::{LedgerError, VoucherType};
use ledgerline_core::reconciliation::{
    MatchSettings, ReconciliationError, ReconciliationService, ReconciliationSummary, StatementImport,
    StatementLine, StatementParser, SuggestRunSummary,
};
use ledgerline_shared::AppError;
use ledgerline_shared::types::{BankAccountId, StatementImportId, StatementLineId, TenantId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::account::{AccountRepoError, load_bank_account};
use super::journal::{JournalError, find_entry, insert_posting, load_entries_touching};
use crate::entities::sea_orm_active_enums::MatchStatus;
use crate::entities::{bank_statement_imports, bank_statement_lines};
use crate::rls::RlsConnection;

// Twenty bound columns per line keeps each insert well under the Postgres
// limit of 65,535 bind parameters.
const LINE_INSERT_CHUNK: usize = 1_000;

/// Error types for statement operations.
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    /// Import or matching rule violated.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Stored voucher data is malformed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Posting the reconciling entry failed.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Bank account lookup failed.
    #[error(transparent)]
    Account(#[from] AccountRepoError),

    /// Statement line not found.
    #[error("Statement line not found: {0}")]
    LineNotFound(StatementLineId),

    /// Import batch not found.
    #[error("Statement import not found: {0}")]
    ImportNotFound(StatementImportId),

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StatementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Reconciliation(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Journal(e) => e.error_code(),
            Self::Account(e) => e.error_code(),
            Self::LineNotFound(_) => "STATEMENT_LINE_NOT_FOUND",
            Self::ImportNotFound(_) => "STATEMENT_IMPORT_NOT_FOUND",
            Self::EntryNotFound(_) => "JOURNAL_ENTRY_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<StatementError> for AppError {
    fn from(err: StatementError) -> Self {
        match err {
            StatementError::Reconciliation(e) => e.into(),
            StatementError::Ledger(e) => e.into(),
            StatementError::Journal(e) => e.into(),
            StatementError::Account(e) => e.into(),
            StatementError::LineNotFound(_) | StatementError::ImportNotFound(_) | StatementError::EntryNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            StatementError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Parameters for booking a statement line directly.
#[derive(Debug, Clone)]
pub struct AutoPostRequest {
    /// Contra account; required.
    pub contra_account_no: Option<AccountNo>,
    /// Voucher type of the new entry.
    pub voucher_type: VoucherType,
    /// Voucher number of the new entry.
    pub voucher_no: String,
    /// Narration; the statement narration is used when blank.
    pub narration: Option<String>,
    /// Back-link to a business document.
    pub ref_id: Option<Uuid>,
}

/// Statement repository.
#[derive(Debug, Clone)]
pub struct StatementRepository {
    db: DatabaseConnection,
    settings: MatchSettings,
}

impl StatementRepository {
    /// Creates a statement repository with the given match settings.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: MatchSettings) -> Self {
        Self { db, settings }
    }

    /// Parses and stores a statement as one import batch.
    ///
    /// Nothing is written when the payload is empty or yields no valid rows.
    ///
    /// # Errors
    ///
    /// Returns a structural error for unusable payloads and
    /// `BankAccountNotFound` for an unknown bank account.
    pub async fn import(
        &self,
        tenant_id: TenantId,
        bank_account_id: BankAccountId,
        raw: &str,
        source_name: Option<&str>,
    ) -> Result<(StatementImport, Vec<StatementLine>), StatementError> {
        let parsed = StatementParser::parse(raw)?;

        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        load_bank_account(txn, tenant_id, bank_account_id).await?;

        let import_id = StatementImportId::new();
        let lines = StatementParser::to_lines(&parsed, tenant_id, import_id, bank_account_id);
        let batch = bank_statement_imports::ActiveModel {
            id: Set(import_id.into_inner()),
            tenant_id: Set(tenant_id.into_inner()),
            bank_account_id: Set(bank_account_id.into_inner()),
            source_name: Set(source_name.map(str::to_string)),
            min_date: Set(parsed.min_date),
            max_date: Set(parsed.max_date),
            line_count: Set(i32::try_from(lines.len()).unwrap_or(i32::MAX)),
            skipped_count: Set(i32::try_from(parsed.skipped_rows()).unwrap_or(i32::MAX)),
            created_at: Set(Utc::now().into()),
        }
        .insert(txn)
        .await?;

        for chunk in lines.chunks(LINE_INSERT_CHUNK) {
            bank_statement_lines::Entity::insert_many(chunk.iter().map(bank_statement_lines::ActiveModel::from))
                .exec_without_returning(txn)
                .await?;
        }
        rls.commit().await?;

        if parsed.skipped_rows() > 0 {
            warn!(
                tenant_id = %tenant_id,
                import_id = %import_id,
                zero_amount = parsed.zero_amount_rows,
                bad_date = parsed.unparseable_date_rows,
                bad_amount = parsed.invalid_amount_rows,
                "statement rows skipped"
            );
        }
        info!(
            tenant_id = %tenant_id,
            import_id = %import_id,
            bank_account_id = %bank_account_id,
            lines = lines.len(),
            "statement imported"
        );
        Ok((batch.into(), lines))
    }

    /// Runs the matcher over the open lines of a bank account, optionally
    /// limited to one import batch.
    ///
    /// # Errors
    ///
    /// Returns not-found errors for unknown bank accounts or batches.
    pub async fn auto_suggest(
        &self,
        tenant_id: TenantId,
        bank_account_id: BankAccountId,
        import_id: Option<StatementImportId>,
    ) -> Result<SuggestRunSummary, StatementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let bank = load_bank_account(txn, tenant_id, bank_account_id).await?;
        if let Some(import_id) = import_id {
            ensure_import(txn, tenant_id, bank_account_id, import_id).await?;
        }

        let mut query = bank_statement_lines::Entity::find()
            .filter(bank_statement_lines::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(bank_statement_lines::Column::BankAccountId.eq(bank_account_id.into_inner()))
            .filter(bank_statement_lines::Column::Status.is_in([MatchStatus::Unmatched, MatchStatus::Suggested]));
        if let Some(import_id) = import_id {
            query = query.filter(bank_statement_lines::Column::ImportId.eq(import_id.into_inner()));
        }
        let mut lines = convert(query.lock_exclusive().all(txn).await?)?;

        let Some(latest) = lines.iter().map(|l| l.transaction_date).max() else {
            rls.commit().await?;
            return Ok(SuggestRunSummary::default());
        };
        let horizon = latest + Duration::days(self.settings.window_days);
        let candidates = load_entries_touching(txn, tenant_id, bank.gl_account_no, None, horizon).await?;
        let claimed = claimed_entries(txn, tenant_id, None).await?;

        let summary =
            ReconciliationService::run_auto_suggest(&mut lines, &candidates, bank.gl_account_no, &claimed, &self.settings);
        for line in &lines {
            bank_statement_lines::match_update(line).update(txn).await?;
        }
        rls.commit().await?;

        info!(
            tenant_id = %tenant_id,
            bank_account_id = %bank_account_id,
            examined = summary.examined,
            by_reference = summary.by_reference,
            by_amount_date = summary.by_amount_date,
            unmatched = summary.unmatched,
            "auto-suggest run finished"
        );
        Ok(summary)
    }

    /// Confirms a suggested match.
    ///
    /// # Errors
    ///
    /// Fails unless the line is `Suggested` with a voucher whose entry is not
    /// already reconciled elsewhere.
    pub async fn approve(&self, tenant_id: TenantId, line_id: StatementLineId) -> Result<StatementLine, StatementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let mut line = lock_line(txn, tenant_id, line_id).await?;
        ReconciliationService::approve(&mut line)?;
        if let Some(entry_id) = line.matched_entry_id
            && claimed_entries(txn, tenant_id, Some(line_id)).await?.contains(&entry_id)
        {
            return Err(ReconciliationError::EntryAlreadyClaimed(entry_id).into());
        }
        bank_statement_lines::match_update(&line).update(txn).await?;
        rls.commit().await?;

        info!(tenant_id = %tenant_id, line_id = %line_id, voucher_no = ?line.matched_voucher_no, "statement line approved");
        Ok(line)
    }

    /// Excludes a line from reconciliation.
    ///
    /// # Errors
    ///
    /// Fails when the line is already `Reconciled`.
    pub async fn ignore(
        &self,
        tenant_id: TenantId,
        line_id: StatementLineId,
        reason: Option<&str>,
    ) -> Result<StatementLine, StatementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let mut line = lock_line(txn, tenant_id, line_id).await?;
        ReconciliationService::ignore(&mut line, reason)?;
        bank_statement_lines::match_update(&line).update(txn).await?;
        rls.commit().await?;

        info!(tenant_id = %tenant_id, line_id = %line_id, "statement line ignored");
        Ok(line)
    }

    /// Rejects a suggestion.
    ///
    /// # Errors
    ///
    /// Fails unless the line is `Suggested` or `Unmatched`.
    pub async fn unmatch(&self, tenant_id: TenantId, line_id: StatementLineId) -> Result<StatementLine, StatementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let mut line = lock_line(txn, tenant_id, line_id).await?;
        ReconciliationService::unmatch(&mut line)?;
        bank_statement_lines::match_update(&line).update(txn).await?;
        rls.commit().await?;

        info!(tenant_id = %tenant_id, line_id = %line_id, "statement line suggestion rejected");
        Ok(line)
    }

    /// Reconciles an open line against a chosen journal entry.
    ///
    /// # Errors
    ///
    /// Fails for closed lines, mismatched or already claimed entries.
    pub async fn manual_match(
        &self,
        tenant_id: TenantId,
        line_id: StatementLineId,
        entry_id: i64,
    ) -> Result<StatementLine, StatementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let mut line = lock_line(txn, tenant_id, line_id).await?;
        let bank = load_bank_account(txn, tenant_id, line.bank_account_id).await?;
        let entry = find_entry(txn, tenant_id, entry_id)
            .await?
            .ok_or(StatementError::EntryNotFound(entry_id))?;
        let claimed = claimed_entries(txn, tenant_id, Some(line_id)).await?;

        ReconciliationService::manual_match(&mut line, &entry, bank.gl_account_no, &claimed)?;
        bank_statement_lines::match_update(&line).update(txn).await?;
        rls.commit().await?;

        info!(tenant_id = %tenant_id, line_id = %line_id, entry_id, "statement line matched manually");
        Ok(line)
    }

    /// Books a statement line as a new journal entry and reconciles it.
    ///
    /// The posting and the line update commit together.
    ///
    /// # Errors
    ///
    /// Fails when the line is `Reconciled`, belongs to another bank account,
    /// or the contra account is missing or unusable.
    pub async fn auto_post(
        &self,
        tenant_id: TenantId,
        bank_account_id: BankAccountId,
        line_id: StatementLineId,
        request: AutoPostRequest,
    ) -> Result<StatementLine, StatementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let mut line = lock_line(txn, tenant_id, line_id).await?;
        if line.bank_account_id != bank_account_id {
            return Err(StatementError::LineNotFound(line_id));
        }
        let bank: BankAccount = load_bank_account(txn, tenant_id, bank_account_id).await?;

        let posting = ReconciliationService::prepare_auto_post(
            &line,
            bank.gl_account_no,
            request.contra_account_no,
            request.voucher_type,
            &request.voucher_no,
            request.narration.as_deref(),
            request.ref_id,
        )?;
        let entry = insert_posting(txn, &posting)
            .await?
            .pop()
            .ok_or(LedgerError::NoLines)?;
        ReconciliationService::mark_auto_posted(&mut line, &entry);
        bank_statement_lines::match_update(&line).update(txn).await?;
        rls.commit().await?;

        info!(
            tenant_id = %tenant_id,
            line_id = %line_id,
            entry_id = entry.id,
            voucher_no = %entry.voucher_no,
            "statement line auto-posted"
        );
        Ok(line)
    }

    /// Per-status counts and reconciled totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn summary(
        &self,
        tenant_id: TenantId,
        bank_account_id: BankAccountId,
        import_id: Option<StatementImportId>,
    ) -> Result<ReconciliationSummary, StatementError> {
        let lines = self.lines(tenant_id, bank_account_id, import_id).await?;
        Ok(ReconciliationService::summarize(&lines))
    }

    /// Statement lines of a bank account in date order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lines(
        &self,
        tenant_id: TenantId,
        bank_account_id: BankAccountId,
        import_id: Option<StatementImportId>,
    ) -> Result<Vec<StatementLine>, StatementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let mut query = bank_statement_lines::Entity::find()
            .filter(bank_statement_lines::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(bank_statement_lines::Column::BankAccountId.eq(bank_account_id.into_inner()));
        if let Some(import_id) = import_id {
            query = query.filter(bank_statement_lines::Column::ImportId.eq(import_id.into_inner()));
        }
        let models = query
            .order_by_asc(bank_statement_lines::Column::TransactionDate)
            .order_by_asc(bank_statement_lines::Column::Id)
            .all(rls.transaction())
            .await?;
        rls.commit().await?;
        convert(models)
    }
}

async fn lock_line<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    line_id: StatementLineId,
) -> Result<StatementLine, StatementError> {
    let model = bank_statement_lines::Entity::find_by_id(line_id.into_inner())
        .filter(bank_statement_lines::Column::TenantId.eq(tenant_id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(StatementError::LineNotFound(line_id))?;
    Ok(StatementLine::try_from(model)?)
}

async fn ensure_import<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    bank_account_id: BankAccountId,
    import_id: StatementImportId,
) -> Result<(), StatementError> {
    bank_statement_imports::Entity::find_by_id(import_id.into_inner())
        .filter(bank_statement_imports::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(bank_statement_imports::Column::BankAccountId.eq(bank_account_id.into_inner()))
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(StatementError::ImportNotFound(import_id))
}

/// Entries reconciled against some line other than `except`.
async fn claimed_entries<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    except: Option<StatementLineId>,
) -> Result<HashSet<i64>, DbErr> {
    let mut query = bank_statement_lines::Entity::find()
        .filter(bank_statement_lines::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(bank_statement_lines::Column::Status.eq(MatchStatus::Reconciled))
        .filter(bank_statement_lines::Column::MatchedEntryId.is_not_null());
    if let Some(line_id) = except {
        query = query.filter(bank_statement_lines::Column::Id.ne(line_id.into_inner()));
    }
    let ids: Vec<Option<i64>> = query
        .select_only()
        .column(bank_statement_lines::Column::MatchedEntryId)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ids.into_iter().flatten().collect())
}

fn convert(models: Vec<bank_statement_lines::Model>) -> Result<Vec<StatementLine>, StatementError> {
    models
        .into_iter()
        .map(|m| StatementLine::try_from(m).map_err(StatementError::from))
        .collect()
}
