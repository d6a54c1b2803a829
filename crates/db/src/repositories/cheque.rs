//! Cheque repository for cheque books and the cheque lifecycle.
//!
//! Each transition locks the cheque row, re-derives the postings the state
//! machine implies, skips vouchers already written for the cheque, and commits
//! the postings with the new status in one transaction. Replaying a transition
//! is therefore harmless.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use ledgerline_core::accounts::{AccountError, AccountNo, AccountRegistry, AccountRole};
use ledgerline_core::cheque::{
    BankCharge, ChequeAccounts, ChequeBook, ChequeBookService, ChequeDirection, ChequeError, ChequeService,
    ChequeTransaction, ChequeTransition, NewCheque, PostingStage,
};
use ledgerline_core::ledger::{JournalEntry, VoucherType, codes};
use ledgerline_shared::AppError;
use ledgerline_shared::types::{ChequeBookId, ChequeId, TenantId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use tracing::{debug, info};

use super::account::{AccountRepoError, ensure_role, load_accounts_by_no};
use super::journal::{JournalError, insert_posting, load_entries_by_ref};
use super::sequence::{SequenceRepoError, next_in};
use crate::entities::{cheque_books, cheque_transactions, journal_entries};
use crate::rls::RlsConnection;

/// Error types for cheque operations.
#[derive(Debug, thiserror::Error)]
pub enum ChequeRepoError {
    /// Cheque rule violated.
    #[error(transparent)]
    Cheque(#[from] ChequeError),

    /// Role resolution or account lookup failed.
    #[error(transparent)]
    Account(#[from] AccountRepoError),

    /// Posting failed.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Voucher number allocation failed.
    #[error(transparent)]
    Sequence(#[from] SequenceRepoError),

    /// Cheque book not found.
    #[error("Cheque book not found: {0}")]
    BookNotFound(ChequeBookId),

    /// Cheque not found.
    #[error("Cheque not found: {0}")]
    ChequeNotFound(ChequeId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ChequeRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cheque(e) => e.error_code(),
            Self::Account(e) => e.error_code(),
            Self::Journal(e) => e.error_code(),
            Self::Sequence(e) => e.error_code(),
            Self::BookNotFound(_) => "CHEQUE_BOOK_NOT_FOUND",
            Self::ChequeNotFound(_) => "CHEQUE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ChequeRepoError> for AppError {
    fn from(err: ChequeRepoError) -> Self {
        match err {
            ChequeRepoError::Cheque(e) => e.into(),
            ChequeRepoError::Account(e) => e.into(),
            ChequeRepoError::Journal(e) => e.into(),
            ChequeRepoError::Sequence(e) => e.into(),
            ChequeRepoError::BookNotFound(_) | ChequeRepoError::ChequeNotFound(_) => Self::NotFound(err.to_string()),
            ChequeRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Cheque repository.
#[derive(Debug, Clone)]
pub struct ChequeRepository {
    db: DatabaseConnection,
    auto_provision: bool,
    pad_width: usize,
}

impl ChequeRepository {
    /// Creates a cheque repository.
    ///
    /// `auto_provision` lets clearing and bank-charge roles be created on
    /// first use; `pad_width` formats the `CHQ` voucher sequence.
    #[must_use]
    pub const fn new(db: DatabaseConnection, auto_provision: bool, pad_width: usize) -> Self {
        Self {
            db,
            auto_provision,
            pad_width,
        }
    }

    // ========================================================================
    // Cheque books
    // ========================================================================

    /// Registers a cheque book for a bank GL account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBookRange` unless `0 < start <= end`, and an account
    /// error when the bank account is unknown or inactive.
    pub async fn create_cheque_book(
        &self,
        tenant_id: TenantId,
        bank_account_no: AccountNo,
        start_no: i64,
        end_no: i64,
    ) -> Result<ChequeBook, ChequeRepoError> {
        let book = ChequeBookService::new_book(tenant_id, bank_account_no, start_no, end_no)?;

        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let bank = load_accounts_by_no(txn, tenant_id, [bank_account_no]).await?;
        AccountRegistry::ensure_postable(bank_account_no, bank.get(&bank_account_no))
            .map_err(AccountRepoError::from)?;
        cheque_books::ActiveModel::from(&book).insert(txn).await?;
        rls.commit().await?;

        info!(
            tenant_id = %tenant_id,
            cheque_book_id = %book.id,
            bank_account_no = %bank_account_no,
            start_no,
            end_no,
            "cheque book created"
        );
        Ok(book)
    }

    /// Deactivates a cheque book; no further leaves are issued from it.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` for unknown books.
    pub async fn deactivate_cheque_book(
        &self,
        tenant_id: TenantId,
        book_id: ChequeBookId,
    ) -> Result<ChequeBook, ChequeRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let model = lock_book(rls.transaction(), tenant_id, book_id).await?;
        let mut active: cheque_books::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(rls.transaction()).await?;
        rls.commit().await?;

        info!(tenant_id = %tenant_id, cheque_book_id = %book_id, "cheque book deactivated");
        Ok(updated.into())
    }

    /// Finds a cheque book.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` for unknown books.
    pub async fn find_cheque_book(
        &self,
        tenant_id: TenantId,
        book_id: ChequeBookId,
    ) -> Result<ChequeBook, ChequeRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let model = cheque_books::Entity::find_by_id(book_id.into_inner())
            .filter(cheque_books::Column::TenantId.eq(tenant_id.into_inner()))
            .one(rls.transaction())
            .await?
            .ok_or(ChequeRepoError::BookNotFound(book_id))?;
        rls.commit().await?;
        Ok(model.into())
    }

    // ========================================================================
    // Cheques
    // ========================================================================

    /// Records a `Draft` cheque.
    ///
    /// Outgoing cheques take the next leaf of their book under a row lock;
    /// the advanced cursor commits with the cheque.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unmapped roles, an unusable book or
    /// bad input.
    pub async fn create_cheque(
        &self,
        tenant_id: TenantId,
        input: &NewCheque,
    ) -> Result<ChequeTransaction, ChequeRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();

        let book = match (input.direction, input.cheque_book_id) {
            (ChequeDirection::Outgoing, Some(book_id)) => {
                Some(ChequeBook::from(lock_book(txn, tenant_id, book_id).await?))
            }
            (ChequeDirection::Outgoing, None) => return Err(ChequeError::BookRequired.into()),
            (ChequeDirection::Incoming, _) => None,
        };

        let mut bank = book.as_ref().map(|b| b.bank_account_no);
        let mut counter = None;
        let mut clearing = None;
        for role in ChequeAccounts::required_roles(input.direction, input.cheque_type) {
            let account_no = ensure_role(txn, tenant_id, role, self.auto_provision).await?;
            match role {
                AccountRole::Bank => bank = Some(account_no),
                AccountRole::Ar | AccountRole::Ap => counter = Some(account_no),
                AccountRole::PdcReceivable | AccountRole::PdcPayableClearing => clearing = Some(account_no),
                _ => {}
            }
        }
        let counter_role = match input.direction {
            ChequeDirection::Outgoing => AccountRole::Ap,
            ChequeDirection::Incoming => AccountRole::Ar,
        };
        let accounts = ChequeAccounts {
            bank_account_no: bank.ok_or(AccountError::RoleUnmapped(AccountRole::Bank)).map_err(AccountRepoError::from)?,
            counter_account_no: counter.ok_or(AccountError::RoleUnmapped(counter_role)).map_err(AccountRepoError::from)?,
            clearing_account_no: clearing,
        };

        let voucher = next_in(txn, tenant_id, codes::CHQ, codes::CHQ, self.pad_width).await?;
        let prepared = ChequeService::prepare_cheque(tenant_id, input, accounts, book.as_ref(), &voucher.document_no)?;

        if let (Some(book), Some(leaf)) = (&book, &prepared.leaf) {
            cheque_books::ActiveModel {
                id: Set(book.id.into_inner()),
                next_no: Set(leaf.next_no),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            }
            .update(txn)
            .await?;
            debug!(tenant_id = %tenant_id, cheque_book_id = %book.id, cheque_no = %leaf.cheque_no, "cheque leaf allocated");
        }
        cheque_transactions::ActiveModel::from(&prepared.cheque).insert(txn).await?;
        rls.commit().await?;

        let cheque = prepared.cheque;
        info!(
            tenant_id = %tenant_id,
            cheque_id = %cheque.id,
            cheque_no = %cheque.cheque_no,
            voucher_no = %cheque.voucher_no,
            direction = cheque.direction.as_str(),
            cheque_type = cheque.cheque_type.as_str(),
            amount = %cheque.amount,
            "cheque created"
        );
        Ok(cheque)
    }

    /// Finds a cheque.
    ///
    /// # Errors
    ///
    /// Returns `ChequeNotFound` for unknown cheques.
    pub async fn find_cheque(&self, tenant_id: TenantId, cheque_id: ChequeId) -> Result<ChequeTransaction, ChequeRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let model = cheque_transactions::Entity::find_by_id(cheque_id.into_inner())
            .filter(cheque_transactions::Column::TenantId.eq(tenant_id.into_inner()))
            .one(rls.transaction())
            .await?
            .ok_or(ChequeRepoError::ChequeNotFound(cheque_id))?;
        rls.commit().await?;
        Ok(model.into())
    }

    /// Journal entries written by a cheque's transitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn cheque_postings(
        &self,
        tenant_id: TenantId,
        cheque_id: ChequeId,
    ) -> Result<Vec<JournalEntry>, ChequeRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let entries = cheque_entries(rls.transaction(), tenant_id, cheque_id).await?;
        rls.commit().await?;
        Ok(entries)
    }

    /// `Draft → Printed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other state.
    pub async fn mark_printed(&self, tenant_id: TenantId, cheque_id: ChequeId) -> Result<ChequeTransaction, ChequeRepoError> {
        self.transition(tenant_id, cheque_id, |cheque, _| ChequeService::mark_printed(cheque))
            .await
    }

    /// Hands over (outgoing) or deposits (incoming), posting stage one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the cheque is `Printed`.
    pub async fn mark_handed_over_or_deposited(
        &self,
        tenant_id: TenantId,
        cheque_id: ChequeId,
        date: NaiveDate,
    ) -> Result<ChequeTransaction, ChequeRepoError> {
        self.transition(tenant_id, cheque_id, |cheque, existing| {
            ChequeService::mark_handed_over_or_deposited(cheque, date, |v| existing.contains(v))
        })
        .await
    }

    /// `HandedOver | Deposited → Presented`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other state.
    pub async fn mark_presented(&self, tenant_id: TenantId, cheque_id: ChequeId) -> Result<ChequeTransaction, ChequeRepoError> {
        self.transition(tenant_id, cheque_id, |cheque, _| ChequeService::mark_presented(cheque))
            .await
    }

    /// Marks the cheque cleared, posting stage two where a clearing account is used.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the cheque is in transit.
    pub async fn mark_cleared(
        &self,
        tenant_id: TenantId,
        cheque_id: ChequeId,
        clear_date: NaiveDate,
    ) -> Result<ChequeTransaction, ChequeRepoError> {
        self.transition(tenant_id, cheque_id, |cheque, existing| {
            ChequeService::mark_cleared(cheque, clear_date, |v| existing.contains(v))
        })
        .await
    }

    /// Marks the cheque bounced, reversing stage one. A non-zero
    /// `bank_charge` is booked against the bank-charges role.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the cheque is in transit, and a
    /// role error when bank charges cannot be mapped.
    pub async fn mark_bounced(
        &self,
        tenant_id: TenantId,
        cheque_id: ChequeId,
        bounce_date: NaiveDate,
        bank_charge: Option<Decimal>,
    ) -> Result<ChequeTransaction, ChequeRepoError> {
        let charge = match bank_charge.filter(|amount| !amount.is_zero()) {
            Some(amount) => {
                let rls = RlsConnection::new(&self.db, tenant_id).await?;
                let expense_account_no =
                    ensure_role(rls.transaction(), tenant_id, AccountRole::BankCharges, self.auto_provision).await?;
                rls.commit().await?;
                Some(BankCharge {
                    amount,
                    expense_account_no,
                })
            }
            None => None,
        };

        self.transition(tenant_id, cheque_id, |cheque, existing| {
            ChequeService::mark_bounced(cheque, bounce_date, charge, |v| existing.contains(v))
        })
        .await
    }

    /// Voids the cheque, reversing stage one if it was posted.
    ///
    /// # Errors
    ///
    /// Returns `VoidReasonRequired` for a blank reason and
    /// `InvalidTransition` once `Cleared`.
    pub async fn void(
        &self,
        tenant_id: TenantId,
        cheque_id: ChequeId,
        date: NaiveDate,
        reason: &str,
    ) -> Result<ChequeTransaction, ChequeRepoError> {
        self.transition(tenant_id, cheque_id, |cheque, existing| {
            ChequeService::void(cheque, date, reason, |v| existing.contains(v))
        })
        .await
    }

    async fn transition<F>(
        &self,
        tenant_id: TenantId,
        cheque_id: ChequeId,
        step: F,
    ) -> Result<ChequeTransaction, ChequeRepoError>
    where
        F: FnOnce(&ChequeTransaction, &HashSet<String>) -> Result<ChequeTransition, ChequeError>,
    {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = rls.transaction();
        let model = cheque_transactions::Entity::find_by_id(cheque_id.into_inner())
            .filter(cheque_transactions::Column::TenantId.eq(tenant_id.into_inner()))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(ChequeRepoError::ChequeNotFound(cheque_id))?;
        let mut cheque = ChequeTransaction::from(model.clone());

        let existing = posted_stage_vouchers(txn, tenant_id, &cheque.voucher_no).await?;
        let transition = step(&cheque, &existing)?;

        for posting in &transition.postings {
            insert_posting(txn, posting).await?;
        }
        ChequeService::apply(&mut cheque, &transition);

        if !transition.is_replay() || !transition.postings.is_empty() {
            let mut active: cheque_transactions::ActiveModel = model.into();
            active.status = Set(cheque.status.into());
            active.clear_date = Set(cheque.clear_date);
            active.notes = Set(cheque.notes.clone());
            active.updated_at = Set(Utc::now().into());
            active.update(txn).await?;
        }
        rls.commit().await?;

        if transition.is_replay() {
            debug!(tenant_id = %tenant_id, cheque_id = %cheque_id, status = %cheque.status, "cheque transition replayed");
        }
        info!(
            tenant_id = %tenant_id,
            cheque_id = %cheque_id,
            voucher_no = %cheque.voucher_no,
            from = %transition.from,
            to = %transition.new_status,
            postings = transition.postings.len(),
            "cheque transition applied"
        );
        Ok(cheque)
    }
}

async fn lock_book<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    book_id: ChequeBookId,
) -> Result<cheque_books::Model, ChequeRepoError> {
    cheque_books::Entity::find_by_id(book_id.into_inner())
        .filter(cheque_books::Column::TenantId.eq(tenant_id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(ChequeRepoError::BookNotFound(book_id))
}

/// Stage vouchers of a cheque already in the journal under `CHQ`, whoever
/// posted them.
async fn posted_stage_vouchers<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    base_voucher: &str,
) -> Result<HashSet<String>, DbErr> {
    let stage_vouchers: Vec<String> = PostingStage::ALL.iter().map(|stage| stage.voucher_no(base_voucher)).collect();
    let found: Vec<String> = journal_entries::Entity::find()
        .select_only()
        .column(journal_entries::Column::VoucherNo)
        .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(journal_entries::Column::VoucherType.eq(codes::CHQ))
        .filter(journal_entries::Column::VoucherNo.is_in(stage_vouchers))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(found.into_iter().collect())
}

/// Entries carrying the cheque id under the `CHQ` voucher type.
async fn cheque_entries<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    cheque_id: ChequeId,
) -> Result<Vec<JournalEntry>, JournalError> {
    let chq = VoucherType::cheque();
    Ok(load_entries_by_ref(conn, tenant_id, cheque_id.into_inner())
        .await?
        .into_iter()
        .filter(|entry| entry.voucher_type == chq)
        .collect())
}
