//! Sequence repository for document number allocation.
//!
//! The counter row is created on first use and then read with
//! `SELECT ... FOR UPDATE`, so concurrent callers for the same tenant and
//! document type queue on the row lock and each observe a distinct number.

use chrono::Utc;
use ledgerline_core::sequence::{Allocation, DocSequence, SequenceError, SequenceService};
use ledgerline_shared::AppError;
use ledgerline_shared::types::TenantId;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use tracing::{debug, info};

use crate::entities::doc_sequences;
use crate::rls::RlsConnection;

/// Error types for sequence operations.
#[derive(Debug, thiserror::Error)]
pub enum SequenceRepoError {
    /// Allocation rule violated.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl SequenceRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Sequence(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<SequenceRepoError> for AppError {
    fn from(err: SequenceRepoError) -> Self {
        match err {
            SequenceRepoError::Sequence(e) => e.into(),
            SequenceRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Sequence repository.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
    pad_width: usize,
}

impl SequenceRepository {
    /// Creates a sequence repository; `pad_width` applies to counters it creates.
    #[must_use]
    pub const fn new(db: DatabaseConnection, pad_width: usize) -> Self {
        Self { db, pad_width }
    }

    /// Allocates the next document number for (tenant, doc type).
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed keys or an exhausted counter.
    pub async fn next(
        &self,
        tenant_id: TenantId,
        doc_type: &str,
        default_prefix: &str,
    ) -> Result<Allocation, SequenceRepoError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let allocation = next_in(rls.transaction(), tenant_id, doc_type, default_prefix, self.pad_width).await?;
        rls.commit().await?;
        Ok(allocation)
    }

    /// Returns the number the next allocation would issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed keys.
    pub async fn peek(
        &self,
        tenant_id: TenantId,
        doc_type: &str,
        default_prefix: &str,
    ) -> Result<String, SequenceRepoError> {
        let fresh = SequenceService::new_sequence(tenant_id, doc_type, default_prefix, self.pad_width)?;
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let stored = doc_sequences::Entity::find_by_id((tenant_id.into_inner(), fresh.doc_type.clone()))
            .one(rls.transaction())
            .await?;
        rls.commit().await?;

        let sequence = stored.map_or(fresh, DocSequence::from);
        Ok(SequenceService::peek(&sequence)?)
    }
}

/// Allocates inside the caller's transaction; the row lock is held until it ends.
pub(crate) async fn next_in<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    doc_type: &str,
    default_prefix: &str,
    pad_width: usize,
) -> Result<Allocation, SequenceRepoError> {
    let fresh = SequenceService::new_sequence(tenant_id, doc_type, default_prefix, pad_width)?;

    let seed = doc_sequences::ActiveModel {
        tenant_id: Set(tenant_id.into_inner()),
        doc_type: Set(fresh.doc_type.clone()),
        prefix: Set(fresh.prefix.clone()),
        next_number: Set(fresh.next_number),
        pad_width: Set(i32::try_from(fresh.pad_width).unwrap_or(i32::MAX)),
        updated_at: Set(Utc::now().into()),
    };
    doc_sequences::Entity::insert(seed)
        .on_conflict(
            OnConflict::columns([doc_sequences::Column::TenantId, doc_sequences::Column::DocType])
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(conn)
        .await?;

    let row = doc_sequences::Entity::find()
        .filter(doc_sequences::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(doc_sequences::Column::DocType.eq(fresh.doc_type.clone()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("doc_sequences {}", fresh.doc_type)))?;

    let allocation = SequenceService::allocate(&DocSequence::from(row.clone()))?;
    debug!(tenant_id = %tenant_id, doc_type = %fresh.doc_type, number = allocation.number, "sequence row locked");

    let mut active: doc_sequences::ActiveModel = row.into();
    active.next_number = Set(allocation.next_number);
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await?;

    info!(
        tenant_id = %tenant_id,
        doc_type = %fresh.doc_type,
        document_no = %allocation.document_no,
        "document number allocated"
    );
    Ok(allocation)
}
