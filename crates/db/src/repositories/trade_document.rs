//! Trade document directory.
//!
//! Sales and purchase documents are owned by the invoicing workflows; the
//! ledger reads them to name the counterparty behind receivable and payable
//! entries.

use chrono::{NaiveDate, Utc};
use ledgerline_core::ledger::VoucherType;
use ledgerline_core::reports::CounterpartyIndex;
use ledgerline_shared::types::TenantId;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::TradeDocumentKind;
use crate::entities::trade_documents;
use crate::rls::RlsConnection;

/// A sales or purchase document as recorded by its workflow.
#[derive(Debug, Clone)]
pub struct NewTradeDocument {
    /// Document id; journal entries carry it as `ref_id`.
    pub id: Uuid,
    /// Sales or purchase.
    pub kind: TradeDocumentKind,
    /// Voucher type the workflow posts under.
    pub voucher_type: VoucherType,
    /// Voucher number the workflow posts under.
    pub voucher_no: String,
    /// Customer or vendor id.
    pub party_id: Option<Uuid>,
    /// Customer or vendor name.
    pub party_name: String,
    /// Document date.
    pub document_date: NaiveDate,
    /// Document total.
    pub total_amount: Decimal,
}

/// Trade document repository.
#[derive(Debug, Clone)]
pub struct TradeDocumentRepository {
    db: DatabaseConnection,
}

impl TradeDocumentRepository {
    /// Creates a new trade document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn register(&self, tenant_id: TenantId, doc: NewTradeDocument) -> Result<trade_documents::Model, DbErr> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let model = trade_documents::ActiveModel {
            id: Set(doc.id),
            tenant_id: Set(tenant_id.into_inner()),
            kind: Set(doc.kind),
            voucher_type: Set(doc.voucher_type.as_str().to_string()),
            voucher_no: Set(doc.voucher_no),
            party_id: Set(doc.party_id),
            party_name: Set(doc.party_name),
            document_date: Set(doc.document_date),
            total_amount: Set(doc.total_amount),
            created_at: Set(Utc::now().into()),
        }
        .insert(rls.transaction())
        .await?;
        rls.commit().await?;

        info!(tenant_id = %tenant_id, document_id = %model.id, voucher_no = %model.voucher_no, "trade document registered");
        Ok(model)
    }

    /// Builds the counterparty lookup for the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn counterparty_index(&self, tenant_id: TenantId) -> Result<CounterpartyIndex, DbErr> {
        let rls = RlsConnection::new(&self.db, tenant_id).await?;
        let index = load_counterparty_index(rls.transaction(), tenant_id).await?;
        rls.commit().await?;
        Ok(index)
    }
}

pub(crate) async fn load_counterparty_index<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
) -> Result<CounterpartyIndex, DbErr> {
    let docs = trade_documents::Entity::find()
        .filter(trade_documents::Column::TenantId.eq(tenant_id.into_inner()))
        .all(conn)
        .await?;

    let mut index = CounterpartyIndex::new();
    for doc in docs {
        index.insert(doc.id, &doc.voucher_type, &doc.voucher_no, doc.party_name);
    }
    Ok(index)
}
