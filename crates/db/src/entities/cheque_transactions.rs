//! `SeaORM` Entity for cheque_transactions table.

use chrono::Utc;
use ledgerline_core::accounts::AccountNo;
use ledgerline_core::cheque::ChequeTransaction;
use ledgerline_shared::types::{ChequeBookId, ChequeId, TenantId};
use rust_decimal::Decimal;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ChequeDirection, ChequeStatus, ChequeType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cheque_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub direction: ChequeDirection,
    pub cheque_type: ChequeType,
    pub status: ChequeStatus,
    pub cheque_book_id: Option<Uuid>,
    pub cheque_no: String,
    pub voucher_no: String,
    pub issue_date: Date,
    pub cheque_date: Date,
    pub clear_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub counterparty_id: Option<Uuid>,
    pub counterparty_name: Option<String>,
    pub source_document_id: Option<Uuid>,
    pub bank_account_no: i32,
    pub clearing_account_no: Option<i32>,
    pub counter_account_no: i32,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cheque_books::Entity",
        from = "Column::ChequeBookId",
        to = "super::cheque_books::Column::Id"
    )]
    ChequeBooks,
}

impl Related<super::cheque_books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChequeBooks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ChequeTransaction {
    fn from(model: Model) -> Self {
        Self {
            id: ChequeId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            direction: model.direction.into(),
            cheque_type: model.cheque_type.into(),
            status: model.status.into(),
            cheque_book_id: model.cheque_book_id.map(ChequeBookId::from_uuid),
            cheque_no: model.cheque_no,
            voucher_no: model.voucher_no,
            issue_date: model.issue_date,
            cheque_date: model.cheque_date,
            clear_date: model.clear_date,
            amount: model.amount,
            counterparty_id: model.counterparty_id,
            counterparty_name: model.counterparty_name,
            source_document_id: model.source_document_id,
            bank_account_no: AccountNo(model.bank_account_no),
            clearing_account_no: model.clearing_account_no.map(AccountNo),
            counter_account_no: AccountNo(model.counter_account_no),
            notes: model.notes,
        }
    }
}

impl From<&ChequeTransaction> for ActiveModel {
    fn from(cheque: &ChequeTransaction) -> Self {
        let now = Utc::now().into();
        Self {
            id: Set(cheque.id.into_inner()),
            tenant_id: Set(cheque.tenant_id.into_inner()),
            direction: Set(cheque.direction.into()),
            cheque_type: Set(cheque.cheque_type.into()),
            status: Set(cheque.status.into()),
            cheque_book_id: Set(cheque.cheque_book_id.map(ChequeBookId::into_inner)),
            cheque_no: Set(cheque.cheque_no.clone()),
            voucher_no: Set(cheque.voucher_no.clone()),
            issue_date: Set(cheque.issue_date),
            cheque_date: Set(cheque.cheque_date),
            clear_date: Set(cheque.clear_date),
            amount: Set(cheque.amount),
            counterparty_id: Set(cheque.counterparty_id),
            counterparty_name: Set(cheque.counterparty_name.clone()),
            source_document_id: Set(cheque.source_document_id),
            bank_account_no: Set(cheque.bank_account_no.value()),
            clearing_account_no: Set(cheque.clearing_account_no.map(AccountNo::value)),
            counter_account_no: Set(cheque.counter_account_no.value()),
            notes: Set(cheque.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}
