//! `SeaORM` Entity for cheque_books table.

use chrono::Utc;
use ledgerline_core::accounts::AccountNo;
use ledgerline_core::cheque::ChequeBook;
use ledgerline_shared::types::{ChequeBookId, TenantId};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cheque_books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub bank_account_no: i32,
    pub start_no: i64,
    pub end_no: i64,
    pub next_no: i64,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cheque_transactions::Entity")]
    ChequeTransactions,
}

impl Related<super::cheque_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChequeTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ChequeBook {
    fn from(model: Model) -> Self {
        Self {
            id: ChequeBookId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            bank_account_no: AccountNo(model.bank_account_no),
            start_no: model.start_no,
            end_no: model.end_no,
            next_no: model.next_no,
            is_active: model.is_active,
        }
    }
}

impl From<&ChequeBook> for ActiveModel {
    fn from(book: &ChequeBook) -> Self {
        let now = Utc::now().into();
        Self {
            id: Set(book.id.into_inner()),
            tenant_id: Set(book.tenant_id.into_inner()),
            bank_account_no: Set(book.bank_account_no.value()),
            start_no: Set(book.start_no),
            end_no: Set(book.end_no),
            next_no: Set(book.next_no),
            is_active: Set(book.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}
