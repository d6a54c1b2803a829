//! `SeaORM` Entity for bank_accounts table.

use ledgerline_core::accounts::{AccountNo, BankAccount};
use ledgerline_shared::types::{BankAccountId, TenantId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub bank_reference: String,
    pub gl_account_no: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_statement_imports::Entity")]
    BankStatementImports,
}

impl Related<super::bank_statement_imports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatementImports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BankAccount {
    fn from(model: Model) -> Self {
        Self {
            id: BankAccountId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            name: model.name,
            bank_reference: model.bank_reference,
            gl_account_no: AccountNo(model.gl_account_no),
            is_active: model.is_active,
        }
    }
}
