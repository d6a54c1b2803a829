//! `SeaORM` Entity for accounts table.

use ledgerline_core::accounts::{Account, AccountNo};
use ledgerline_shared::types::TenantId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountType, CashFlowGroup, StatementClass};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tenant_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_no: i32,
    pub name: String,
    pub account_type: AccountType,
    pub statement_class: StatementClass,
    pub cash_flow_group: Option<CashFlowGroup>,
    pub is_cash_account: bool,
    pub is_non_cash_expense: bool,
    pub is_working_capital: bool,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            tenant_id: TenantId::from_uuid(model.tenant_id),
            account_no: AccountNo(model.account_no),
            name: model.name,
            account_type: model.account_type.into(),
            statement_class: model.statement_class.into(),
            cash_flow_group: model.cash_flow_group.map(Into::into),
            is_cash_account: model.is_cash_account,
            is_non_cash_expense: model.is_non_cash_expense,
            is_working_capital: model.is_working_capital,
            is_active: model.is_active,
        }
    }
}
