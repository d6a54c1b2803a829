//! `SeaORM` Entity for bank_statement_imports table.

use ledgerline_core::reconciliation::StatementImport;
use ledgerline_shared::types::{BankAccountId, StatementImportId, TenantId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_statement_imports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub bank_account_id: Uuid,
    pub source_name: Option<String>,
    pub min_date: Date,
    pub max_date: Date,
    pub line_count: i32,
    pub skipped_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id"
    )]
    BankAccounts,
    #[sea_orm(has_many = "super::bank_statement_lines::Entity")]
    BankStatementLines,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::bank_statement_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatementLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StatementImport {
    fn from(model: Model) -> Self {
        Self {
            id: StatementImportId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            bank_account_id: BankAccountId::from_uuid(model.bank_account_id),
            source_name: model.source_name,
            min_date: model.min_date,
            max_date: model.max_date,
            line_count: usize::try_from(model.line_count).unwrap_or_default(),
            skipped_count: usize::try_from(model.skipped_count).unwrap_or_default(),
        }
    }
}
