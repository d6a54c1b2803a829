//! `SeaORM` Entity for bank_statement_lines table.

use chrono::Utc;
use ledgerline_core::ledger::{LedgerError, VoucherType};
use ledgerline_core::reconciliation::StatementLine;
use ledgerline_shared::types::{BankAccountId, StatementImportId, StatementLineId, TenantId};
use rust_decimal::Decimal;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{MatchMethod, MatchStatus, StatementDirection};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_statement_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub import_id: Uuid,
    pub bank_account_id: Uuid,
    pub transaction_date: Date,
    pub narration: String,
    pub direction: StatementDirection,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub running_balance: Option<Decimal>,
    pub reference_token: Option<String>,
    pub status: MatchStatus,
    pub matched_voucher_type: Option<String>,
    pub matched_voucher_no: Option<String>,
    pub matched_ref_id: Option<Uuid>,
    pub matched_entry_id: Option<i64>,
    #[sea_orm(column_type = "Decimal(Some((5, 4)))")]
    pub confidence: Decimal,
    pub method: MatchMethod,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_statement_imports::Entity",
        from = "Column::ImportId",
        to = "super::bank_statement_imports::Column::Id"
    )]
    BankStatementImports,
}

impl Related<super::bank_statement_imports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatementImports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for StatementLine {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StatementLineId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            import_id: StatementImportId::from_uuid(model.import_id),
            bank_account_id: BankAccountId::from_uuid(model.bank_account_id),
            transaction_date: model.transaction_date,
            narration: model.narration,
            direction: model.direction.into(),
            amount: model.amount,
            running_balance: model.running_balance,
            reference_token: model.reference_token,
            status: model.status.into(),
            matched_voucher_type: model.matched_voucher_type.map(VoucherType::new).transpose()?,
            matched_voucher_no: model.matched_voucher_no,
            matched_ref_id: model.matched_ref_id,
            matched_entry_id: model.matched_entry_id,
            confidence: model.confidence,
            method: model.method.into(),
            notes: model.notes,
        })
    }
}

impl From<&StatementLine> for ActiveModel {
    /// Full row for insertion; every column is set.
    fn from(line: &StatementLine) -> Self {
        let now = Utc::now().into();
        Self {
            id: Set(line.id.into_inner()),
            tenant_id: Set(line.tenant_id.into_inner()),
            import_id: Set(line.import_id.into_inner()),
            bank_account_id: Set(line.bank_account_id.into_inner()),
            transaction_date: Set(line.transaction_date),
            narration: Set(line.narration.clone()),
            direction: Set(line.direction.into()),
            amount: Set(line.amount),
            running_balance: Set(line.running_balance),
            reference_token: Set(line.reference_token.clone()),
            status: Set(line.status.into()),
            matched_voucher_type: Set(line.matched_voucher_type.as_ref().map(|v| v.as_str().to_string())),
            matched_voucher_no: Set(line.matched_voucher_no.clone()),
            matched_ref_id: Set(line.matched_ref_id),
            matched_entry_id: Set(line.matched_entry_id),
            confidence: Set(line.confidence),
            method: Set(line.method.into()),
            notes: Set(line.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Copies the mutable match columns of a line onto an active model.
pub fn match_update(line: &StatementLine) -> ActiveModel {
    ActiveModel {
        id: sea_orm::Unchanged(line.id.into_inner()),
        status: Set(line.status.into()),
        matched_voucher_type: Set(line.matched_voucher_type.as_ref().map(|v| v.as_str().to_string())),
        matched_voucher_no: Set(line.matched_voucher_no.clone()),
        matched_ref_id: Set(line.matched_ref_id),
        matched_entry_id: Set(line.matched_entry_id),
        confidence: Set(line.confidence),
        method: Set(line.method.into()),
        notes: Set(line.notes.clone()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
}
