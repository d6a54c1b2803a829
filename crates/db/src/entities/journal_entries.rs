//! `SeaORM` Entity for journal_entries table.
//!
//! Rows are insert-only; a trigger rejects UPDATE and DELETE.

use ledgerline_core::accounts::AccountNo;
use ledgerline_core::ledger::{JournalEntry, LedgerError, VoucherType};
use ledgerline_shared::types::TenantId;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tenant_id: Uuid,
    pub transaction_date: Date,
    pub voucher_type: String,
    pub voucher_no: String,
    pub ref_id: Option<Uuid>,
    pub debit_account_no: i32,
    pub credit_account_no: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub narration: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for JournalEntry {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: TenantId::from_uuid(model.tenant_id),
            transaction_date: model.transaction_date,
            voucher_type: VoucherType::new(model.voucher_type)?,
            voucher_no: model.voucher_no,
            ref_id: model.ref_id,
            debit_account_no: AccountNo(model.debit_account_no),
            credit_account_no: AccountNo(model.credit_account_no),
            amount: model.amount,
            narration: model.narration,
        })
    }
}
