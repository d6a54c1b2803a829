//! `SeaORM` Entity for doc_sequences table.

use ledgerline_core::sequence::DocSequence;
use ledgerline_shared::types::TenantId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "doc_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tenant_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub doc_type: String,
    pub prefix: String,
    pub next_number: i64,
    pub pad_width: i32,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DocSequence {
    fn from(model: Model) -> Self {
        Self {
            tenant_id: TenantId::from_uuid(model.tenant_id),
            doc_type: model.doc_type,
            prefix: model.prefix,
            next_number: model.next_number,
            // The CHECK constraint keeps this within 1..=18.
            pad_width: usize::try_from(model.pad_width).unwrap_or(1),
        }
    }
}
