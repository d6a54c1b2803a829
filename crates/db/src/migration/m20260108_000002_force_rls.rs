//! Enables FORCE ROW LEVEL SECURITY on every tenant table.
//!
//! Without it the table owner, which is usually the application role,
//! bypasses the tenant policies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(FORCE_RLS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DISABLE_FORCE_RLS_SQL)
            .await?;
        Ok(())
    }
}

const FORCE_RLS_SQL: &str = r"
ALTER TABLE accounts FORCE ROW LEVEL SECURITY;
ALTER TABLE account_role_mappings FORCE ROW LEVEL SECURITY;
ALTER TABLE bank_accounts FORCE ROW LEVEL SECURITY;
ALTER TABLE journal_entries FORCE ROW LEVEL SECURITY;
ALTER TABLE doc_sequences FORCE ROW LEVEL SECURITY;
ALTER TABLE trade_documents FORCE ROW LEVEL SECURITY;
ALTER TABLE bank_statement_imports FORCE ROW LEVEL SECURITY;
ALTER TABLE bank_statement_lines FORCE ROW LEVEL SECURITY;
ALTER TABLE cheque_books FORCE ROW LEVEL SECURITY;
ALTER TABLE cheque_transactions FORCE ROW LEVEL SECURITY;
";

const DISABLE_FORCE_RLS_SQL: &str = r"
ALTER TABLE accounts NO FORCE ROW LEVEL SECURITY;
ALTER TABLE account_role_mappings NO FORCE ROW LEVEL SECURITY;
ALTER TABLE bank_accounts NO FORCE ROW LEVEL SECURITY;
ALTER TABLE journal_entries NO FORCE ROW LEVEL SECURITY;
ALTER TABLE doc_sequences NO FORCE ROW LEVEL SECURITY;
ALTER TABLE trade_documents NO FORCE ROW LEVEL SECURITY;
ALTER TABLE bank_statement_imports NO FORCE ROW LEVEL SECURITY;
ALTER TABLE bank_statement_lines NO FORCE ROW LEVEL SECURITY;
ALTER TABLE cheque_books NO FORCE ROW LEVEL SECURITY;
ALTER TABLE cheque_transactions NO FORCE ROW LEVEL SECURITY;
";
