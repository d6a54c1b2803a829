//! Tenant-scoped transactions for the row-level security policies.
//!
//! Every unit of work runs inside a transaction that first issues
//! `SET LOCAL app.current_tenant_id`, so the tenant policies installed by the
//! migrations filter every read and check every write. The tenant is passed
//! explicitly to each call; nothing is kept in ambient state.
//!
//! # Usage
//!
//! ```ignore
//! use ledgerline_db::rls::RlsConnection;
//!
//! let rls = RlsConnection::new(&db, tenant_id).await?;
//! let accounts = accounts::Entity::find().all(rls.transaction()).await?;
//! rls.commit().await?;
//! ```

use ledgerline_shared::types::TenantId;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// A transaction bound to one tenant.
pub struct RlsConnection {
    txn: DatabaseTransaction,
    tenant_id: TenantId,
}

impl RlsConnection {
    /// Begins a transaction and sets the tenant context with `SET LOCAL`,
    /// which scopes the setting to this transaction only.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn new(db: &DatabaseConnection, tenant_id: TenantId) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        txn.execute_unprepared(&context_sql(tenant_id)).await?;
        Ok(Self { txn, tenant_id })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// The tenant this connection is scoped to.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Commits the unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Abandons the unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Opens tenant-scoped units of work straight from a connection pool.
#[async_trait::async_trait]
pub trait RlsExt {
    /// Creates an RLS-enabled connection for the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_tenant(&self, tenant_id: TenantId) -> Result<RlsConnection, DbErr>;
}

#[async_trait::async_trait]
impl RlsExt for DatabaseConnection {
    async fn with_tenant(&self, tenant_id: TenantId) -> Result<RlsConnection, DbErr> {
        RlsConnection::new(self, tenant_id).await
    }
}

// SET does not accept bind parameters; a typed UUID cannot carry quotes.
fn context_sql(tenant_id: TenantId) -> String {
    format!("SET LOCAL app.current_tenant_id = '{tenant_id}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_sql_quotes_the_tenant() {
        let tenant: TenantId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert_eq!(
            context_sql(tenant),
            "SET LOCAL app.current_tenant_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
