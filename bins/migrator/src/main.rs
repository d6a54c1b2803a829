//! Database migration runner for Ledgerline.
//!
//! Usage:
//!   migrator up      - Apply pending migrations (schema, RLS, triggers)
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! The connection string comes from `DATABASE_URL` (or `-u`).

use ledgerline_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The migrator CLI sets up its own tracing subscriber.
    cli::run_cli(Migrator).await;
}
