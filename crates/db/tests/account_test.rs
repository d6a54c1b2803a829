//! Integration tests for the chart of accounts and role mappings.
//!
//! Requires a running `PostgreSQL` database with `DATABASE_URL` set.

mod common;

use common::{AP, AR, BANK, SALES, SUPPLIES, connect, date, seed_tenant};
use ledgerline_core::accounts::{AccountNo, AccountRole, AccountType, NewAccount};
use ledgerline_core::ledger::{PostingLine, PostingRequest, VoucherType, codes};
use ledgerline_db::{AccountRepository, JournalRepository};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_duplicate_and_inconsistent_accounts_are_rejected() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let accounts = AccountRepository::new(db);

    let err = accounts
        .create_account(tenant, NewAccount::new(AR, "Receivables again", AccountType::Asset))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "DUPLICATE_ACCOUNT");

    let err = accounts
        .create_account(tenant, NewAccount::new(AccountNo(7000), "  ", AccountType::Expense))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "EMPTY_ACCOUNT_NAME");

    let found = accounts.find_account(tenant, SALES).await.unwrap().unwrap();
    assert_eq!(found.name, "Sales");
    assert!(accounts.find_account(tenant, AccountNo(7000)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deactivated_account_refuses_postings() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let accounts = AccountRepository::new(db.clone());
    let journal = JournalRepository::new(db);

    let deactivated = accounts.deactivate_account(tenant, SUPPLIES).await.unwrap();
    assert!(!deactivated.is_active);
    // Still listed: accounts are never deleted.
    assert!(accounts.list_accounts(tenant).await.unwrap().iter().any(|a| a.account_no == SUPPLIES));

    let err = journal
        .post(&PostingRequest::single(
            tenant,
            date(2025, 2, 1),
            VoucherType::new(codes::PCV).unwrap(),
            "PCV-1",
            PostingLine::new(SUPPLIES, BANK, dec!(20)),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");

    let err = accounts
        .set_role_mapping(tenant, AccountRole::Suspense, SUPPLIES)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn test_role_resolution_and_auto_provisioning() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let accounts = AccountRepository::new(db);

    let roles = accounts.role_map(tenant).await.unwrap();
    assert_eq!(roles.get(AccountRole::Ar), Some(AR));
    assert_eq!(roles.get(AccountRole::Ap), Some(AP));
    assert_eq!(roles.get(AccountRole::Cash), None);

    // Control accounts are never invented.
    let err = accounts
        .ensure_role_account(tenant, AccountRole::Cash, true)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ROLE_UNMAPPED");

    // Clearing accounts are, but only when allowed.
    let err = accounts
        .ensure_role_account(tenant, AccountRole::PdcReceivable, false)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ROLE_UNMAPPED");
    let provisioned = accounts
        .ensure_role_account(tenant, AccountRole::PdcReceivable, true)
        .await
        .unwrap();
    assert_eq!(provisioned, AccountNo(1150));
    assert_eq!(
        accounts.ensure_role_account(tenant, AccountRole::PdcReceivable, false).await.unwrap(),
        provisioned
    );
    let created = accounts.find_account(tenant, provisioned).await.unwrap().unwrap();
    assert_eq!(created.name, "Cheques in Hand");

    let tags = accounts.tag_counts(tenant).await.unwrap();
    assert_eq!(tags.total, 7);
    assert_eq!(tags.cash, 1);
    assert_eq!(tags.working_capital, 3);
    assert_eq!(tags.financing, 1);
}

#[tokio::test]
async fn test_bank_account_must_point_at_an_active_gl_account() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let accounts = AccountRepository::new(db);

    let bank = accounts
        .register_bank_account(tenant, "Operating", "GB00-1234", BANK)
        .await
        .unwrap();
    let found = accounts.find_bank_account(tenant, bank.id).await.unwrap();
    assert_eq!(found.gl_account_no, BANK);
    assert_eq!(found.bank_reference, "GB00-1234");

    let err = accounts
        .register_bank_account(tenant, "Ghost", "XX-1", AccountNo(1999))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_NOT_FOUND");

    let err = accounts
        .register_bank_account(tenant, "", "XX-2", BANK)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "BANK_ACCOUNT_FIELD_REQUIRED");
}
