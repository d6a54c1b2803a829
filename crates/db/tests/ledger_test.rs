//! Integration tests for the journal store and derived reports.
//!
//! Requires a running `PostgreSQL` database with `DATABASE_URL` set.

mod common;

use common::{AP, AR, BANK, CAPITAL, SALES, SUPPLIES, connect, date, seed_tenant};
use ledgerline_core::accounts::AccountNo;
use ledgerline_core::ledger::{LedgerError, PostingLine, PostingRequest, VoucherType, codes};
use ledgerline_core::reports::UNRESOLVED_COUNTERPARTY;
use ledgerline_db::entities::sea_orm_active_enums::TradeDocumentKind;
use ledgerline_db::repositories::{JournalError, NewTradeDocument};
use ledgerline_db::{JournalRepository, TradeDocumentRepository};
use ledgerline_shared::types::TenantId;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn sale(tenant: TenantId, voucher_no: &str, amount: rust_decimal::Decimal) -> PostingRequest {
    PostingRequest::single(
        tenant,
        date(2025, 1, 10),
        VoucherType::new(codes::INV).unwrap(),
        voucher_no,
        PostingLine::new(AR, SALES, amount),
    )
}

#[tokio::test]
async fn test_simple_sale_moves_receivable_and_revenue() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let journal = JournalRepository::new(db);

    let entry = journal.post(&sale(tenant, "INV-001", dec!(1050.00))).await.unwrap();
    assert!(entry.id > 0);

    let as_of = date(2025, 1, 10);
    assert_eq!(journal.balance(tenant, AR, as_of).await.unwrap(), dec!(1050.00));
    assert_eq!(journal.balance(tenant, SALES, as_of).await.unwrap(), dec!(-1050.00));
    // Balances include the as-of date but nothing after it.
    assert_eq!(journal.balance(tenant, AR, date(2025, 1, 9)).await.unwrap(), dec!(0));

    let pnl = journal
        .profit_and_loss(tenant, date(2025, 1, 1), date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(pnl.total_revenue, dec!(1050.00));
    assert_eq!(pnl.net_result, dec!(1050.00));

    let voucher = VoucherType::new(codes::INV).unwrap();
    assert!(journal.voucher_exists(tenant, &voucher, "INV-001").await.unwrap());
    assert!(!journal.voucher_exists(tenant, &voucher, "INV-002").await.unwrap());
}

#[tokio::test]
async fn test_post_many_writes_nothing_when_a_line_fails() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let journal = JournalRepository::new(db);

    let mut request = sale(tenant, "INV-100", dec!(100));
    request.lines.push(PostingLine::new(AR, AccountNo(9999), dec!(15)));

    let err = journal.post_many(&request).await.unwrap_err();
    assert!(matches!(
        err,
        JournalError::Ledger(LedgerError::AccountNotFound(AccountNo(9999)))
    ));
    assert_eq!(journal.balance(tenant, AR, date(2025, 12, 31)).await.unwrap(), dec!(0));

    request.lines[1] = PostingLine::new(AR, SUPPLIES, dec!(15));
    let written = journal.post_many(&request).await.unwrap();
    assert_eq!(written.len(), 2);
    assert!(written[0].id < written[1].id);
    assert_eq!(journal.balance(tenant, AR, date(2025, 12, 31)).await.unwrap(), dec!(115));
}

#[tokio::test]
async fn test_single_post_rejects_same_account_and_multi_line() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let journal = JournalRepository::new(db);

    let same = PostingRequest::single(
        tenant,
        date(2025, 1, 10),
        VoucherType::new(codes::JV).unwrap(),
        "JV-1",
        PostingLine::new(BANK, BANK, dec!(10)),
    );
    assert!(matches!(
        journal.post(&same).await,
        Err(JournalError::Ledger(LedgerError::SameAccount(_)))
    ));

    let mut two = sale(tenant, "INV-7", dec!(10));
    two.lines.push(PostingLine::new(BANK, AR, dec!(10)));
    assert!(matches!(
        journal.post(&two).await,
        Err(JournalError::Ledger(LedgerError::MultipleLines(2)))
    ));
}

#[tokio::test]
async fn test_trial_balance_and_ledger_card_counterparties() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let journal = JournalRepository::new(db.clone());
    let documents = TradeDocumentRepository::new(db);

    let invoice_id = Uuid::new_v4();
    documents
        .register(
            tenant,
            NewTradeDocument {
                id: invoice_id,
                kind: TradeDocumentKind::Sales,
                voucher_type: VoucherType::new(codes::INV).unwrap(),
                voucher_no: "INV-001".to_string(),
                party_id: None,
                party_name: "Acme Trading".to_string(),
                document_date: date(2025, 1, 10),
                total_amount: dec!(1050),
            },
        )
        .await
        .unwrap();

    journal
        .post(
            &PostingRequest::single(
                tenant,
                date(2025, 1, 2),
                VoucherType::new(codes::JV).unwrap(),
                "JV-1",
                PostingLine::new(BANK, CAPITAL, dec!(5000)),
            ),
        )
        .await
        .unwrap();
    journal
        .post(&sale(tenant, "INV-001", dec!(1050)).with_ref(invoice_id))
        .await
        .unwrap();
    journal
        .post(&PostingRequest::single(
            tenant,
            date(2025, 1, 20),
            VoucherType::new(codes::PAY).unwrap(),
            "PAY-9",
            PostingLine::new(BANK, AR, dec!(50)),
        ))
        .await
        .unwrap();
    journal
        .post(&PostingRequest::single(
            tenant,
            date(2025, 1, 25),
            VoucherType::new(codes::PINV).unwrap(),
            "PINV-3",
            PostingLine::new(SUPPLIES, AP, dec!(300)),
        ))
        .await
        .unwrap();

    let trial = journal.trial_balance(tenant, date(2025, 1, 31)).await.unwrap();
    assert!(trial.is_balanced);
    assert_eq!(trial.total_debit, dec!(6400));
    assert_eq!(trial.total_credit, dec!(6400));

    let card = journal
        .ledger_card(tenant, AR, date(2025, 1, 5), date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(card.opening_balance, dec!(0));
    assert_eq!(card.rows.len(), 2);
    assert_eq!(card.rows[0].running_balance, dec!(1050));
    assert_eq!(card.rows[0].counterparty.as_deref(), Some("Acme Trading"));
    assert_eq!(card.rows[1].running_balance, dec!(1000));
    assert_eq!(card.rows[1].counterparty.as_deref(), Some(UNRESOLVED_COUNTERPARTY));
    assert_eq!(card.closing_balance, dec!(1000));

    // Bank is not a trade control account: no counterparty column.
    let bank_card = journal
        .ledger_card(tenant, BANK, date(2025, 1, 5), date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(bank_card.opening_balance, dec!(5000));
    assert!(bank_card.rows.iter().all(|row| row.counterparty.is_none()));

    let cash_flow = journal
        .cash_flow(tenant, date(2025, 1, 1), date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(cash_flow.financing, dec!(5000));
    assert_eq!(cash_flow.closing_cash - cash_flow.opening_cash, dec!(5050));
}

#[tokio::test]
async fn test_inverted_period_is_rejected() {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let journal = JournalRepository::new(db);

    let err = journal
        .profit_and_loss(tenant, date(2025, 2, 1), date(2025, 1, 1))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_DATE_RANGE");
}
