//! Integration tests for cheque books and the cheque lifecycle.
//!
//! Requires a running `PostgreSQL` database with `DATABASE_URL` set.

mod common;

use std::sync::Arc;

use common::{AP, AR, BANK, connect, date, seed_tenant};
use futures::future::join_all;
use ledgerline_core::accounts::AccountNo;
use ledgerline_core::cheque::{ChequeDirection, ChequeStatus, ChequeType, NewCheque};
use ledgerline_core::ledger::{PostingLine, PostingRequest, VoucherType, codes};
use ledgerline_db::{ChequeRepository, JournalRepository};
use ledgerline_shared::types::{ChequeBookId, TenantId};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tokio::sync::Barrier;

const PDC_PAYABLE: AccountNo = AccountNo(2150);
const PDC_RECEIVABLE: AccountNo = AccountNo(1150);
const BANK_CHARGES: AccountNo = AccountNo(6150);

fn incoming(cheque_no: &str, amount: Decimal) -> NewCheque {
    NewCheque {
        direction: ChequeDirection::Incoming,
        cheque_type: ChequeType::PostDated,
        cheque_book_id: None,
        cheque_no: Some(cheque_no.to_string()),
        issue_date: date(2025, 3, 1),
        cheque_date: date(2025, 3, 20),
        amount,
        counterparty_id: None,
        counterparty_name: Some("Acme Trading".to_string()),
        source_document_id: None,
        notes: None,
    }
}

fn outgoing(book: ChequeBookId, cheque_type: ChequeType, amount: Decimal) -> NewCheque {
    NewCheque {
        direction: ChequeDirection::Outgoing,
        cheque_type,
        cheque_book_id: Some(book),
        cheque_no: None,
        issue_date: date(2025, 3, 1),
        cheque_date: match cheque_type {
            ChequeType::Normal => date(2025, 3, 1),
            ChequeType::PostDated => date(2025, 4, 1),
        },
        amount,
        counterparty_id: None,
        counterparty_name: Some("Paper Supplies Ltd".to_string()),
        source_document_id: None,
        notes: None,
    }
}

async fn setup(book_end: i64) -> (DatabaseConnection, TenantId, ChequeRepository, ChequeBookId) {
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let cheques = ChequeRepository::new(db.clone(), true, 5);
    let book = cheques
        .create_cheque_book(tenant, BANK, 100, book_end)
        .await
        .expect("Failed to create cheque book");
    (db, tenant, cheques, book.id)
}

#[tokio::test]
async fn test_post_dated_outgoing_round_trip() {
    let (db, tenant, cheques, book) = setup(199).await;
    let journal = JournalRepository::new(db);

    let cheque = cheques
        .create_cheque(tenant, &outgoing(book, ChequeType::PostDated, dec!(500)))
        .await
        .unwrap();
    assert_eq!(cheque.status, ChequeStatus::Draft);
    assert_eq!(cheque.cheque_no, "100");
    assert_eq!(cheque.clearing_account_no, Some(PDC_PAYABLE));
    assert_eq!(cheques.find_cheque_book(tenant, book).await.unwrap().next_no, 101);

    cheques.mark_printed(tenant, cheque.id).await.unwrap();
    cheques
        .mark_handed_over_or_deposited(tenant, cheque.id, date(2025, 3, 2))
        .await
        .unwrap();

    // Stage one: Dr AP / Cr PDC payable.
    let end = date(2025, 12, 31);
    assert_eq!(journal.balance(tenant, AP, end).await.unwrap(), dec!(500));
    assert_eq!(journal.balance(tenant, PDC_PAYABLE, end).await.unwrap(), dec!(-500));
    assert_eq!(journal.balance(tenant, BANK, end).await.unwrap(), dec!(0));

    cheques.mark_presented(tenant, cheque.id).await.unwrap();
    let cleared = cheques.mark_cleared(tenant, cheque.id, date(2025, 4, 2)).await.unwrap();
    assert_eq!(cleared.status, ChequeStatus::Cleared);
    assert_eq!(cleared.clear_date, Some(date(2025, 4, 2)));

    // Stage two: Dr PDC payable / Cr Bank.
    assert_eq!(journal.balance(tenant, BANK, end).await.unwrap(), dec!(-500));
    assert_eq!(journal.balance(tenant, PDC_PAYABLE, end).await.unwrap(), dec!(0));
    assert_eq!(cheques.cheque_postings(tenant, cheque.id).await.unwrap().len(), 2);

    let err = cheques
        .void(tenant, cheque.id, date(2025, 4, 3), "too late")
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CHEQUE_TRANSITION");
}

#[tokio::test]
async fn test_replayed_handover_posts_once() {
    let (_db, tenant, cheques, book) = setup(199).await;

    let cheque = cheques
        .create_cheque(tenant, &outgoing(book, ChequeType::PostDated, dec!(80)))
        .await
        .unwrap();
    cheques.mark_printed(tenant, cheque.id).await.unwrap();
    for _ in 0..2 {
        let handed = cheques
            .mark_handed_over_or_deposited(tenant, cheque.id, date(2025, 3, 2))
            .await
            .unwrap();
        assert_eq!(handed.status, ChequeStatus::HandedOver);
    }
    assert_eq!(cheques.cheque_postings(tenant, cheque.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_stage_voucher_posted_elsewhere_is_not_duplicated() {
    let (db, tenant, cheques, book) = setup(199).await;
    let journal = JournalRepository::new(db);
    let end = date(2025, 12, 31);

    // Another workflow already booked the cheque's first voucher without a ref id.
    journal
        .post(&PostingRequest::single(
            tenant,
            date(2025, 3, 1),
            VoucherType::new(codes::CHQ).unwrap(),
            "CHQ-00001",
            PostingLine::new(AP, BANK, dec!(50)),
        ))
        .await
        .unwrap();

    let cheque = cheques
        .create_cheque(tenant, &outgoing(book, ChequeType::Normal, dec!(50)))
        .await
        .unwrap();
    assert_eq!(cheque.voucher_no, "CHQ-00001");
    cheques.mark_printed(tenant, cheque.id).await.unwrap();
    let handed = cheques
        .mark_handed_over_or_deposited(tenant, cheque.id, date(2025, 3, 2))
        .await
        .unwrap();
    assert_eq!(handed.status, ChequeStatus::HandedOver);

    assert_eq!(journal.balance(tenant, BANK, end).await.unwrap(), dec!(-50));
    assert_eq!(journal.balance(tenant, AP, end).await.unwrap(), dec!(50));
    assert!(cheques.cheque_postings(tenant, cheque.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bounce_reverses_stage_one_and_books_charge() {
    let (db, tenant, cheques, book) = setup(199).await;
    let journal = JournalRepository::new(db);
    let end = date(2025, 12, 31);

    let cheque = cheques
        .create_cheque(tenant, &outgoing(book, ChequeType::Normal, dec!(300)))
        .await
        .unwrap();
    assert_eq!(cheque.clearing_account_no, None);
    cheques.mark_printed(tenant, cheque.id).await.unwrap();
    cheques
        .mark_handed_over_or_deposited(tenant, cheque.id, date(2025, 3, 2))
        .await
        .unwrap();
    assert_eq!(journal.balance(tenant, BANK, end).await.unwrap(), dec!(-300));

    let bounced = cheques
        .mark_bounced(tenant, cheque.id, date(2025, 3, 5), Some(dec!(25)))
        .await
        .unwrap();
    assert_eq!(bounced.status, ChequeStatus::Bounced);
    assert!(bounced.notes.as_deref().is_some_and(|n| n.contains("25")));

    assert_eq!(journal.balance(tenant, AP, end).await.unwrap(), dec!(0));
    assert_eq!(journal.balance(tenant, BANK, end).await.unwrap(), dec!(-25));
    assert_eq!(journal.balance(tenant, BANK_CHARGES, end).await.unwrap(), dec!(25));

    // Voiding after a bounce writes no second reversal.
    let voided = cheques
        .void(tenant, cheque.id, date(2025, 3, 6), "replaced by transfer")
        .await
        .unwrap();
    assert_eq!(voided.status, ChequeStatus::Voided);
    assert_eq!(cheques.cheque_postings(tenant, cheque.id).await.unwrap().len(), 3);
    assert_eq!(journal.balance(tenant, AP, end).await.unwrap(), dec!(0));
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn test_void_requires_reason(#[case] reason: &str) {
    let (_db, tenant, cheques, book) = setup(199).await;
    let cheque = cheques
        .create_cheque(tenant, &outgoing(book, ChequeType::Normal, dec!(10)))
        .await
        .unwrap();

    let err = cheques
        .void(tenant, cheque.id, date(2025, 3, 2), reason)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VOID_REASON_REQUIRED");
    assert_eq!(cheques.find_cheque(tenant, cheque.id).await.unwrap().status, ChequeStatus::Draft);
}

#[tokio::test]
async fn test_incoming_post_dated_cheque_moves_through_cheques_in_hand() {
    let (db, tenant, cheques, _book) = setup(199).await;
    let journal = JournalRepository::new(db);
    let end = date(2025, 12, 31);

    let cheque = cheques
        .create_cheque(
            tenant,
            &NewCheque {
                direction: ChequeDirection::Incoming,
                cheque_type: ChequeType::PostDated,
                cheque_book_id: None,
                cheque_no: Some("884120".to_string()),
                issue_date: date(2025, 3, 1),
                cheque_date: date(2025, 3, 20),
                amount: dec!(750),
                counterparty_id: None,
                counterparty_name: Some("Acme Trading".to_string()),
                source_document_id: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(cheque.clearing_account_no, Some(PDC_RECEIVABLE));

    cheques.mark_printed(tenant, cheque.id).await.unwrap();
    let deposited = cheques
        .mark_handed_over_or_deposited(tenant, cheque.id, date(2025, 3, 2))
        .await
        .unwrap();
    assert_eq!(deposited.status, ChequeStatus::Deposited);
    assert_eq!(journal.balance(tenant, AR, end).await.unwrap(), dec!(-750));
    assert_eq!(journal.balance(tenant, PDC_RECEIVABLE, end).await.unwrap(), dec!(750));

    cheques.mark_cleared(tenant, cheque.id, date(2025, 3, 21)).await.unwrap();
    assert_eq!(journal.balance(tenant, BANK, end).await.unwrap(), dec!(750));
    assert_eq!(journal.balance(tenant, PDC_RECEIVABLE, end).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn test_exhausted_book_rejects_new_cheques() {
    let (_db, tenant, cheques, book) = setup(101).await;

    for expected in ["100", "101"] {
        let cheque = cheques
            .create_cheque(tenant, &outgoing(book, ChequeType::Normal, dec!(1)))
            .await
            .unwrap();
        assert_eq!(cheque.cheque_no, expected);
    }
    let err = cheques
        .create_cheque(tenant, &outgoing(book, ChequeType::Normal, dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CHEQUE_BOOK_EXHAUSTED");

    let err = cheques
        .create_cheque(
            tenant,
            &NewCheque {
                cheque_book_id: None,
                ..outgoing(book, ChequeType::Normal, dec!(1))
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CHEQUE_BOOK_REQUIRED");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_cheques_provision_one_clearing_account() {
    const CALLERS: usize = 8;
    let db = connect().await;
    let tenant = seed_tenant(&db).await;
    let cheques = ChequeRepository::new(db.clone(), true, 5);
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles = (0..CALLERS).map(|i| {
        let cheques = cheques.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            cheques
                .create_cheque(tenant, &incoming(&format!("77{i:04}"), dec!(100)))
                .await
        })
    });

    let created: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked").expect("create failed"))
        .collect();
    assert_eq!(created.len(), CALLERS);
    assert!(created.iter().all(|c| c.clearing_account_no == Some(PDC_RECEIVABLE)));

    let roles = ledgerline_db::AccountRepository::new(db).role_map(tenant).await.unwrap();
    assert_eq!(
        roles.get(ledgerline_core::accounts::AccountRole::PdcReceivable),
        Some(PDC_RECEIVABLE)
    );
}
