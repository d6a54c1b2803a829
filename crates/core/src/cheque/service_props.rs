//! Property-based tests for the cheque state machine.
//!
//! A `Vec<PostingRequest>` stands in for the journal; `voucher_exists` looks
//! vouchers up in it the way the repository does.

use chrono::NaiveDate;
use ledgerline_shared::types::TenantId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::accounts::AccountNo;
use crate::cheque::book::ChequeBookService;
use crate::cheque::service::ChequeService;
use crate::cheque::types::{
    BankCharge, ChequeAccounts, ChequeDirection, ChequeStatus, ChequeTransaction, ChequeType, NewCheque,
};
use crate::ledger::PostingRequest;

const BANK: AccountNo = AccountNo(1010);
const AR: AccountNo = AccountNo(1100);
const IN_HAND: AccountNo = AccountNo(1150);
const AP: AccountNo = AccountNo(2000);
const PDC_PAY: AccountNo = AccountNo(2150);
const CHARGES: AccountNo = AccountNo(6150);

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_kind() -> impl Strategy<Value = (ChequeDirection, ChequeType)> {
    prop_oneof![
        Just((ChequeDirection::Outgoing, ChequeType::Normal)),
        Just((ChequeDirection::Outgoing, ChequeType::PostDated)),
        Just((ChequeDirection::Incoming, ChequeType::Normal)),
        Just((ChequeDirection::Incoming, ChequeType::PostDated)),
    ]
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn printed_cheque(direction: ChequeDirection, cheque_type: ChequeType, amount: Decimal) -> ChequeTransaction {
    let tenant = TenantId::new();
    let accounts = match direction {
        ChequeDirection::Outgoing => ChequeAccounts {
            bank_account_no: BANK,
            counter_account_no: AP,
            clearing_account_no: Some(PDC_PAY),
        },
        ChequeDirection::Incoming => ChequeAccounts {
            bank_account_no: BANK,
            counter_account_no: AR,
            clearing_account_no: Some(IN_HAND),
        },
    };
    let book = ChequeBookService::new_book(tenant, BANK, 1, 500).unwrap();
    let input = NewCheque {
        direction,
        cheque_type,
        cheque_book_id: Some(book.id),
        cheque_no: Some("004411".to_string()),
        issue_date: date(1),
        cheque_date: date(15),
        amount,
        counterparty_id: None,
        counterparty_name: None,
        source_document_id: None,
        notes: None,
    };
    let mut cheque = ChequeService::prepare_cheque(tenant, &input, accounts, Some(&book), "CHQ-00042")
        .unwrap()
        .cheque;
    let t = ChequeService::mark_printed(&cheque).unwrap();
    ChequeService::apply(&mut cheque, &t);
    cheque
}

fn exists(journal: &[PostingRequest]) -> impl Fn(&str) -> bool + '_ {
    move |voucher_no| journal.iter().any(|p| p.voucher_no == voucher_no)
}

/// Net Dr−Cr movement of an account across the journal.
fn net(journal: &[PostingRequest], account: AccountNo) -> Decimal {
    journal
        .iter()
        .flat_map(|p| p.lines.iter())
        .map(|l| {
            let dr = if l.debit_account_no == account { l.amount } else { Decimal::ZERO };
            let cr = if l.credit_account_no == account { l.amount } else { Decimal::ZERO };
            dr - cr
        })
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Calling the handover/deposit transition repeatedly yields exactly one stage-one entry.
    #[test]
    fn prop_stage_one_is_idempotent(
        (direction, cheque_type) in arb_kind(),
        amount in arb_amount(),
        repeats in 2usize..5,
    ) {
        let mut cheque = printed_cheque(direction, cheque_type, amount);
        let mut journal: Vec<PostingRequest> = Vec::new();

        for _ in 0..repeats {
            let t = ChequeService::mark_handed_over_or_deposited(&cheque, date(2), exists(&journal)).unwrap();
            journal.extend(t.postings.iter().cloned());
            ChequeService::apply(&mut cheque, &t);
        }

        prop_assert_eq!(journal.len(), 1);
        prop_assert_eq!(&journal[0].voucher_no, "CHQ-00042");
        prop_assert_eq!(journal[0].ref_id, Some(cheque.id.into_inner()));
    }

    /// After a bounce, everything tagged with the cheque nets to zero on the
    /// counter account and the account stage one credited or debited.
    #[test]
    fn prop_bounce_reverses_stage_one(
        (direction, cheque_type) in arb_kind(),
        amount in arb_amount(),
        presented in any::<bool>(),
        charge in prop::option::of(1i64..10_000),
        bounce_twice in any::<bool>(),
    ) {
        let mut cheque = printed_cheque(direction, cheque_type, amount);
        let mut journal: Vec<PostingRequest> = Vec::new();

        let t = ChequeService::mark_handed_over_or_deposited(&cheque, date(2), exists(&journal)).unwrap();
        journal.extend(t.postings.iter().cloned());
        ChequeService::apply(&mut cheque, &t);
        if presented {
            let t = ChequeService::mark_presented(&cheque).unwrap();
            ChequeService::apply(&mut cheque, &t);
        }

        let charge = charge.map(|c| BankCharge { amount: Decimal::new(c, 2), expense_account_no: CHARGES });
        for _ in 0..(if bounce_twice { 2 } else { 1 }) {
            let t = ChequeService::mark_bounced(&cheque, date(16), charge, exists(&journal)).unwrap();
            journal.extend(t.postings.iter().cloned());
            ChequeService::apply(&mut cheque, &t);
        }
        prop_assert_eq!(cheque.status, ChequeStatus::Bounced);

        let stage_one: Vec<PostingRequest> = journal
            .iter()
            .filter(|p| !p.voucher_no.ends_with("-BC"))
            .cloned()
            .collect();
        prop_assert_eq!(stage_one.len(), 2);
        prop_assert_eq!(net(&stage_one, cheque.counter_account_no), Decimal::ZERO);
        prop_assert_eq!(net(&stage_one, BANK), Decimal::ZERO);
        if let Some(clearing) = cheque.clearing_account_no {
            prop_assert_eq!(net(&stage_one, clearing), Decimal::ZERO);
        }

        let charged = charge.map_or(Decimal::ZERO, |c| c.amount);
        prop_assert_eq!(net(&journal, CHARGES), charged);

        // Voiding after a bounce posts no second reversal.
        let t = ChequeService::void(&cheque, date(17), "returned unpaid", exists(&journal)).unwrap();
        prop_assert!(t.postings.is_empty());
    }

    /// Outgoing post-dated round trip: the clearing account nets to zero,
    /// AP is debited and the bank credited by the cheque amount.
    #[test]
    fn prop_pdc_round_trip(amount in arb_amount()) {
        let mut cheque = printed_cheque(ChequeDirection::Outgoing, ChequeType::PostDated, amount);
        let mut journal: Vec<PostingRequest> = Vec::new();

        let t = ChequeService::mark_handed_over_or_deposited(&cheque, date(2), exists(&journal)).unwrap();
        journal.extend(t.postings.iter().cloned());
        ChequeService::apply(&mut cheque, &t);

        let t = ChequeService::mark_cleared(&cheque, date(15), exists(&journal)).unwrap();
        journal.extend(t.postings.iter().cloned());
        ChequeService::apply(&mut cheque, &t);

        prop_assert_eq!(cheque.status, ChequeStatus::Cleared);
        prop_assert_eq!(journal.len(), 2);
        prop_assert_eq!(net(&journal, BANK), -amount);
        prop_assert_eq!(net(&journal, AP), amount);
        prop_assert_eq!(net(&journal, PDC_PAY), Decimal::ZERO);

        // Replaying the clearance adds nothing.
        let t = ChequeService::mark_cleared(&cheque, date(20), exists(&journal)).unwrap();
        prop_assert!(t.postings.is_empty());
        prop_assert_eq!(t.clear_date, Some(date(15)));
    }

    /// Voiding a handed-over or deposited cheque reverses stage one exactly once.
    #[test]
    fn prop_void_reverses_once(
        (direction, cheque_type) in arb_kind(),
        amount in arb_amount(),
    ) {
        let mut cheque = printed_cheque(direction, cheque_type, amount);
        let mut journal: Vec<PostingRequest> = Vec::new();

        let t = ChequeService::mark_handed_over_or_deposited(&cheque, date(2), exists(&journal)).unwrap();
        journal.extend(t.postings.iter().cloned());
        ChequeService::apply(&mut cheque, &t);

        for _ in 0..2 {
            let t = ChequeService::void(&cheque, date(3), "stopped", exists(&journal)).unwrap();
            journal.extend(t.postings.iter().cloned());
            ChequeService::apply(&mut cheque, &t);
        }

        prop_assert_eq!(journal.len(), 2);
        prop_assert_eq!(&journal[1].voucher_no, "CHQ-00042-VOIDREV");
        prop_assert_eq!(net(&journal, cheque.counter_account_no), Decimal::ZERO);
        prop_assert_eq!(cheque.notes.as_deref(), Some("Voided: stopped"));
    }
}
