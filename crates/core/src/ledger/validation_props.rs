//! Property-based tests for the global double-entry balance.
//!
//! Every stored entry is a debit/credit pair of the same amount, so for any
//! set of validated postings the sum of all account debits equals the sum
//! of all account credits, in every date window.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use ledgerline_shared::types::TenantId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::totals_between;
use super::entry::{JournalEntry, VoucherType};
use super::service::LedgerService;
use super::types::{AccountInfo, PostingLine, PostingRequest};
use crate::accounts::AccountNo;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a line between two distinct accounts from a small chart.
fn line_strategy() -> impl Strategy<Value = PostingLine> {
    (1i32..8, 1i32..8, positive_amount())
        .prop_filter("debit and credit must differ", |(d, c, _)| d != c)
        .prop_map(|(d, c, amount)| PostingLine::new(AccountNo(d * 1000), AccountNo(c * 1000), amount))
}

fn active(account_no: AccountNo) -> Result<AccountInfo, super::error::LedgerError> {
    Ok(AccountInfo {
        account_no,
        is_active: true,
    })
}

fn post_all(batches: &[(u32, Vec<PostingLine>)]) -> Vec<JournalEntry> {
    let tenant = TenantId::new();
    let mut next_id = 0i64;
    let mut entries = Vec::new();
    for (idx, (day, lines)) in batches.iter().enumerate() {
        let request = PostingRequest {
            tenant_id: tenant,
            transaction_date: NaiveDate::from_ymd_opt(2025, 3, *day).unwrap(),
            voucher_type: VoucherType::new("JV").unwrap(),
            voucher_no: format!("JV-{idx:05}"),
            ref_id: None,
            lines: lines.clone(),
        };
        for new in LedgerService::prepare_post_many(&request, active).unwrap() {
            next_id += 1;
            entries.push(JournalEntry {
                id: next_id,
                tenant_id: new.tenant_id,
                transaction_date: new.transaction_date,
                voucher_type: new.voucher_type,
                voucher_no: new.voucher_no,
                ref_id: new.ref_id,
                debit_account_no: new.debit_account_no,
                credit_account_no: new.credit_account_no,
                amount: new.amount,
                narration: new.narration,
            });
        }
    }
    entries
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any window, Σ debits == Σ credits over all accounts.
    #[test]
    fn prop_global_balance_holds_in_every_window(
        batches in prop::collection::vec(
            (1u32..29, prop::collection::vec(line_strategy(), 1..4)),
            1..20,
        ),
        from_day in 1u32..29,
        len in 0u32..28,
    ) {
        let entries = post_all(&batches);
        let from = NaiveDate::from_ymd_opt(2025, 3, from_day).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, (from_day + len).min(28)).unwrap();

        let accounts: BTreeSet<AccountNo> = entries
            .iter()
            .flat_map(|e| [e.debit_account_no, e.credit_account_no])
            .collect();

        let mut debit = Decimal::ZERO;
        let mut credit = Decimal::ZERO;
        let mut net = Decimal::ZERO;
        for account in accounts {
            let totals = totals_between(&entries, account, Some(from), Some(to));
            debit += totals.debit_total;
            credit += totals.credit_total;
            net += totals.balance();
        }
        prop_assert_eq!(debit, credit);
        prop_assert_eq!(net, Decimal::ZERO);
    }

    /// Valid postings never produce a non-positive amount or a self-posting.
    #[test]
    fn prop_prepared_entries_respect_line_invariants(
        lines in prop::collection::vec(line_strategy(), 1..10),
    ) {
        let entries = post_all(&[(15, lines)]);
        for e in entries {
            prop_assert!(e.amount > Decimal::ZERO);
            prop_assert_ne!(e.debit_account_no, e.credit_account_no);
        }
    }
}
