//! Property-based tests for LedgerService.
//!
//! - Any non-positive amount on any line rejects the whole posting
//! - Self-postings are rejected regardless of position
//! - Accepted postings keep line order and amounts

use chrono::NaiveDate;
use ledgerline_shared::types::TenantId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::VoucherType;
use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{AccountInfo, PostingLine, PostingRequest};
use crate::accounts::AccountNo;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate zero or negative amounts.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..=0i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn valid_line() -> impl Strategy<Value = PostingLine> {
    (1i32..500, 500i32..1000, positive_amount())
        .prop_map(|(d, c, amount)| PostingLine::new(AccountNo(d), AccountNo(c), amount))
}

/// Mock account validator that always succeeds.
fn ok_account_validator(account_no: AccountNo) -> Result<AccountInfo, LedgerError> {
    Ok(AccountInfo {
        account_no,
        is_active: true,
    })
}

fn make_request(lines: Vec<PostingLine>) -> PostingRequest {
    PostingRequest {
        tenant_id: TenantId::new(),
        transaction_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        voucher_type: VoucherType::new("JV").unwrap(),
        voucher_no: "JV-00001".to_string(),
        ref_id: None,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_non_positive_line_rejects_posting(
        mut lines in prop::collection::vec(valid_line(), 1..6),
        bad in non_positive_amount(),
        pos in 0usize..6,
    ) {
        let idx = pos % lines.len();
        lines[idx].amount = bad;
        let result = LedgerService::prepare_post_many(&make_request(lines), ok_account_validator);
        prop_assert!(matches!(
            result,
            Err(LedgerError::ZeroAmount | LedgerError::NegativeAmount(_))
        ));
    }

    #[test]
    fn prop_self_posting_rejected(
        mut lines in prop::collection::vec(valid_line(), 1..6),
        pos in 0usize..6,
    ) {
        let idx = pos % lines.len();
        lines[idx].credit_account_no = lines[idx].debit_account_no;
        let result = LedgerService::prepare_post_many(&make_request(lines), ok_account_validator);
        prop_assert!(matches!(result, Err(LedgerError::SameAccount(_))), "expected SameAccount");
    }

    #[test]
    fn prop_accepted_posting_preserves_lines(
        lines in prop::collection::vec(valid_line(), 1..10),
    ) {
        let request = make_request(lines.clone());
        let entries = LedgerService::prepare_post_many(&request, ok_account_validator).unwrap();
        prop_assert_eq!(entries.len(), lines.len());
        for (entry, line) in entries.iter().zip(&lines) {
            prop_assert_eq!(entry.amount, line.amount);
            prop_assert_eq!(entry.debit_account_no, line.debit_account_no);
            prop_assert_eq!(entry.credit_account_no, line.credit_account_no);
        }
        let total: Decimal = entries.iter().map(|e| e.amount).sum();
        prop_assert_eq!(total, request.total());
    }
}
