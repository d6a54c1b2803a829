//! Tests for report generation.

use chrono::NaiveDate;
use ledgerline_shared::types::TenantId;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::error::ReportError;
use super::service::ReportService;
use super::types::{CounterpartyIndex, UNRESOLVED_COUNTERPARTY};
use crate::accounts::{Account, AccountNo, AccountType, CashFlowGroup, NewAccount};
use crate::ledger::{JournalEntry, VoucherType};

const BANK: i32 = 1010;
const AR: i32 = 1100;
const EQUIPMENT: i32 = 1500;
const ACCUM_DEP: i32 = 1590;
const AP: i32 = 2000;
const LOAN: i32 = 2500;
const CAPITAL: i32 = 3000;
const SALES: i32 = 4000;
const SUPPLIES: i32 = 5000;
const DEPRECIATION: i32 = 6100;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn entry(id: i64, on: NaiveDate, vno: &str, debit: i32, credit: i32, amount: Decimal) -> JournalEntry {
    let code = vno.split('-').next().unwrap_or("JV");
    JournalEntry {
        id,
        tenant_id: TenantId::new(),
        transaction_date: on,
        voucher_type: VoucherType::new(code).unwrap(),
        voucher_no: vno.to_string(),
        ref_id: None,
        debit_account_no: AccountNo(debit),
        credit_account_no: AccountNo(credit),
        amount,
        narration: None,
    }
}

fn tagged_chart() -> Vec<Account> {
    let tenant = TenantId::new();
    vec![
        NewAccount::new(BANK, "Bank", AccountType::Asset).cash(),
        NewAccount::new(AR, "Accounts Receivable", AccountType::Asset).working_capital(),
        NewAccount::new(EQUIPMENT, "Equipment", AccountType::Asset)
            .with_cash_flow_group(CashFlowGroup::Investing),
        NewAccount::new(ACCUM_DEP, "Accumulated Depreciation", AccountType::Asset),
        NewAccount::new(AP, "Accounts Payable", AccountType::Liability).working_capital(),
        NewAccount::new(LOAN, "Bank Loan", AccountType::Liability)
            .with_cash_flow_group(CashFlowGroup::Financing),
        NewAccount::new(CAPITAL, "Owner Capital", AccountType::Equity),
        NewAccount::new(SALES, "Sales", AccountType::Revenue),
        NewAccount::new(SUPPLIES, "Supplies", AccountType::Expense),
        NewAccount::new(DEPRECIATION, "Depreciation", AccountType::Expense).non_cash_expense(),
    ]
    .into_iter()
    .map(|a| a.into_account(tenant))
    .collect()
}

fn untagged_chart() -> Vec<Account> {
    tagged_chart()
        .into_iter()
        .map(|mut a| {
            a.is_cash_account = false;
            a.is_working_capital = false;
            a.is_non_cash_expense = false;
            a.cash_flow_group = None;
            a
        })
        .collect()
}

/// One quarter of trading with capital paid in beforehand.
fn quarter() -> Vec<JournalEntry> {
    vec![
        entry(1, date(3, 31), "JV-0001", BANK, CAPITAL, dec!(500)),
        entry(2, date(4, 2), "INV-0001", AR, SALES, dec!(1000)),
        entry(3, date(4, 20), "JV-0002", BANK, AR, dec!(600)),
        entry(4, date(5, 3), "PINV-0001", SUPPLIES, AP, dec!(300)),
        entry(5, date(5, 10), "JV-0003", BANK, LOAN, dec!(2000)),
        entry(6, date(5, 11), "JV-0004", EQUIPMENT, BANK, dec!(1500)),
        entry(7, date(6, 30), "JV-0005", DEPRECIATION, ACCUM_DEP, dec!(100)),
    ]
}

fn account(chart: &[Account], no: i32) -> &Account {
    chart.iter().find(|a| a.account_no == AccountNo(no)).unwrap()
}

// ---------------------------------------------------------------------------
// Ledger card
// ---------------------------------------------------------------------------

#[test]
fn test_ledger_card_opening_and_running_balance() {
    let chart = tagged_chart();
    let entries = vec![
        entry(1, date(3, 1), "INV-0001", AR, SALES, dec!(250)),
        // Same date, inserted out of id order.
        entry(4, date(4, 5), "JV-0002", BANK, AR, dec!(100)),
        entry(3, date(4, 5), "INV-0002", AR, SALES, dec!(400)),
        entry(5, date(4, 30), "INV-0003", AR, SALES, dec!(75)),
        entry(6, date(5, 1), "JV-0003", BANK, AR, dec!(9999)),
        entry(7, date(4, 10), "JV-0004", BANK, SALES, dec!(1)),
    ];

    let card = ReportService::ledger_card(account(&chart, AR), &entries, date(4, 1), date(4, 30), None).unwrap();

    assert_eq!(card.account_name, "Accounts Receivable");
    assert_eq!(card.opening_balance, dec!(250));
    let ids: Vec<i64> = card.rows.iter().map(|r| r.entry_id).collect();
    assert_eq!(ids, vec![3, 4, 5]);

    let running: Vec<Decimal> = card.rows.iter().map(|r| r.running_balance).collect();
    assert_eq!(running, vec![dec!(650), dec!(550), dec!(625)]);
    assert_eq!(card.rows[1].credit, dec!(100));
    assert_eq!(card.rows[1].contra_account_no, AccountNo(BANK));
    assert_eq!(card.total_debit, dec!(475));
    assert_eq!(card.total_credit, dec!(100));
    assert_eq!(card.closing_balance, dec!(625));
    assert!(card.rows.iter().all(|r| r.counterparty.is_none()));
}

#[test]
fn test_ledger_card_credit_normal_account_runs_negative() {
    let chart = tagged_chart();
    let entries = vec![entry(1, date(4, 2), "INV-0001", AR, SALES, dec!(1050))];

    let card = ReportService::ledger_card(account(&chart, SALES), &entries, date(4, 1), date(4, 30), None).unwrap();

    assert_eq!(card.closing_balance, dec!(-1050));
    assert_eq!(card.rows[0].contra_account_no, AccountNo(AR));
}

#[test]
fn test_ledger_card_resolves_counterparties() {
    let chart = tagged_chart();
    let doc = Uuid::new_v4();
    let mut by_ref = entry(1, date(4, 2), "INV-0001", AR, SALES, dec!(100));
    by_ref.ref_id = Some(doc);
    let by_voucher = entry(2, date(4, 3), "INV-0002", AR, SALES, dec!(200));
    let orphan = entry(3, date(4, 4), "JV-0001", BANK, AR, dec!(50));

    let mut index = CounterpartyIndex::new();
    index.insert(doc, "INV", "INV-0001", "Acme Trading");
    index.insert(Uuid::new_v4(), "INV", "INV-0002", "Blue Harbor Ltd");
    assert_eq!(index.len(), 2);

    let resolve = |e: &JournalEntry| index.resolve(e);
    let card = ReportService::ledger_card(
        account(&chart, AR),
        &[by_ref, by_voucher, orphan],
        date(4, 1),
        date(4, 30),
        Some(&resolve),
    )
    .unwrap();

    let parties: Vec<Option<&str>> = card.rows.iter().map(|r| r.counterparty.as_deref()).collect();
    assert_eq!(
        parties,
        vec![Some("Acme Trading"), Some("Blue Harbor Ltd"), Some(UNRESOLVED_COUNTERPARTY)]
    );
}

#[test]
fn test_ledger_card_rejects_inverted_period() {
    let chart = tagged_chart();
    let result = ReportService::ledger_card(account(&chart, AR), &[], date(5, 1), date(4, 1), None);
    assert!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
}

// ---------------------------------------------------------------------------
// Profit and loss
// ---------------------------------------------------------------------------

#[test]
fn test_profit_and_loss_single_sale() {
    let chart = tagged_chart();
    let entries = vec![entry(1, date(4, 2), "INV-0001", AR, SALES, dec!(1050))];

    let pnl = ReportService::profit_and_loss(&chart, &entries, date(4, 1), date(4, 30)).unwrap();

    assert_eq!(pnl.revenue.len(), 1);
    assert_eq!(pnl.revenue[0].account_no, AccountNo(SALES));
    assert_eq!(pnl.revenue[0].amount, dec!(1050));
    assert!(pnl.expenses.is_empty());
    assert_eq!(pnl.total_revenue, dec!(1050));
    assert_eq!(pnl.net_result, dec!(1050));
}

#[test]
fn test_profit_and_loss_period_bounds_and_zero_rows() {
    let chart = tagged_chart();
    let entries = vec![
        entry(1, date(3, 31), "INV-0001", AR, SALES, dec!(999)),
        entry(2, date(4, 1), "INV-0002", AR, SALES, dec!(800)),
        entry(3, date(4, 30), "PINV-0001", SUPPLIES, AP, dec!(200)),
        // Fully reversed within the period.
        entry(4, date(4, 10), "JV-0001", DEPRECIATION, ACCUM_DEP, dec!(40)),
        entry(5, date(4, 11), "JV-0002", ACCUM_DEP, DEPRECIATION, dec!(40)),
        entry(6, date(5, 1), "INV-0003", AR, SALES, dec!(999)),
    ];

    let pnl = ReportService::profit_and_loss(&chart, &entries, date(4, 1), date(4, 30)).unwrap();

    assert_eq!(pnl.total_revenue, dec!(800));
    assert_eq!(pnl.total_expenses, dec!(200));
    assert_eq!(pnl.net_result, dec!(600));
    assert_eq!(pnl.expenses.len(), 1);
    assert_eq!(pnl.expenses[0].name, "Supplies");
}

// ---------------------------------------------------------------------------
// Cash flow
// ---------------------------------------------------------------------------

#[test]
fn test_cash_flow_with_tagged_chart_reconciles() {
    let chart = tagged_chart();
    let cf = ReportService::cash_flow(&chart, &quarter(), date(4, 1), date(6, 30)).unwrap();

    assert_eq!(cf.net_income, dec!(600));
    assert_eq!(cf.non_cash_addbacks.len(), 1);
    assert_eq!(cf.non_cash_addbacks[0].amount, dec!(100));

    let wc: Vec<(AccountNo, Decimal)> = cf.working_capital.iter().map(|l| (l.account_no, l.cash_effect)).collect();
    assert_eq!(wc, vec![(AccountNo(AR), dec!(-400)), (AccountNo(AP), dec!(300))]);
    assert_eq!(cf.operating, dec!(600));

    assert_eq!(cf.investing, dec!(-1500));
    assert_eq!(cf.investing_lines[0].name, "Equipment");
    assert_eq!(cf.financing, dec!(2000));
    assert_eq!(cf.net_cash_flow, dec!(1100));

    assert_eq!(cf.opening_cash, dec!(500));
    assert_eq!(cf.closing_cash, dec!(1600));
    assert_eq!(cf.unexplained_difference, Decimal::ZERO);
    assert!(cf.warnings.is_empty(), "unexpected warnings: {:?}", cf.warnings);
    assert_eq!(cf.diagnostics.cash, 1);
    assert_eq!(cf.diagnostics.working_capital, 2);
}

#[test]
fn test_cash_flow_with_untagged_chart_warns() {
    let chart = untagged_chart();
    let cf = ReportService::cash_flow(&chart, &quarter(), date(4, 1), date(6, 30)).unwrap();

    assert_eq!(cf.net_income, dec!(600));
    assert!(cf.non_cash_addbacks.is_empty());
    assert!(cf.working_capital.is_empty());
    assert_eq!(cf.operating, dec!(600));
    assert_eq!(cf.investing, Decimal::ZERO);
    assert_eq!(cf.financing, Decimal::ZERO);
    assert_eq!(cf.opening_cash, Decimal::ZERO);
    assert_eq!(cf.closing_cash, Decimal::ZERO);
    assert_eq!(cf.unexplained_difference, dec!(-600));
    assert_eq!(cf.diagnostics.total, 10);
    assert_eq!(cf.diagnostics.cash, 0);
    assert_eq!(cf.warnings.len(), 4);
}

#[test]
fn test_cash_flow_rejects_inverted_period() {
    let result = ReportService::cash_flow(&tagged_chart(), &quarter(), date(6, 30), date(4, 1));
    assert!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
}

// ---------------------------------------------------------------------------
// Trial balance
// ---------------------------------------------------------------------------

#[test]
fn test_trial_balance_as_of_is_inclusive() {
    let chart = tagged_chart();
    let tb = ReportService::trial_balance(&chart, &quarter(), date(5, 10));

    assert!(tb.is_balanced);
    assert_eq!(tb.total_debit, dec!(4400));
    let bank = tb.rows.iter().find(|r| r.account_no == AccountNo(BANK)).unwrap();
    assert_eq!(bank.balance, dec!(3100));
    assert!(tb.rows.iter().all(|r| r.account_no != AccountNo(EQUIPMENT)));
}

#[test]
fn test_trial_balance_names_unknown_accounts() {
    let chart = tagged_chart();
    let entries = vec![entry(1, date(4, 1), "JV-0001", 9100, BANK, dec!(10))];
    let tb = ReportService::trial_balance(&chart, &entries, date(4, 1));

    let unknown = tb.rows.iter().find(|r| r.account_no == AccountNo(9100)).unwrap();
    assert_eq!(unknown.name, "Account 9100");
    assert_eq!(unknown.account_type, None);
    assert!(tb.is_balanced);
}

fn arb_entries() -> impl Strategy<Value = Vec<JournalEntry>> {
    let accounts = prop::sample::select(vec![BANK, AR, EQUIPMENT, AP, LOAN, CAPITAL, SALES, SUPPLIES, 9100]);
    prop::collection::vec(
        (accounts.clone(), accounts, 1i64..10_000_000, 1u32..=28),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .filter(|(_, (dr, cr, _, _))| dr != cr)
            .map(|(i, (dr, cr, cents, day))| {
                entry(i as i64 + 1, date(4, day), "JV-0001", dr, cr, Decimal::new(cents, 2))
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any journal yields a balanced trial balance whose balances net to zero.
    #[test]
    fn prop_trial_balance_always_balances(entries in arb_entries(), day in 1u32..=28) {
        let tb = ReportService::trial_balance(&tagged_chart(), &entries, date(4, day));

        prop_assert!(tb.is_balanced);
        prop_assert_eq!(tb.total_debit, tb.total_credit);
        let net: Decimal = tb.rows.iter().map(|r| r.balance).sum();
        prop_assert_eq!(net, Decimal::ZERO);
    }

    /// The ledger card closes at its opening balance plus period movement.
    #[test]
    fn prop_ledger_card_closing_matches_totals(entries in arb_entries(), split in 1u32..=28) {
        let chart = tagged_chart();
        let card = ReportService::ledger_card(account(&chart, BANK), &entries, date(4, split), date(4, 28), None).unwrap();

        prop_assert_eq!(card.closing_balance, card.opening_balance + card.total_debit - card.total_credit);
        let full = ReportService::trial_balance(&chart, &entries, date(4, 28));
        let bank = full.rows.iter().find(|r| r.account_no == AccountNo(BANK)).map_or(Decimal::ZERO, |r| r.balance);
        prop_assert_eq!(card.closing_balance, bank);
    }
}
