//! Report generation service.
//!
//! Every report is folded from journal entries on request; nothing here
//! keeps state.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    CashFlowLine, CashFlowStatement, LedgerCard, LedgerCardRow, PnlRow, ProfitAndLoss,
    TrialBalance, TrialBalanceRow, UNRESOLVED_COUNTERPARTY, WorkingCapitalLine,
};
use crate::accounts::{Account, AccountNo, AccountRegistry, AccountType, CashFlowGroup, StatementClass};
use crate::ledger::{AccountBalance, JournalEntry, NormalBalance, RunningBalance};

/// Resolves the customer or vendor behind a journal entry.
pub type CounterpartyResolver<'a> = &'a dyn Fn(&JournalEntry) -> Option<String>;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Builds the ledger card of one account.
    ///
    /// The opening balance covers every entry before `from`; rows between
    /// `from` and `to` inclusive follow in date order, ties broken by entry
    /// id. Balances are raw `debit − credit`. When `counterparty` is given
    /// each row carries the resolved party, or a placeholder.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from > to`.
    pub fn ledger_card(
        account: &Account,
        entries: &[JournalEntry],
        from: NaiveDate,
        to: NaiveDate,
        counterparty: Option<CounterpartyResolver<'_>>,
    ) -> Result<LedgerCard, ReportError> {
        Self::check_period(from, to)?;
        let account_no = account.account_no;

        let mut opening = AccountBalance::new(account_no);
        let mut in_period: Vec<&JournalEntry> = Vec::new();
        for entry in entries.iter().filter(|e| e.touches(account_no)) {
            if entry.transaction_date < from {
                opening.apply(entry);
            } else if entry.transaction_date <= to {
                in_period.push(entry);
            }
        }
        in_period.sort_by_key(|e| (e.transaction_date, e.id));

        let opening_balance = opening.balance();
        let mut running = RunningBalance::opening(opening_balance);
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;

        let rows = in_period
            .into_iter()
            .filter_map(|entry| {
                let (debit, credit) = entry.amounts_for(account_no);
                let contra_account_no = entry.contra_of(account_no)?;
                total_debit += debit;
                total_credit += credit;
                running = running.next(debit - credit);
                Some(LedgerCardRow {
                    entry_id: entry.id,
                    transaction_date: entry.transaction_date,
                    voucher_type: entry.voucher_type.clone(),
                    voucher_no: entry.voucher_no.clone(),
                    ref_id: entry.ref_id,
                    narration: entry.narration.clone(),
                    contra_account_no,
                    debit,
                    credit,
                    running_balance: running.current_balance,
                    counterparty: counterparty.map(|resolve| {
                        resolve(entry).unwrap_or_else(|| UNRESOLVED_COUNTERPARTY.to_string())
                    }),
                })
            })
            .collect();

        Ok(LedgerCard {
            account_no,
            account_name: account.name.clone(),
            from,
            to,
            opening_balance,
            rows,
            total_debit,
            total_credit,
            closing_balance: running.current_balance,
        })
    }

    /// Profit and loss for a period.
    ///
    /// Revenue rows are `credit − debit`, expense rows `debit − credit`;
    /// accounts with no net movement are left out.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from > to`.
    pub fn profit_and_loss(
        accounts: &[Account],
        entries: &[JournalEntry],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ProfitAndLoss, ReportError> {
        Self::check_period(from, to)?;
        let totals = Self::fold_totals(entries, Some(from), to);

        let mut revenue = Vec::new();
        let mut expenses = Vec::new();
        for account in Self::sorted(accounts) {
            if account.statement_class != StatementClass::IncomeStatement {
                continue;
            }
            let Some(t) = totals.get(&account.account_no) else {
                continue;
            };
            let row = PnlRow {
                account_no: account.account_no,
                name: account.name.clone(),
                amount: t.natural(NormalBalance::of(account.account_type)),
            };
            if row.amount.is_zero() {
                continue;
            }
            match account.account_type {
                AccountType::Revenue => revenue.push(row),
                AccountType::Expense => expenses.push(row),
                AccountType::Asset | AccountType::Liability | AccountType::Equity => {}
            }
        }

        let total_revenue: Decimal = revenue.iter().map(|r| r.amount).sum();
        let total_expenses: Decimal = expenses.iter().map(|r| r.amount).sum();

        Ok(ProfitAndLoss {
            from,
            to,
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_result: total_revenue - total_expenses,
        })
    }

    /// Indirect-method cash flow statement.
    ///
    /// Operating cash is net income, plus non-cash expenses, plus the cash
    /// effect of working-capital movements: a debit-normal account that grows
    /// consumes cash, a credit-normal one that grows provides it. Investing
    /// and financing come from entries that move a cash account against an
    /// account tagged with that group. An untagged chart yields zeros, the
    /// diagnostic counts and warnings rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `from > to`.
    pub fn cash_flow(
        accounts: &[Account],
        entries: &[JournalEntry],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CashFlowStatement, ReportError> {
        Self::check_period(from, to)?;
        let period = Self::fold_totals(entries, Some(from), to);
        let before = match from.pred_opt() {
            Some(prev) => Self::fold_totals(entries, None, prev),
            None => BTreeMap::new(),
        };
        let through = Self::fold_totals(entries, None, to);

        let chart = Self::sorted(accounts);
        let cash_accounts: HashSet<AccountNo> = chart
            .iter()
            .filter(|a| a.is_cash_account)
            .map(|a| a.account_no)
            .collect();

        // Net income
        let mut net_income = Decimal::ZERO;
        for account in chart.iter().filter(|a| a.statement_class == StatementClass::IncomeStatement) {
            let t = period.get(&account.account_no).copied().unwrap_or_else(|| AccountBalance::new(account.account_no));
            match account.account_type {
                AccountType::Revenue => net_income += t.natural(NormalBalance::CreditNormal),
                AccountType::Expense => net_income -= t.natural(NormalBalance::DebitNormal),
                AccountType::Asset | AccountType::Liability | AccountType::Equity => {}
            }
        }

        let non_cash_addbacks: Vec<CashFlowLine> = chart
            .iter()
            .filter(|a| a.is_non_cash_expense)
            .filter_map(|a| {
                let amount = period.get(&a.account_no)?.balance();
                (!amount.is_zero()).then(|| CashFlowLine {
                    account_no: a.account_no,
                    name: a.name.clone(),
                    amount,
                })
            })
            .collect();

        let working_capital: Vec<WorkingCapitalLine> = chart
            .iter()
            .filter(|a| a.is_working_capital && !a.is_cash_account)
            .filter_map(|a| {
                let normal = NormalBalance::of(a.account_type);
                let opening = before.get(&a.account_no).map_or(Decimal::ZERO, |t| t.natural(normal));
                let closing = through.get(&a.account_no).map_or(Decimal::ZERO, |t| t.natural(normal));
                let change = closing - opening;
                if change.is_zero() {
                    return None;
                }
                let cash_effect = match normal {
                    NormalBalance::DebitNormal => -change,
                    NormalBalance::CreditNormal => change,
                };
                Some(WorkingCapitalLine {
                    account_no: a.account_no,
                    name: a.name.clone(),
                    account_type: a.account_type,
                    opening,
                    closing,
                    cash_effect,
                })
            })
            .collect();

        let operating = net_income
            + non_cash_addbacks.iter().map(|l| l.amount).sum::<Decimal>()
            + working_capital.iter().map(|l| l.cash_effect).sum::<Decimal>();

        // Investing and financing: cash movements keyed by the counter account.
        let groups: BTreeMap<AccountNo, (CashFlowGroup, &str)> = chart
            .iter()
            .filter(|a| !a.is_cash_account)
            .filter_map(|a| a.cash_flow_group.map(|g| (a.account_no, (g, a.name.as_str()))))
            .collect();
        let mut investing_by: BTreeMap<AccountNo, Decimal> = BTreeMap::new();
        let mut financing_by: BTreeMap<AccountNo, Decimal> = BTreeMap::new();
        for entry in entries.iter().filter(|e| e.transaction_date >= from && e.transaction_date <= to) {
            let debit_cash = cash_accounts.contains(&entry.debit_account_no);
            let credit_cash = cash_accounts.contains(&entry.credit_account_no);
            let (counter, movement) = match (debit_cash, credit_cash) {
                (true, false) => (entry.credit_account_no, entry.amount),
                (false, true) => (entry.debit_account_no, -entry.amount),
                _ => continue,
            };
            match groups.get(&counter) {
                Some((CashFlowGroup::Investing, _)) => *investing_by.entry(counter).or_default() += movement,
                Some((CashFlowGroup::Financing, _)) => *financing_by.entry(counter).or_default() += movement,
                Some((CashFlowGroup::Operating, _)) | None => {}
            }
        }
        let to_lines = |by: BTreeMap<AccountNo, Decimal>| -> Vec<CashFlowLine> {
            by.into_iter()
                .filter(|(_, amount)| !amount.is_zero())
                .map(|(account_no, amount)| CashFlowLine {
                    account_no,
                    name: groups.get(&account_no).map_or_else(String::new, |(_, n)| (*n).to_string()),
                    amount,
                })
                .collect()
        };
        let investing_lines = to_lines(investing_by);
        let financing_lines = to_lines(financing_by);
        let investing: Decimal = investing_lines.iter().map(|l| l.amount).sum();
        let financing: Decimal = financing_lines.iter().map(|l| l.amount).sum();
        let net_cash_flow = operating + investing + financing;

        let cash_total = |totals: &BTreeMap<AccountNo, AccountBalance>| -> Decimal {
            cash_accounts
                .iter()
                .filter_map(|no| totals.get(no))
                .map(AccountBalance::balance)
                .sum()
        };
        let opening_cash = cash_total(&before);
        let closing_cash = cash_total(&through);
        let unexplained_difference = (closing_cash - opening_cash) - net_cash_flow;

        let diagnostics = AccountRegistry::tag_counts(accounts);
        let mut warnings = Vec::new();
        if diagnostics.cash == 0 {
            warnings.push("No account is tagged as cash; opening and closing cash are zero".to_string());
        }
        if diagnostics.working_capital == 0 {
            warnings.push("No account is tagged as working capital; operating cash excludes working-capital changes".to_string());
        }
        if diagnostics.investing + diagnostics.financing == 0 {
            warnings.push("No account is tagged investing or financing; all cash movement is treated as operating".to_string());
        }
        if !unexplained_difference.is_zero() {
            warnings.push(format!(
                "Computed net cash flow differs from the change in cash by {unexplained_difference}; check account tags"
            ));
        }

        Ok(CashFlowStatement {
            from,
            to,
            net_income,
            non_cash_addbacks,
            working_capital,
            operating,
            investing_lines,
            investing,
            financing_lines,
            financing,
            net_cash_flow,
            opening_cash,
            closing_cash,
            unexplained_difference,
            diagnostics,
            warnings,
        })
    }

    /// Trial balance as of a date, inclusive.
    ///
    /// Entries on account numbers missing from `accounts` still appear, named
    /// by number, so the totals always cover the whole journal.
    #[must_use]
    pub fn trial_balance(accounts: &[Account], entries: &[JournalEntry], as_of: NaiveDate) -> TrialBalance {
        let totals = Self::fold_totals(entries, None, as_of);

        let rows: Vec<TrialBalanceRow> = totals
            .values()
            .map(|t| {
                let account = accounts.iter().find(|a| a.account_no == t.account_no);
                TrialBalanceRow {
                    account_no: t.account_no,
                    name: account.map_or_else(|| format!("Account {}", t.account_no), |a| a.name.clone()),
                    account_type: account.map(|a| a.account_type),
                    debit_total: t.debit_total,
                    credit_total: t.credit_total,
                    balance: t.balance(),
                }
            })
            .collect();

        let total_debit: Decimal = rows.iter().map(|r| r.debit_total).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.credit_total).sum();

        TrialBalance {
            as_of,
            rows,
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }

    /// Folds entries within an optional start and inclusive end into per-account totals.
    fn fold_totals(
        entries: &[JournalEntry],
        from: Option<NaiveDate>,
        to: NaiveDate,
    ) -> BTreeMap<AccountNo, AccountBalance> {
        let mut totals: BTreeMap<AccountNo, AccountBalance> = BTreeMap::new();
        for entry in entries
            .iter()
            .filter(|e| from.is_none_or(|f| e.transaction_date >= f) && e.transaction_date <= to)
        {
            totals
                .entry(entry.debit_account_no)
                .or_insert_with(|| AccountBalance::new(entry.debit_account_no))
                .debit_total += entry.amount;
            totals
                .entry(entry.credit_account_no)
                .or_insert_with(|| AccountBalance::new(entry.credit_account_no))
                .credit_total += entry.amount;
        }
        totals
    }

    fn sorted(accounts: &[Account]) -> Vec<&Account> {
        let mut sorted: Vec<&Account> = accounts.iter().collect();
        sorted.sort_by_key(|a| a.account_no);
        sorted
    }

    fn check_period(from: NaiveDate, to: NaiveDate) -> Result<(), ReportError> {
        if from > to {
            Err(ReportError::InvalidDateRange { start: from, end: to })
        } else {
            Ok(())
        }
    }
}
