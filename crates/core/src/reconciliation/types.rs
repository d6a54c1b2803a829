//! Bank statement and matching types.

use std::fmt;

use chrono::NaiveDate;
use ledgerline_shared::types::{BankAccountId, StatementImportId, StatementLineId, TenantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reference::ReferenceToken;
use crate::ledger::VoucherType;

/// Direction of a statement line from the bank's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money left the account.
    Debit,
    /// Money arrived in the account.
    Credit,
}

/// Reconciliation status of a statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// No candidate found.
    Unmatched,
    /// Candidate proposed, awaiting approval.
    Suggested,
    /// Confirmed against the journal.
    Reconciled,
    /// Excluded by the user.
    Ignored,
}

impl MatchStatus {
    /// Lines the matcher may (re)process.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Unmatched | Self::Suggested)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unmatched => "Unmatched",
            Self::Suggested => "Suggested",
            Self::Reconciled => "Reconciled",
            Self::Ignored => "Ignored",
        };
        f.write_str(s)
    }
}

/// How a match was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// No match.
    None,
    /// Reference token in the narration.
    Reference,
    /// Same amount within the date window.
    AmountDate,
    /// Chosen by a user.
    Manual,
    /// Posted from the statement line itself.
    AutoPosted,
}

/// A row parsed from a statement payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStatementLine {
    /// 1-based row number in the payload.
    pub row_number: usize,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Narration text.
    pub narration: String,
    /// Direction.
    pub direction: Direction,
    /// Positive amount.
    pub amount: Decimal,
    /// Running balance reported by the bank.
    pub running_balance: Option<Decimal>,
    /// Extracted voucher reference.
    pub reference: Option<ReferenceToken>,
}

/// Result of parsing a statement payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStatement {
    /// Retained rows.
    pub lines: Vec<ParsedStatementLine>,
    /// Data rows seen after the header.
    pub total_rows: usize,
    /// Rows dropped for zero or blank amounts.
    pub zero_amount_rows: usize,
    /// Rows dropped because the date could not be read.
    pub unparseable_date_rows: usize,
    /// Rows dropped because an amount cell was not a number.
    pub invalid_amount_rows: usize,
    /// Earliest transaction date.
    pub min_date: NaiveDate,
    /// Latest transaction date.
    pub max_date: NaiveDate,
}

impl ParsedStatement {
    /// Total rows not turned into lines.
    #[must_use]
    pub const fn skipped_rows(&self) -> usize {
        self.zero_amount_rows + self.unparseable_date_rows + self.invalid_amount_rows
    }
}

/// An import batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementImport {
    /// Batch id.
    pub id: StatementImportId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Bank account the statement belongs to.
    pub bank_account_id: BankAccountId,
    /// File name or other source label.
    pub source_name: Option<String>,
    /// Earliest transaction date.
    pub min_date: NaiveDate,
    /// Latest transaction date.
    pub max_date: NaiveDate,
    /// Lines created.
    pub line_count: usize,
    /// Rows skipped.
    pub skipped_count: usize,
}

/// A stored statement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Line id.
    pub id: StatementLineId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Import batch.
    pub import_id: StatementImportId,
    /// Bank account.
    pub bank_account_id: BankAccountId,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Narration.
    pub narration: String,
    /// Direction.
    pub direction: Direction,
    /// Positive amount.
    pub amount: Decimal,
    /// Running balance reported by the bank.
    pub running_balance: Option<Decimal>,
    /// Extracted reference token, canonical form (`INV-12`).
    pub reference_token: Option<String>,
    /// Match status.
    pub status: MatchStatus,
    /// Matched voucher type.
    pub matched_voucher_type: Option<VoucherType>,
    /// Matched voucher number.
    pub matched_voucher_no: Option<String>,
    /// Matched reference id.
    pub matched_ref_id: Option<Uuid>,
    /// Matched journal entry.
    pub matched_entry_id: Option<i64>,
    /// Match confidence in `0..=1`.
    pub confidence: Decimal,
    /// Match method.
    pub method: MatchMethod,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl StatementLine {
    /// Clears every match field and returns the line to `Unmatched`.
    pub fn reset_match(&mut self) {
        self.status = MatchStatus::Unmatched;
        self.matched_voucher_type = None;
        self.matched_voucher_no = None;
        self.matched_ref_id = None;
        self.matched_entry_id = None;
        self.confidence = Decimal::ZERO;
        self.method = MatchMethod::None;
    }

    /// Appends a note, keeping earlier notes.
    pub fn append_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{note}"),
            _ => note.to_string(),
        });
    }
}

/// A proposed match for a statement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSuggestion {
    /// Matched journal entry.
    pub entry_id: i64,
    /// Voucher type of the entry.
    pub voucher_type: VoucherType,
    /// Voucher number of the entry.
    pub voucher_no: String,
    /// Reference id of the entry.
    pub ref_id: Option<Uuid>,
    /// Confidence.
    pub confidence: Decimal,
    /// How it was found.
    pub method: MatchMethod,
}

/// Matcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    /// Days either side of the line date.
    pub window_days: i64,
    /// Confidence for reference matches.
    pub reference_confidence: Decimal,
    /// Confidence for amount+date matches.
    pub amount_date_confidence: Decimal,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            window_days: 3,
            reference_confidence: Decimal::new(95, 2),
            amount_date_confidence: Decimal::new(75, 2),
        }
    }
}

impl From<&ledgerline_shared::config::ReconciliationConfig> for MatchSettings {
    fn from(config: &ledgerline_shared::config::ReconciliationConfig) -> Self {
        Self {
            window_days: i64::from(config.match_window_days),
            reference_confidence: config.reference_confidence,
            amount_date_confidence: config.amount_date_confidence,
        }
    }
}

/// Outcome of one suggestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestRunSummary {
    /// Lines examined.
    pub examined: usize,
    /// Lines suggested by reference.
    pub by_reference: usize,
    /// Lines suggested by amount and date.
    pub by_amount_date: usize,
    /// Lines left unmatched.
    pub unmatched: usize,
}

/// Per-status counts and reconciled totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Unmatched lines.
    pub unmatched: usize,
    /// Suggested lines.
    pub suggested: usize,
    /// Reconciled lines.
    pub reconciled: usize,
    /// Ignored lines.
    pub ignored: usize,
    /// Sum of reconciled money-in lines.
    pub reconciled_credits: Decimal,
    /// Sum of reconciled money-out lines.
    pub reconciled_debits: Decimal,
    /// Sum of money-in lines not yet reconciled or ignored.
    pub outstanding_credits: Decimal,
    /// Sum of money-out lines not yet reconciled or ignored.
    pub outstanding_debits: Decimal,
}
