//! Candidate selection for statement lines.

use std::collections::HashSet;

use chrono::Duration;

use super::reference::ReferenceToken;
use super::types::{Direction, MatchMethod, MatchSettings, MatchSuggestion, StatementLine};
use crate::accounts::AccountNo;
use crate::ledger::JournalEntry;

/// Whether the entry moves the bank GL account on the line's side.
///
/// Money in (`Credit` on the statement) is a debit to the bank account in
/// the books; money out is a credit.
#[must_use]
pub fn side_matches(direction: Direction, entry: &JournalEntry, bank_gl: AccountNo) -> bool {
    match direction {
        Direction::Credit => entry.debit_account_no == bank_gl,
        Direction::Debit => entry.credit_account_no == bank_gl,
    }
}

/// Finds an entry whose voucher matches the line's reference token.
#[must_use]
pub fn by_reference<'a>(
    line: &StatementLine,
    token: &ReferenceToken,
    candidates: &'a [JournalEntry],
    bank_gl: AccountNo,
    claimed: &HashSet<i64>,
) -> Option<&'a JournalEntry> {
    candidates
        .iter()
        .filter(|e| !claimed.contains(&e.id))
        .filter(|e| e.amount == line.amount && side_matches(line.direction, e, bank_gl))
        .filter(|e| token.matches_voucher(e.voucher_type.as_str(), &e.voucher_no))
        .max_by_key(|e| (e.transaction_date, e.id))
}

/// Finds an entry with the same amount and side within the date window.
///
/// Several candidates can qualify; the most recent one wins.
#[must_use]
pub fn by_amount_date<'a>(
    line: &StatementLine,
    candidates: &'a [JournalEntry],
    bank_gl: AccountNo,
    claimed: &HashSet<i64>,
    window_days: i64,
) -> Option<&'a JournalEntry> {
    let window = Duration::days(window_days.max(0));
    let from = line.transaction_date - window;
    let to = line.transaction_date + window;

    candidates
        .iter()
        .filter(|e| !claimed.contains(&e.id))
        .filter(|e| e.transaction_date >= from && e.transaction_date <= to)
        .filter(|e| e.amount == line.amount && side_matches(line.direction, e, bank_gl))
        .max_by_key(|e| (e.transaction_date, e.id))
}

/// Runs the match pipeline for one line: reference first, then amount+date.
#[must_use]
pub fn suggest(
    line: &StatementLine,
    candidates: &[JournalEntry],
    bank_gl: AccountNo,
    claimed: &HashSet<i64>,
    settings: &MatchSettings,
) -> Option<MatchSuggestion> {
    let token = line.reference_token.as_deref().and_then(ReferenceToken::parse);

    if let Some(token) = token
        && let Some(entry) = by_reference(line, &token, candidates, bank_gl, claimed)
    {
        return Some(suggestion(entry, settings.reference_confidence, MatchMethod::Reference));
    }

    by_amount_date(line, candidates, bank_gl, claimed, settings.window_days)
        .map(|entry| suggestion(entry, settings.amount_date_confidence, MatchMethod::AmountDate))
}

fn suggestion(
    entry: &JournalEntry,
    confidence: rust_decimal::Decimal,
    method: MatchMethod,
) -> MatchSuggestion {
    MatchSuggestion {
        entry_id: entry.id,
        voucher_type: entry.voucher_type.clone(),
        voucher_no: entry.voucher_no.clone(),
        ref_id: entry.ref_id,
        confidence,
        method,
    }
}
