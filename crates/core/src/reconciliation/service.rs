//! Statement line workflow: suggestion runs, approval, overrides and auto-posting.

use std::collections::HashSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ReconciliationError;
use super::matcher;
use super::types::{
    Direction, MatchMethod, MatchSettings, MatchStatus, MatchSuggestion, ReconciliationSummary,
    StatementLine, SuggestRunSummary,
};
use crate::accounts::AccountNo;
use crate::ledger::{JournalEntry, PostingLine, PostingRequest, VoucherType};

/// Stateless service for statement line transitions.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Runs the matcher over every open line.
    ///
    /// Lines are processed in date order. Each open line is reset before it
    /// is matched, so a rerun replaces earlier suggestions. `claimed` holds
    /// the entries already reconciled against other lines; entries suggested
    /// earlier in the same run are added to it as the run proceeds.
    pub fn run_auto_suggest(
        lines: &mut [StatementLine],
        candidates: &[JournalEntry],
        bank_gl: AccountNo,
        claimed: &HashSet<i64>,
        settings: &MatchSettings,
    ) -> SuggestRunSummary {
        let mut claimed = claimed.clone();
        let mut summary = SuggestRunSummary::default();

        let mut order: Vec<usize> = (0..lines.len())
            .filter(|&i| lines[i].status.is_open())
            .collect();
        order.sort_by_key(|&i| (lines[i].transaction_date, lines[i].id));

        for i in order {
            let line = &mut lines[i];
            line.reset_match();
            summary.examined += 1;

            match matcher::suggest(line, candidates, bank_gl, &claimed, settings) {
                Some(found) => {
                    match found.method {
                        MatchMethod::Reference => summary.by_reference += 1,
                        _ => summary.by_amount_date += 1,
                    }
                    claimed.insert(found.entry_id);
                    Self::apply_suggestion(line, found);
                }
                None => summary.unmatched += 1,
            }
        }

        summary
    }

    /// Records a suggestion on the line.
    pub fn apply_suggestion(line: &mut StatementLine, suggestion: MatchSuggestion) {
        line.status = MatchStatus::Suggested;
        line.matched_voucher_type = Some(suggestion.voucher_type);
        line.matched_voucher_no = Some(suggestion.voucher_no);
        line.matched_ref_id = suggestion.ref_id;
        line.matched_entry_id = Some(suggestion.entry_id);
        line.confidence = suggestion.confidence;
        line.method = suggestion.method;
    }

    /// Confirms a suggested match.
    ///
    /// # Errors
    ///
    /// Fails unless the line is `Suggested` and carries a matched voucher.
    pub fn approve(line: &mut StatementLine) -> Result<(), ReconciliationError> {
        if line.status != MatchStatus::Suggested {
            return Err(ReconciliationError::InvalidTransition {
                from: line.status,
                action: "approve",
            });
        }
        if line.matched_voucher_no.is_none() || line.matched_entry_id.is_none() {
            return Err(ReconciliationError::NoMatchedVoucher);
        }
        line.status = MatchStatus::Reconciled;
        Ok(())
    }

    /// Excludes a line from reconciliation.
    ///
    /// # Errors
    ///
    /// Fails when the line is already `Reconciled`.
    pub fn ignore(line: &mut StatementLine, reason: Option<&str>) -> Result<(), ReconciliationError> {
        if line.status == MatchStatus::Reconciled {
            return Err(ReconciliationError::InvalidTransition {
                from: line.status,
                action: "ignore",
            });
        }
        line.reset_match();
        line.status = MatchStatus::Ignored;
        if let Some(reason) = reason {
            line.append_note(&format!("Ignored: {}", reason.trim()));
        }
        Ok(())
    }

    /// Rejects a suggestion, returning the line to `Unmatched`.
    ///
    /// # Errors
    ///
    /// Fails unless the line is `Suggested` or already `Unmatched`.
    pub fn unmatch(line: &mut StatementLine) -> Result<(), ReconciliationError> {
        match line.status {
            MatchStatus::Suggested => {
                line.reset_match();
                Ok(())
            }
            MatchStatus::Unmatched => Ok(()),
            from => Err(ReconciliationError::InvalidTransition {
                from,
                action: "unmatch",
            }),
        }
    }

    /// Reconciles an open line against a chosen journal entry.
    ///
    /// `claimed` holds entries reconciled against other lines.
    ///
    /// # Errors
    ///
    /// Fails for closed lines, entries on the wrong side or amount, and
    /// entries already claimed.
    pub fn manual_match(
        line: &mut StatementLine,
        entry: &JournalEntry,
        bank_gl: AccountNo,
        claimed: &HashSet<i64>,
    ) -> Result<(), ReconciliationError> {
        if !line.status.is_open() {
            return Err(ReconciliationError::InvalidTransition {
                from: line.status,
                action: "match",
            });
        }
        if !matcher::side_matches(line.direction, entry, bank_gl) {
            return Err(ReconciliationError::EntryMismatch {
                entry_id: entry.id,
                reason: "entry does not move the bank account on the line's side",
            });
        }
        if entry.amount != line.amount {
            return Err(ReconciliationError::EntryMismatch {
                entry_id: entry.id,
                reason: "amounts differ",
            });
        }
        if claimed.contains(&entry.id) {
            return Err(ReconciliationError::EntryAlreadyClaimed(entry.id));
        }

        Self::set_reconciled(line, entry, MatchMethod::Manual);
        Ok(())
    }

    /// Builds the posting that books a statement line directly.
    ///
    /// Money in debits the bank and credits the contra account; money out is
    /// the reverse. The entry is dated at the line's date.
    ///
    /// # Errors
    ///
    /// Fails when the line is `Reconciled`, the contra account is missing, or
    /// it equals the bank account.
    pub fn prepare_auto_post(
        line: &StatementLine,
        bank_gl: AccountNo,
        contra: Option<AccountNo>,
        voucher_type: VoucherType,
        voucher_no: &str,
        narration: Option<&str>,
        ref_id: Option<Uuid>,
    ) -> Result<PostingRequest, ReconciliationError> {
        if line.status == MatchStatus::Reconciled {
            return Err(ReconciliationError::InvalidTransition {
                from: line.status,
                action: "auto-post",
            });
        }
        let contra = contra.ok_or(ReconciliationError::ContraAccountRequired)?;
        if contra == bank_gl {
            return Err(ReconciliationError::ContraIsBank);
        }

        let posting = match line.direction {
            Direction::Credit => PostingLine::new(bank_gl, contra, line.amount),
            Direction::Debit => PostingLine::new(contra, bank_gl, line.amount),
        };
        let narration = narration
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(line.narration.as_str());
        let posting = if narration.is_empty() {
            posting
        } else {
            posting.with_narration(narration)
        };

        let mut request = PostingRequest::single(
            line.tenant_id,
            line.transaction_date,
            voucher_type,
            voucher_no,
            posting,
        );
        request.ref_id = ref_id;
        Ok(request)
    }

    /// Marks a line reconciled against the entry it was auto-posted as.
    pub fn mark_auto_posted(line: &mut StatementLine, entry: &JournalEntry) {
        Self::set_reconciled(line, entry, MatchMethod::AutoPosted);
    }

    /// Per-status counts and money totals for a set of lines.
    #[must_use]
    pub fn summarize(lines: &[StatementLine]) -> ReconciliationSummary {
        lines.iter().fold(ReconciliationSummary::default(), |mut acc, line| {
            match line.status {
                MatchStatus::Unmatched => acc.unmatched += 1,
                MatchStatus::Suggested => acc.suggested += 1,
                MatchStatus::Reconciled => acc.reconciled += 1,
                MatchStatus::Ignored => acc.ignored += 1,
            }
            let bucket = match (line.status, line.direction) {
                (MatchStatus::Reconciled, Direction::Credit) => Some(&mut acc.reconciled_credits),
                (MatchStatus::Reconciled, Direction::Debit) => Some(&mut acc.reconciled_debits),
                (MatchStatus::Ignored, _) => None,
                (_, Direction::Credit) => Some(&mut acc.outstanding_credits),
                (_, Direction::Debit) => Some(&mut acc.outstanding_debits),
            };
            if let Some(total) = bucket {
                *total += line.amount;
            }
            acc
        })
    }

    fn set_reconciled(line: &mut StatementLine, entry: &JournalEntry, method: MatchMethod) {
        line.status = MatchStatus::Reconciled;
        line.matched_voucher_type = Some(entry.voucher_type.clone());
        line.matched_voucher_no = Some(entry.voucher_no.clone());
        line.matched_ref_id = entry.ref_id;
        line.matched_entry_id = Some(entry.id);
        line.confidence = Decimal::ONE;
        line.method = method;
    }
}
