//! Ledger service for posting validation.
//!
//! This module turns posting requests into validated journal entries before
//! they are persisted. It owns no state: account lookups come in as closures.

use std::collections::HashSet;

use super::error::LedgerError;
use super::types::{AccountInfo, NewJournalEntry, PostingLine, PostingRequest};
use super::validation::{validate_line, validate_voucher_no};
use crate::accounts::AccountNo;

/// Ledger service for posting validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validate a single-line posting.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn prepare_post<A>(
        request: &PostingRequest,
        account_validator: A,
    ) -> Result<NewJournalEntry, LedgerError>
    where
        A: Fn(AccountNo) -> Result<AccountInfo, LedgerError>,
    {
        if request.lines.len() > 1 {
            return Err(LedgerError::MultipleLines(request.lines.len()));
        }
        Self::prepare_post_many(request, account_validator)?
            .pop()
            .ok_or(LedgerError::NoLines)
    }

    /// Validate a multi-line posting.
    ///
    /// Every line is checked before any entry is produced, so a caller
    /// inserting the result inside one transaction writes all or nothing:
    /// 1. At least one line and a non-blank voucher number
    /// 2. Each line: positive amount, distinct non-zero accounts
    /// 3. Each referenced account exists and is active
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn prepare_post_many<A>(
        request: &PostingRequest,
        account_validator: A,
    ) -> Result<Vec<NewJournalEntry>, LedgerError>
    where
        A: Fn(AccountNo) -> Result<AccountInfo, LedgerError>,
    {
        if request.lines.is_empty() {
            return Err(LedgerError::NoLines);
        }
        validate_voucher_no(&request.voucher_no)?;

        for line in &request.lines {
            validate_line(line)?;
        }

        // Each account is checked once even if several lines use it.
        let mut checked: HashSet<AccountNo> = HashSet::new();
        for line in &request.lines {
            for account_no in [line.debit_account_no, line.credit_account_no] {
                if !checked.insert(account_no) {
                    continue;
                }
                let info = account_validator(account_no)?;
                if !info.is_active {
                    return Err(LedgerError::AccountInactive(info.account_no));
                }
            }
        }

        Ok(request
            .lines
            .iter()
            .map(|line| Self::to_entry(request, line))
            .collect())
    }

    fn to_entry(request: &PostingRequest, line: &PostingLine) -> NewJournalEntry {
        NewJournalEntry {
            tenant_id: request.tenant_id,
            transaction_date: request.transaction_date,
            voucher_type: request.voucher_type.clone(),
            voucher_no: request.voucher_no.trim().to_string(),
            ref_id: request.ref_id,
            debit_account_no: line.debit_account_no,
            credit_account_no: line.credit_account_no,
            amount: line.amount,
            narration: line.narration.clone(),
        }
    }
}
