//! Cheque state machine.
//!
//! Every transition returns the postings it implies, filtered through a
//! `voucher_exists` check so that a repeated call never produces a second
//! entry for the same voucher. Stage vouchers share the cheque's base voucher
//! number and carry the cheque id as `ref_id`.

use chrono::NaiveDate;
use ledgerline_shared::types::{ChequeId, TenantId};
use rust_decimal::Decimal;

use super::book::ChequeBookService;
use super::error::ChequeError;
use super::types::{
    BankCharge, ChequeAccounts, ChequeBook, ChequeDirection, ChequeStatus, ChequeTransaction,
    ChequeTransition, ChequeType, LeafAllocation, NewCheque, PostingStage, uses_clearing,
};
use crate::ledger::validation::validate_line;
use crate::ledger::{PostingLine, PostingRequest, VoucherType};

/// A cheque ready to store, plus the book cursor to persist with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCheque {
    /// The `Draft` cheque.
    pub cheque: ChequeTransaction,
    /// Leaf taken from the book, for outgoing cheques.
    pub leaf: Option<LeafAllocation>,
}

/// Stateless service for cheque transitions.
pub struct ChequeService;

impl ChequeService {
    /// Validates input and builds a `Draft` cheque.
    ///
    /// Outgoing cheques take the next leaf of `book` and draw on the book's
    /// bank account; incoming cheques keep the drawer's number.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive amounts, post-dated cheques not
    /// dated after issue, a missing book or number, an unusable book, or a
    /// missing clearing account.
    pub fn prepare_cheque(
        tenant_id: TenantId,
        input: &NewCheque,
        accounts: ChequeAccounts,
        book: Option<&ChequeBook>,
        voucher_no: &str,
    ) -> Result<PreparedCheque, ChequeError> {
        if input.amount <= Decimal::ZERO {
            return Err(ChequeError::InvalidAmount(input.amount));
        }
        if input.cheque_type == ChequeType::PostDated && input.cheque_date <= input.issue_date {
            return Err(ChequeError::PostDatedNotInFuture);
        }
        if uses_clearing(input.direction, input.cheque_type) && accounts.clearing_account_no.is_none() {
            return Err(ChequeError::ClearingAccountRequired);
        }

        let (cheque_no, leaf, bank_account_no, cheque_book_id) = match input.direction {
            ChequeDirection::Outgoing => {
                let book = book.ok_or(ChequeError::BookRequired)?;
                let leaf = ChequeBookService::allocate(book)?;
                (leaf.cheque_no.clone(), Some(leaf), book.bank_account_no, Some(book.id))
            }
            ChequeDirection::Incoming => {
                let number = input
                    .cheque_no
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or(ChequeError::ChequeNumberRequired)?;
                (number.to_string(), None, accounts.bank_account_no, None)
            }
        };

        let clearing_account_no = if uses_clearing(input.direction, input.cheque_type) {
            accounts.clearing_account_no
        } else {
            None
        };

        let cheque = ChequeTransaction {
            id: ChequeId::new(),
            tenant_id,
            direction: input.direction,
            cheque_type: input.cheque_type,
            status: ChequeStatus::Draft,
            cheque_book_id,
            cheque_no,
            voucher_no: voucher_no.to_string(),
            issue_date: input.issue_date,
            cheque_date: input.cheque_date,
            clear_date: None,
            amount: input.amount,
            counterparty_id: input.counterparty_id,
            counterparty_name: input
                .counterparty_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            source_document_id: input.source_document_id,
            bank_account_no,
            clearing_account_no,
            counter_account_no: accounts.counter_account_no,
            notes: input.notes.clone(),
        };

        // Both stage lines must be postable before the cheque exists.
        validate_line(&Self::stage_one_line(&cheque)?)?;
        if let Some(line) = Self::clearing_line(&cheque)? {
            validate_line(&line)?;
        }

        Ok(PreparedCheque { cheque, leaf })
    }

    /// `Draft → Printed`. No posting.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other state.
    pub fn mark_printed(cheque: &ChequeTransaction) -> Result<ChequeTransition, ChequeError> {
        match cheque.status {
            ChequeStatus::Draft | ChequeStatus::Printed => {
                Ok(Self::transition(cheque, ChequeStatus::Printed, Vec::new()))
            }
            from => Err(ChequeError::InvalidTransition {
                from,
                to: ChequeStatus::Printed,
            }),
        }
    }

    /// `Printed → HandedOver` (outgoing) or `Printed → Deposited` (incoming),
    /// posting stage one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the cheque is `Printed` or already
    /// in the target state.
    pub fn mark_handed_over_or_deposited<F>(
        cheque: &ChequeTransaction,
        date: NaiveDate,
        voucher_exists: F,
    ) -> Result<ChequeTransition, ChequeError>
    where
        F: Fn(&str) -> bool,
    {
        let target = match cheque.direction {
            ChequeDirection::Outgoing => ChequeStatus::HandedOver,
            ChequeDirection::Incoming => ChequeStatus::Deposited,
        };
        if cheque.status != ChequeStatus::Printed && cheque.status != target {
            return Err(ChequeError::InvalidTransition {
                from: cheque.status,
                to: target,
            });
        }

        let stage_one = Self::stage_one_line(cheque)?;
        let postings = Self::pending(
            cheque,
            vec![(PostingStage::StageOne, date, stage_one)],
            voucher_exists,
        );
        Ok(Self::transition(cheque, target, postings))
    }

    /// `HandedOver | Deposited → Presented`. No posting.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other state.
    pub fn mark_presented(cheque: &ChequeTransaction) -> Result<ChequeTransition, ChequeError> {
        match cheque.status {
            ChequeStatus::HandedOver | ChequeStatus::Deposited | ChequeStatus::Presented => {
                Ok(Self::transition(cheque, ChequeStatus::Presented, Vec::new()))
            }
            from => Err(ChequeError::InvalidTransition {
                from,
                to: ChequeStatus::Presented,
            }),
        }
    }

    /// Marks the cheque paid by the bank, posting stage two for instruments
    /// that sit in a clearing account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the cheque is in transit or already
    /// `Cleared`.
    pub fn mark_cleared<F>(
        cheque: &ChequeTransaction,
        clear_date: NaiveDate,
        voucher_exists: F,
    ) -> Result<ChequeTransition, ChequeError>
    where
        F: Fn(&str) -> bool,
    {
        if !cheque.status.is_in_transit() && cheque.status != ChequeStatus::Cleared {
            return Err(ChequeError::InvalidTransition {
                from: cheque.status,
                to: ChequeStatus::Cleared,
            });
        }

        let clear_date = cheque.clear_date.unwrap_or(clear_date);
        let stages = Self::clearing_line(cheque)?
            .map(|line| (PostingStage::Clearing, clear_date, line))
            .into_iter()
            .collect();
        let mut transition =
            Self::transition(cheque, ChequeStatus::Cleared, Self::pending(cheque, stages, voucher_exists));
        transition.clear_date = Some(clear_date);
        Ok(transition)
    }

    /// Marks the cheque dishonoured: reverses stage one and optionally books
    /// the bank's charge.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the cheque is in transit or already
    /// `Bounced`, and `InvalidBankCharge` for a negative charge.
    pub fn mark_bounced<F>(
        cheque: &ChequeTransaction,
        bounce_date: NaiveDate,
        charge: Option<BankCharge>,
        voucher_exists: F,
    ) -> Result<ChequeTransition, ChequeError>
    where
        F: Fn(&str) -> bool,
    {
        if !cheque.status.is_in_transit() && cheque.status != ChequeStatus::Bounced {
            return Err(ChequeError::InvalidTransition {
                from: cheque.status,
                to: ChequeStatus::Bounced,
            });
        }

        let mut stages = vec![(
            PostingStage::BounceReversal,
            bounce_date,
            Self::stage_one_line(cheque)?.reversed(),
        )];
        let charge = charge.filter(|c| !c.amount.is_zero());
        if let Some(charge) = charge {
            if charge.amount.is_sign_negative() {
                return Err(ChequeError::InvalidBankCharge(charge.amount));
            }
            stages.push((
                PostingStage::BankCharge,
                bounce_date,
                PostingLine::new(charge.expense_account_no, cheque.bank_account_no, charge.amount)
                    .with_narration(format!("Bank charge on bounced cheque {}", cheque.cheque_no)),
            ));
        }

        let mut transition =
            Self::transition(cheque, ChequeStatus::Bounced, Self::pending(cheque, stages, voucher_exists));
        if cheque.status != ChequeStatus::Bounced {
            transition.note = Some(match charge {
                Some(c) => format!("Bounced on {bounce_date}; bank charge {}", c.amount),
                None => format!("Bounced on {bounce_date}"),
            });
        }
        Ok(transition)
    }

    /// Voids the cheque, reversing stage one when it was posted and not
    /// already reversed by a bounce.
    ///
    /// # Errors
    ///
    /// Returns `VoidReasonRequired` for a blank reason and
    /// `InvalidTransition` once the cheque is `Cleared`.
    pub fn void<F>(
        cheque: &ChequeTransaction,
        date: NaiveDate,
        reason: &str,
        voucher_exists: F,
    ) -> Result<ChequeTransition, ChequeError>
    where
        F: Fn(&str) -> bool,
    {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ChequeError::VoidReasonRequired);
        }
        if cheque.status == ChequeStatus::Cleared {
            return Err(ChequeError::InvalidTransition {
                from: cheque.status,
                to: ChequeStatus::Voided,
            });
        }

        let base = &cheque.voucher_no;
        let stage_one_posted = voucher_exists(&PostingStage::StageOne.voucher_no(base));
        let already_reversed = voucher_exists(&PostingStage::BounceReversal.voucher_no(base));
        let stages = if stage_one_posted && !already_reversed {
            vec![(
                PostingStage::VoidReversal,
                date,
                Self::stage_one_line(cheque)?.reversed(),
            )]
        } else {
            Vec::new()
        };

        let mut transition =
            Self::transition(cheque, ChequeStatus::Voided, Self::pending(cheque, stages, voucher_exists));
        if cheque.status != ChequeStatus::Voided {
            transition.note = Some(format!("Voided: {reason}"));
        }
        Ok(transition)
    }

    /// Writes a transition's status, clear date and note onto the cheque.
    pub fn apply(cheque: &mut ChequeTransaction, transition: &ChequeTransition) {
        cheque.status = transition.new_status;
        if transition.clear_date.is_some() {
            cheque.clear_date = transition.clear_date;
        }
        if let Some(note) = &transition.note {
            cheque.notes = Some(match cheque.notes.take() {
                Some(existing) if !existing.trim().is_empty() => format!("{existing}\n{note}"),
                _ => note.clone(),
            });
        }
    }

    /// The handover or deposit line.
    ///
    /// - outgoing normal: Dr AP / Cr bank
    /// - outgoing post-dated: Dr AP / Cr PDC payable clearing
    /// - incoming: Dr cheques in hand / Cr AR
    ///
    /// # Errors
    ///
    /// Returns `ClearingAccountRequired` when the instrument needs a clearing
    /// account and has none.
    pub fn stage_one_line(cheque: &ChequeTransaction) -> Result<PostingLine, ChequeError> {
        let accounts = cheque.accounts();
        let (debit, credit, narration) = match (cheque.direction, cheque.cheque_type) {
            (ChequeDirection::Outgoing, ChequeType::Normal) => (
                accounts.counter_account_no,
                accounts.bank_account_no,
                format!("Cheque {} handed over{}", cheque.cheque_no, Self::party(cheque, " to ")),
            ),
            (ChequeDirection::Outgoing, ChequeType::PostDated) => (
                accounts.counter_account_no,
                Self::clearing(cheque)?,
                format!("PDC {} handed over{}", cheque.cheque_no, Self::party(cheque, " to ")),
            ),
            (ChequeDirection::Incoming, _) => (
                Self::clearing(cheque)?,
                accounts.counter_account_no,
                format!("Cheque {} deposited{}", cheque.cheque_no, Self::party(cheque, " from ")),
            ),
        };
        Ok(PostingLine::new(debit, credit, cheque.amount).with_narration(narration))
    }

    /// The clearance line, for instruments that use a clearing account.
    ///
    /// # Errors
    ///
    /// Returns `ClearingAccountRequired` when the clearing account is missing.
    pub fn clearing_line(cheque: &ChequeTransaction) -> Result<Option<PostingLine>, ChequeError> {
        if !cheque.uses_clearing() {
            return Ok(None);
        }
        let clearing = Self::clearing(cheque)?;
        let (debit, credit) = match cheque.direction {
            ChequeDirection::Outgoing => (clearing, cheque.bank_account_no),
            ChequeDirection::Incoming => (cheque.bank_account_no, clearing),
        };
        Ok(Some(
            PostingLine::new(debit, credit, cheque.amount)
                .with_narration(format!("Cheque {} cleared", cheque.cheque_no)),
        ))
    }

    fn clearing(cheque: &ChequeTransaction) -> Result<crate::accounts::AccountNo, ChequeError> {
        cheque
            .clearing_account_no
            .ok_or(ChequeError::ClearingAccountRequired)
    }

    fn party(cheque: &ChequeTransaction, joiner: &str) -> String {
        cheque
            .counterparty_name
            .as_deref()
            .map_or_else(String::new, |name| format!("{joiner}{name}"))
    }

    fn pending<F>(
        cheque: &ChequeTransaction,
        stages: Vec<(PostingStage, NaiveDate, PostingLine)>,
        voucher_exists: F,
    ) -> Vec<PostingRequest>
    where
        F: Fn(&str) -> bool,
    {
        stages
            .into_iter()
            .map(|(stage, date, line)| (stage.voucher_no(&cheque.voucher_no), date, line))
            .filter(|(voucher_no, _, _)| !voucher_exists(voucher_no))
            .map(|(voucher_no, date, line)| {
                PostingRequest::single(cheque.tenant_id, date, VoucherType::cheque(), voucher_no, line)
                    .with_ref(cheque.id.into_inner())
            })
            .collect()
    }

    fn transition(
        cheque: &ChequeTransaction,
        new_status: ChequeStatus,
        postings: Vec<PostingRequest>,
    ) -> ChequeTransition {
        ChequeTransition {
            from: cheque.status,
            new_status,
            postings,
            clear_date: None,
            note: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountNo;
    use rust_decimal_macros::dec;

    const BANK: AccountNo = AccountNo(1010);
    const AR: AccountNo = AccountNo(1100);
    const IN_HAND: AccountNo = AccountNo(1150);
    const AP: AccountNo = AccountNo(2000);
    const PDC_PAY: AccountNo = AccountNo(2150);

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn input(direction: ChequeDirection, cheque_type: ChequeType) -> NewCheque {
        NewCheque {
            direction,
            cheque_type,
            cheque_book_id: None,
            cheque_no: Some("778812".to_string()),
            issue_date: date(1),
            cheque_date: date(20),
            amount: dec!(500),
            counterparty_id: None,
            counterparty_name: Some("Gulf Supplies".to_string()),
            source_document_id: None,
            notes: None,
        }
    }

    fn outgoing_accounts() -> ChequeAccounts {
        ChequeAccounts {
            bank_account_no: BANK,
            counter_account_no: AP,
            clearing_account_no: Some(PDC_PAY),
        }
    }

    fn book() -> ChequeBook {
        ChequeBookService::new_book(TenantId::new(), BANK, 100_001, 100_050).unwrap()
    }

    #[test]
    fn test_prepare_outgoing_takes_leaf() {
        let b = book();
        let prepared = ChequeService::prepare_cheque(
            TenantId::new(),
            &input(ChequeDirection::Outgoing, ChequeType::Normal),
            outgoing_accounts(),
            Some(&b),
            "CHQ-00001",
        )
        .unwrap();
        assert_eq!(prepared.cheque.cheque_no, "100001");
        assert_eq!(prepared.cheque.status, ChequeStatus::Draft);
        assert_eq!(prepared.cheque.cheque_book_id, Some(b.id));
        assert_eq!(prepared.cheque.clearing_account_no, None);
        assert_eq!(prepared.leaf.unwrap().next_no, 100_002);
    }

    #[test]
    fn test_prepare_validation() {
        let tenant = TenantId::new();
        let b = book();

        let no_book = ChequeService::prepare_cheque(
            tenant,
            &input(ChequeDirection::Outgoing, ChequeType::Normal),
            outgoing_accounts(),
            None,
            "CHQ-1",
        );
        assert!(matches!(no_book, Err(ChequeError::BookRequired)));

        let mut zero = input(ChequeDirection::Outgoing, ChequeType::Normal);
        zero.amount = Decimal::ZERO;
        assert!(matches!(
            ChequeService::prepare_cheque(tenant, &zero, outgoing_accounts(), Some(&b), "CHQ-1"),
            Err(ChequeError::InvalidAmount(_))
        ));

        let mut backdated = input(ChequeDirection::Outgoing, ChequeType::PostDated);
        backdated.cheque_date = date(1);
        assert!(matches!(
            ChequeService::prepare_cheque(tenant, &backdated, outgoing_accounts(), Some(&b), "CHQ-1"),
            Err(ChequeError::PostDatedNotInFuture)
        ));

        let mut unnumbered = input(ChequeDirection::Incoming, ChequeType::Normal);
        unnumbered.cheque_no = Some("  ".to_string());
        let incoming_accounts = ChequeAccounts {
            bank_account_no: BANK,
            counter_account_no: AR,
            clearing_account_no: Some(IN_HAND),
        };
        assert!(matches!(
            ChequeService::prepare_cheque(tenant, &unnumbered, incoming_accounts, None, "CHQ-1"),
            Err(ChequeError::ChequeNumberRequired)
        ));

        let no_clearing = ChequeAccounts {
            clearing_account_no: None,
            ..incoming_accounts
        };
        assert!(matches!(
            ChequeService::prepare_cheque(
                tenant,
                &input(ChequeDirection::Incoming, ChequeType::Normal),
                no_clearing,
                None,
                "CHQ-1"
            ),
            Err(ChequeError::ClearingAccountRequired)
        ));
    }

    #[test]
    fn test_outgoing_normal_has_no_stage_two() {
        let mut cheque = ChequeService::prepare_cheque(
            TenantId::new(),
            &input(ChequeDirection::Outgoing, ChequeType::Normal),
            outgoing_accounts(),
            Some(&book()),
            "CHQ-00002",
        )
        .unwrap()
        .cheque;

        let t = ChequeService::mark_printed(&cheque).unwrap();
        ChequeService::apply(&mut cheque, &t);
        let t = ChequeService::mark_handed_over_or_deposited(&cheque, date(2), |_| false).unwrap();
        assert_eq!(t.new_status, ChequeStatus::HandedOver);
        assert_eq!(t.postings.len(), 1);
        let line = &t.postings[0].lines[0];
        assert_eq!((line.debit_account_no, line.credit_account_no), (AP, BANK));
        assert_eq!(t.postings[0].voucher_no, "CHQ-00002");
        assert_eq!(t.postings[0].voucher_type, VoucherType::cheque());
        assert_eq!(t.postings[0].ref_id, Some(cheque.id.into_inner()));
        ChequeService::apply(&mut cheque, &t);

        let t = ChequeService::mark_cleared(&cheque, date(3), |_| false).unwrap();
        assert!(t.postings.is_empty());
        ChequeService::apply(&mut cheque, &t);
        assert_eq!(cheque.status, ChequeStatus::Cleared);
        assert_eq!(cheque.clear_date, Some(date(3)));
    }

    #[test]
    fn test_incoming_deposit_and_clear() {
        let accounts = ChequeAccounts {
            bank_account_no: BANK,
            counter_account_no: AR,
            clearing_account_no: Some(IN_HAND),
        };
        let mut cheque = ChequeService::prepare_cheque(
            TenantId::new(),
            &input(ChequeDirection::Incoming, ChequeType::Normal),
            accounts,
            None,
            "CHQ-00003",
        )
        .unwrap()
        .cheque;
        assert_eq!(cheque.cheque_no, "778812");

        let t = ChequeService::mark_printed(&cheque).unwrap();
        ChequeService::apply(&mut cheque, &t);
        let t = ChequeService::mark_handed_over_or_deposited(&cheque, date(2), |_| false).unwrap();
        assert_eq!(t.new_status, ChequeStatus::Deposited);
        let l = &t.postings[0].lines[0];
        assert_eq!((l.debit_account_no, l.credit_account_no), (IN_HAND, AR));
        ChequeService::apply(&mut cheque, &t);

        let t = ChequeService::mark_presented(&cheque).unwrap();
        ChequeService::apply(&mut cheque, &t);

        let t = ChequeService::mark_cleared(&cheque, date(5), |_| false).unwrap();
        assert_eq!(t.postings[0].voucher_no, "CHQ-00003-CLR");
        let l = &t.postings[0].lines[0];
        assert_eq!((l.debit_account_no, l.credit_account_no), (BANK, IN_HAND));
        assert_eq!(t.postings[0].transaction_date, date(5));
    }

    #[test]
    fn test_transition_guards() {
        let mut cheque = ChequeService::prepare_cheque(
            TenantId::new(),
            &input(ChequeDirection::Outgoing, ChequeType::Normal),
            outgoing_accounts(),
            Some(&book()),
            "CHQ-00004",
        )
        .unwrap()
        .cheque;

        assert!(ChequeService::mark_handed_over_or_deposited(&cheque, date(2), |_| false).is_err());
        assert!(ChequeService::mark_cleared(&cheque, date(2), |_| false).is_err());
        assert!(ChequeService::mark_bounced(&cheque, date(2), None, |_| false).is_err());
        assert!(ChequeService::mark_presented(&cheque).is_err());

        cheque.status = ChequeStatus::Cleared;
        assert!(matches!(
            ChequeService::void(&cheque, date(9), "lost", |_| false),
            Err(ChequeError::InvalidTransition { .. })
        ));
        assert!(ChequeService::mark_bounced(&cheque, date(9), None, |_| false).is_err());

        cheque.status = ChequeStatus::Printed;
        assert!(matches!(
            ChequeService::void(&cheque, date(9), "  ", |_| false),
            Err(ChequeError::VoidReasonRequired)
        ));
    }

    #[test]
    fn test_void_before_handover_posts_nothing() {
        let mut cheque = ChequeService::prepare_cheque(
            TenantId::new(),
            &input(ChequeDirection::Outgoing, ChequeType::Normal),
            outgoing_accounts(),
            Some(&book()),
            "CHQ-00005",
        )
        .unwrap()
        .cheque;
        cheque.notes = Some("printed twice".to_string());

        let t = ChequeService::void(&cheque, date(2), "misprint", |_| false).unwrap();
        assert!(t.postings.is_empty());
        ChequeService::apply(&mut cheque, &t);
        assert_eq!(cheque.status, ChequeStatus::Voided);
        assert_eq!(cheque.notes.as_deref(), Some("printed twice\nVoided: misprint"));
    }

    #[test]
    fn test_bounce_with_charge() {
        let mut cheque = ChequeService::prepare_cheque(
            TenantId::new(),
            &input(ChequeDirection::Outgoing, ChequeType::PostDated),
            outgoing_accounts(),
            Some(&book()),
            "CHQ-00006",
        )
        .unwrap()
        .cheque;
        cheque.status = ChequeStatus::HandedOver;

        let charge = BankCharge {
            amount: dec!(25),
            expense_account_no: AccountNo(6150),
        };
        let t = ChequeService::mark_bounced(&cheque, date(21), Some(charge), |_| false).unwrap();
        assert_eq!(t.postings.len(), 2);
        let rev = &t.postings[0];
        assert_eq!(rev.voucher_no, "CHQ-00006-REV");
        assert_eq!(
            (rev.lines[0].debit_account_no, rev.lines[0].credit_account_no),
            (PDC_PAY, AP)
        );
        let bc = &t.postings[1];
        assert_eq!(bc.voucher_no, "CHQ-00006-BC");
        assert_eq!(
            (bc.lines[0].debit_account_no, bc.lines[0].credit_account_no, bc.lines[0].amount),
            (AccountNo(6150), BANK, dec!(25))
        );

        let negative = BankCharge {
            amount: dec!(-1),
            expense_account_no: AccountNo(6150),
        };
        assert!(matches!(
            ChequeService::mark_bounced(&cheque, date(21), Some(negative), |_| false),
            Err(ChequeError::InvalidBankCharge(_))
        ));
    }
}
