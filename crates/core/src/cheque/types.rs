//! Cheque domain types.
//!
//! Valid status transitions:
//! - Draft → Printed (print)
//! - Printed → HandedOver (outgoing) or Deposited (incoming)
//! - HandedOver | Deposited → Presented
//! - HandedOver | Deposited | Presented → Cleared or Bounced
//! - any state except Cleared → Voided

use std::fmt;

use chrono::NaiveDate;
use ledgerline_shared::types::{ChequeBookId, ChequeId, TenantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{AccountNo, AccountRole};
use crate::ledger::PostingRequest;

/// Whether the tenant issued or received the cheque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChequeDirection {
    /// Received from a customer.
    Incoming,
    /// Issued to a vendor.
    Outgoing,
}

impl ChequeDirection {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }
}

/// Normal or post-dated instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChequeType {
    /// Payable on presentation.
    Normal,
    /// Payable from the cheque date onwards.
    PostDated,
}

impl ChequeType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::PostDated => "post_dated",
        }
    }
}

/// Cheque status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChequeStatus {
    /// Recorded, not yet printed.
    Draft,
    /// Printed or received.
    Printed,
    /// Outgoing cheque given to the payee.
    HandedOver,
    /// Incoming cheque deposited at the bank.
    Deposited,
    /// Presented for payment.
    Presented,
    /// Paid by the bank.
    Cleared,
    /// Dishonoured.
    Bounced,
    /// Cancelled.
    Voided,
}

impl ChequeStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Printed => "printed",
            Self::HandedOver => "handed_over",
            Self::Deposited => "deposited",
            Self::Presented => "presented",
            Self::Cleared => "cleared",
            Self::Bounced => "bounced",
            Self::Voided => "voided",
        }
    }

    /// Parses a status from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "printed" => Some(Self::Printed),
            "handed_over" => Some(Self::HandedOver),
            "deposited" => Some(Self::Deposited),
            "presented" => Some(Self::Presented),
            "cleared" => Some(Self::Cleared),
            "bounced" => Some(Self::Bounced),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }

    /// States in which the instrument is out of the tenant's hands and awaiting the bank.
    #[must_use]
    pub const fn is_in_transit(self) -> bool {
        matches!(self, Self::HandedOver | Self::Deposited | Self::Presented)
    }

    /// No further transitions.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Cleared | Self::Bounced | Self::Voided)
    }
}

impl fmt::Display for ChequeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numbered cheque book bound to a bank GL account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeBook {
    /// Book id.
    pub id: ChequeBookId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Bank GL account the cheques draw on.
    pub bank_account_no: AccountNo,
    /// First leaf number.
    pub start_no: i64,
    /// Last leaf number.
    pub end_no: i64,
    /// Next leaf to issue; `end_no + 1` once exhausted.
    pub next_no: i64,
    /// Whether leaves may be issued.
    pub is_active: bool,
}

impl ChequeBook {
    /// No leaves left.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.next_no > self.end_no
    }

    /// Leaves left to issue.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        if self.is_exhausted() {
            0
        } else {
            self.end_no - self.next_no + 1
        }
    }
}

/// A leaf taken from a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafAllocation {
    /// Printed cheque number.
    pub cheque_no: String,
    /// Cursor value to persist.
    pub next_no: i64,
}

/// Accounts a cheque posts to, resolved from role mappings at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeAccounts {
    /// Bank GL account.
    pub bank_account_no: AccountNo,
    /// AR for incoming, AP for outgoing.
    pub counter_account_no: AccountNo,
    /// Cheques-in-hand or PDC-payable clearing account.
    pub clearing_account_no: Option<AccountNo>,
}

impl ChequeAccounts {
    /// Roles a cheque of this kind needs mapped.
    ///
    /// The bank account of an outgoing cheque comes from its book.
    #[must_use]
    pub fn required_roles(direction: ChequeDirection, cheque_type: ChequeType) -> Vec<AccountRole> {
        match (direction, cheque_type) {
            (ChequeDirection::Outgoing, ChequeType::Normal) => vec![AccountRole::Ap],
            (ChequeDirection::Outgoing, ChequeType::PostDated) => {
                vec![AccountRole::Ap, AccountRole::PdcPayableClearing]
            }
            (ChequeDirection::Incoming, _) => {
                vec![AccountRole::Bank, AccountRole::Ar, AccountRole::PdcReceivable]
            }
        }
    }
}

/// Input for recording a cheque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCheque {
    /// Direction.
    pub direction: ChequeDirection,
    /// Normal or post-dated.
    pub cheque_type: ChequeType,
    /// Book to draw a leaf from (outgoing).
    pub cheque_book_id: Option<ChequeBookId>,
    /// Drawer's printed number (incoming).
    pub cheque_no: Option<String>,
    /// Date the cheque was written or received.
    pub issue_date: NaiveDate,
    /// Date printed on the cheque.
    pub cheque_date: NaiveDate,
    /// Positive amount.
    pub amount: Decimal,
    /// Customer or vendor id.
    pub counterparty_id: Option<Uuid>,
    /// Customer or vendor name.
    pub counterparty_name: Option<String>,
    /// Originating sales or purchase document.
    pub source_document_id: Option<Uuid>,
    /// Free text.
    pub notes: Option<String>,
}

/// A stored cheque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeTransaction {
    /// Cheque id; also the `ref_id` of every posting it makes.
    pub id: ChequeId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Direction.
    pub direction: ChequeDirection,
    /// Normal or post-dated.
    pub cheque_type: ChequeType,
    /// Current status.
    pub status: ChequeStatus,
    /// Book the leaf came from.
    pub cheque_book_id: Option<ChequeBookId>,
    /// Printed cheque number.
    pub cheque_no: String,
    /// Base voucher number of its postings.
    pub voucher_no: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Cheque date.
    pub cheque_date: NaiveDate,
    /// Date the bank cleared it.
    pub clear_date: Option<NaiveDate>,
    /// Positive amount.
    pub amount: Decimal,
    /// Customer or vendor id.
    pub counterparty_id: Option<Uuid>,
    /// Customer or vendor name.
    pub counterparty_name: Option<String>,
    /// Originating sales or purchase document.
    pub source_document_id: Option<Uuid>,
    /// Bank GL account.
    pub bank_account_no: AccountNo,
    /// Clearing account, when the instrument uses one.
    pub clearing_account_no: Option<AccountNo>,
    /// AR or AP.
    pub counter_account_no: AccountNo,
    /// Free text, including void reasons.
    pub notes: Option<String>,
}

impl ChequeTransaction {
    /// Whether postings route through a clearing account.
    #[must_use]
    pub const fn uses_clearing(&self) -> bool {
        uses_clearing(self.direction, self.cheque_type)
    }

    /// The accounts this cheque posts to.
    #[must_use]
    pub const fn accounts(&self) -> ChequeAccounts {
        ChequeAccounts {
            bank_account_no: self.bank_account_no,
            counter_account_no: self.counter_account_no,
            clearing_account_no: self.clearing_account_no,
        }
    }
}

/// Incoming cheques sit in cheques-in-hand and outgoing post-dated cheques in
/// PDC payable until the bank clears them.
#[must_use]
pub const fn uses_clearing(direction: ChequeDirection, cheque_type: ChequeType) -> bool {
    matches!(
        (direction, cheque_type),
        (ChequeDirection::Incoming, _) | (ChequeDirection::Outgoing, ChequeType::PostDated)
    )
}

/// The posting a lifecycle step makes, identified by voucher suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostingStage {
    /// Handover or deposit.
    StageOne,
    /// Bank clearance through the clearing account.
    Clearing,
    /// Bounce reversal of stage one.
    BounceReversal,
    /// Void reversal of stage one.
    VoidReversal,
    /// Bank charge on a bounce.
    BankCharge,
}

impl PostingStage {
    /// Every stage a cheque can post.
    pub const ALL: [Self; 5] = [
        Self::StageOne,
        Self::Clearing,
        Self::BounceReversal,
        Self::VoidReversal,
        Self::BankCharge,
    ];

    /// Voucher suffix appended to the cheque's base voucher number.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::StageOne => "",
            Self::Clearing => "-CLR",
            Self::BounceReversal => "-REV",
            Self::VoidReversal => "-VOIDREV",
            Self::BankCharge => "-BC",
        }
    }

    /// Full voucher number for a cheque's base voucher.
    #[must_use]
    pub fn voucher_no(self, base: &str) -> String {
        format!("{base}{}", self.suffix())
    }
}

/// A bank charge levied on a bounced cheque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankCharge {
    /// Charge amount.
    pub amount: Decimal,
    /// Bank charges expense account.
    pub expense_account_no: AccountNo,
}

/// Outcome of a transition: the new status and the postings still to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChequeTransition {
    /// Status before.
    pub from: ChequeStatus,
    /// Status after.
    pub new_status: ChequeStatus,
    /// Postings whose vouchers do not exist yet.
    pub postings: Vec<PostingRequest>,
    /// Clear date to store.
    pub clear_date: Option<NaiveDate>,
    /// Note to append.
    pub note: Option<String>,
}

impl ChequeTransition {
    /// Whether the status stays the same.
    #[must_use]
    pub fn is_replay(&self) -> bool {
        self.from == self.new_status
    }
}
