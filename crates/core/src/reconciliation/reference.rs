//! Voucher reference tokens found in bank narrations.
//!
//! `INV 12`, `INV/0012`, `inv-12` and `INV-00012` all normalise to the same
//! token: voucher type `INV`, number 12.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cheque::PostingStage;
use crate::ledger::codes::{self, REFERENCE_CODES};

// Patterns are constant; `None` only if they fail to compile, which disables matching.
static TOKEN_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    let codes = REFERENCE_CODES.join("|");
    Regex::new(&format!(r"(?i)\b({codes})\s*[-/#: ]?\s*(\d{{1,15}})\b")).ok()
});

static VOUCHER_NO_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(?i)([A-Z]*)\s*[-/#: ]?\s*(\d{1,15})$").ok());

/// A normalised voucher reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceToken {
    /// Voucher type code, uppercase.
    pub voucher_type: String,
    /// Numeric part without leading zeros.
    pub number: u64,
}

impl ReferenceToken {
    /// Finds the first known voucher reference in free text.
    #[must_use]
    pub fn extract(text: &str) -> Option<Self> {
        let caps = TOKEN_RE.as_ref()?.captures(text)?;
        let number = caps.get(2)?.as_str().parse().ok()?;
        Some(Self {
            voucher_type: caps.get(1)?.as_str().to_ascii_uppercase(),
            number,
        })
    }

    /// Parses a stored canonical token (`INV-12`).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let caps = VOUCHER_NO_RE.as_ref()?.captures(token.trim())?;
        let voucher_type = caps.get(1)?.as_str().to_ascii_uppercase();
        if voucher_type.is_empty() {
            return None;
        }
        Some(Self {
            voucher_type,
            number: caps.get(2)?.as_str().parse().ok()?,
        })
    }

    /// Whether a stored voucher matches this token.
    ///
    /// The voucher type must be equal and the voucher number's numeric part
    /// must equal the token's number; an alphabetic prefix on the voucher
    /// number, if present, must equal the token's type. A cheque token also
    /// matches the cheque's clearing voucher, which is the entry that moves
    /// the bank for post-dated cheques.
    #[must_use]
    pub fn matches_voucher(&self, voucher_type: &str, voucher_no: &str) -> bool {
        if !voucher_type.eq_ignore_ascii_case(&self.voucher_type) {
            return false;
        }
        let mut voucher_no = voucher_no.trim();
        if voucher_type.eq_ignore_ascii_case(codes::CHQ) {
            voucher_no = voucher_no
                .strip_suffix(PostingStage::Clearing.suffix())
                .unwrap_or(voucher_no);
        }
        let Some(caps) = VOUCHER_NO_RE
            .as_ref()
            .and_then(|re| re.captures(voucher_no))
        else {
            return false;
        };
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let number = caps.get(2).and_then(|m| m.as_str().parse::<u64>().ok());
        (prefix.is_empty() || prefix.eq_ignore_ascii_case(&self.voucher_type))
            && number == Some(self.number)
    }
}

impl fmt::Display for ReferenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.voucher_type, self.number)
    }
}
