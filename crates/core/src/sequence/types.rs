//! Document sequence types.

use ledgerline_shared::types::TenantId;
use serde::{Deserialize, Serialize};

/// Per-tenant counter for one document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSequence {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Document type key (e.g. `INV`, `CHQ`).
    pub doc_type: String,
    /// Prefix placed before the padded number.
    pub prefix: String,
    /// Next number to issue.
    pub next_number: i64,
    /// Minimum digits in the formatted number.
    pub pad_width: usize,
}

/// Result of one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// The captured number.
    pub number: i64,
    /// Formatted document number, `prefix-` plus the padded number.
    pub document_no: String,
    /// Counter value to persist.
    pub next_number: i64,
}
