//! Sequence allocation rules.

use ledgerline_shared::types::TenantId;

use super::error::SequenceError;
use super::types::{Allocation, DocSequence};

/// Largest supported pad width; wider would exceed the digits of an `i64`.
const MAX_PAD_WIDTH: usize = 18;

/// Stateless service for document number allocation.
pub struct SequenceService;

impl SequenceService {
    /// Builds the counter row for a (tenant, doc type) seen for the first time.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed doc types, prefixes or pad widths.
    pub fn new_sequence(
        tenant_id: TenantId,
        doc_type: &str,
        default_prefix: &str,
        pad_width: usize,
    ) -> Result<DocSequence, SequenceError> {
        let doc_type = Self::normalize_doc_type(doc_type)?;
        let prefix = default_prefix.trim();
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(SequenceError::InvalidPrefix(default_prefix.to_string()));
        }
        if !(1..=MAX_PAD_WIDTH).contains(&pad_width) {
            return Err(SequenceError::InvalidPadWidth(pad_width));
        }

        Ok(DocSequence {
            tenant_id,
            doc_type,
            prefix: prefix.to_string(),
            next_number: 1,
            pad_width,
        })
    }

    /// Normalizes and validates a document type key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocType` unless the key is 1-20 of `A-Z`, `0-9`, `_`.
    pub fn normalize_doc_type(doc_type: &str) -> Result<String, SequenceError> {
        let key = doc_type.trim().to_ascii_uppercase();
        let valid = !key.is_empty()
            && key.len() <= 20
            && key
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
        if valid {
            Ok(key)
        } else {
            Err(SequenceError::InvalidDocType(doc_type.to_string()))
        }
    }

    /// Captures the current counter and returns the advanced value to persist.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` when the counter cannot advance, and
    /// `CorruptCounter` when the stored counter is below 1.
    pub fn allocate(sequence: &DocSequence) -> Result<Allocation, SequenceError> {
        let number = Self::current(sequence)?;
        let next_number = number.checked_add(1).ok_or_else(|| SequenceError::Overflow {
            doc_type: sequence.doc_type.clone(),
            next_number: number,
        })?;

        Ok(Allocation {
            number,
            document_no: Self::format(&sequence.prefix, number, sequence.pad_width),
            next_number,
        })
    }

    /// Returns the number the next allocation would issue, without advancing.
    ///
    /// # Errors
    ///
    /// Returns `CorruptCounter` when the stored counter is below 1.
    pub fn peek(sequence: &DocSequence) -> Result<String, SequenceError> {
        let number = Self::current(sequence)?;
        Ok(Self::format(&sequence.prefix, number, sequence.pad_width))
    }

    /// Formats `prefix-` plus the zero-padded number.
    #[must_use]
    pub fn format(prefix: &str, number: i64, pad_width: usize) -> String {
        format!("{prefix}-{number:0pad_width$}")
    }

    fn current(sequence: &DocSequence) -> Result<i64, SequenceError> {
        if sequence.next_number < 1 {
            return Err(SequenceError::CorruptCounter {
                doc_type: sequence.doc_type.clone(),
                next_number: sequence.next_number,
            });
        }
        Ok(sequence.next_number)
    }
}
