//! Cheque book leaf allocation.

use ledgerline_shared::types::{ChequeBookId, TenantId};

use super::error::ChequeError;
use super::types::{ChequeBook, LeafAllocation};
use crate::accounts::AccountNo;
use crate::ledger::validation::validate_account_no;

/// Stateless service for cheque books.
pub struct ChequeBookService;

impl ChequeBookService {
    /// Builds a new book with the cursor at its first leaf.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBookRange` unless `0 < start <= end`, or a ledger
    /// error for an invalid bank account number.
    pub fn new_book(
        tenant_id: TenantId,
        bank_account_no: AccountNo,
        start_no: i64,
        end_no: i64,
    ) -> Result<ChequeBook, ChequeError> {
        validate_account_no(bank_account_no)?;
        if start_no <= 0 || start_no > end_no || end_no == i64::MAX {
            return Err(ChequeError::InvalidBookRange {
                start: start_no,
                end: end_no,
            });
        }

        Ok(ChequeBook {
            id: ChequeBookId::new(),
            tenant_id,
            bank_account_no,
            start_no,
            end_no,
            next_no: start_no,
            is_active: true,
        })
    }

    /// Takes the next leaf. The caller persists `next_no` before handing the
    /// number out.
    ///
    /// # Errors
    ///
    /// Returns `BookInactive` or `BookExhausted`.
    pub fn allocate(book: &ChequeBook) -> Result<LeafAllocation, ChequeError> {
        if !book.is_active {
            return Err(ChequeError::BookInactive);
        }
        if book.is_exhausted() || book.next_no < book.start_no {
            return Err(ChequeError::BookExhausted { end_no: book.end_no });
        }

        Ok(LeafAllocation {
            cheque_no: Self::format_leaf(book.next_no, book.end_no),
            next_no: book.next_no + 1,
        })
    }

    /// Leaf numbers are zero-padded to the width of the book's last leaf.
    #[must_use]
    pub fn format_leaf(number: i64, end_no: i64) -> String {
        let width = end_no.to_string().len();
        format!("{number:0width$}")
    }
}
