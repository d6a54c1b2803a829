//! Business rule validation for journal lines.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::PostingLine;
use crate::accounts::AccountNo;

/// Validates a positive, non-zero amount.
///
/// # Errors
///
/// Returns `ZeroAmount` or `NegativeAmount`.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount.is_sign_negative() {
        return Err(LedgerError::NegativeAmount(amount));
    }
    Ok(())
}

/// Validates an account number is usable on a line.
///
/// # Errors
///
/// Returns `InvalidAccountNumber` for zero or negative numbers.
pub fn validate_account_no(account_no: AccountNo) -> Result<(), LedgerError> {
    if account_no.is_valid() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAccountNumber(account_no))
    }
}

/// Validates the structural rules of a single line.
///
/// # Errors
///
/// Returns the first rule the line breaks.
pub fn validate_line(line: &PostingLine) -> Result<(), LedgerError> {
    validate_amount(line.amount)?;
    validate_account_no(line.debit_account_no)?;
    validate_account_no(line.credit_account_no)?;
    if line.debit_account_no == line.credit_account_no {
        return Err(LedgerError::SameAccount(line.debit_account_no));
    }
    Ok(())
}

/// Validates a voucher number is present.
///
/// # Errors
///
/// Returns `EmptyVoucherNo` for blank voucher numbers.
pub fn validate_voucher_no(voucher_no: &str) -> Result<(), LedgerError> {
    if voucher_no.trim().is_empty() {
        Err(LedgerError::EmptyVoucherNo)
    } else {
        Ok(())
    }
}

/// Validates that a period is not inverted.
///
/// # Errors
///
/// Returns `InvalidPeriod` when `from > to`.
pub fn validate_period(from: chrono::NaiveDate, to: chrono::NaiveDate) -> Result<(), LedgerError> {
    if from > to {
        Err(LedgerError::InvalidPeriod { from, to })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec!(0.01)).is_ok());
        assert!(matches!(validate_amount(Decimal::ZERO), Err(LedgerError::ZeroAmount)));
        assert!(matches!(
            validate_amount(dec!(-1)),
            Err(LedgerError::NegativeAmount(_))
        ));
    }

    #[test]
    fn test_validate_line_rejects_same_and_zero_accounts() {
        let same = PostingLine::new(AccountNo(1000), AccountNo(1000), dec!(10));
        assert!(matches!(validate_line(&same), Err(LedgerError::SameAccount(_))));

        let zero = PostingLine::new(AccountNo(0), AccountNo(1000), dec!(10));
        assert!(matches!(
            validate_line(&zero),
            Err(LedgerError::InvalidAccountNumber(_))
        ));
    }

    #[test]
    fn test_validate_period() {
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert!(validate_period(d1, d2).is_ok());
        assert!(validate_period(d1, d1).is_ok());
        assert!(matches!(
            validate_period(d2, d1),
            Err(LedgerError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_validate_voucher_no() {
        assert!(validate_voucher_no("INV-00001").is_ok());
        assert!(validate_voucher_no("   ").is_err());
    }
}
