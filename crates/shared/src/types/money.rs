//! Fixed-point money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal`; these helpers pin the scales the
//! ledger stores and reports with.

use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept for ordinary monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Fractional digits kept for VAT/tax-related amounts.
pub const TAX_SCALE: u32 = 4;

/// Rounds an amount to [`MONEY_SCALE`] using banker's rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a tax amount to [`TAX_SCALE`] using banker's rounding.
#[must_use]
pub fn round_tax(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(TAX_SCALE, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_bankers() {
        assert_eq!(round_money(dec!(10.125)), dec!(10.12));
        assert_eq!(round_money(dec!(10.135)), dec!(10.14));
        assert_eq!(round_money(dec!(-10.125)), dec!(-10.12));
    }

    #[test]
    fn test_round_tax_keeps_four_digits() {
        assert_eq!(round_tax(dec!(1.23456)), dec!(1.2346));
        assert_eq!(round_tax(dec!(0.00005)), dec!(0.0000));
    }

    #[test]
    fn test_round_money_leaves_exact_values() {
        assert_eq!(round_money(dec!(1050.00)), dec!(1050.00));
    }
}
