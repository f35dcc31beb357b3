//! Monetary amount helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` with two fractional digits.
//!
//! The settlement tolerance (one cent) absorbs rounding drift when split
//! payments are compared against an obligation total. It is defined here,
//! once, so every comparison in the system agrees on the same epsilon.

use rust_decimal::Decimal;

/// The tolerance used for settlement comparisons: 0.01 currency units.
#[must_use]
pub fn settlement_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Returns true if two amounts are equal within the settlement tolerance.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= settlement_tolerance()
}

/// Remaining amount due, floored at zero.
///
/// A fully (or over-tolerantly) paid obligation never reports a negative
/// remainder.
#[must_use]
pub fn remaining_amount(total_due: Decimal, paid: Decimal) -> Decimal {
    (total_due - paid).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tolerance_is_one_cent() {
        assert_eq!(settlement_tolerance(), dec!(0.01));
    }

    #[test]
    fn test_within_tolerance_boundary() {
        assert!(within_tolerance(dec!(100.00), dec!(100.00)));
        assert!(within_tolerance(dec!(100.00), dec!(100.01)));
        assert!(within_tolerance(dec!(100.00), dec!(99.99)));
        assert!(!within_tolerance(dec!(100.00), dec!(100.02)));
        assert!(!within_tolerance(dec!(100.00), dec!(99.98)));
    }

    #[test]
    fn test_within_tolerance_sub_cent() {
        // Sub-cent drift from rounding is tolerated.
        assert!(within_tolerance(dec!(100.00), dec!(99.995)));
    }

    #[test]
    fn test_remaining_amount() {
        assert_eq!(remaining_amount(dec!(9000), dec!(6000)), dec!(3000));
        assert_eq!(remaining_amount(dec!(9000), dec!(9000)), dec!(0));
    }

    #[test]
    fn test_remaining_amount_floors_at_zero() {
        // Tolerance-level overpay never yields a negative remainder.
        assert_eq!(remaining_amount(dec!(9000), dec!(9000.01)), dec!(0));
    }
}
