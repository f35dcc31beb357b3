//! Payment application rules for obligations.
//!
//! These functions are pure check-then-act rules: the caller is
//! responsible for making their inputs stable (a row-level lock on the
//! obligation while `check_payment` runs and the movements are written).
//! Keeping the rules free of I/O means the lock is the only concurrency
//! mechanism the system needs.

use rust_decimal::Decimal;
use uuid::Uuid;

use tesoro_shared::types::settlement_tolerance;

use super::error::ObligationError;
use super::types::SettlementState;

/// Derives the settlement state from the fixed total and the paid sum.
///
/// An obligation is settled once the cumulative paid amount reaches the
/// total minus the tolerance. Below that, any positive paid amount makes
/// it partially settled; the tolerance guards only the settled threshold.
#[must_use]
pub fn settlement_state_for(total_due: Decimal, amount_paid: Decimal) -> SettlementState {
    if amount_paid >= total_due - settlement_tolerance() {
        SettlementState::Settled
    } else if amount_paid > Decimal::ZERO {
        SettlementState::PartiallySettled
    } else {
        SettlementState::Unsettled
    }
}

/// Checks whether a payment of `amount` may be applied.
///
/// # Errors
///
/// - `NonPositiveAmount` if `amount <= 0`.
/// - `AlreadySettled` if the obligation is already fully paid.
/// - `Overpayment` if `already_paid + amount` exceeds the total due
///   beyond the settlement tolerance. The error carries the already-paid
///   total and the attempted amount so the caller can correct the request.
pub fn check_payment(
    obligation_id: Uuid,
    total_due: Decimal,
    already_paid: Decimal,
    state: SettlementState,
    amount: Decimal,
) -> Result<(), ObligationError> {
    if amount <= Decimal::ZERO {
        return Err(ObligationError::NonPositiveAmount(amount));
    }
    if !state.accepts_payments() {
        return Err(ObligationError::AlreadySettled(obligation_id));
    }
    if already_paid + amount > total_due + settlement_tolerance() {
        return Err(ObligationError::Overpayment {
            already_paid,
            attempted: amount,
            total_due,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use tesoro_shared::types::remaining_amount;

    #[rstest]
    #[case(dec!(0), SettlementState::Unsettled)]
    // Any positive paid sum counts, even one inside the tolerance:
    // the tolerance guards the settled threshold only.
    #[case(dec!(0.005), SettlementState::PartiallySettled)]
    #[case(dec!(0.01), SettlementState::PartiallySettled)]
    #[case(dec!(0.02), SettlementState::PartiallySettled)]
    #[case(dec!(6000), SettlementState::PartiallySettled)]
    // Within tolerance of the total counts as settled.
    #[case(dec!(8999.995), SettlementState::Settled)]
    #[case(dec!(9000), SettlementState::Settled)]
    fn test_state_thresholds(#[case] paid: Decimal, #[case] expected: SettlementState) {
        assert_eq!(settlement_state_for(dec!(9000), paid), expected);
    }

    #[test]
    fn test_installment_scenario() {
        // totalAmountDue = 9000: 6000 then 3000 then 0.01.
        let id = Uuid::new_v4();
        let total = dec!(9000);

        assert!(check_payment(id, total, dec!(0), SettlementState::Unsettled, dec!(6000)).is_ok());
        let state = settlement_state_for(total, dec!(6000));
        assert_eq!(state, SettlementState::PartiallySettled);
        assert_eq!(remaining_amount(total, dec!(6000)), dec!(3000));

        assert!(check_payment(id, total, dec!(6000), state, dec!(3000)).is_ok());
        let state = settlement_state_for(total, dec!(9000));
        assert_eq!(state, SettlementState::Settled);
        assert_eq!(remaining_amount(total, dec!(9000)), dec!(0));

        let result = check_payment(id, total, dec!(9000), state, dec!(0.01));
        assert!(matches!(result, Err(ObligationError::AlreadySettled(_))));
    }

    #[test]
    fn test_overpayment_rejected_before_settled() {
        // Partially paid, attempted amount blows past the total.
        let result = check_payment(
            Uuid::new_v4(),
            dec!(9000),
            dec!(6000),
            SettlementState::PartiallySettled,
            dec!(3000.02),
        );
        assert!(matches!(
            result,
            Err(ObligationError::Overpayment {
                already_paid,
                attempted,
                total_due,
            }) if already_paid == dec!(6000)
                && attempted == dec!(3000.02)
                && total_due == dec!(9000)
        ));
    }

    #[test]
    fn test_payment_within_tolerance_accepted() {
        // 0.005 short of the total is inside the tolerance.
        let result = check_payment(
            Uuid::new_v4(),
            dec!(9000),
            dec!(6000),
            SettlementState::PartiallySettled,
            dec!(3000.005),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        let id = Uuid::new_v4();
        assert!(matches!(
            check_payment(id, dec!(100), dec!(0), SettlementState::Unsettled, dec!(0)),
            Err(ObligationError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            check_payment(id, dec!(100), dec!(0), SettlementState::Unsettled, dec!(-5)),
            Err(ObligationError::NonPositiveAmount(_))
        ));
    }

    // Strategy for two-decimal amounts in a realistic range.
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For any sequence of accepted payments, the cumulative paid sum
        /// never exceeds the total due beyond the tolerance.
        #[test]
        fn prop_accepted_payments_never_overpay(
            total in amount_strategy(),
            amounts in prop::collection::vec(amount_strategy(), 1..12),
        ) {
            let id = Uuid::new_v4();
            let mut paid = Decimal::ZERO;

            for amount in amounts {
                let state = settlement_state_for(total, paid);
                if check_payment(id, total, paid, state, amount).is_ok() {
                    paid += amount;
                }
            }

            prop_assert!(paid <= total + settlement_tolerance());
        }

        /// The settlement state never regresses as payments accumulate.
        #[test]
        fn prop_state_never_regresses(
            total in amount_strategy(),
            amounts in prop::collection::vec(amount_strategy(), 1..12),
        ) {
            fn rank(state: SettlementState) -> u8 {
                match state {
                    SettlementState::Unsettled => 0,
                    SettlementState::PartiallySettled => 1,
                    SettlementState::Settled => 2,
                }
            }

            let id = Uuid::new_v4();
            let mut paid = Decimal::ZERO;
            let mut last = settlement_state_for(total, paid);

            for amount in amounts {
                let state = settlement_state_for(total, paid);
                if check_payment(id, total, paid, state, amount).is_ok() {
                    paid += amount;
                    let next = settlement_state_for(total, paid);
                    prop_assert!(rank(next) >= rank(last));
                    last = next;
                }
            }
        }

        /// Once settled, every further payment is rejected.
        #[test]
        fn prop_settled_rejects_everything(
            total in amount_strategy(),
            extra in amount_strategy(),
        ) {
            let id = Uuid::new_v4();
            let state = settlement_state_for(total, total);
            prop_assert_eq!(state, SettlementState::Settled);

            let result = check_payment(id, total, total, state, extra);
            prop_assert!(matches!(result, Err(ObligationError::AlreadySettled(_))));
        }
    }
}
