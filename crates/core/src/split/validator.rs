//! Split payment validator.

use rust_decimal::Decimal;

use tesoro_shared::types::within_tolerance;

use crate::movement::FundingSourceKind;

use super::error::SplitError;
use super::types::{
    CashBoxResolution, FundingAllocation, FundingSourceInfo, FundingSourceRef, ResolvedAllocation,
};

/// Validates a split payment and resolves each allocation to a concrete
/// funding source.
///
/// Rules, applied in order:
/// 1. `total` must be strictly positive.
/// 2. No allocation may be negative; zero-amount allocations are dropped.
/// 3. At least one non-zero allocation must remain.
/// 4. The allocations must sum to `total` within the settlement tolerance.
/// 5. Bank allocations must name a bank account; cash-box allocations
///    without an explicit box resolve through `resolution`.
/// 6. Every resolved source must exist, be active, and match the declared
///    kind.
///
/// `lookup` performs read-only funding-source reads; no writes happen here.
///
/// # Errors
///
/// Returns the first `SplitError` encountered; nothing has been written
/// when this function fails.
pub fn validate<L>(
    total: Decimal,
    allocations: &[FundingAllocation],
    resolution: CashBoxResolution,
    lookup: L,
) -> Result<Vec<ResolvedAllocation>, SplitError>
where
    L: Fn(FundingSourceRef) -> Result<FundingSourceInfo, SplitError>,
{
    if total <= Decimal::ZERO {
        return Err(SplitError::NonPositiveTotal(total));
    }

    if let Some(neg) = allocations.iter().find(|a| a.amount < Decimal::ZERO) {
        return Err(SplitError::NegativeAllocation(neg.amount));
    }

    let non_zero: Vec<&FundingAllocation> = allocations
        .iter()
        .filter(|a| a.amount > Decimal::ZERO)
        .collect();
    if non_zero.is_empty() {
        return Err(SplitError::EmptySplit);
    }

    let actual: Decimal = non_zero.iter().map(|a| a.amount).sum();
    if !within_tolerance(actual, total) {
        return Err(SplitError::AmountMismatch {
            expected: total,
            actual,
        });
    }

    let mut resolved = Vec::with_capacity(non_zero.len());
    for allocation in non_zero {
        let source_ref = match (allocation.source, allocation.funding_source_id) {
            (_, Some(id)) => FundingSourceRef::Explicit(id),
            (FundingSourceKind::BankAccount, None) => {
                return Err(SplitError::MissingFundingReference);
            }
            (FundingSourceKind::CashBox, None) => match resolution {
                CashBoxResolution::UsePrincipal => FundingSourceRef::PrincipalCashBox,
                CashBoxResolution::RequireExplicit => {
                    return Err(SplitError::ExplicitCashBoxRequired);
                }
            },
        };

        let info = lookup(source_ref)?;
        if info.kind != allocation.source {
            return Err(SplitError::KindMismatch {
                id: info.id,
                declared: allocation.source,
                actual: info.kind,
            });
        }
        if !info.is_active {
            return Err(SplitError::SourceInactive(info.id));
        }

        resolved.push(ResolvedAllocation {
            funding_source_id: info.id,
            kind: info.kind,
            amount: allocation.amount,
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    struct Fixture {
        principal_box: FundingSourceInfo,
        other_box: FundingSourceInfo,
        bank: FundingSourceInfo,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                principal_box: FundingSourceInfo {
                    id: Uuid::new_v4(),
                    kind: FundingSourceKind::CashBox,
                    is_active: true,
                },
                other_box: FundingSourceInfo {
                    id: Uuid::new_v4(),
                    kind: FundingSourceKind::CashBox,
                    is_active: true,
                },
                bank: FundingSourceInfo {
                    id: Uuid::new_v4(),
                    kind: FundingSourceKind::BankAccount,
                    is_active: true,
                },
            }
        }

        fn lookup(&self) -> impl Fn(FundingSourceRef) -> Result<FundingSourceInfo, SplitError> {
            let principal = self.principal_box;
            let other = self.other_box;
            let bank = self.bank;
            move |source_ref| match source_ref {
                FundingSourceRef::PrincipalCashBox => Ok(principal),
                FundingSourceRef::Explicit(id) if id == principal.id => Ok(principal),
                FundingSourceRef::Explicit(id) if id == other.id => Ok(other),
                FundingSourceRef::Explicit(id) if id == bank.id => Ok(bank),
                FundingSourceRef::Explicit(id) => Err(SplitError::SourceNotFound(id)),
            }
        }
    }

    fn cash(amount: Decimal) -> FundingAllocation {
        FundingAllocation {
            source: FundingSourceKind::CashBox,
            amount,
            funding_source_id: None,
        }
    }

    fn bank(amount: Decimal, id: Option<Uuid>) -> FundingAllocation {
        FundingAllocation {
            source: FundingSourceKind::BankAccount,
            amount,
            funding_source_id: id,
        }
    }

    #[test]
    fn test_valid_split_resolves_sources() {
        let fx = Fixture::new();
        let result = validate(
            dec!(9000),
            &[cash(dec!(4000)), bank(dec!(5000), Some(fx.bank.id))],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        )
        .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].funding_source_id, fx.principal_box.id);
        assert_eq!(result[1].funding_source_id, fx.bank.id);
    }

    #[test]
    fn test_mismatch_outside_tolerance_fails() {
        let fx = Fixture::new();
        // 0.02 short of the total.
        let result = validate(
            dec!(100.00),
            &[cash(dec!(99.98))],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        );
        assert!(matches!(
            result,
            Err(SplitError::AmountMismatch { expected, actual })
                if expected == dec!(100.00) && actual == dec!(99.98)
        ));
    }

    #[test]
    fn test_mismatch_inside_tolerance_succeeds() {
        let fx = Fixture::new();
        // 0.005 short of the total is inside the tolerance.
        let result = validate(
            dec!(100.00),
            &[cash(dec!(99.995))],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_bank_without_reference_fails() {
        let fx = Fixture::new();
        let result = validate(
            dec!(500),
            &[bank(dec!(500), None)],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        );
        assert!(matches!(result, Err(SplitError::MissingFundingReference)));
    }

    #[test]
    fn test_require_explicit_rejects_implicit_cash_box() {
        let fx = Fixture::new();
        let result = validate(
            dec!(500),
            &[cash(dec!(500))],
            CashBoxResolution::RequireExplicit,
            fx.lookup(),
        );
        assert!(matches!(result, Err(SplitError::ExplicitCashBoxRequired)));
    }

    #[test]
    fn test_explicit_cash_box_overrides_principal() {
        let fx = Fixture::new();
        let result = validate(
            dec!(500),
            &[FundingAllocation {
                source: FundingSourceKind::CashBox,
                amount: dec!(500),
                funding_source_id: Some(fx.other_box.id),
            }],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        )
        .unwrap();
        assert_eq!(result[0].funding_source_id, fx.other_box.id);
    }

    #[test]
    fn test_no_principal_designated_fails() {
        let lookup = |source_ref: FundingSourceRef| match source_ref {
            FundingSourceRef::PrincipalCashBox => Err(SplitError::NoPrincipalCashBox),
            FundingSourceRef::Explicit(id) => Err(SplitError::SourceNotFound(id)),
        };
        let result = validate(
            dec!(500),
            &[cash(dec!(500))],
            CashBoxResolution::UsePrincipal,
            lookup,
        );
        assert!(matches!(result, Err(SplitError::NoPrincipalCashBox)));
    }

    #[test]
    fn test_kind_mismatch_fails() {
        let fx = Fixture::new();
        // Declares a bank allocation but points at a cash box.
        let result = validate(
            dec!(500),
            &[bank(dec!(500), Some(fx.other_box.id))],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        );
        assert!(matches!(result, Err(SplitError::KindMismatch { .. })));
    }

    #[test]
    fn test_inactive_source_fails() {
        let inactive = FundingSourceInfo {
            id: Uuid::new_v4(),
            kind: FundingSourceKind::CashBox,
            is_active: false,
        };
        let lookup = move |_: FundingSourceRef| Ok(inactive);
        let result = validate(
            dec!(500),
            &[cash(dec!(500))],
            CashBoxResolution::UsePrincipal,
            lookup,
        );
        assert!(matches!(result, Err(SplitError::SourceInactive(_))));
    }

    #[test]
    fn test_zero_allocations_dropped() {
        let fx = Fixture::new();
        let result = validate(
            dec!(500),
            &[cash(dec!(0)), cash(dec!(500))],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        )
        .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_all_zero_allocations_is_empty_split() {
        let fx = Fixture::new();
        let result = validate(
            dec!(500),
            &[cash(dec!(0))],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        );
        assert!(matches!(result, Err(SplitError::EmptySplit)));
    }

    #[test]
    fn test_negative_allocation_fails() {
        let fx = Fixture::new();
        let result = validate(
            dec!(500),
            &[cash(dec!(600)), cash(dec!(-100))],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        );
        assert!(matches!(result, Err(SplitError::NegativeAllocation(_))));
    }

    #[test]
    fn test_non_positive_total_fails() {
        let fx = Fixture::new();
        let result = validate(
            dec!(0),
            &[cash(dec!(0))],
            CashBoxResolution::UsePrincipal,
            fx.lookup(),
        );
        assert!(matches!(result, Err(SplitError::NonPositiveTotal(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any accepted split's resolved amounts sum to the declared total
        /// within the settlement tolerance.
        #[test]
        fn prop_resolved_sum_matches_total(
            amounts in prop::collection::vec((1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)), 1..6),
        ) {
            let fx = Fixture::new();
            let total: Decimal = amounts.iter().copied().sum();
            let allocations: Vec<FundingAllocation> =
                amounts.iter().map(|&a| cash(a)).collect();

            let resolved = validate(
                total,
                &allocations,
                CashBoxResolution::UsePrincipal,
                fx.lookup(),
            ).unwrap();

            let resolved_sum: Decimal = resolved.iter().map(|r| r.amount).sum();
            prop_assert!(tesoro_shared::types::within_tolerance(resolved_sum, total));
        }
    }
}
