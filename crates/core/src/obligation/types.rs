//! Obligation domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tesoro_shared::types::remaining_amount;

/// Kind of payable obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationKind {
    /// A payroll record owed to an employee.
    Payroll,
    /// An invoice owed by a customer.
    Invoice,
}

/// Settlement lifecycle of an obligation.
///
/// Created `Unsettled`, moves forward as payments accumulate, and never
/// regresses automatically. Only an explicit payment reversal recomputes
/// the state downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    /// No payments applied yet.
    Unsettled,
    /// Some payments applied, total still outstanding.
    PartiallySettled,
    /// Cumulative payments cover the total amount due (within tolerance).
    Settled,
}

impl SettlementState {
    /// Returns true if further payments are accepted in this state.
    #[must_use]
    pub fn accepts_payments(&self) -> bool {
        !matches!(self, Self::Settled)
    }
}

/// Point-in-time view of an obligation, with the derived paid amounts.
///
/// `amount_paid` is always computed by summing unreversed movements that
/// reference the obligation; it is never read from a cached counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObligationSnapshot {
    /// The obligation ID.
    pub id: Uuid,
    /// Payroll or invoice.
    pub kind: ObligationKind,
    /// Total amount due, fixed at creation.
    pub total_amount_due: Decimal,
    /// Sum of unreversed movements referencing this obligation.
    pub amount_paid: Decimal,
    /// Amount still outstanding, floored at zero.
    pub remaining: Decimal,
    /// Current settlement state.
    pub settlement_state: SettlementState,
}

impl ObligationSnapshot {
    /// Builds a snapshot from the obligation's fixed total and the
    /// freshly computed paid sum.
    #[must_use]
    pub fn new(
        id: Uuid,
        kind: ObligationKind,
        total_amount_due: Decimal,
        amount_paid: Decimal,
        settlement_state: SettlementState,
    ) -> Self {
        Self {
            id,
            kind,
            total_amount_due,
            amount_paid,
            remaining: remaining_amount(total_amount_due, amount_paid),
            settlement_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settled_rejects_payments() {
        assert!(SettlementState::Unsettled.accepts_payments());
        assert!(SettlementState::PartiallySettled.accepts_payments());
        assert!(!SettlementState::Settled.accepts_payments());
    }

    #[test]
    fn test_snapshot_remaining_floored() {
        let snap = ObligationSnapshot::new(
            Uuid::new_v4(),
            ObligationKind::Payroll,
            dec!(9000),
            dec!(9000.01),
            SettlementState::Settled,
        );
        assert_eq!(snap.remaining, dec!(0));
    }
}
