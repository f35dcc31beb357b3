//! Payment attempt phases and outcome types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::obligation::ObligationSnapshot;

/// Phases of a single payment attempt.
///
/// The write phase is one database transaction; everything before it has
/// no side effects, and reconciliation runs strictly after the commit.
/// A failure after `Written` is a reconciliation failure, not a payment
/// failure: the movements are already durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPhase {
    /// Request accepted, nothing checked yet.
    Received,
    /// Split validated and funding sources resolved; no writes.
    Validated,
    /// Movements and obligation state committed.
    Written,
    /// Balances recomputed for every funding source touched.
    Reconciled,
    /// Outcome returned to the caller.
    Done,
}

/// Result of a settled payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutcome {
    /// The obligation after the payment, with freshly derived amounts.
    pub obligation: ObligationSnapshot,
    /// The ledger movements written for this payment, one per allocation.
    pub movement_ids: Vec<Uuid>,
    /// True when a post-commit reconcile failed and is pending re-run.
    /// The payment itself is durable; balances are briefly stale.
    pub reconciliation_pending: bool,
}
