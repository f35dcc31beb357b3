//! Obligation settlement state machine and payment application rules.

mod error;
mod tracker;
mod types;

pub use error::ObligationError;
pub use tracker::{check_payment, settlement_state_for};
pub use types::{ObligationKind, ObligationSnapshot, SettlementState};
