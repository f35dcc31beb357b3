//! Ledger movement domain types and validation.

mod error;
mod types;

pub use error::MovementError;
pub use types::{FundingSourceKind, MovementDirection, NewMovement, signed_amount};
