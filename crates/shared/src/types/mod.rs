//! Shared domain types.

pub mod amount;

pub use amount::{remaining_amount, settlement_tolerance, within_tolerance};
