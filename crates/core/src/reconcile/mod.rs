//! Funding-source balance recomputation.

mod balance;

pub use balance::{BalanceInput, compute_balance};
