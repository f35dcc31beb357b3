//! Split payment validation.
//!
//! A split payment divides one logical settlement across several funding
//! sources. Validation is pure (read-only lookups only) and runs fully
//! before any ledger write, so an invalid split can never leave partial
//! writes behind.

mod error;
mod types;
mod validator;

pub use error::SplitError;
pub use types::{
    CashBoxResolution, FundingAllocation, FundingSourceInfo, FundingSourceRef, ResolvedAllocation,
};
pub use validator::validate;
