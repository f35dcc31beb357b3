//! Payment attempt lifecycle types.

mod types;

pub use types::{PaymentOutcome, PaymentPhase};
