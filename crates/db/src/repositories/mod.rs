//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! `PaymentService` and `ReconcileService` compose the repositories and own
//! the transaction boundaries.

pub mod funding_source;
pub mod movement;
pub mod obligation;
pub mod payment;
pub mod reconcile;

pub use funding_source::{
    CreateFundingSourceInput, FundingSourceError, FundingSourceRepository, FundingSourceStatus,
};
pub use movement::{MovementFilter, MovementRepository, MovementStoreError};
pub use obligation::{
    CreateObligationInput, ObligationRepository, ObligationStatus, ObligationStoreError,
    PaymentRecord,
};
pub use payment::{PaymentError, PaymentService, ReversalOutcome, SettlePaymentInput};
pub use reconcile::{ReconcileError, ReconcileService};
