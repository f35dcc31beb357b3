//! Split payment validation errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::movement::FundingSourceKind;

/// Errors raised while validating a split payment.
#[derive(Debug, Error)]
pub enum SplitError {
    /// The payment total must be strictly positive.
    #[error("Payment total must be positive, got {0}")]
    NonPositiveTotal(Decimal),

    /// No non-zero allocations were supplied.
    #[error("Split payment needs at least one non-zero allocation")]
    EmptySplit,

    /// An allocation carried a negative amount.
    #[error("Allocation amounts cannot be negative, got {0}")]
    NegativeAllocation(Decimal),

    /// Allocations do not sum to the payment total.
    #[error("Allocations sum to {actual}, expected {expected}")]
    AmountMismatch {
        /// The declared payment total.
        expected: Decimal,
        /// The actual sum of the allocations.
        actual: Decimal,
    },

    /// A bank allocation did not name a bank account.
    #[error("Bank allocation requires a bank account reference")]
    MissingFundingReference,

    /// Policy requires every cash-box allocation to name its box.
    #[error("Cash box must be named explicitly for this payment")]
    ExplicitCashBoxRequired,

    /// No active principal cash box is designated.
    #[error("No principal cash box is designated")]
    NoPrincipalCashBox,

    /// The referenced funding source does not exist.
    #[error("Funding source not found: {0}")]
    SourceNotFound(Uuid),

    /// The referenced funding source is inactive.
    #[error("Funding source {0} is inactive")]
    SourceInactive(Uuid),

    /// The referenced funding source is not of the declared kind.
    #[error("Funding source {id} is a {actual:?}, allocation declared {declared:?}")]
    KindMismatch {
        /// The funding source ID.
        id: Uuid,
        /// The kind the allocation declared.
        declared: FundingSourceKind,
        /// The kind the source actually has.
        actual: FundingSourceKind,
    },
}

impl SplitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveTotal(_) => "NON_POSITIVE_TOTAL",
            Self::EmptySplit => "EMPTY_SPLIT",
            Self::NegativeAllocation(_) => "NEGATIVE_ALLOCATION",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::MissingFundingReference => "MISSING_FUNDING_REFERENCE",
            Self::ExplicitCashBoxRequired => "EXPLICIT_CASH_BOX_REQUIRED",
            Self::NoPrincipalCashBox => "NO_PRINCIPAL_CASH_BOX",
            Self::SourceNotFound(_) => "FUNDING_SOURCE_NOT_FOUND",
            Self::SourceInactive(_) => "FUNDING_SOURCE_INACTIVE",
            Self::KindMismatch { .. } => "FUNDING_SOURCE_KIND_MISMATCH",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::SourceNotFound(_) => 404,
            Self::NoPrincipalCashBox => 422,
            _ => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_mismatch_names_both_totals() {
        let err = SplitError::AmountMismatch {
            expected: dec!(100.00),
            actual: dec!(99.98),
        };
        assert_eq!(err.to_string(), "Allocations sum to 99.98, expected 100.00");
        assert_eq!(err.error_code(), "AMOUNT_MISMATCH");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_lookup_failures() {
        assert_eq!(SplitError::SourceNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(SplitError::NoPrincipalCashBox.http_status_code(), 422);
        assert_eq!(SplitError::MissingFundingReference.http_status_code(), 400);
    }
}
