//! Obligation payment errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when applying or reversing a payment on an obligation.
#[derive(Debug, Error)]
pub enum ObligationError {
    /// Payment amount must be strictly positive.
    #[error("Payment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The payment would push the paid total past the amount due.
    #[error(
        "Payment of {attempted} would overpay obligation: {already_paid} already paid of {total_due} due"
    )]
    Overpayment {
        /// Sum already paid against the obligation.
        already_paid: Decimal,
        /// The amount the caller attempted to pay.
        attempted: Decimal,
        /// The obligation's fixed total.
        total_due: Decimal,
    },

    /// The obligation is already fully settled.
    #[error("Obligation {0} is already settled")]
    AlreadySettled(Uuid),

    /// No unreversed payments exist to reverse.
    #[error("Obligation {0} has no payments to reverse")]
    NothingToReverse(Uuid),
}

impl ObligationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::AlreadySettled(_) => "ALREADY_SETTLED",
            Self::NothingToReverse(_) => "NOTHING_TO_REVERSE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount(_) => 400,
            Self::Overpayment { .. } => 422,
            Self::AlreadySettled(_) => 409,
            Self::NothingToReverse(_) => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overpayment_reports_totals() {
        let err = ObligationError::Overpayment {
            already_paid: dec!(9000),
            attempted: dec!(0.02),
            total_due: dec!(9000),
        };
        assert_eq!(
            err.to_string(),
            "Payment of 0.02 would overpay obligation: 9000 already paid of 9000 due"
        );
        assert_eq!(err.error_code(), "OVERPAYMENT");
        assert_eq!(err.http_status_code(), 422);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ObligationError::AlreadySettled(Uuid::nil()).http_status_code(),
            409
        );
        assert_eq!(
            ObligationError::NothingToReverse(Uuid::nil()).http_status_code(),
            404
        );
    }
}
