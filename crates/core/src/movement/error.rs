//! Movement validation errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when recording a ledger movement.
#[derive(Debug, Error)]
pub enum MovementError {
    /// Movement amount must be strictly positive.
    #[error("Movement amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Funding source does not exist.
    #[error("Funding source not found: {0}")]
    FundingSourceNotFound(Uuid),

    /// Funding source exists but is inactive.
    #[error("Funding source {0} is inactive")]
    FundingSourceInactive(Uuid),
}

impl MovementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::FundingSourceNotFound(_) => "FUNDING_SOURCE_NOT_FOUND",
            Self::FundingSourceInactive(_) => "FUNDING_SOURCE_INACTIVE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount(_) | Self::FundingSourceInactive(_) => 400,
            Self::FundingSourceNotFound(_) => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            MovementError::NonPositiveAmount(Decimal::ZERO).error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(
            MovementError::FundingSourceNotFound(Uuid::nil()).error_code(),
            "FUNDING_SOURCE_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            MovementError::NonPositiveAmount(Decimal::ZERO).http_status_code(),
            400
        );
        assert_eq!(
            MovementError::FundingSourceNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            MovementError::FundingSourceInactive(Uuid::nil()).http_status_code(),
            400
        );
    }
}
