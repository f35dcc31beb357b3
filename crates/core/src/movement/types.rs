//! Ledger movement domain types.
//!
//! A movement is one immutable monetary event against a funding source.
//! Corrections are recorded as reversal marks on existing movements,
//! never as edits to the amount.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MovementError;

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Money entering the funding source.
    Income,
    /// Money leaving the funding source.
    Expense,
}

/// Kind of funding source a movement is recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingSourceKind {
    /// A physical cash box.
    CashBox,
    /// A bank-linked account.
    BankAccount,
}

/// Input for recording a new ledger movement.
#[derive(Debug, Clone)]
pub struct NewMovement {
    /// Whether this movement is income or expense for the funding source.
    pub direction: MovementDirection,
    /// The amount moved (must be strictly positive).
    pub amount: Decimal,
    /// The funding source the movement is recorded against.
    pub funding_source_id: Uuid,
    /// The obligation this movement settles, if any.
    pub obligation_id: Option<Uuid>,
    /// Groups the movements written together by one split payment, so a
    /// reversal can find every leg of that payment.
    pub payment_group_id: Option<Uuid>,
    /// Optional movement category.
    pub category_id: Option<Uuid>,
    /// Free-text description.
    pub description: String,
    /// When the monetary event occurred.
    pub occurred_at: DateTime<Utc>,
    /// The actor who recorded the movement.
    pub recorded_by: Uuid,
}

impl NewMovement {
    /// Validates the movement input before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns `MovementError::NonPositiveAmount` if the amount is zero
    /// or negative.
    pub fn validate(&self) -> Result<(), MovementError> {
        if self.amount <= Decimal::ZERO {
            return Err(MovementError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

/// Signed contribution of a movement to its funding source's balance.
#[must_use]
pub fn signed_amount(direction: MovementDirection, amount: Decimal) -> Decimal {
    match direction {
        MovementDirection::Income => amount,
        MovementDirection::Expense => -amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_movement(amount: Decimal) -> NewMovement {
        NewMovement {
            direction: MovementDirection::Expense,
            amount,
            funding_source_id: Uuid::new_v4(),
            obligation_id: None,
            payment_group_id: None,
            category_id: None,
            description: "office supplies".to_string(),
            occurred_at: Utc::now(),
            recorded_by: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_positive_amount_is_valid() {
        assert!(make_movement(dec!(150.25)).validate().is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result = make_movement(dec!(0)).validate();
        assert!(matches!(result, Err(MovementError::NonPositiveAmount(_))));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = make_movement(dec!(-10)).validate();
        assert!(matches!(result, Err(MovementError::NonPositiveAmount(_))));
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(
            signed_amount(MovementDirection::Income, dec!(100)),
            dec!(100)
        );
        assert_eq!(
            signed_amount(MovementDirection::Expense, dec!(100)),
            dec!(-100)
        );
    }
}
