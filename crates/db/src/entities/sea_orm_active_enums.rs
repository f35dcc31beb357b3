//! `SeaORM` active enums mirroring the Postgres enum types.
//!
//! Each enum has lossless conversions to and from its `tesoro-core`
//! counterpart so repository code can hand plain domain values to the pure
//! rules without leaking `SeaORM` types into the core crate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_direction")]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Money entering the funding source.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money leaving the funding source.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<tesoro_core::movement::MovementDirection> for MovementDirection {
    fn from(value: tesoro_core::movement::MovementDirection) -> Self {
        match value {
            tesoro_core::movement::MovementDirection::Income => Self::Income,
            tesoro_core::movement::MovementDirection::Expense => Self::Expense,
        }
    }
}

impl From<MovementDirection> for tesoro_core::movement::MovementDirection {
    fn from(value: MovementDirection) -> Self {
        match value {
            MovementDirection::Income => Self::Income,
            MovementDirection::Expense => Self::Expense,
        }
    }
}

/// Kind of funding source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "funding_source_kind")]
#[serde(rename_all = "snake_case")]
pub enum FundingSourceKind {
    /// Physical cash box.
    #[sea_orm(string_value = "cash_box")]
    CashBox,
    /// Bank account.
    #[sea_orm(string_value = "bank_account")]
    BankAccount,
}

impl From<tesoro_core::movement::FundingSourceKind> for FundingSourceKind {
    fn from(value: tesoro_core::movement::FundingSourceKind) -> Self {
        match value {
            tesoro_core::movement::FundingSourceKind::CashBox => Self::CashBox,
            tesoro_core::movement::FundingSourceKind::BankAccount => Self::BankAccount,
        }
    }
}

impl From<FundingSourceKind> for tesoro_core::movement::FundingSourceKind {
    fn from(value: FundingSourceKind) -> Self {
        match value {
            FundingSourceKind::CashBox => Self::CashBox,
            FundingSourceKind::BankAccount => Self::BankAccount,
        }
    }
}

/// Settlement state of an obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "settlement_state")]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    /// Nothing paid yet.
    #[sea_orm(string_value = "unsettled")]
    Unsettled,
    /// Some but not all of the amount due has been paid.
    #[sea_orm(string_value = "partially_settled")]
    PartiallySettled,
    /// Fully paid within the settlement tolerance.
    #[sea_orm(string_value = "settled")]
    Settled,
}

impl From<tesoro_core::obligation::SettlementState> for SettlementState {
    fn from(value: tesoro_core::obligation::SettlementState) -> Self {
        match value {
            tesoro_core::obligation::SettlementState::Unsettled => Self::Unsettled,
            tesoro_core::obligation::SettlementState::PartiallySettled => Self::PartiallySettled,
            tesoro_core::obligation::SettlementState::Settled => Self::Settled,
        }
    }
}

impl From<SettlementState> for tesoro_core::obligation::SettlementState {
    fn from(value: SettlementState) -> Self {
        match value {
            SettlementState::Unsettled => Self::Unsettled,
            SettlementState::PartiallySettled => Self::PartiallySettled,
            SettlementState::Settled => Self::Settled,
        }
    }
}

/// Kind of payable or receivable obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "obligation_kind")]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    /// Wages owed to an employee.
    #[sea_orm(string_value = "payroll")]
    Payroll,
    /// Amount owed by a customer against an invoice.
    #[sea_orm(string_value = "invoice")]
    Invoice,
}

impl From<tesoro_core::obligation::ObligationKind> for ObligationKind {
    fn from(value: tesoro_core::obligation::ObligationKind) -> Self {
        match value {
            tesoro_core::obligation::ObligationKind::Payroll => Self::Payroll,
            tesoro_core::obligation::ObligationKind::Invoice => Self::Invoice,
        }
    }
}

impl From<ObligationKind> for tesoro_core::obligation::ObligationKind {
    fn from(value: ObligationKind) -> Self {
        match value {
            ObligationKind::Payroll => Self::Payroll,
            ObligationKind::Invoice => Self::Invoice,
        }
    }
}
