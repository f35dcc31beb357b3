//! Split payment domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::movement::FundingSourceKind;

/// One slice of a split payment, as submitted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingAllocation {
    /// The kind of funding source this slice draws from.
    pub source: FundingSourceKind,
    /// The amount allocated to this source.
    pub amount: Decimal,
    /// Explicit funding source reference. Required for bank accounts;
    /// optional for cash boxes (see `CashBoxResolution`).
    pub funding_source_id: Option<Uuid>,
}

/// Policy for resolving a cash-box allocation without an explicit id.
///
/// The back office historically fell back to an implicitly named
/// principal box; that rule is explicit and overridable here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashBoxResolution {
    /// Resolve unspecified cash-box allocations to the designated
    /// principal box.
    #[default]
    UsePrincipal,
    /// Reject allocations that do not name a cash box explicitly.
    RequireExplicit,
}

/// Reference handed to the funding-source lookup during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingSourceRef {
    /// A source named explicitly by id.
    Explicit(Uuid),
    /// The designated principal cash box.
    PrincipalCashBox,
}

/// Funding source facts needed for validation.
#[derive(Debug, Clone, Copy)]
pub struct FundingSourceInfo {
    /// The funding source ID.
    pub id: Uuid,
    /// Cash box or bank account.
    pub kind: FundingSourceKind,
    /// Whether the source is active.
    pub is_active: bool,
}

/// An allocation after validation, bound to a concrete funding source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAllocation {
    /// The concrete funding source the slice draws from.
    pub funding_source_id: Uuid,
    /// The funding source kind.
    pub kind: FundingSourceKind,
    /// The (strictly positive) amount allocated.
    pub amount: Decimal,
}
