//! Payment orchestration.
//!
//! A payment runs in three strictly ordered phases:
//!
//! 1. Validation: the split is validated against read-only funding source
//!    lookups; nothing is written.
//! 2. Write: one transaction locks the obligation row, re-derives the paid
//!    total under the lock, applies the payment rules, records one movement
//!    per allocation, and recomputes the settlement state. Any failure
//!    rolls the whole transaction back.
//! 3. Reconcile: after the commit, every touched funding source is
//!    reconciled. A reconcile failure is logged and surfaced as
//!    `reconciliation_pending`; it is never reported as a failed payment,
//!    because the movements are already durable.
//!
//! Reversals follow the same shape: the latest unreversed payment group is
//! marked reversed inside one locked transaction, then balances reconcile.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, TransactionTrait};
use sea_orm::{ColumnTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tesoro_core::movement::{FundingSourceKind, MovementDirection, MovementError, NewMovement};
use tesoro_core::obligation::{
    ObligationError, ObligationKind, ObligationSnapshot, check_payment, settlement_state_for,
};
use tesoro_core::payment::{PaymentOutcome, PaymentPhase};
use tesoro_core::split::{
    self, CashBoxResolution, FundingAllocation, FundingSourceInfo, FundingSourceRef, SplitError,
};

use crate::entities::{funding_sources, movement_categories};
use crate::repositories::{
    FundingSourceRepository, MovementRepository, MovementStoreError, ObligationRepository,
    ObligationStoreError, ReconcileService,
};
use crate::retry::is_transient;

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The split payment failed validation.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// The payment violated an obligation rule.
    #[error(transparent)]
    Rule(#[from] ObligationError),

    /// A movement failed validation.
    #[error(transparent)]
    Movement(#[from] MovementError),

    /// Obligation not found.
    #[error("Obligation not found: {0}")]
    ObligationNotFound(Uuid),

    /// A concurrent payment won the obligation lock race.
    #[error("Concurrent modification detected, please retry")]
    ConcurrencyConflict,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Split(err) => err.error_code(),
            Self::Rule(err) => err.error_code(),
            Self::Movement(err) => err.error_code(),
            Self::ObligationNotFound(_) => "OBLIGATION_NOT_FOUND",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Split(err) => err.http_status_code(),
            Self::Rule(err) => err.http_status_code(),
            Self::Movement(err) => err.http_status_code(),
            Self::ObligationNotFound(_) => 404,
            Self::ConcurrencyConflict => 409,
            Self::Database(_) => 500,
        }
    }

    fn from_db(err: DbErr) -> Self {
        if is_transient(&err) {
            Self::ConcurrencyConflict
        } else {
            Self::Database(err)
        }
    }

    fn map_conflict(self) -> Self {
        match self {
            Self::Database(err) => Self::from_db(err),
            other => other,
        }
    }
}

impl From<MovementStoreError> for PaymentError {
    fn from(err: MovementStoreError) -> Self {
        match err {
            MovementStoreError::Movement(inner) => Self::Movement(inner),
            MovementStoreError::Database(inner) => Self::Database(inner),
        }
    }
}

impl From<ObligationStoreError> for PaymentError {
    fn from(err: ObligationStoreError) -> Self {
        match err {
            ObligationStoreError::NotFound(id) => Self::ObligationNotFound(id),
            ObligationStoreError::Database(inner) => Self::Database(inner),
        }
    }
}

/// Input for settling (part of) an obligation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlePaymentInput {
    /// The obligation being settled.
    pub obligation_id: Uuid,
    /// The payment total; the allocations must sum to it.
    pub total_amount: Decimal,
    /// How the total splits across funding sources.
    pub allocations: Vec<FundingAllocation>,
    /// When the monetary event occurred; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
    /// The actor recording the payment.
    pub actor_id: Uuid,
    /// Optional free-text note recorded on each movement.
    pub note: Option<String>,
}

/// Result of reversing a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReversalOutcome {
    /// The obligation after the reversal, with freshly derived amounts.
    pub obligation: ObligationSnapshot,
    /// The movements that were marked reversed.
    pub reversed_movement_ids: Vec<Uuid>,
    /// True when a post-commit reconcile failed and is pending re-run.
    pub reconciliation_pending: bool,
}

/// Orchestrates payments against obligations.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: DatabaseConnection,
    movements: MovementRepository,
    obligations: ObligationRepository,
    funding_sources: FundingSourceRepository,
    reconciler: ReconcileService,
    resolution: CashBoxResolution,
}

impl PaymentService {
    /// Creates a new payment service. `resolution` decides how cash-box
    /// allocations without an explicit box are resolved; `retry_attempts`
    /// bounds the reconcile retries.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        resolution: CashBoxResolution,
        retry_attempts: u32,
    ) -> Self {
        Self {
            movements: MovementRepository::new(db.clone()),
            obligations: ObligationRepository::new(db.clone()),
            funding_sources: FundingSourceRepository::new(db.clone()),
            reconciler: ReconcileService::new(db.clone(), retry_attempts),
            db,
            resolution,
        }
    }

    /// Applies a (possibly split, possibly partial) payment to an
    /// obligation.
    ///
    /// # Errors
    ///
    /// Returns a validation or rule error before anything is written, a
    /// `ConcurrencyConflict` when a concurrent payment aborted the
    /// transaction, or a database error. A reconcile failure after the
    /// commit is not an error; it sets `reconciliation_pending`.
    pub async fn settle_payment(
        &self,
        input: SettlePaymentInput,
    ) -> Result<PaymentOutcome, PaymentError> {
        let resolved = self
            .resolve_allocations(input.total_amount, &input.allocations)
            .await?;
        tracing::debug!(
            obligation_id = %input.obligation_id,
            phase = ?PaymentPhase::Validated,
            allocations = resolved.len(),
            "split validated, funding sources resolved"
        );

        let txn = self.db.begin().await?;
        let written = match self.write_payment(&txn, &input, &resolved).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(
                        obligation_id = %input.obligation_id,
                        error = %rollback_err,
                        "payment transaction rollback failed"
                    );
                }
                return Err(err.map_conflict());
            }
        };
        txn.commit().await.map_err(PaymentError::from_db)?;
        tracing::debug!(
            obligation_id = %input.obligation_id,
            phase = ?PaymentPhase::Written,
            movements = written.movement_ids.len(),
            "payment movements committed"
        );

        let reconciliation_pending = self.reconcile_touched(&written.touched_sources).await;
        tracing::debug!(
            obligation_id = %input.obligation_id,
            phase = ?PaymentPhase::Reconciled,
            reconciliation_pending,
            "touched funding sources reconciled"
        );

        let obligation = self.obligations.snapshot(input.obligation_id).await?;
        tracing::info!(
            obligation_id = %input.obligation_id,
            total_amount = %input.total_amount,
            settlement_state = ?obligation.settlement_state,
            "payment settled"
        );
        Ok(PaymentOutcome {
            obligation,
            movement_ids: written.movement_ids,
            reconciliation_pending,
        })
    }

    /// Reverses the most recent unreversed payment on an obligation. All
    /// movements written together (one per allocation of a split payment)
    /// are reversed together.
    ///
    /// # Errors
    ///
    /// Returns `NothingToReverse` if no unreversed payment exists,
    /// `ObligationNotFound` for an unknown obligation, or a database error.
    pub async fn reverse_last_payment(
        &self,
        obligation_id: Uuid,
        actor_id: Uuid,
    ) -> Result<ReversalOutcome, PaymentError> {
        let txn = self.db.begin().await?;
        let written = match self.write_reversal(&txn, obligation_id, actor_id).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(
                        %obligation_id,
                        error = %rollback_err,
                        "reversal transaction rollback failed"
                    );
                }
                return Err(err.map_conflict());
            }
        };
        txn.commit().await.map_err(PaymentError::from_db)?;

        tracing::info!(
            %obligation_id,
            movements = written.movement_ids.len(),
            "payment reversed"
        );

        let reconciliation_pending = self.reconcile_touched(&written.touched_sources).await;
        let obligation = self.obligations.snapshot(obligation_id).await?;
        Ok(ReversalOutcome {
            obligation,
            reversed_movement_ids: written.movement_ids,
            reconciliation_pending,
        })
    }

    /// Pre-fetches the funding sources the allocations may resolve to, then
    /// runs the pure split validation against the fetched facts.
    async fn resolve_allocations(
        &self,
        total: Decimal,
        allocations: &[FundingAllocation],
    ) -> Result<Vec<split::ResolvedAllocation>, PaymentError> {
        let mut explicit: HashMap<Uuid, FundingSourceInfo> = HashMap::new();
        for allocation in allocations {
            if let Some(id) = allocation.funding_source_id
                && !explicit.contains_key(&id)
                && let Some(source) = self.funding_sources.find_by_id(id).await?
            {
                explicit.insert(id, source_info(&source));
            }
        }

        let needs_principal = allocations.iter().any(|a| {
            a.funding_source_id.is_none() && a.source == FundingSourceKind::CashBox
        });
        let principal = if needs_principal && self.resolution == CashBoxResolution::UsePrincipal {
            self.funding_sources
                .find_principal_cash_box()
                .await?
                .map(|source| source_info(&source))
        } else {
            None
        };

        let resolved = split::validate(total, allocations, self.resolution, |source_ref| {
            match source_ref {
                FundingSourceRef::Explicit(id) => explicit
                    .get(&id)
                    .copied()
                    .ok_or(SplitError::SourceNotFound(id)),
                FundingSourceRef::PrincipalCashBox => {
                    principal.ok_or(SplitError::NoPrincipalCashBox)
                }
            }
        })?;
        Ok(resolved)
    }

    async fn write_payment(
        &self,
        txn: &DatabaseTransaction,
        input: &SettlePaymentInput,
        resolved: &[split::ResolvedAllocation],
    ) -> Result<WrittenMovements, PaymentError> {
        let obligation = self
            .obligations
            .find_for_update(txn, input.obligation_id)
            .await?;
        let already_paid = self.obligations.amount_paid(txn, obligation.id).await?;
        let kind: ObligationKind = obligation.kind.into();

        check_payment(
            obligation.id,
            obligation.total_amount_due,
            already_paid,
            obligation.settlement_state.into(),
            input.total_amount,
        )?;

        // Payroll pays money out; an invoice receipt brings money in.
        let direction = match kind {
            ObligationKind::Payroll => MovementDirection::Expense,
            ObligationKind::Invoice => MovementDirection::Income,
        };
        let category_id = self.settlement_category(txn, kind).await?;
        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);
        let description = input
            .note
            .clone()
            .unwrap_or_else(|| format!("Settlement: {}", obligation.description));

        // All legs of this payment carry one group id so a reversal can
        // find them together.
        let payment_group_id = Uuid::new_v4();
        let mut movement_ids = Vec::with_capacity(resolved.len());
        let mut touched_sources = BTreeSet::new();
        for allocation in resolved {
            let movement = self
                .movements
                .record(
                    txn,
                    NewMovement {
                        direction,
                        amount: allocation.amount,
                        funding_source_id: allocation.funding_source_id,
                        obligation_id: Some(obligation.id),
                        payment_group_id: Some(payment_group_id),
                        category_id,
                        description: description.clone(),
                        occurred_at,
                        recorded_by: input.actor_id,
                    },
                )
                .await?;
            movement_ids.push(movement.id);
            touched_sources.insert(allocation.funding_source_id);
        }

        // Re-derive the paid total from the movements just written so the
        // cached state can never disagree with the ledger.
        let paid = self.obligations.amount_paid(txn, obligation.id).await?;
        let state = settlement_state_for(obligation.total_amount_due, paid);
        self.obligations
            .set_settlement_state(txn, obligation, state)
            .await?;

        Ok(WrittenMovements {
            movement_ids,
            touched_sources,
        })
    }

    async fn write_reversal(
        &self,
        txn: &DatabaseTransaction,
        obligation_id: Uuid,
        actor_id: Uuid,
    ) -> Result<WrittenMovements, PaymentError> {
        let obligation = self.obligations.find_for_update(txn, obligation_id).await?;

        let unreversed = self
            .movements
            .list_for_obligation(txn, obligation_id, false)
            .await?;
        let Some(latest) = unreversed.last() else {
            return Err(ObligationError::NothingToReverse(obligation_id).into());
        };

        // Movements of one split payment share a payment group id; the
        // whole group reverses together.
        let latest_id = latest.id;
        let group_id = latest.payment_group_id;
        let group: Vec<_> = unreversed
            .into_iter()
            .filter(|m| match group_id {
                Some(id) => m.payment_group_id == Some(id),
                None => m.id == latest_id,
            })
            .collect();

        let mut movement_ids = Vec::with_capacity(group.len());
        let mut touched_sources = BTreeSet::new();
        for movement in group {
            movement_ids.push(movement.id);
            touched_sources.insert(movement.funding_source_id);
            self.movements.mark_reversed(txn, movement, actor_id).await?;
        }

        let paid = self.obligations.amount_paid(txn, obligation_id).await?;
        let state = settlement_state_for(obligation.total_amount_due, paid);
        self.obligations
            .set_settlement_state(txn, obligation, state)
            .await?;

        Ok(WrittenMovements {
            movement_ids,
            touched_sources,
        })
    }

    /// Reconciles every funding source a committed write touched. Failures
    /// are logged and reported as pending, never as payment failures.
    async fn reconcile_touched(&self, touched: &BTreeSet<Uuid>) -> bool {
        let mut pending = false;
        for funding_source_id in touched {
            if let Err(err) = self.reconciler.reconcile(*funding_source_id).await {
                tracing::error!(
                    %funding_source_id,
                    error = %err,
                    "post-commit reconcile failed, balance refresh pending"
                );
                pending = true;
            }
        }
        pending
    }

    async fn settlement_category(
        &self,
        txn: &DatabaseTransaction,
        kind: ObligationKind,
    ) -> Result<Option<Uuid>, DbErr> {
        let code = match kind {
            ObligationKind::Payroll => "payroll_settlement",
            ObligationKind::Invoice => "invoice_settlement",
        };
        Ok(movement_categories::Entity::find()
            .filter(movement_categories::Column::Code.eq(code))
            .one(txn)
            .await?
            .map(|category| category.id))
    }
}

struct WrittenMovements {
    movement_ids: Vec<Uuid>,
    touched_sources: BTreeSet<Uuid>,
}

fn source_info(source: &funding_sources::Model) -> FundingSourceInfo {
    FundingSourceInfo {
        id: source.id,
        kind: source.kind.into(),
        is_active: source.is_active,
    }
}
