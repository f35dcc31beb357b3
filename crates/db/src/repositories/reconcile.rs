//! Balance reconciliation service.
//!
//! A reconcile recomputes one funding source's balance from its opening
//! balance and full unreversed movement history, persists the result, and
//! refreshes the linked summary account. The recompute reads nothing it
//! writes and writes nothing it reads twice, so it is idempotent and safe
//! to re-run; transient serialization conflicts are retried with a bound.
//!
//! Reconciliation never runs inside a payment transaction. It is invoked
//! strictly after the payment commit, so a reconcile failure can delay a
//! balance refresh but can never undo a durable payment.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, TransactionTrait};
use uuid::Uuid;

use tesoro_core::reconcile::{BalanceInput, compute_balance};

use crate::entities::funding_sources;
use crate::repositories::{FundingSourceRepository, MovementRepository};
use crate::retry::{is_transient, with_retry};

/// Error types for reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Funding source not found.
    #[error("Funding source not found: {0}")]
    FundingSourceNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ReconcileError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Database(err) => is_transient(err),
            Self::FundingSourceNotFound(_) => false,
        }
    }
}

/// Service that recomputes and persists funding source balances.
#[derive(Debug, Clone)]
pub struct ReconcileService {
    db: DatabaseConnection,
    movements: MovementRepository,
    funding_sources: FundingSourceRepository,
    retry_attempts: u32,
}

impl ReconcileService {
    /// Creates a new reconcile service. `retry_attempts` bounds the re-runs
    /// on transient serialization conflicts.
    #[must_use]
    pub fn new(db: DatabaseConnection, retry_attempts: u32) -> Self {
        Self {
            movements: MovementRepository::new(db.clone()),
            funding_sources: FundingSourceRepository::new(db.clone()),
            db,
            retry_attempts: retry_attempts.max(1),
        }
    }

    /// Reconciles one funding source and returns its fresh balance.
    ///
    /// # Errors
    ///
    /// Returns `FundingSourceNotFound` for an unknown source, or a database
    /// error once the bounded retries are exhausted.
    pub async fn reconcile(&self, funding_source_id: Uuid) -> Result<Decimal, ReconcileError> {
        let balance = with_retry(self.retry_attempts, ReconcileError::is_transient, || {
            self.reconcile_once(funding_source_id)
        })
        .await?;
        tracing::debug!(%funding_source_id, %balance, "funding source reconciled");
        Ok(balance)
    }

    async fn reconcile_once(&self, funding_source_id: Uuid) -> Result<Decimal, ReconcileError> {
        let txn = self.db.begin().await?;

        let source = funding_sources::Entity::find_by_id(funding_source_id)
            .one(&txn)
            .await?
            .ok_or(ReconcileError::FundingSourceNotFound(funding_source_id))?;

        let history = self
            .movements
            .unreversed_for_funding_source(&txn, funding_source_id)
            .await?;
        let inputs: Vec<BalanceInput> = history
            .iter()
            .map(|m| BalanceInput {
                direction: m.direction.into(),
                amount: m.amount,
            })
            .collect();
        let balance = compute_balance(source.opening_balance, &inputs);

        let linked_summary = source.linked_summary_account_id;
        self.funding_sources
            .persist_balance(&txn, source, balance)
            .await?;
        if let Some(summary_account_id) = linked_summary {
            self.funding_sources
                .refresh_summary_account(&txn, summary_account_id)
                .await?;
        }

        txn.commit().await?;
        Ok(balance)
    }

    /// Reconciles every active funding source, continuing past individual
    /// failures. Returns the per-source results.
    ///
    /// # Errors
    ///
    /// Returns a database error only if the source listing itself fails.
    pub async fn reconcile_all(&self) -> Result<Vec<(Uuid, Result<Decimal, ReconcileError>)>, DbErr> {
        let sources = self.funding_sources.list_active().await?;
        let mut results = Vec::with_capacity(sources.len());
        for source in sources {
            let outcome = self.reconcile(source.id).await;
            if let Err(err) = &outcome {
                tracing::error!(funding_source_id = %source.id, error = %err, "reconcile failed");
            }
            results.push((source.id, outcome));
        }
        Ok(results)
    }
}
