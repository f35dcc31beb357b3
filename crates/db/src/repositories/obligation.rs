//! Obligation repository.
//!
//! The paid total of an obligation is never cached: it is derived on every
//! read by summing the unreversed movements referencing the obligation.
//! The stored `settlement_state` is recomputed from that sum inside the
//! same transaction that writes or reverses payments.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use tesoro_core::movement::{FundingSourceKind, MovementDirection};
use tesoro_core::obligation::{ObligationKind, ObligationSnapshot, SettlementState};

use crate::entities::{movements, obligations};

/// Error types for obligation operations.
#[derive(Debug, thiserror::Error)]
pub enum ObligationStoreError {
    /// Obligation not found.
    #[error("Obligation not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an obligation.
#[derive(Debug, Clone)]
pub struct CreateObligationInput {
    /// Payroll or invoice.
    pub kind: ObligationKind,
    /// The employee or customer the obligation is against.
    pub counterparty_id: Uuid,
    /// Free-text description.
    pub description: String,
    /// Total amount due, fixed at creation.
    pub total_amount_due: Decimal,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
}

/// One payment shown in an obligation's payment history.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    /// The ledger movement backing the payment.
    pub movement_id: Uuid,
    /// Income or expense.
    pub direction: MovementDirection,
    /// The amount paid in this movement.
    pub amount: Decimal,
    /// The funding source the payment drew from or landed on.
    pub funding_source_id: Uuid,
    /// The kind of that funding source.
    pub funding_source_kind: FundingSourceKind,
    /// When the monetary event occurred.
    pub occurred_at: chrono::DateTime<Utc>,
    /// Whether the payment has been reversed.
    pub reversed: bool,
}

/// An obligation with its derived amounts and payment history.
#[derive(Debug, Clone)]
pub struct ObligationStatus {
    /// Snapshot with the freshly derived paid and remaining amounts.
    pub snapshot: ObligationSnapshot,
    /// Every payment recorded against the obligation, oldest first,
    /// reversed payments included and flagged.
    pub payments: Vec<PaymentRecord>,
}

/// Repository for obligations.
#[derive(Debug, Clone)]
pub struct ObligationRepository {
    db: DatabaseConnection,
}

impl ObligationRepository {
    /// Creates a new obligation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an obligation in the `Unsettled` state.
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails.
    pub async fn create(
        &self,
        input: CreateObligationInput,
    ) -> Result<obligations::Model, ObligationStoreError> {
        let now = Utc::now();
        let obligation = obligations::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(input.kind.into()),
            counterparty_id: Set(input.counterparty_id),
            description: Set(input.description),
            total_amount_due: Set(input.total_amount_due),
            settlement_state: Set(SettlementState::Unsettled.into()),
            due_date: Set(input.due_date),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(obligation.insert(&self.db).await?)
    }

    /// Finds an obligation by id.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<obligations::Model>, DbErr> {
        obligations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Fetches an obligation inside a transaction with a `FOR UPDATE` row
    /// lock, serializing concurrent payments against the same obligation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the obligation does not exist.
    pub async fn find_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<obligations::Model, ObligationStoreError> {
        obligations::Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or(ObligationStoreError::NotFound(id))
    }

    /// Derives the paid total by summing the unreversed movements that
    /// reference the obligation. Runs on the caller's connection so a
    /// locked transaction sees its own uncommitted writes.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn amount_paid<C: ConnectionTrait>(
        &self,
        conn: &C,
        obligation_id: Uuid,
    ) -> Result<Decimal, DbErr> {
        let rows: Vec<Decimal> = movements::Entity::find()
            .filter(movements::Column::ObligationId.eq(obligation_id))
            .filter(movements::Column::ReversedAt.is_null())
            .select_only()
            .column(movements::Column::Amount)
            .into_tuple()
            .all(conn)
            .await?;
        Ok(rows.into_iter().sum())
    }

    /// Persists a recomputed settlement state.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails.
    pub async fn set_settlement_state<C: ConnectionTrait>(
        &self,
        conn: &C,
        obligation: obligations::Model,
        state: SettlementState,
    ) -> Result<obligations::Model, DbErr> {
        let mut active: obligations::ActiveModel = obligation.into();
        active.settlement_state = Set(state.into());
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await
    }

    /// Builds a snapshot with freshly derived amounts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the obligation does not exist.
    pub async fn snapshot(&self, id: Uuid) -> Result<ObligationSnapshot, ObligationStoreError> {
        let obligation = self
            .find_by_id(id)
            .await?
            .ok_or(ObligationStoreError::NotFound(id))?;
        let paid = self.amount_paid(&self.db, id).await?;
        Ok(ObligationSnapshot::new(
            obligation.id,
            obligation.kind.into(),
            obligation.total_amount_due,
            paid,
            obligation.settlement_state.into(),
        ))
    }

    /// Fetches an obligation with its full payment history.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the obligation does not exist.
    pub async fn status(&self, id: Uuid) -> Result<ObligationStatus, ObligationStoreError> {
        let snapshot = self.snapshot(id).await?;

        let rows = movements::Entity::find()
            .filter(movements::Column::ObligationId.eq(id))
            .order_by_asc(movements::Column::CreatedAt)
            .find_also_related(crate::entities::funding_sources::Entity)
            .all(&self.db)
            .await?;

        let mut payments = Vec::with_capacity(rows.len());
        for (movement, source) in rows {
            // The NOT NULL foreign key guarantees the related row exists.
            let source = source.ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "funding source {} of movement {}",
                    movement.funding_source_id, movement.id
                ))
            })?;
            payments.push(PaymentRecord {
                movement_id: movement.id,
                direction: movement.direction.into(),
                amount: movement.amount,
                funding_source_id: source.id,
                funding_source_kind: source.kind.into(),
                occurred_at: movement.occurred_at.into(),
                reversed: movement.reversed_at.is_some(),
            });
        }

        Ok(ObligationStatus { snapshot, payments })
    }
}
