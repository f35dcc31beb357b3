//! Movement repository: the append-only ledger of monetary events.
//!
//! Movements are never updated or deleted once written; a reversal stamps
//! `reversed_at`/`reversed_by` on the row. Every derived figure (balances,
//! amounts paid) sums only unreversed rows.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use tesoro_core::movement::{MovementError, NewMovement};

use crate::entities::{funding_sources, movements};

/// Error types for movement operations.
#[derive(Debug, thiserror::Error)]
pub enum MovementStoreError {
    /// Domain validation failed.
    #[error(transparent)]
    Movement(#[from] MovementError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter for listing movements of a funding source.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Only movements occurring at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only movements occurring before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Include reversed movements in the listing.
    pub include_reversed: bool,
}

/// Repository for ledger movements.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records one movement on the given connection, which may be a live
    /// transaction. The funding source is checked on the same connection so
    /// the check sees uncommitted rows of the enclosing transaction.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive amount or a missing or
    /// inactive funding source, and a database error otherwise.
    pub async fn record<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: NewMovement,
    ) -> Result<movements::Model, MovementStoreError> {
        input.validate()?;

        let source = funding_sources::Entity::find_by_id(input.funding_source_id)
            .one(conn)
            .await?
            .ok_or(MovementError::FundingSourceNotFound(
                input.funding_source_id,
            ))?;
        if !source.is_active {
            return Err(MovementError::FundingSourceInactive(source.id).into());
        }

        let now = Utc::now();
        let movement = movements::ActiveModel {
            id: Set(Uuid::new_v4()),
            direction: Set(input.direction.into()),
            amount: Set(input.amount),
            funding_source_id: Set(input.funding_source_id),
            obligation_id: Set(input.obligation_id),
            payment_group_id: Set(input.payment_group_id),
            category_id: Set(input.category_id),
            description: Set(input.description),
            occurred_at: Set(input.occurred_at.into()),
            recorded_by: Set(input.recorded_by),
            reversed_at: Set(None),
            reversed_by: Set(None),
            created_at: Set(now.into()),
        };

        Ok(movement.insert(conn).await?)
    }

    /// Lists movements of a funding source, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_for_funding_source(
        &self,
        funding_source_id: Uuid,
        filter: &MovementFilter,
    ) -> Result<Vec<movements::Model>, DbErr> {
        let mut query = movements::Entity::find()
            .filter(movements::Column::FundingSourceId.eq(funding_source_id));

        if let Some(from) = filter.from {
            query = query.filter(movements::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(movements::Column::OccurredAt.lt(to));
        }
        if !filter.include_reversed {
            query = query.filter(movements::Column::ReversedAt.is_null());
        }

        query
            .order_by_desc(movements::Column::OccurredAt)
            .all(&self.db)
            .await
    }

    /// Fetches every unreversed movement of a funding source, for a balance
    /// recompute. Runs on the caller's connection.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn unreversed_for_funding_source<C: ConnectionTrait>(
        &self,
        conn: &C,
        funding_source_id: Uuid,
    ) -> Result<Vec<movements::Model>, DbErr> {
        movements::Entity::find()
            .filter(movements::Column::FundingSourceId.eq(funding_source_id))
            .filter(movements::Column::ReversedAt.is_null())
            .all(conn)
            .await
    }

    /// Stamps a movement as reversed. The row itself is never deleted, so
    /// the audit trail keeps the original event and its reversal mark.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails.
    pub async fn mark_reversed<C: ConnectionTrait>(
        &self,
        conn: &C,
        movement: movements::Model,
        actor_id: Uuid,
    ) -> Result<movements::Model, DbErr> {
        let mut active: movements::ActiveModel = movement.into();
        active.reversed_at = Set(Some(Utc::now().into()));
        active.reversed_by = Set(Some(actor_id));
        active.update(conn).await
    }

    /// Lists the movements referencing an obligation, oldest first. Runs on
    /// the caller's connection.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_for_obligation<C: ConnectionTrait>(
        &self,
        conn: &C,
        obligation_id: Uuid,
        include_reversed: bool,
    ) -> Result<Vec<movements::Model>, DbErr> {
        let mut query =
            movements::Entity::find().filter(movements::Column::ObligationId.eq(obligation_id));
        if !include_reversed {
            query = query.filter(movements::Column::ReversedAt.is_null());
        }
        query
            .order_by_asc(movements::Column::CreatedAt)
            .all(conn)
            .await
    }
}
