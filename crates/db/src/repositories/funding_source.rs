//! Funding source repository.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use tesoro_core::movement::FundingSourceKind;
use tesoro_core::reconcile::{BalanceInput, compute_balance};

use crate::entities::{funding_sources, sea_orm_active_enums, summary_accounts};

/// Error types for funding source operations.
#[derive(Debug, thiserror::Error)]
pub enum FundingSourceError {
    /// Funding source not found.
    #[error("Funding source not found: {0}")]
    NotFound(Uuid),

    /// No active cash box is designated as principal.
    #[error("No principal cash box is designated")]
    NoPrincipalCashBox,

    /// An active principal cash box already exists.
    #[error("An active principal cash box is already designated")]
    PrincipalAlreadyDesignated,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a funding source.
#[derive(Debug, Clone)]
pub struct CreateFundingSourceInput {
    /// Cash box or bank account.
    pub kind: FundingSourceKind,
    /// Human-readable name.
    pub name: String,
    /// Bank account number, for bank accounts.
    pub bank_account_number: Option<String>,
    /// Whether this cash box is the principal one.
    pub is_principal: bool,
    /// Balance before any recorded movement.
    pub opening_balance: Decimal,
    /// Summary account the reconciler pushes the balance into, if any.
    pub linked_summary_account_id: Option<Uuid>,
}

/// A funding source with its cached and freshly recomputed balances.
///
/// The two balances differ only while a post-commit reconcile is pending.
#[derive(Debug, Clone)]
pub struct FundingSourceStatus {
    /// The funding source record, including the cached balance.
    pub source: funding_sources::Model,
    /// Balance recomputed from the full unreversed movement history.
    pub computed_balance: Decimal,
    /// Number of unreversed movements backing the balance.
    pub movement_count: u64,
}

/// Repository for funding sources and their summary accounts.
#[derive(Debug, Clone)]
pub struct FundingSourceRepository {
    db: DatabaseConnection,
}

impl FundingSourceRepository {
    /// Creates a new funding source repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a funding source. The current balance starts at the opening
    /// balance; the first reconcile confirms it.
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails. Designating a second
    /// principal cash box trips the partial unique index.
    pub async fn create(
        &self,
        input: CreateFundingSourceInput,
    ) -> Result<funding_sources::Model, FundingSourceError> {
        let now = Utc::now();
        let source = funding_sources::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(input.kind.into()),
            name: Set(input.name),
            bank_account_number: Set(input.bank_account_number),
            is_principal: Set(input.is_principal),
            is_active: Set(true),
            opening_balance: Set(input.opening_balance),
            current_balance: Set(input.opening_balance),
            linked_summary_account_id: Set(input.linked_summary_account_id),
            reconciled_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        match source.insert(&self.db).await {
            Ok(model) => Ok(model),
            Err(err) if err.to_string().contains("idx_funding_sources_one_principal") => {
                Err(FundingSourceError::PrincipalAlreadyDesignated)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Finds a funding source by id.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<funding_sources::Model>, DbErr> {
        funding_sources::Entity::find_by_id(id).one(&self.db).await
    }

    /// Fetches a funding source together with a balance freshly recomputed
    /// from its unreversed movement history, without persisting it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the funding source does not exist.
    pub async fn status(&self, id: Uuid) -> Result<FundingSourceStatus, FundingSourceError> {
        let source = self
            .find_by_id(id)
            .await?
            .ok_or(FundingSourceError::NotFound(id))?;

        let history = crate::entities::movements::Entity::find()
            .filter(crate::entities::movements::Column::FundingSourceId.eq(id))
            .filter(crate::entities::movements::Column::ReversedAt.is_null())
            .all(&self.db)
            .await?;
        let inputs: Vec<BalanceInput> = history
            .iter()
            .map(|m| BalanceInput {
                direction: m.direction.into(),
                amount: m.amount,
            })
            .collect();
        let computed_balance = compute_balance(source.opening_balance, &inputs);
        let movement_count = history.len() as u64;

        Ok(FundingSourceStatus {
            source,
            computed_balance,
            movement_count,
        })
    }

    /// Finds the designated principal cash box, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find_principal_cash_box(
        &self,
    ) -> Result<Option<funding_sources::Model>, DbErr> {
        funding_sources::Entity::find()
            .filter(
                funding_sources::Column::Kind.eq(sea_orm_active_enums::FundingSourceKind::CashBox),
            )
            .filter(funding_sources::Column::IsPrincipal.eq(true))
            .filter(funding_sources::Column::IsActive.eq(true))
            .one(&self.db)
            .await
    }

    /// Lists all active funding sources.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_active(&self) -> Result<Vec<funding_sources::Model>, DbErr> {
        funding_sources::Entity::find()
            .filter(funding_sources::Column::IsActive.eq(true))
            .all(&self.db)
            .await
    }

    /// Persists a reconciled balance and stamps the reconcile time. Runs on
    /// the caller's connection so the balance write shares the reconcile
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails.
    pub async fn persist_balance<C: ConnectionTrait>(
        &self,
        conn: &C,
        source: funding_sources::Model,
        balance: Decimal,
    ) -> Result<funding_sources::Model, DbErr> {
        let now = Utc::now();
        let mut active: funding_sources::ActiveModel = source.into();
        active.current_balance = Set(balance);
        active.reconciled_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        active.update(conn).await
    }

    /// Recomputes a summary account's balance as the sum of the reconciled
    /// balances of the funding sources linked to it.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn refresh_summary_account<C: ConnectionTrait>(
        &self,
        conn: &C,
        summary_account_id: Uuid,
    ) -> Result<(), DbErr> {
        let Some(account) = summary_accounts::Entity::find_by_id(summary_account_id)
            .one(conn)
            .await?
        else {
            return Ok(());
        };

        let linked = funding_sources::Entity::find()
            .filter(funding_sources::Column::LinkedSummaryAccountId.eq(summary_account_id))
            .filter(funding_sources::Column::IsActive.eq(true))
            .all(conn)
            .await?;
        let balance: Decimal = linked.iter().map(|s| s.current_balance).sum();

        let mut active: summary_accounts::ActiveModel = account.into();
        active.balance = Set(balance);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
        Ok(())
    }
}
