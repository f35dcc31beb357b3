//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for movements, obligations, and funding sources
//! - Repository abstractions for data access
//! - The payment and reconciliation services that own database transactions
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod retry;

pub use repositories::{
    FundingSourceRepository, MovementRepository, ObligationRepository, PaymentService,
    ReconcileService,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
