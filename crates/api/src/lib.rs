//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for obligations, payments, and funding sources
//! - JSON error responses carrying stable error codes

pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tesoro_core::split::CashBoxResolution;
use tesoro_db::{PaymentService, ReconcileService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Payment orchestrator.
    pub payments: Arc<PaymentService>,
    /// Balance reconciler.
    pub reconciler: Arc<ReconcileService>,
}

impl AppState {
    /// Builds the application state and its services.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        resolution: CashBoxResolution,
        reconcile_retry_attempts: u32,
    ) -> Self {
        Self {
            payments: Arc::new(PaymentService::new(
                db.clone(),
                resolution,
                reconcile_retry_attempts,
            )),
            reconciler: Arc::new(ReconcileService::new(db.clone(), reconcile_retry_attempts)),
            db: Arc::new(db),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
