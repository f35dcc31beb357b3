//! Funding source and reconciliation routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::routes::app_error_response;
use tesoro_shared::error::AppError;
use tesoro_core::movement::FundingSourceKind;
use tesoro_db::repositories::{
    CreateFundingSourceInput, FundingSourceError, FundingSourceRepository, MovementFilter,
    MovementRepository, ReconcileError,
};

/// Creates the funding sources router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/funding-sources", post(create_funding_source))
        .route("/funding-sources/reconcile", post(reconcile_all))
        .route("/funding-sources/{source_id}", get(get_funding_source))
        .route(
            "/funding-sources/{source_id}/movements",
            get(list_movements),
        )
        .route(
            "/funding-sources/{source_id}/reconcile",
            post(reconcile_one),
        )
}

/// Request body for creating a funding source.
#[derive(Debug, Deserialize)]
pub struct CreateFundingSourceRequest {
    /// Cash box or bank account.
    pub kind: FundingSourceKind,
    /// Human-readable name.
    pub name: String,
    /// Bank account number, for bank accounts.
    pub bank_account_number: Option<String>,
    /// Whether this cash box is the principal one.
    #[serde(default)]
    pub is_principal: bool,
    /// Balance before any recorded movement.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Summary account the reconciler pushes the balance into.
    pub linked_summary_account_id: Option<Uuid>,
}

/// Query parameters for listing movements.
#[derive(Debug, Deserialize)]
pub struct MovementsQuery {
    /// Only movements occurring at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only movements occurring before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Include reversed movements.
    #[serde(default)]
    pub include_reversed: bool,
}

/// POST /funding-sources - Create a funding source.
async fn create_funding_source(
    State(state): State<AppState>,
    Json(payload): Json<CreateFundingSourceRequest>,
) -> Response {
    let repo = FundingSourceRepository::new((*state.db).clone());
    match repo
        .create(CreateFundingSourceInput {
            kind: payload.kind,
            name: payload.name,
            bank_account_number: payload.bank_account_number,
            is_principal: payload.is_principal,
            opening_balance: payload.opening_balance,
            linked_summary_account_id: payload.linked_summary_account_id,
        })
        .await
    {
        Ok(source) => (StatusCode::CREATED, Json(json!(source))).into_response(),
        Err(err) => funding_source_error_response(&err),
    }
}

/// GET `/funding-sources/{source_id}` - Funding source with its reconciled
/// balance.
async fn get_funding_source(
    State(state): State<AppState>,
    Path(source_id): Path<Uuid>,
) -> Response {
    let repo = FundingSourceRepository::new((*state.db).clone());
    match repo.status(source_id).await {
        Ok(status) => Json(json!({
            "funding_source": status.source,
            "computed_balance": status.computed_balance,
            "movement_count": status.movement_count,
        }))
        .into_response(),
        Err(err) => funding_source_error_response(&err),
    }
}

/// GET `/funding-sources/{source_id}/movements` - Movement history, most
/// recent first.
async fn list_movements(
    State(state): State<AppState>,
    Path(source_id): Path<Uuid>,
    Query(query): Query<MovementsQuery>,
) -> Response {
    let repo = MovementRepository::new((*state.db).clone());
    let filter = MovementFilter {
        from: query.from,
        to: query.to,
        include_reversed: query.include_reversed,
    };
    match repo.list_for_funding_source(source_id, &filter).await {
        Ok(movements) => Json(json!({ "movements": movements })).into_response(),
        Err(err) => app_error_response(&AppError::Database(err.to_string())),
    }
}

/// POST `/funding-sources/{source_id}/reconcile` - Recompute and persist the
/// balance from the full movement history.
async fn reconcile_one(State(state): State<AppState>, Path(source_id): Path<Uuid>) -> Response {
    match state.reconciler.reconcile(source_id).await {
        Ok(balance) => Json(json!({
            "funding_source_id": source_id,
            "balance": balance,
        }))
        .into_response(),
        Err(err) => reconcile_error_response(&err),
    }
}

/// POST /funding-sources/reconcile - Reconcile every active funding source.
async fn reconcile_all(State(state): State<AppState>) -> Response {
    match state.reconciler.reconcile_all().await {
        Ok(results) => {
            let body: Vec<_> = results
                .iter()
                .map(|(id, outcome)| match outcome {
                    Ok(balance) => json!({
                        "funding_source_id": id,
                        "balance": balance,
                    }),
                    Err(err) => json!({
                        "funding_source_id": id,
                        "error": err.to_string(),
                    }),
                })
                .collect();
            Json(json!({ "results": body })).into_response()
        }
        Err(err) => app_error_response(&AppError::Database(err.to_string())),
    }
}

fn funding_source_error_response(err: &FundingSourceError) -> Response {
    match err {
        FundingSourceError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "FUNDING_SOURCE_NOT_FOUND",
                "message": format!("Funding source not found: {id}"),
            })),
        )
            .into_response(),
        FundingSourceError::PrincipalAlreadyDesignated => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "PRINCIPAL_ALREADY_DESIGNATED",
                "message": err.to_string(),
            })),
        )
            .into_response(),
        FundingSourceError::NoPrincipalCashBox => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "NO_PRINCIPAL_CASH_BOX",
                "message": err.to_string(),
            })),
        )
            .into_response(),
        FundingSourceError::Database(db_err) => {
            app_error_response(&AppError::Database(db_err.to_string()))
        }
    }
}

fn reconcile_error_response(err: &ReconcileError) -> Response {
    match err {
        ReconcileError::FundingSourceNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "FUNDING_SOURCE_NOT_FOUND",
                "message": format!("Funding source not found: {id}"),
            })),
        )
            .into_response(),
        ReconcileError::Database(db_err) => {
            app_error_response(&AppError::Database(db_err.to_string()))
        }
    }
}
