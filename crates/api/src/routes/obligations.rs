//! Obligation and payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::routes::app_error_response;
use tesoro_shared::error::AppError;
use tesoro_core::obligation::ObligationKind;
use tesoro_core::split::FundingAllocation;
use tesoro_db::ObligationRepository;
use tesoro_db::repositories::{
    CreateObligationInput, ObligationStoreError, PaymentError, SettlePaymentInput,
};

/// Creates the obligations router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/obligations", post(create_obligation))
        .route("/obligations/{obligation_id}", get(get_obligation))
        .route("/obligations/{obligation_id}/payments", post(settle_payment))
        .route(
            "/obligations/{obligation_id}/payments/reverse",
            post(reverse_payment),
        )
}

/// Request body for creating an obligation.
#[derive(Debug, Deserialize)]
pub struct CreateObligationRequest {
    /// Payroll or invoice.
    pub kind: ObligationKind,
    /// The employee or customer the obligation is against.
    pub counterparty_id: Uuid,
    /// Free-text description.
    pub description: String,
    /// Total amount due.
    pub total_amount_due: Decimal,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
}

/// Request body for settling (part of) an obligation.
#[derive(Debug, Deserialize)]
pub struct SettlePaymentRequest {
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

/// Request body for reversing the latest payment.
#[derive(Debug, Deserialize)]
pub struct ReversePaymentRequest {
    /// The actor recording the reversal.
    pub actor_id: Uuid,
}

/// POST /obligations - Create a new obligation.
async fn create_obligation(
    State(state): State<AppState>,
    Json(payload): Json<CreateObligationRequest>,
) -> Response {
    if payload.total_amount_due <= Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "NON_POSITIVE_AMOUNT",
                "message": "total_amount_due must be positive"
            })),
        )
            .into_response();
    }

    let repo = ObligationRepository::new((*state.db).clone());
    match repo
        .create(CreateObligationInput {
            kind: payload.kind,
            counterparty_id: payload.counterparty_id,
            description: payload.description,
            total_amount_due: payload.total_amount_due,
            due_date: payload.due_date,
        })
        .await
    {
        Ok(obligation) => (StatusCode::CREATED, Json(json!(obligation))).into_response(),
        Err(err) => obligation_store_error_response(&err),
    }
}

/// GET `/obligations/{obligation_id}` - Obligation with derived amounts and
/// payment history.
async fn get_obligation(
    State(state): State<AppState>,
    Path(obligation_id): Path<Uuid>,
) -> Response {
    let repo = ObligationRepository::new((*state.db).clone());
    match repo.status(obligation_id).await {
        Ok(status) => {
            let payments: Vec<_> = status
                .payments
                .iter()
                .map(|p| {
                    json!({
                        "movement_id": p.movement_id,
                        "direction": p.direction,
                        "amount": p.amount,
                        "funding_source_id": p.funding_source_id,
                        "funding_source_kind": p.funding_source_kind,
                        "occurred_at": p.occurred_at,
                        "reversed": p.reversed,
                    })
                })
                .collect();
            Json(json!({
                "obligation": status.snapshot,
                "payments": payments,
            }))
            .into_response()
        }
        Err(err) => obligation_store_error_response(&err),
    }
}

/// POST `/obligations/{obligation_id}/payments` - Apply a (split, partial)
/// payment.
async fn settle_payment(
    State(state): State<AppState>,
    Path(obligation_id): Path<Uuid>,
    Json(payload): Json<SettlePaymentRequest>,
) -> Response {
    let result = state
        .payments
        .settle_payment(SettlePaymentInput {
            obligation_id,
            total_amount: payload.total_amount,
            allocations: payload.allocations,
            occurred_at: payload.occurred_at,
            actor_id: payload.actor_id,
            note: payload.note,
        })
        .await;

    match result {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(json!({
                "obligation": outcome.obligation,
                "movement_ids": outcome.movement_ids,
                "reconciliation_pending": outcome.reconciliation_pending,
            })),
        )
            .into_response(),
        Err(err) => payment_error_response(&err),
    }
}

/// POST `/obligations/{obligation_id}/payments/reverse` - Reverse the latest
/// unreversed payment.
async fn reverse_payment(
    State(state): State<AppState>,
    Path(obligation_id): Path<Uuid>,
    Json(payload): Json<ReversePaymentRequest>,
) -> Response {
    match state
        .payments
        .reverse_last_payment(obligation_id, payload.actor_id)
        .await
    {
        Ok(outcome) => Json(json!({
            "obligation": outcome.obligation,
            "reversed_movement_ids": outcome.reversed_movement_ids,
            "reconciliation_pending": outcome.reconciliation_pending,
        }))
        .into_response(),
        Err(err) => payment_error_response(&err),
    }
}

/// Maps a payment error to a JSON response with a stable error code.
pub(crate) fn payment_error_response(err: &PaymentError) -> Response {
    if let PaymentError::Database(db_err) = err {
        return app_error_response(&AppError::Database(db_err.to_string()));
    }
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

fn obligation_store_error_response(err: &ObligationStoreError) -> Response {
    match err {
        ObligationStoreError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "OBLIGATION_NOT_FOUND",
                "message": format!("Obligation not found: {id}"),
            })),
        )
            .into_response(),
        ObligationStoreError::Database(db_err) => {
            app_error_response(&AppError::Database(db_err.to_string()))
        }
    }
}
