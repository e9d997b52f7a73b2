use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use marquee_domain::{Seat, SeatEvent};
use marquee_store::HoldValidity;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/shows/{show_id}/holds", post(acquire_hold))
        .route("/v1/holds/{hold_id}", get(validate_hold).delete(release_hold))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcquireHoldRequest {
    seat_ids: Vec<Uuid>,
    /// Opaque session token from an earlier hold; minted server-side if absent.
    requester_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AcquireHoldResponse {
    hold_id: Uuid,
    requester_id: String,
    /// Authoritative expiry. Local countdowns reconcile against this, never
    /// the other way round.
    expires_at: DateTime<Utc>,
    seats: Vec<Seat>,
}

async fn acquire_hold(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    Json(req): Json<AcquireHoldRequest>,
) -> Result<Json<AcquireHoldResponse>, AppError> {
    let grant = state
        .manager
        .acquire_hold(show_id, &req.seat_ids, req.requester_id)?;

    let _ = state.sse_tx.send(SeatEvent::Held {
        show_id,
        hold_id: grant.hold.id,
        seat_ids: grant.hold.seat_ids.clone(),
        expires_at: grant.hold.expires_at,
    });

    Ok(Json(AcquireHoldResponse {
        hold_id: grant.hold.id,
        requester_id: grant.hold.requester_id,
        expires_at: grant.hold.expires_at,
        seats: grant.seats,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequesterQuery {
    requester_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateHoldResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

async fn validate_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
    Query(query): Query<RequesterQuery>,
) -> Json<ValidateHoldResponse> {
    let response = match state.manager.validate_hold(hold_id, &query.requester_id) {
        HoldValidity::Valid { expires_at } => ValidateHoldResponse {
            status: "VALID",
            expires_at: Some(expires_at),
        },
        HoldValidity::Expired => ValidateHoldResponse {
            status: "EXPIRED",
            expires_at: None,
        },
        HoldValidity::NotOwner => ValidateHoldResponse {
            status: "NOT_OWNER",
            expires_at: None,
        },
        HoldValidity::NotFound => ValidateHoldResponse {
            status: "NOT_FOUND",
            expires_at: None,
        },
    };
    Json(response)
}

async fn release_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
    Query(query): Query<RequesterQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    if let Some(hold) = state.manager.release_hold(hold_id, &query.requester_id)? {
        let _ = state.sse_tx.send(SeatEvent::Released {
            show_id: hold.show_id,
            hold_id: hold.id,
            seat_ids: hold.seat_ids,
        });
    }
    Ok(Json(json!({ "ok": true })))
}
