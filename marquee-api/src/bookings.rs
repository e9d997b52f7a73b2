use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use marquee_booking::ReservationError;
use marquee_domain::{Booking, SeatEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/confirm", post(confirm_booking))
        .route("/v1/bookings/{booking_id}", get(get_booking))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBookingRequest {
    hold_id: Uuid,
    requester_id: String,
    guest_name: String,
    guest_email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub show_id: Uuid,
    pub seats: Vec<Uuid>,
    pub total_amount: i64,
    pub guest_name: String,
    pub guest_email: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: booking.id,
            show_id: booking.show_id,
            seats: booking.seat_ids,
            total_amount: booking.total_amount,
            guest_name: booking.guest_name,
            guest_email: booking.guest_email,
            created_at: booking.created_at,
            status: booking.status.to_string(),
        }
    }
}

async fn confirm_booking(
    State(state): State<AppState>,
    Json(req): Json<ConfirmBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = match state.manager.confirm_booking(
        req.hold_id,
        &req.requester_id,
        &req.guest_name,
        &req.guest_email,
    ) {
        Ok(booking) => {
            let _ = state.sse_tx.send(SeatEvent::Booked {
                show_id: booking.show_id,
                booking_id: booking.id,
                seat_ids: booking.seat_ids.clone(),
            });
            booking
        }
        // Double submit: answer with the existing booking instead of erroring
        Err(ReservationError::AlreadyBooked(existing)) => existing,
        Err(err) => return Err(err.into()),
    };

    Ok(Json(BookingResponse::from(booking)))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .manager
        .get_booking(&booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking not found: {}", booking_id)))?;
    Ok(Json(BookingResponse::from(booking)))
}
