use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_booking::ReservationError;
use serde_json::json;

/// Boundary error type. Every reservation failure is an expected,
/// caller-recoverable condition mapped to a distinct status so the UI can
/// render the right message; only genuinely internal faults become 500s.
#[derive(Debug)]
pub enum AppError {
    Reservation(ReservationError),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        AppError::Reservation(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Reservation(err) => reservation_response(err),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

fn reservation_response(err: ReservationError) -> Response {
    match err {
        ReservationError::SeatUnavailable(conflicts) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "some seats are already locked or booked",
                "conflictSeats": conflicts,
            })),
        )
            .into_response(),
        ReservationError::HoldNotFound => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() }))).into_response()
        }
        ReservationError::HoldExpired => {
            (StatusCode::GONE, Json(json!({ "error": err.to_string() }))).into_response()
        }
        ReservationError::NotHoldOwner => {
            (StatusCode::FORBIDDEN, Json(json!({ "error": err.to_string() }))).into_response()
        }
        ReservationError::InvalidGuestInfo(_) | ReservationError::InvalidSeatSelection(_) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response()
        }
        ReservationError::ShowMismatch(seats) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "seats do not belong to the show",
                "conflictSeats": seats,
            })),
        )
            .into_response(),
        ReservationError::ShowNotFound(show_id) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("show not found: {}", show_id) })),
        )
            .into_response(),
        // Double submits are safe: hand the existing booking back. Handlers
        // normally catch this before it gets here.
        ReservationError::AlreadyBooked(booking) => {
            (StatusCode::OK, Json(crate::bookings::BookingResponse::from(booking))).into_response()
        }
        err @ (ReservationError::Ledger(_) | ReservationError::Lock(_)) => {
            tracing::error!("Reservation fault: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_store::{LedgerError, LockError};
    use uuid::Uuid;

    #[test]
    fn test_store_faults_map_to_internal_server_error() {
        let lock = AppError::from(ReservationError::Lock(LockError::Unavailable(vec![])));
        assert_eq!(lock.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let ledger = AppError::from(ReservationError::Ledger(LedgerError::DuplicateHold(
            Uuid::new_v4(),
        )));
        assert_eq!(ledger.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
