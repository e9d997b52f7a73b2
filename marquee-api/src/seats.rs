use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use marquee_booking::SeatView;
use marquee_domain::SeatEvent;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/shows/{show_id}/seats", get(seat_layout))
        .route("/v1/shows/{show_id}/stream", get(seat_stream))
}

/// Derived read model of the whole seating plan. Sweeper-driven releases are
/// visible here without any client action.
async fn seat_layout(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<Vec<SeatView>>, AppError> {
    let layout = state.manager.seat_layout(show_id)?;
    Ok(Json(layout))
}

/// Live stream of seat state changes for one show, so seat maps refresh
/// without polling.
async fn seat_stream(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.show_id() == show_id => {
                let name = match &event {
                    SeatEvent::Held { .. } => "seats_held",
                    SeatEvent::Released { .. } => "seats_released",
                    SeatEvent::Booked { .. } => "seats_booked",
                };
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok::<_, Infallible>(Event::default().event(name).data(data)))
            }
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
