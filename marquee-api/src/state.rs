use marquee_booking::ReservationManager;
use marquee_domain::SeatEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ReservationManager>,
    pub sse_tx: broadcast::Sender<SeatEvent>,
}
