use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seat state change broadcast to live seat-map subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeatEvent {
    Held {
        show_id: Uuid,
        hold_id: Uuid,
        seat_ids: Vec<Uuid>,
        expires_at: DateTime<Utc>,
    },
    Released {
        show_id: Uuid,
        hold_id: Uuid,
        seat_ids: Vec<Uuid>,
    },
    Booked {
        show_id: Uuid,
        booking_id: Uuid,
        seat_ids: Vec<Uuid>,
    },
}

impl SeatEvent {
    pub fn show_id(&self) -> Uuid {
        match self {
            SeatEvent::Held { show_id, .. } => *show_id,
            SeatEvent::Released { show_id, .. } => *show_id,
            SeatEvent::Booked { show_id, .. } => *show_id,
        }
    }
}
