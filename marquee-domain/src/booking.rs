use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finalized, immutable booking. Created exactly once per successful
/// confirmation; there is no cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub show_id: Uuid,
    /// The hold this booking was promoted from. Anchors the idempotent
    /// re-confirm lookup after the hold itself is gone.
    pub hold_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub guest_name: String,
    pub guest_email: String,
    /// Sum of per-category show prices at confirmation time, in whole
    /// currency units.
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "CONFIRMED"),
        }
    }
}
