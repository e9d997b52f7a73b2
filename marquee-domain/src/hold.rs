use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A temporary exclusive claim on a set of seats, bounded by a TTL.
///
/// The seat set is immutable once the hold exists; resizing means releasing
/// and re-acquiring. A hold is destroyed by exactly one of: explicit release,
/// the expiry sweep, or promotion into a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hold {
    pub id: Uuid,
    pub show_id: Uuid,
    /// Opaque session token of the owner, not a user account.
    pub requester_id: String,
    pub seat_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Authoritative expiry instant. Clients may run a local countdown but
    /// this timestamp is the single source of truth.
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
