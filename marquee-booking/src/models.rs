use chrono::{DateTime, Utc};
use marquee_domain::{Hold, Seat, SeatCategory, SeatStatus};
use serde::Serialize;
use uuid::Uuid;

/// A granted hold together with the seats it covers, as handed back to the
/// caller of `acquire_hold`.
#[derive(Debug, Clone)]
pub struct HoldGrant {
    pub hold: Hold,
    pub seats: Vec<Seat>,
}

/// One seat of the derived read model: catalog data plus the exclusivity
/// status computed from the lock table and ledger at read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub id: Uuid,
    pub row: u32,
    pub number: u32,
    pub category: SeatCategory,
    pub status: SeatStatus,
    /// Expiry of the covering hold; only present while `status` is LOCKED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
}
