use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only show reference data. Owned and mutated outside this engine;
/// prices are immutable for the lifetime of any hold against the show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: Uuid,
    pub title: String,
    /// Price of a REGULAR seat, whole currency units.
    pub base_price: i64,
    /// Price of a PREMIUM seat, whole currency units.
    pub premium_price: i64,
    pub starts_at: DateTime<Utc>,
}
