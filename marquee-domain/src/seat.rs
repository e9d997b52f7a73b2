use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single seat of a show's seating plan. Identity is show-scoped; the seat
/// exists for as long as the show does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub row: u32,
    pub number: u32,
    pub category: SeatCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatCategory {
    Regular,
    Premium,
}

/// Derived exclusivity state of a seat. Never stored: computed on read from
/// the lock table and the booking ledger so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Locked,
    Booked,
}

impl std::fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeatStatus::Available => write!(f, "AVAILABLE"),
            SeatStatus::Locked => write!(f, "LOCKED"),
            SeatStatus::Booked => write!(f, "BOOKED"),
        }
    }
}
