pub mod manager;
pub mod models;
pub mod sweeper;

pub use manager::{ReservationError, ReservationManager};
pub use models::{HoldGrant, SeatView};
pub use sweeper::ExpirySweeper;
