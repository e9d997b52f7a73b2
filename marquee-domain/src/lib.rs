pub mod booking;
pub mod events;
pub mod hold;
pub mod seat;
pub mod show;

pub use booking::{Booking, BookingStatus};
pub use events::SeatEvent;
pub use hold::Hold;
pub use seat::{Seat, SeatCategory, SeatStatus};
pub use show::Show;
