use marquee_domain::Booking;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Append-only record of finalized bookings. No update or delete exists;
/// reads serve the idempotent re-confirm check and the receipt view.
pub struct BookingLedger {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    bookings: HashMap<Uuid, Booking>,
    /// Originating hold id -> booking id, for idempotent re-confirmation.
    by_hold: HashMap<Uuid, Uuid>,
    by_show: HashMap<Uuid, Vec<Uuid>>,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("booking already recorded for hold {0}")]
    DuplicateHold(Uuid),

    #[error("booking id already recorded: {0}")]
    DuplicateBooking(Uuid),
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn append(&self, booking: Booking) -> Result<(), LedgerError> {
        let mut inner = self.inner.write().unwrap();
        if inner.bookings.contains_key(&booking.id) {
            return Err(LedgerError::DuplicateBooking(booking.id));
        }
        if inner.by_hold.contains_key(&booking.hold_id) {
            return Err(LedgerError::DuplicateHold(booking.hold_id));
        }

        info!(booking_id = %booking.id, show_id = %booking.show_id, amount = booking.total_amount, "booking recorded");
        inner.by_hold.insert(booking.hold_id, booking.id);
        inner.by_show.entry(booking.show_id).or_default().push(booking.id);
        inner.bookings.insert(booking.id, booking);
        Ok(())
    }

    pub fn get(&self, booking_id: &Uuid) -> Option<Booking> {
        let inner = self.inner.read().unwrap();
        inner.bookings.get(booking_id).cloned()
    }

    /// The booking a given hold was promoted into, if any.
    pub fn find_by_hold(&self, hold_id: &Uuid) -> Option<Booking> {
        let inner = self.inner.read().unwrap();
        let booking_id = inner.by_hold.get(hold_id)?;
        inner.bookings.get(booking_id).cloned()
    }

    pub fn bookings_for_show(&self, show_id: &Uuid) -> Vec<Booking> {
        let inner = self.inner.read().unwrap();
        inner
            .by_show
            .get(show_id)
            .map(|ids| ids.iter().filter_map(|id| inner.bookings.get(id).cloned()).collect())
            .unwrap_or_default()
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}
