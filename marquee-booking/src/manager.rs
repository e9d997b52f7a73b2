use crate::models::{HoldGrant, SeatView};
use chrono::{Duration, Utc};
use marquee_catalog::{pricing, CatalogError, SeatCatalog};
use marquee_domain::{Booking, BookingStatus, Hold, SeatStatus};
use marquee_store::{BookingLedger, HoldValidity, LedgerError, LockError, LockTable};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Public reservation operations layered over the lock table: acquire a
/// hold, confirm it into a booking, release it early. Enforces request
/// validation and the idempotent double-confirm path; all seat exclusivity
/// rules live in the [`LockTable`].
pub struct ReservationManager {
    catalog: Arc<SeatCatalog>,
    locks: Arc<LockTable>,
    ledger: Arc<BookingLedger>,
    hold_ttl: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("seats unavailable: {0:?}")]
    SeatUnavailable(Vec<Uuid>),

    #[error("hold not found")]
    HoldNotFound,

    #[error("hold expired")]
    HoldExpired,

    #[error("hold belongs to another requester")]
    NotHoldOwner,

    #[error("invalid guest info: {0}")]
    InvalidGuestInfo(String),

    #[error("invalid seat selection: {0}")]
    InvalidSeatSelection(String),

    #[error("seats do not belong to the show: {0:?}")]
    ShowMismatch(Vec<Uuid>),

    #[error("show not found: {0}")]
    ShowNotFound(Uuid),

    /// The hold was already promoted; carries the existing booking so the
    /// caller can render it instead of erroring on a double submit.
    #[error("hold already confirmed as booking {}", .0.id)]
    AlreadyBooked(Booking),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A lock table response outside the calling operation's contract.
    /// Surfaces as an internal fault at the API boundary.
    #[error(transparent)]
    Lock(LockError),
}

impl From<CatalogError> for ReservationError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ShowNotFound(id) => ReservationError::ShowNotFound(id),
            CatalogError::UnknownSeats(ids) => ReservationError::ShowMismatch(ids),
        }
    }
}

impl ReservationManager {
    pub fn new(
        catalog: Arc<SeatCatalog>,
        locks: Arc<LockTable>,
        ledger: Arc<BookingLedger>,
        hold_ttl: Duration,
    ) -> Self {
        Self {
            catalog,
            locks,
            ledger,
            hold_ttl,
        }
    }

    /// Place an exclusive hold on a seat set. Mints an opaque requester
    /// token when the caller has none yet. The returned hold carries the
    /// authoritative expiry instant.
    pub fn acquire_hold(
        &self,
        show_id: Uuid,
        seat_ids: &[Uuid],
        requester_id: Option<String>,
    ) -> Result<HoldGrant, ReservationError> {
        if seat_ids.is_empty() {
            return Err(ReservationError::InvalidSeatSelection(
                "no seats requested".to_string(),
            ));
        }
        let distinct: HashSet<&Uuid> = seat_ids.iter().collect();
        if distinct.len() != seat_ids.len() {
            return Err(ReservationError::InvalidSeatSelection(
                "duplicate seat ids in request".to_string(),
            ));
        }

        let seats = self.catalog.seats_by_ids(&show_id, seat_ids)?;

        let requester_id = requester_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let hold = self
            .locks
            .try_acquire(show_id, seat_ids, &requester_id, self.hold_ttl, Utc::now())
            .map_err(|err| match err {
                LockError::Unavailable(conflicts) => ReservationError::SeatUnavailable(conflicts),
                other => ReservationError::Lock(other),
            })?;

        info!(hold_id = %hold.id, %show_id, seats = seats.len(), expires_at = %hold.expires_at, "hold acquired");
        Ok(HoldGrant { hold, seats })
    }

    /// Promote a hold into a permanent booking, priced at this instant.
    ///
    /// Confirming the same hold twice never creates two bookings: the second
    /// call finds the hold consumed, looks the booking up in the ledger and
    /// reports it via [`ReservationError::AlreadyBooked`].
    pub fn confirm_booking(
        &self,
        hold_id: Uuid,
        requester_id: &str,
        guest_name: &str,
        guest_email: &str,
    ) -> Result<Booking, ReservationError> {
        let guest_name = guest_name.trim();
        let guest_email = guest_email.trim();
        if guest_name.is_empty() {
            return Err(ReservationError::InvalidGuestInfo(
                "guest name is required".to_string(),
            ));
        }
        if guest_email.is_empty() || !guest_email.contains('@') {
            return Err(ReservationError::InvalidGuestInfo(
                "a valid guest email is required".to_string(),
            ));
        }

        let now = Utc::now();
        let hold = self
            .locks
            .promote(&hold_id, requester_id, now)
            .map_err(|err| match err {
                LockError::NotFound => match self.booking_for_promoted_hold(&hold_id) {
                    Some(existing) => ReservationError::AlreadyBooked(existing),
                    None => ReservationError::HoldNotFound,
                },
                LockError::Expired => ReservationError::HoldExpired,
                LockError::NotOwner => ReservationError::NotHoldOwner,
                other => ReservationError::Lock(other),
            })?;

        let show = self
            .catalog
            .get_show(&hold.show_id)
            .ok_or(ReservationError::ShowNotFound(hold.show_id))?;
        let seats = self.catalog.seats_by_ids(&hold.show_id, &hold.seat_ids)?;

        let booking = Booking {
            id: Uuid::new_v4(),
            show_id: hold.show_id,
            hold_id: hold.id,
            seat_ids: hold.seat_ids.clone(),
            guest_name: guest_name.to_string(),
            guest_email: guest_email.to_string(),
            total_amount: pricing::total_amount(&show, &seats),
            created_at: now,
            status: BookingStatus::Confirmed,
        };
        self.ledger.append(booking.clone())?;

        info!(booking_id = %booking.id, hold_id = %hold.id, amount = booking.total_amount, "booking confirmed");
        Ok(booking)
    }

    /// Voluntary early release, e.g. the guest navigated away. Idempotent;
    /// returns the released hold when there was one to release.
    pub fn release_hold(
        &self,
        hold_id: Uuid,
        requester_id: &str,
    ) -> Result<Option<Hold>, ReservationError> {
        let released = self
            .locks
            .release_owned(&hold_id, requester_id)
            .map_err(|err| match err {
                LockError::NotOwner => ReservationError::NotHoldOwner,
                other => ReservationError::Lock(other),
            })?;
        if let Some(hold) = &released {
            info!(%hold_id, seats = hold.seat_ids.len(), "hold released early");
        }
        Ok(released)
    }

    /// Read-only check for callers reconciling a local countdown against the
    /// authoritative server expiry.
    pub fn validate_hold(&self, hold_id: Uuid, requester_id: &str) -> HoldValidity {
        self.locks.validate(&hold_id, requester_id, Utc::now())
    }

    /// Derived seat-status read model: BOOKED if promoted, LOCKED while an
    /// unexpired hold covers the seat, AVAILABLE otherwise. Sweeper-driven
    /// releases show up here without any client action.
    pub fn seat_layout(&self, show_id: Uuid) -> Result<Vec<SeatView>, ReservationError> {
        let seats = self.catalog.seats(&show_id)?;
        let snapshot = self.locks.snapshot(&show_id, Utc::now());

        Ok(seats
            .into_iter()
            .map(|seat| {
                let (status, locked_until) = if snapshot.booked.contains(&seat.id) {
                    (SeatStatus::Booked, None)
                } else if let Some(expires_at) = snapshot.held.get(&seat.id) {
                    (SeatStatus::Locked, Some(*expires_at))
                } else {
                    (SeatStatus::Available, None)
                };
                SeatView {
                    id: seat.id,
                    row: seat.row,
                    number: seat.number,
                    category: seat.category,
                    status,
                    locked_until,
                }
            })
            .collect())
    }

    pub fn get_booking(&self, booking_id: &Uuid) -> Option<Booking> {
        self.ledger.get(booking_id)
    }

    pub fn get_show(&self, show_id: &Uuid) -> Option<marquee_domain::Show> {
        self.catalog.get_show(show_id)
    }

    /// Ledger lookup for a hold the lock table no longer knows. A confirm
    /// racing ours may have promoted the hold but not yet appended its
    /// booking; retry briefly before concluding the hold never existed, so
    /// the loser of that race reports the existing booking rather than a
    /// missing hold.
    fn booking_for_promoted_hold(&self, hold_id: &Uuid) -> Option<Booking> {
        const GRACE_RETRIES: usize = 5;
        for _ in 0..GRACE_RETRIES {
            if let Some(existing) = self.ledger.find_by_hold(hold_id) {
                return Some(existing);
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        self.ledger.find_by_hold(hold_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use marquee_domain::{SeatCategory, Show};
    use rand::seq::SliceRandom;
    use rand::Rng;
    use std::thread;

    struct Fixture {
        manager: Arc<ReservationManager>,
        ledger: Arc<BookingLedger>,
        show_id: Uuid,
        seats: Vec<marquee_domain::Seat>,
    }

    fn fixture_with_ttl(ttl: Duration, rows: u32, seats_per_row: u32) -> Fixture {
        let catalog = Arc::new(SeatCatalog::new());
        let show = Show {
            id: Uuid::new_v4(),
            title: "Interstellar".to_string(),
            base_price: 250,
            premium_price: 350,
            starts_at: Utc::now() + Duration::hours(4),
        };
        let show_id = show.id;
        let seats = catalog.register_show(show, rows, seats_per_row);
        let ledger = Arc::new(BookingLedger::new());
        let manager = Arc::new(ReservationManager::new(
            catalog,
            Arc::new(LockTable::new()),
            Arc::clone(&ledger),
            ttl,
        ));
        Fixture {
            manager,
            ledger,
            show_id,
            seats,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_ttl(Duration::seconds(300), 4, 4)
    }

    #[test]
    fn test_hold_confirm_and_idempotent_reconfirm() {
        // Show with A1 REGULAR (250) and A2 PREMIUM (350): rows 1..=4 of 4,
        // rows 2..=4 premium
        let f = fixture();
        let a1 = f.seats.iter().find(|s| s.row == 1).unwrap().id;
        let a2 = f.seats.iter().find(|s| s.row == 4).unwrap().id;

        let grant = f.manager.acquire_hold(f.show_id, &[a1, a2], None).unwrap();
        assert_eq!(grant.seats.len(), 2);
        let requester = grant.hold.requester_id.clone();

        // A second guest contesting A2 is told exactly which seat is taken
        match f.manager.acquire_hold(f.show_id, &[a2], None) {
            Err(ReservationError::SeatUnavailable(conflicts)) => assert_eq!(conflicts, vec![a2]),
            other => panic!("expected SeatUnavailable, got {:?}", other),
        }

        let booking = f
            .manager
            .confirm_booking(grant.hold.id, &requester, "Jane", "jane@x.com")
            .unwrap();
        assert_eq!(booking.total_amount, 600);
        assert_eq!(booking.seat_ids, vec![a1, a2]);
        assert_eq!(booking.status, BookingStatus::Confirmed);

        // Double submit: identical booking back, never a second one
        match f
            .manager
            .confirm_booking(grant.hold.id, &requester, "Jane", "jane@x.com")
        {
            Err(ReservationError::AlreadyBooked(existing)) => {
                assert_eq!(existing.id, booking.id);
                assert_eq!(existing.total_amount, 600);
            }
            other => panic!("expected AlreadyBooked, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_and_duplicate_selections() {
        let f = fixture();
        assert!(matches!(
            f.manager.acquire_hold(f.show_id, &[], None),
            Err(ReservationError::InvalidSeatSelection(_))
        ));

        let seat = f.seats[0].id;
        assert!(matches!(
            f.manager.acquire_hold(f.show_id, &[seat, seat], None),
            Err(ReservationError::InvalidSeatSelection(_))
        ));
    }

    #[test]
    fn test_rejects_foreign_seats_and_unknown_show() {
        let f = fixture();
        let stranger = Uuid::new_v4();
        match f.manager.acquire_hold(f.show_id, &[stranger], None) {
            Err(ReservationError::ShowMismatch(ids)) => assert_eq!(ids, vec![stranger]),
            other => panic!("expected ShowMismatch, got {:?}", other),
        }

        assert!(matches!(
            f.manager.acquire_hold(Uuid::new_v4(), &[f.seats[0].id], None),
            Err(ReservationError::ShowNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_guest_info_before_touching_hold() {
        let f = fixture();
        let grant = f
            .manager
            .acquire_hold(f.show_id, &[f.seats[0].id], None)
            .unwrap();
        let requester = grant.hold.requester_id.clone();

        assert!(matches!(
            f.manager.confirm_booking(grant.hold.id, &requester, "  ", "jane@x.com"),
            Err(ReservationError::InvalidGuestInfo(_))
        ));
        assert!(matches!(
            f.manager.confirm_booking(grant.hold.id, &requester, "Jane", "not-an-email"),
            Err(ReservationError::InvalidGuestInfo(_))
        ));

        // The hold survived the rejected attempts
        let booking = f
            .manager
            .confirm_booking(grant.hold.id, &requester, "Jane", "jane@x.com")
            .unwrap();
        assert_eq!(booking.seat_ids, vec![f.seats[0].id]);
    }

    #[test]
    fn test_confirm_checks_ownership() {
        let f = fixture();
        let grant = f
            .manager
            .acquire_hold(f.show_id, &[f.seats[0].id], None)
            .unwrap();

        assert!(matches!(
            f.manager.confirm_booking(grant.hold.id, "someone-else", "Jane", "jane@x.com"),
            Err(ReservationError::NotHoldOwner)
        ));
    }

    #[test]
    fn test_expired_hold_cannot_confirm() {
        let f = fixture_with_ttl(Duration::zero(), 2, 2);
        let grant = f
            .manager
            .acquire_hold(f.show_id, &[f.seats[0].id], None)
            .unwrap();
        let requester = grant.hold.requester_id.clone();

        assert!(matches!(
            f.manager.confirm_booking(grant.hold.id, &requester, "Jane", "jane@x.com"),
            Err(ReservationError::HoldExpired)
        ));
        assert_eq!(
            f.manager.validate_hold(grant.hold.id, &requester),
            HoldValidity::Expired
        );
    }

    #[test]
    fn test_release_then_reacquire() {
        let f = fixture();
        let seat = f.seats[0].id;
        let grant = f.manager.acquire_hold(f.show_id, &[seat], None).unwrap();
        let requester = grant.hold.requester_id.clone();

        assert!(matches!(
            f.manager.release_hold(grant.hold.id, "intruder"),
            Err(ReservationError::NotHoldOwner)
        ));
        assert!(f.manager.release_hold(grant.hold.id, &requester).unwrap().is_some());
        // Idempotent
        assert!(f.manager.release_hold(grant.hold.id, &requester).unwrap().is_none());

        assert!(f.manager.acquire_hold(f.show_id, &[seat], None).is_ok());
    }

    #[test]
    fn test_seat_layout_reflects_all_states() {
        let f = fixture();
        let locked_seat = f.seats[0].id;
        let booked_seat = f.seats[1].id;

        let held = f.manager.acquire_hold(f.show_id, &[locked_seat], None).unwrap();
        let to_book = f.manager.acquire_hold(f.show_id, &[booked_seat], None).unwrap();
        f.manager
            .confirm_booking(to_book.hold.id, &to_book.hold.requester_id, "Jane", "jane@x.com")
            .unwrap();

        let layout = f.manager.seat_layout(f.show_id).unwrap();
        assert_eq!(layout.len(), f.seats.len());

        let by_id = |id: Uuid| layout.iter().find(|v| v.id == id).unwrap();
        let locked = by_id(locked_seat);
        assert_eq!(locked.status, SeatStatus::Locked);
        assert_eq!(locked.locked_until, Some(held.hold.expires_at));

        let booked = by_id(booked_seat);
        assert_eq!(booked.status, SeatStatus::Booked);
        assert!(booked.locked_until.is_none());

        let available = layout
            .iter()
            .filter(|v| v.status == SeatStatus::Available)
            .count();
        assert_eq!(available, f.seats.len() - 2);
    }

    #[test]
    fn test_premium_and_regular_pricing_per_category() {
        let f = fixture();
        let regular: Vec<Uuid> = f
            .seats
            .iter()
            .filter(|s| s.category == SeatCategory::Regular)
            .take(2)
            .map(|s| s.id)
            .collect();

        let grant = f.manager.acquire_hold(f.show_id, &regular, None).unwrap();
        let booking = f
            .manager
            .confirm_booking(grant.hold.id, &grant.hold.requester_id, "Jane", "jane@x.com")
            .unwrap();
        assert_eq!(booking.total_amount, 500);
    }

    /// Two threads racing to confirm the same hold: the loser lands between
    /// the winner's promote and its ledger append, and must still be told
    /// about the existing booking rather than a missing hold.
    #[test]
    fn test_concurrent_double_confirm_reports_existing_booking() {
        use std::sync::Barrier;

        let f = fixture();
        for pair in f.seats.chunks(2) {
            let picks: Vec<Uuid> = pair.iter().map(|s| s.id).collect();
            let grant = f.manager.acquire_hold(f.show_id, &picks, None).unwrap();
            let requester = grant.hold.requester_id.clone();
            let hold_id = grant.hold.id;

            let barrier = Arc::new(Barrier::new(2));
            let mut handles = Vec::new();
            for _ in 0..2 {
                let manager = Arc::clone(&f.manager);
                let requester = requester.clone();
                let barrier = Arc::clone(&barrier);
                handles.push(thread::spawn(move || {
                    barrier.wait();
                    manager.confirm_booking(hold_id, &requester, "Jane", "jane@x.com")
                }));
            }
            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

            let winners: Vec<&Booking> =
                results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(winners.len(), 1, "exactly one confirm must win");
            let winner_id = winners[0].id;

            for result in &results {
                if let Err(err) = result {
                    match err {
                        ReservationError::AlreadyBooked(existing) => {
                            assert_eq!(existing.id, winner_id);
                        }
                        other => panic!("loser must see AlreadyBooked, got {:?}", other),
                    }
                }
            }
        }
    }

    /// Randomized concurrent acquire/confirm/release storm. Afterwards no
    /// two bookings of the show may share a seat, and every booked seat must
    /// show BOOKED in the layout.
    #[test]
    fn test_randomized_concurrent_operations_keep_bookings_disjoint() {
        let f = fixture_with_ttl(Duration::seconds(300), 6, 6);
        let seat_ids: Vec<Uuid> = f.seats.iter().map(|s| s.id).collect();

        let mut handles = Vec::new();
        for worker in 0..8 {
            let manager = Arc::clone(&f.manager);
            let seat_ids = seat_ids.clone();
            let show_id = f.show_id;
            handles.push(thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for round in 0..50 {
                    let count = rng.gen_range(1..=4);
                    let picks: Vec<Uuid> = seat_ids
                        .choose_multiple(&mut rng, count)
                        .copied()
                        .collect();

                    let grant = match manager.acquire_hold(show_id, &picks, None) {
                        Ok(grant) => grant,
                        Err(ReservationError::SeatUnavailable(_)) => continue,
                        Err(other) => panic!("unexpected acquire failure: {:?}", other),
                    };
                    let requester = grant.hold.requester_id.clone();

                    match rng.gen_range(0..3) {
                        0 => {
                            let name = format!("Guest {}-{}", worker, round);
                            manager
                                .confirm_booking(grant.hold.id, &requester, &name, "guest@example.com")
                                .unwrap();
                        }
                        1 => {
                            manager.release_hold(grant.hold.id, &requester).unwrap();
                        }
                        _ => {} // abandon the hold
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Global invariant: booking seat sets are pairwise disjoint
        let bookings = f.ledger.bookings_for_show(&f.show_id);
        let mut seen = HashSet::new();
        for booking in &bookings {
            for seat_id in &booking.seat_ids {
                assert!(
                    seen.insert(*seat_id),
                    "seat {} appears in two bookings",
                    seat_id
                );
            }
        }

        // And every booked seat shows BOOKED in the read model
        let layout = f.manager.seat_layout(f.show_id).unwrap();
        for view in layout {
            if seen.contains(&view.id) {
                assert_eq!(view.status, SeatStatus::Booked);
            }
        }
    }
}
