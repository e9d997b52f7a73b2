use chrono::{DateTime, Duration, Utc};
use marquee_domain::Hold;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Single source of truth for seat exclusivity.
///
/// Every mutation covers the entire seat set of one operation atomically
/// under that show's mutex; no request ever observes a partially applied
/// transition. Operations on different shows proceed concurrently.
///
/// Lock ordering: a show mutex may be held while taking `hold_index`,
/// never the reverse.
pub struct LockTable {
    shows: RwLock<HashMap<Uuid, Arc<Mutex<ShowLocks>>>>,
    /// hold id -> show id, so releases and promotions need only the hold id.
    hold_index: Mutex<HashMap<Uuid, Uuid>>,
}

#[derive(Default)]
struct ShowLocks {
    holds: HashMap<Uuid, Hold>,
    seat_to_hold: HashMap<Uuid, Uuid>,
    booked: HashSet<Uuid>,
}

/// Outcome of a read-only hold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldValidity {
    Valid { expires_at: DateTime<Utc> },
    Expired,
    NotOwner,
    NotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("seats unavailable: {0:?}")]
    Unavailable(Vec<Uuid>),

    #[error("hold not found")]
    NotFound,

    #[error("hold expired")]
    Expired,

    #[error("hold owned by another requester")]
    NotOwner,
}

/// Point-in-time view of a show's exclusivity state, the feed for the
/// derived seat-status read model.
#[derive(Debug, Clone, Default)]
pub struct SeatSnapshot {
    pub booked: HashSet<Uuid>,
    /// Seat id -> expiry of the unexpired hold covering it.
    pub held: HashMap<Uuid, DateTime<Utc>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self {
            shows: RwLock::new(HashMap::new()),
            hold_index: Mutex::new(HashMap::new()),
        }
    }

    fn show_entry(&self, show_id: Uuid) -> Arc<Mutex<ShowLocks>> {
        {
            let shows = self.shows.read().unwrap();
            if let Some(entry) = shows.get(&show_id) {
                return Arc::clone(entry);
            }
        }
        let mut shows = self.shows.write().unwrap();
        Arc::clone(shows.entry(show_id).or_default())
    }

    fn lookup_show(&self, hold_id: &Uuid) -> Option<Arc<Mutex<ShowLocks>>> {
        let show_id = {
            let index = self.hold_index.lock().unwrap();
            index.get(hold_id).copied()?
        };
        let shows = self.shows.read().unwrap();
        shows.get(&show_id).map(Arc::clone)
    }

    /// Atomically lock every requested seat under a newly minted hold, or
    /// fail naming the seats that are already locked or booked. All or
    /// nothing: a conflict on any seat leaves every other seat untouched.
    ///
    /// A hold whose expiry has already passed does not block the acquire;
    /// the stale hold is removed wholesale before the new one is granted.
    pub fn try_acquire(
        &self,
        show_id: Uuid,
        seat_ids: &[Uuid],
        requester_id: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Hold, LockError> {
        let entry = self.show_entry(show_id);
        let mut locks = entry.lock().unwrap();

        let mut conflicts = Vec::new();
        let mut stale_holds = HashSet::new();
        for seat_id in seat_ids {
            if locks.booked.contains(seat_id) {
                conflicts.push(*seat_id);
                continue;
            }
            if let Some(hold_id) = locks.seat_to_hold.get(seat_id) {
                let hold = &locks.holds[hold_id];
                if hold.is_expired(now) {
                    stale_holds.insert(*hold_id);
                } else {
                    conflicts.push(*seat_id);
                }
            }
        }
        if !conflicts.is_empty() {
            conflicts.sort();
            return Err(LockError::Unavailable(conflicts));
        }

        for hold_id in stale_holds {
            remove_hold(&mut locks, &hold_id);
            self.hold_index.lock().unwrap().remove(&hold_id);
        }

        let hold = Hold {
            id: Uuid::new_v4(),
            show_id,
            requester_id: requester_id.to_string(),
            seat_ids: seat_ids.to_vec(),
            created_at: now,
            expires_at: now + ttl,
        };
        for seat_id in seat_ids {
            locks.seat_to_hold.insert(*seat_id, hold.id);
        }
        locks.holds.insert(hold.id, hold.clone());
        self.hold_index.lock().unwrap().insert(hold.id, show_id);

        debug!(hold_id = %hold.id, %show_id, seats = seat_ids.len(), "seats locked");
        Ok(hold)
    }

    /// Free all seats of a hold. Idempotent: returns `None` if the hold was
    /// already released, expired-and-swept, or promoted.
    pub fn release(&self, hold_id: &Uuid) -> Option<Hold> {
        let entry = self.lookup_show(hold_id)?;
        let mut locks = entry.lock().unwrap();
        let hold = remove_hold(&mut locks, hold_id)?;
        self.hold_index.lock().unwrap().remove(hold_id);
        debug!(%hold_id, "hold released");
        Some(hold)
    }

    /// Ownership-checked voluntary release. A missing hold is success, so a
    /// double release (or a release racing the sweeper) stays idempotent.
    pub fn release_owned(&self, hold_id: &Uuid, requester_id: &str) -> Result<Option<Hold>, LockError> {
        let Some(entry) = self.lookup_show(hold_id) else {
            return Ok(None);
        };
        let mut locks = entry.lock().unwrap();
        match locks.holds.get(hold_id) {
            None => Ok(None),
            Some(hold) if hold.requester_id != requester_id => Err(LockError::NotOwner),
            Some(_) => {
                let hold = remove_hold(&mut locks, hold_id);
                self.hold_index.lock().unwrap().remove(hold_id);
                debug!(%hold_id, "hold released by owner");
                Ok(hold)
            }
        }
    }

    /// Read-only validity check; mutates nothing.
    pub fn validate(&self, hold_id: &Uuid, requester_id: &str, now: DateTime<Utc>) -> HoldValidity {
        let Some(entry) = self.lookup_show(hold_id) else {
            return HoldValidity::NotFound;
        };
        let locks = entry.lock().unwrap();
        match locks.holds.get(hold_id) {
            None => HoldValidity::NotFound,
            Some(hold) if hold.requester_id != requester_id => HoldValidity::NotOwner,
            Some(hold) if hold.is_expired(now) => HoldValidity::Expired,
            Some(hold) => HoldValidity::Valid {
                expires_at: hold.expires_at,
            },
        }
    }

    /// Atomically verify the hold is valid and owned by `requester_id`, then
    /// consume it and mark its seats booked in the same step. The seats are
    /// never observably AVAILABLE in between. Failure mutates nothing; an
    /// expired hold is left for the sweeper.
    pub fn promote(&self, hold_id: &Uuid, requester_id: &str, now: DateTime<Utc>) -> Result<Hold, LockError> {
        let entry = self.lookup_show(hold_id).ok_or(LockError::NotFound)?;
        let mut locks = entry.lock().unwrap();
        match locks.holds.get(hold_id) {
            None => return Err(LockError::NotFound),
            Some(hold) if hold.requester_id != requester_id => return Err(LockError::NotOwner),
            Some(hold) if hold.is_expired(now) => return Err(LockError::Expired),
            Some(_) => {}
        }

        let hold = locks.holds.remove(hold_id).ok_or(LockError::NotFound)?;
        for seat_id in &hold.seat_ids {
            locks.seat_to_hold.remove(seat_id);
            locks.booked.insert(*seat_id);
        }
        self.hold_index.lock().unwrap().remove(hold_id);
        debug!(%hold_id, seats = hold.seat_ids.len(), "hold promoted to booking");
        Ok(hold)
    }

    /// Remove every hold whose expiry has passed, freeing its seats. Returns
    /// the removed holds. The only time-based mutator in the engine.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<Hold> {
        let entries: Vec<Arc<Mutex<ShowLocks>>> = {
            let shows = self.shows.read().unwrap();
            shows.values().map(Arc::clone).collect()
        };

        let mut swept = Vec::new();
        for entry in entries {
            let mut locks = entry.lock().unwrap();
            let expired: Vec<Uuid> = locks
                .holds
                .values()
                .filter(|h| h.is_expired(now))
                .map(|h| h.id)
                .collect();
            for hold_id in expired {
                if let Some(hold) = remove_hold(&mut locks, &hold_id) {
                    self.hold_index.lock().unwrap().remove(&hold_id);
                    swept.push(hold);
                }
            }
        }
        swept
    }

    /// Exclusivity state of a show's seats, unexpired holds only.
    pub fn snapshot(&self, show_id: &Uuid, now: DateTime<Utc>) -> SeatSnapshot {
        let entry = {
            let shows = self.shows.read().unwrap();
            match shows.get(show_id) {
                Some(entry) => Arc::clone(entry),
                None => return SeatSnapshot::default(),
            }
        };
        let locks = entry.lock().unwrap();

        let mut held = HashMap::new();
        for (seat_id, hold_id) in &locks.seat_to_hold {
            let hold = &locks.holds[hold_id];
            if !hold.is_expired(now) {
                held.insert(*seat_id, hold.expires_at);
            }
        }
        SeatSnapshot {
            booked: locks.booked.clone(),
            held,
        }
    }
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_hold(locks: &mut ShowLocks, hold_id: &Uuid) -> Option<Hold> {
    let hold = locks.holds.remove(hold_id)?;
    for seat_id in &hold.seat_ids {
        locks.seat_to_hold.remove(seat_id);
    }
    Some(hold)
}
