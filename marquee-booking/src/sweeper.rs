use chrono::Utc;
use marquee_domain::SeatEvent;
use marquee_store::LockTable;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Background task that reclaims expired holds so seats return to the pool
/// without any client calling back. Runs on its own interval beside the
/// request handlers; all coordination goes through the lock table's own
/// mutual exclusion, never through request lifetimes.
pub struct ExpirySweeper {
    locks: Arc<LockTable>,
    interval: Duration,
    events: Option<broadcast::Sender<SeatEvent>>,
}

impl ExpirySweeper {
    pub fn new(locks: Arc<LockTable>, interval: Duration) -> Self {
        Self {
            locks,
            interval,
            events: None,
        }
    }

    /// Broadcast a `SeatEvent::Released` per swept hold, so live seat maps
    /// refresh without polling.
    pub fn with_events(mut self, tx: broadcast::Sender<SeatEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            let swept = self.locks.sweep_expired(Utc::now());
            if swept.is_empty() {
                debug!("sweep: no expired holds");
                continue;
            }

            info!(count = swept.len(), "sweep: released expired holds");
            if let Some(tx) = &self.events {
                for hold in swept {
                    let _ = tx.send(SeatEvent::Released {
                        show_id: hold.show_id,
                        hold_id: hold.id,
                        seat_ids: hold.seat_ids,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_expired_hold_is_swept_and_seat_reacquirable() {
        let locks = Arc::new(LockTable::new());
        let (tx, mut rx) = broadcast::channel(16);

        let show = Uuid::new_v4();
        let seat = vec![Uuid::new_v4()];
        let hold = locks
            .try_acquire(show, &seat, "guest-x", ChronoDuration::milliseconds(200), Utc::now())
            .unwrap();

        let handle = ExpirySweeper::new(Arc::clone(&locks), Duration::from_millis(50))
            .with_events(tx)
            .spawn();

        // Within one TTL the seat stays taken
        assert!(locks
            .try_acquire(show, &seat, "guest-y", ChronoDuration::seconds(300), Utc::now())
            .is_err());

        // After the TTL plus a sweep interval the seat is free again,
        // with no release call from the owner
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(locks
            .try_acquire(show, &seat, "guest-y", ChronoDuration::seconds(300), Utc::now())
            .is_ok());

        match rx.recv().await.unwrap() {
            SeatEvent::Released { hold_id, seat_ids, .. } => {
                assert_eq!(hold_id, hold.id);
                assert_eq!(seat_ids, seat);
            }
            other => panic!("expected Released event, got {:?}", other),
        }

        handle.abort();
    }
}
