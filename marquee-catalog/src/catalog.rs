use marquee_domain::{Seat, SeatCategory, Show};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Static per-show seat inventory. Read-mostly: shows are provisioned once
/// and never change while the engine runs.
pub struct SeatCatalog {
    shows: RwLock<HashMap<Uuid, ShowEntry>>,
}

struct ShowEntry {
    show: Show,
    /// Seats keyed by id for membership checks.
    seats: HashMap<Uuid, Seat>,
    /// Seat ids in (row, number) order for layout rendering.
    ordered: Vec<Uuid>,
}

impl SeatCatalog {
    pub fn new() -> Self {
        Self {
            shows: RwLock::new(HashMap::new()),
        }
    }

    /// Provision the seating plan for a show: `rows` x `seats_per_row`, the
    /// last 3 rows PREMIUM, the rest REGULAR.
    pub fn register_show(&self, show: Show, rows: u32, seats_per_row: u32) -> Vec<Seat> {
        let mut seats = HashMap::new();
        let mut ordered = Vec::new();

        for row in 1..=rows {
            for number in 1..=seats_per_row {
                let seat = Seat {
                    id: Uuid::new_v4(),
                    row,
                    number,
                    category: category_for_row(row, rows),
                };
                ordered.push(seat.id);
                seats.insert(seat.id, seat);
            }
        }

        let plan: Vec<Seat> = ordered.iter().map(|id| seats[id].clone()).collect();
        let mut shows = self.shows.write().unwrap();
        shows.insert(
            show.id,
            ShowEntry {
                show,
                seats,
                ordered,
            },
        );
        plan
    }

    pub fn get_show(&self, show_id: &Uuid) -> Option<Show> {
        let shows = self.shows.read().unwrap();
        shows.get(show_id).map(|e| e.show.clone())
    }

    /// All seats of a show in (row, number) order.
    pub fn seats(&self, show_id: &Uuid) -> Result<Vec<Seat>, CatalogError> {
        let shows = self.shows.read().unwrap();
        let entry = shows
            .get(show_id)
            .ok_or(CatalogError::ShowNotFound(*show_id))?;
        Ok(entry.ordered.iter().map(|id| entry.seats[id].clone()).collect())
    }

    /// Resolve seat ids against a show, preserving request order. Any id not
    /// belonging to the show fails the whole lookup and is named.
    pub fn seats_by_ids(&self, show_id: &Uuid, seat_ids: &[Uuid]) -> Result<Vec<Seat>, CatalogError> {
        let shows = self.shows.read().unwrap();
        let entry = shows
            .get(show_id)
            .ok_or(CatalogError::ShowNotFound(*show_id))?;

        let unknown: Vec<Uuid> = seat_ids
            .iter()
            .filter(|id| !entry.seats.contains_key(id))
            .copied()
            .collect();
        if !unknown.is_empty() {
            return Err(CatalogError::UnknownSeats(unknown));
        }

        Ok(seat_ids.iter().map(|id| entry.seats[id].clone()).collect())
    }
}

impl Default for SeatCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn category_for_row(row: u32, total_rows: u32) -> SeatCategory {
    // Last 3 rows are premium
    if row + 3 > total_rows {
        SeatCategory::Premium
    } else {
        SeatCategory::Regular
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("show not found: {0}")]
    ShowNotFound(Uuid),

    #[error("seats do not belong to the show: {0:?}")]
    UnknownSeats(Vec<Uuid>),
}
