use marquee_domain::{Seat, SeatCategory, Show};

/// Flat per-category price of one seat for a show.
pub fn seat_price(show: &Show, category: SeatCategory) -> i64 {
    match category {
        SeatCategory::Regular => show.base_price,
        SeatCategory::Premium => show.premium_price,
    }
}

/// Total amount for a seat selection at this instant.
pub fn total_amount(show: &Show, seats: &[Seat]) -> i64 {
    seats.iter().map(|s| seat_price(show, s.category)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn seat(category: SeatCategory) -> Seat {
        Seat {
            id: Uuid::new_v4(),
            row: 1,
            number: 1,
            category,
        }
    }

    #[test]
    fn test_flat_category_pricing() {
        let show = Show {
            id: Uuid::new_v4(),
            title: "Test Feature".to_string(),
            base_price: 250,
            premium_price: 350,
            starts_at: Utc::now(),
        };

        assert_eq!(seat_price(&show, SeatCategory::Regular), 250);
        assert_eq!(seat_price(&show, SeatCategory::Premium), 350);

        let selection = vec![seat(SeatCategory::Regular), seat(SeatCategory::Premium)];
        assert_eq!(total_amount(&show, &selection), 600);
    }
}
