pub mod catalog;
pub mod pricing;

pub use catalog::{CatalogError, SeatCatalog};
pub use pricing::{seat_price, total_amount};
