pub mod app_config;
pub mod ledger;
pub mod lock_table;

pub use ledger::{BookingLedger, LedgerError};
pub use lock_table::{HoldValidity, LockError, LockTable, SeatSnapshot};
