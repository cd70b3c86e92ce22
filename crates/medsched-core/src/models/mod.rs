//! Domain types for the medicine tracker.

mod dose;
mod inventory;
mod log;
mod time;

pub use dose::PendingDose;
pub use inventory::LedgerEntry;
pub use log::HistoryRecord;
pub use time::{format_minute, parse_minute, truncate_minute, MINUTE_FORMAT};
