//! Medsched Core Library
//!
//! The reconcilable core of a medicine intake tracker: a stock ledger, a
//! dose scheduler, and an append-only intake history over a local SQLite
//! store.
//!
//! # Architecture
//!
//! ```text
//!   UI / shell (out of scope)
//!        │
//!        ▼
//!   MedTracker ──── one Mutex<Database>: UI calls and timer
//!    │   │   │      ticks never interleave
//!    │   │   │
//!    ▼   ▼   ▼
//! Ledger Scheduler History
//!    │     │  │       │
//!    │     │  └─ Notifier (fire-and-forget)
//!    │     └──── Clock (injected, testable)
//!    ▼
//! Database (SQLite: inventory / doses / dose_log)
//! ```
//!
//! Control flow: scheduling a dose debits the ledger and inserts the dose
//! in one transaction; a periodic [`service::Poller`] tick archives due
//! doses into the log and removes them from the pending set, with no
//! ledger movement (the stock was consumed at schedule time).
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: domain types (LedgerEntry, PendingDose, HistoryRecord)
//! - [`ledger`]: stock counts, debit/credit
//! - [`scheduler`]: pending doses and the due-dose notifier
//! - [`history`]: intake log with post-hoc annotation
//! - [`service`]: coarse-locked facade and poll timer
//! - [`clock`] / [`notify`]: injectable time and notification backends

pub mod clock;
pub mod db;
pub mod error;
pub mod history;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod service;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use db::Database;
pub use error::{Error, Result};
pub use history::History;
pub use ledger::Ledger;
pub use models::{HistoryRecord, LedgerEntry, PendingDose};
pub use notify::{LogNotifier, Notifier, NullNotifier, RecordingNotifier};
pub use scheduler::Scheduler;
pub use service::{MedTracker, Poller};
