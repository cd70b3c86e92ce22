//! Coarse-locked facade over ledger, scheduler, and history, plus the
//! periodic poll timer.
//!
//! All mutating operations share one `Mutex<Database>`: a UI call and a
//! timer tick can never interleave and observe half-applied state. The
//! poller uses `try_lock`, so a tick that fires while a poll (or any other
//! operation) is still running is coalesced instead of queued.

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::clock::Clock;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::history::History;
use crate::ledger::Ledger;
use crate::models::{HistoryRecord, LedgerEntry, PendingDose};
use crate::notify::Notifier;
use crate::scheduler::Scheduler;

/// The application core: one store, one clock, one notification sink.
///
/// Constructed explicitly at startup and dropped at shutdown; there is no
/// ambient global state.
pub struct MedTracker {
    db: Mutex<Database>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl MedTracker {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::open(path)?),
            clock,
            notifier,
        })
    }

    /// In-memory store, for tests and previews.
    pub fn open_in_memory(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::open_in_memory()?),
            clock,
            notifier,
        })
    }

    // =========================================================================
    // Ledger operations
    // =========================================================================

    /// Stock a medicine for the first time.
    pub fn stock_medicine(&self, name: &str, quantity: i64) -> Result<LedgerEntry> {
        let db = self.db.lock()?;
        Ledger::new(&db).create(name, quantity)
    }

    /// Current stock count, `None` when never stocked.
    pub fn quantity(&self, name: &str) -> Result<Option<i64>> {
        let db = self.db.lock()?;
        Ledger::new(&db).get_quantity(name)
    }

    /// Edit a ledger entry's name and/or quantity.
    pub fn adjust_stock(&self, name: &str, new_name: &str, new_quantity: i64) -> Result<()> {
        let db = self.db.lock()?;
        Ledger::new(&db).rename_or_adjust(name, new_name, new_quantity)
    }

    /// Delete a ledger entry.
    pub fn remove_stock(&self, name: &str) -> Result<()> {
        let db = self.db.lock()?;
        Ledger::new(&db).remove(name)
    }

    /// All ledger entries, ordered by name.
    pub fn inventory(&self) -> Result<Vec<LedgerEntry>> {
        let db = self.db.lock()?;
        Ledger::new(&db).list()
    }

    /// Search ledger entries by name substring.
    pub fn search_inventory(&self, query: &str) -> Result<Vec<LedgerEntry>> {
        let db = self.db.lock()?;
        Ledger::new(&db).search(query)
    }

    // =========================================================================
    // Scheduler operations
    // =========================================================================

    /// Schedule a dose, debiting stock.
    pub fn schedule(&self, name: &str, dosage: i64, at: NaiveDateTime) -> Result<PendingDose> {
        let db = self.db.lock()?;
        Scheduler::new(&db, &*self.clock, &*self.notifier).schedule(name, dosage, at)
    }

    /// Cancel a pending dose, crediting stock back.
    pub fn cancel(&self, dose_id: &str) -> Result<()> {
        let db = self.db.lock()?;
        Scheduler::new(&db, &*self.clock, &*self.notifier).cancel(dose_id)
    }

    /// Edit a pending dose in place.
    pub fn edit(
        &self,
        dose_id: &str,
        new_name: &str,
        new_dosage: i64,
        new_at: NaiveDateTime,
    ) -> Result<()> {
        let db = self.db.lock()?;
        Scheduler::new(&db, &*self.clock, &*self.notifier).edit(dose_id, new_name, new_dosage, new_at)
    }

    /// Schedule a copy of a dose, offset into the future.
    pub fn repeat(&self, dose_id: &str, days: u32, hours: u32, minutes: u32) -> Result<PendingDose> {
        let db = self.db.lock()?;
        Scheduler::new(&db, &*self.clock, &*self.notifier).repeat(dose_id, days, hours, minutes)
    }

    /// All pending doses in schedule order.
    pub fn pending(&self) -> Result<Vec<PendingDose>> {
        let db = self.db.lock()?;
        Scheduler::new(&db, &*self.clock, &*self.notifier).list()
    }

    /// Search pending doses by name or scheduled time.
    pub fn search_pending(&self, query: &str) -> Result<Vec<PendingDose>> {
        let db = self.db.lock()?;
        Scheduler::new(&db, &*self.clock, &*self.notifier).search(query)
    }

    /// Distinct medicine names across all tables, for name pickers.
    pub fn medicine_names(&self) -> Result<Vec<String>> {
        let db = self.db.lock()?;
        Ok(db.medicine_names()?)
    }

    // =========================================================================
    // History operations
    // =========================================================================

    /// All log records, newest scheduled first.
    pub fn history(&self) -> Result<Vec<HistoryRecord>> {
        let db = self.db.lock()?;
        History::new(&db).list()
    }

    /// Search the log by name or scheduled date.
    pub fn search_history(&self, query: &str) -> Result<Vec<HistoryRecord>> {
        let db = self.db.lock()?;
        History::new(&db).search(query)
    }

    /// Annotate a log record.
    pub fn describe_dose(&self, record_id: &str, text: &str) -> Result<()> {
        let db = self.db.lock()?;
        History::new(&db).set_description(record_id, text)
    }

    // =========================================================================
    // Polling and maintenance
    // =========================================================================

    /// Archive every due dose now, blocking until the lock is available.
    pub fn poll_now(&self) -> Result<Vec<PendingDose>> {
        let db = self.db.lock()?;
        let now = self.clock.now();
        Scheduler::new(&db, &*self.clock, &*self.notifier).poll_due(now)
    }

    /// Timer entry point: poll for due doses unless another operation is
    /// in flight, in which case the tick is skipped (`Ok(None)`).
    pub fn tick(&self) -> Result<Option<Vec<PendingDose>>> {
        let db = match self.db.try_lock() {
            Ok(db) => db,
            Err(TryLockError::WouldBlock) => return Ok(None),
            Err(TryLockError::Poisoned(_)) => return Err(Error::Poisoned),
        };
        let now = self.clock.now();
        Scheduler::new(&db, &*self.clock, &*self.notifier)
            .poll_due(now)
            .map(Some)
    }

    /// Delete all data. Irreversible.
    pub fn reset_all(&self) -> Result<()> {
        let db = self.db.lock()?;
        Ok(db.reset_all()?)
    }
}

/// Background timer driving [`MedTracker::tick`] on a fixed interval.
///
/// The thread stops when the poller is dropped (or [`Poller::stop`] is
/// called); shutdown is signalled over a channel so it never waits out a
/// full interval.
pub struct Poller {
    handle: Option<thread::JoinHandle<()>>,
    stop_tx: mpsc::Sender<()>,
}

impl Poller {
    /// Spawn the polling thread.
    pub fn spawn(tracker: Arc<MedTracker>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => match tracker.tick() {
                    Ok(Some(taken)) if !taken.is_empty() => {
                        tracing::debug!(count = taken.len(), "archived due doses");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "poll tick failed"),
                },
            }
        });
        Self {
            handle: Some(handle),
            stop_tx,
        }
    }

    /// Stop the polling thread and wait for it to exit.
    pub fn stop(self) {}
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::parse_minute;
    use crate::notify::RecordingNotifier;

    fn ts(s: &str) -> NaiveDateTime {
        parse_minute(s).unwrap()
    }

    fn setup(now: &str) -> (Arc<MedTracker>, Arc<FixedClock>, Arc<RecordingNotifier>) {
        let clock = Arc::new(FixedClock::new(ts(now)));
        let notifier = Arc::new(RecordingNotifier::new());
        let tracker = Arc::new(
            MedTracker::open_in_memory(clock.clone(), notifier.clone()).unwrap(),
        );
        (tracker, clock, notifier)
    }

    #[test]
    fn test_facade_schedule_and_poll() {
        let (tracker, clock, notifier) = setup("2025-01-01 07:00");
        tracker.stock_medicine("Aspirin", 10).unwrap();
        tracker.schedule("Aspirin", 4, ts("2025-01-01 08:00")).unwrap();
        assert_eq!(tracker.quantity("Aspirin").unwrap(), Some(6));

        clock.set(ts("2025-01-01 08:00"));
        let taken = tracker.poll_now().unwrap();
        assert_eq!(taken.len(), 1);
        assert!(tracker.pending().unwrap().is_empty());
        assert_eq!(tracker.history().unwrap().len(), 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn test_tick_skips_when_busy() {
        let (tracker, _clock, _notifier) = setup("2025-01-01 07:00");

        // Hold the lock the way an in-flight operation would.
        let guard = tracker.db.lock().unwrap();
        assert!(matches!(tracker.tick(), Ok(None)));
        drop(guard);
        assert!(matches!(tracker.tick(), Ok(Some(_))));
    }

    #[test]
    fn test_reset_all() {
        let (tracker, _clock, _notifier) = setup("2025-01-01 07:00");
        tracker.stock_medicine("Aspirin", 10).unwrap();
        tracker.schedule("Aspirin", 4, ts("2025-01-01 08:00")).unwrap();

        tracker.reset_all().unwrap();
        assert!(tracker.inventory().unwrap().is_empty());
        assert!(tracker.pending().unwrap().is_empty());
        assert!(tracker.history().unwrap().is_empty());
    }

    #[test]
    fn test_poller_archives_due_doses() {
        let (tracker, clock, _notifier) = setup("2025-01-01 07:59");
        tracker.stock_medicine("Aspirin", 10).unwrap();
        tracker.schedule("Aspirin", 4, ts("2025-01-01 08:00")).unwrap();

        clock.set(ts("2025-01-01 08:00"));
        let poller = Poller::spawn(tracker.clone(), Duration::from_millis(10));
        // Give the timer a few intervals to fire.
        for _ in 0..100 {
            if tracker.pending().unwrap().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        poller.stop();

        assert!(tracker.pending().unwrap().is_empty());
        assert_eq!(tracker.history().unwrap().len(), 1);
    }
}
