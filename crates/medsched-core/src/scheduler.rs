//! Dose scheduling and the due-dose notifier.
//!
//! Per-dose state machine: Scheduled -> Cancelled or Scheduled -> Taken,
//! both terminal. Scheduling debits the ledger; cancelling credits it;
//! coming due only archives (the stock was consumed at schedule time).

use chrono::{NaiveDateTime, TimeDelta};

use crate::clock::Clock;
use crate::db::{Database, DbError};
use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::{truncate_minute, HistoryRecord, PendingDose};
use crate::notify::Notifier;

/// Scheduler component over the shared store, clock, and notification sink.
pub struct Scheduler<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
    notifier: &'a dyn Notifier,
}

impl<'a> Scheduler<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock, notifier: &'a dyn Notifier) -> Self {
        Self {
            db,
            clock,
            notifier,
        }
    }

    /// Schedule a dose: validate, debit the ledger, insert the dose.
    ///
    /// Debit and insert are one transaction; if either fails the other is
    /// rolled back. A schedule that empties the stock fires a best-effort
    /// "stock exhausted" notification after commit.
    pub fn schedule(
        &self,
        name: &str,
        dosage: i64,
        scheduled_at: NaiveDateTime,
    ) -> Result<PendingDose> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if dosage <= 0 {
            return Err(Error::InvalidDosage(dosage));
        }
        let scheduled_at = truncate_minute(scheduled_at);
        // Scheduling for the current minute is allowed; only earlier is past.
        if scheduled_at < truncate_minute(self.clock.now()) {
            return Err(Error::PastSchedule(scheduled_at));
        }

        let ledger = Ledger::new(self.db);
        let dose = PendingDose::new(name.to_string(), dosage, scheduled_at);

        let tx = self.db.transaction()?;
        ledger.debit(name, dosage)?;
        self.db.insert_dose(&dose)?;
        tx.commit().map_err(DbError::from)?;

        if ledger.is_depleted(name)? {
            self.notifier
                .notify("Stock exhausted", &format!("'{}' has run out", name));
        }
        Ok(dose)
    }

    /// Cancel a pending dose, returning its stock to the ledger. Credit
    /// and removal are one transaction.
    pub fn cancel(&self, dose_id: &str) -> Result<()> {
        let dose = self
            .db
            .get_dose(dose_id)?
            .ok_or_else(|| Error::NotFound(dose_id.to_string()))?;

        let tx = self.db.transaction()?;
        Ledger::new(self.db).credit(&dose.name, dose.dosage)?;
        self.db.delete_dose(dose_id)?;
        tx.commit().map_err(DbError::from)?;
        Ok(())
    }

    /// Edit a pending dose in place. Stock is accounted only at
    /// schedule/cancel time; changing the dosage here does not touch the
    /// ledger.
    pub fn edit(
        &self,
        dose_id: &str,
        new_name: &str,
        new_dosage: i64,
        new_scheduled_at: NaiveDateTime,
    ) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::EmptyName);
        }
        if new_dosage <= 0 {
            return Err(Error::InvalidDosage(new_dosage));
        }
        let new_scheduled_at = truncate_minute(new_scheduled_at);
        if new_scheduled_at < truncate_minute(self.clock.now()) {
            return Err(Error::PastSchedule(new_scheduled_at));
        }
        if !self
            .db
            .update_dose(dose_id, new_name, new_dosage, new_scheduled_at)?
        {
            return Err(Error::NotFound(dose_id.to_string()));
        }
        Ok(())
    }

    /// Schedule a copy of an existing dose, offset into the future. The
    /// copy goes through [`Scheduler::schedule`], so the usual stock check
    /// applies. An all-zero offset is rejected.
    pub fn repeat(&self, dose_id: &str, days: u32, hours: u32, minutes: u32) -> Result<PendingDose> {
        if days == 0 && hours == 0 && minutes == 0 {
            return Err(Error::InvalidOffset);
        }
        let dose = self
            .db
            .get_dose(dose_id)?
            .ok_or_else(|| Error::NotFound(dose_id.to_string()))?;

        let offset = TimeDelta::try_days(i64::from(days))
            .and_then(|d| Some(d + TimeDelta::try_hours(i64::from(hours))?))
            .and_then(|d| Some(d + TimeDelta::try_minutes(i64::from(minutes))?))
            .ok_or(Error::InvalidOffset)?;
        let new_at = dose
            .scheduled_at
            .checked_add_signed(offset)
            .ok_or(Error::InvalidOffset)?;

        self.schedule(&dose.name, dose.dosage, new_at)
    }

    /// Archive every dose whose time has arrived.
    ///
    /// For each due dose, in schedule order: emit a "dose due"
    /// notification, append a log record with `received_at = now`, delete
    /// the pending row. Each dose is processed independently; a storage
    /// failure on one is logged and the rest still run. Returns the doses
    /// that were archived.
    pub fn poll_due(&self, now: NaiveDateTime) -> Result<Vec<PendingDose>> {
        let now = truncate_minute(now);
        let due = self.db.due_doses(now)?;

        let mut taken = Vec::new();
        for dose in due {
            self.notifier.notify(
                "Time to take your medicine",
                &format!("{} ({})", dose.name, dose.dosage),
            );
            let record = HistoryRecord::taken(&dose, now);
            if let Err(e) = self.archive(&dose, &record) {
                tracing::warn!(dose_id = %dose.id, error = %e, "failed to archive due dose");
                continue;
            }
            taken.push(dose);
        }
        Ok(taken)
    }

    fn archive(&self, dose: &PendingDose, record: &HistoryRecord) -> Result<()> {
        let tx = self.db.transaction()?;
        self.db.append_log(record)?;
        self.db.delete_dose(&dose.id)?;
        tx.commit().map_err(DbError::from)?;
        Ok(())
    }

    /// All pending doses in schedule order.
    pub fn list(&self) -> Result<Vec<PendingDose>> {
        Ok(self.db.list_doses()?)
    }

    /// Case-insensitive search on name or scheduled time.
    pub fn search(&self, query: &str) -> Result<Vec<PendingDose>> {
        Ok(self.db.search_doses(query)?)
    }

    /// Distinct medicine names across stock, schedule, and log.
    pub fn medicine_names(&self) -> Result<Vec<String>> {
        Ok(self.db.medicine_names()?)
    }
}
