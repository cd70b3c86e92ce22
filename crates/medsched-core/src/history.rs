//! Intake history: append-only archive of taken doses.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::HistoryRecord;

/// History component over the shared store.
pub struct History<'a> {
    db: &'a Database,
}

impl<'a> History<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append a record. Fails only on storage failure.
    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        Ok(self.db.append_log(record)?)
    }

    /// Get a record by id.
    pub fn get(&self, record_id: &str) -> Result<Option<HistoryRecord>> {
        Ok(self.db.get_log_record(record_id)?)
    }

    /// Set or overwrite the annotation on a record. The rest of a record
    /// is immutable once archived.
    pub fn set_description(&self, record_id: &str, text: &str) -> Result<()> {
        if !self.db.set_log_description(record_id, text)? {
            return Err(Error::NotFound(record_id.to_string()));
        }
        Ok(())
    }

    /// All records, newest scheduled first.
    pub fn list(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.db.list_log()?)
    }

    /// Case-insensitive search on name or scheduled date, newest first.
    pub fn search(&self, query: &str) -> Result<Vec<HistoryRecord>> {
        Ok(self.db.search_log(query)?)
    }
}
