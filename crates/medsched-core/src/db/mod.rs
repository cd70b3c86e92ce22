//! Database layer for medsched.

mod doses;
mod inventory;
mod log;
mod schema;

pub use schema::SCHEMA;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction. The connection must not already be inside one;
    /// callers are serialized by the facade's coarse lock, which upholds that.
    pub fn transaction(&self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Distinct medicine names across stock, pending doses, and the log,
    /// sorted. Feeds the name pickers of an embedding UI.
    pub fn medicine_names(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name FROM inventory
            UNION
            SELECT name FROM doses
            UNION
            SELECT name FROM dose_log
            ORDER BY name
            "#,
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Delete every row of every table. Irreversible.
    pub fn reset_all(&self) -> DbResult<()> {
        let tx = self.transaction()?;
        tx.execute("DELETE FROM doses", [])?;
        tx.execute("DELETE FROM inventory", [])?;
        tx.execute("DELETE FROM dose_log", [])?;
        tx.commit()?;
        Ok(())
    }
}
