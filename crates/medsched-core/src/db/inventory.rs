//! Inventory ledger database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::LedgerEntry;

impl Database {
    /// Insert a new ledger entry. Fails on a duplicate name.
    pub fn insert_ledger_entry(&self, entry: &LedgerEntry) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO inventory (id, name, quantity) VALUES (?1, ?2, ?3)",
            params![entry.id, entry.name, entry.quantity],
        )?;
        Ok(())
    }

    /// Get the ledger entry for a medicine name.
    pub fn get_ledger_entry(&self, name: &str) -> DbResult<Option<LedgerEntry>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, name, quantity FROM inventory WHERE name = ?",
                [name],
                |row| {
                    Ok(LedgerEntry {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        quantity: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// Current stock count, or `None` when the medicine was never stocked.
    pub fn get_quantity(&self, name: &str) -> DbResult<Option<i64>> {
        let result = self
            .conn
            .query_row(
                "SELECT quantity FROM inventory WHERE name = ?",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    /// Add `delta` (possibly negative) to a medicine's stock count.
    /// Returns false when no such medicine exists.
    pub fn adjust_quantity(&self, name: &str, delta: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE inventory SET quantity = quantity + ?1 WHERE name = ?2",
            params![delta, name],
        )?;
        Ok(rows_affected > 0)
    }

    /// Replace the name and/or quantity of an existing entry.
    /// Returns false when no such medicine exists.
    pub fn update_ledger_entry(
        &self,
        name: &str,
        new_name: &str,
        new_quantity: i64,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE inventory SET name = ?2, quantity = ?3 WHERE name = ?1",
            params![name, new_name, new_quantity],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a ledger entry. Returns false when no such medicine exists.
    pub fn delete_ledger_entry(&self, name: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM inventory WHERE name = ?", [name])?;
        Ok(rows_affected > 0)
    }

    /// All ledger entries, ordered by name.
    pub fn list_inventory(&self) -> DbResult<Vec<LedgerEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, quantity FROM inventory ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(LedgerEntry {
                id: row.get(0)?,
                name: row.get(1)?,
                quantity: row.get(2)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Case-insensitive substring search on medicine name, ordered by name.
    pub fn search_inventory(&self, query: &str) -> DbResult<Vec<LedgerEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, quantity FROM inventory \
             WHERE name LIKE '%' || ?1 || '%' ORDER BY name ASC",
        )?;
        let rows = stmt.query_map([query], |row| {
            Ok(LedgerEntry {
                id: row.get(0)?,
                name: row.get(1)?,
                quantity: row.get(2)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}
