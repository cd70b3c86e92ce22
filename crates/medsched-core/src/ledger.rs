//! Inventory ledger: stock counts per medicine.
//!
//! The ledger owns the `inventory` table. Stock moves exactly twice in a
//! dose's life: a debit when the dose is scheduled and a credit if it is
//! cancelled. Doses that come due were already paid for at schedule time.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::LedgerEntry;

/// Ledger component over the shared store.
pub struct Ledger<'a> {
    db: &'a Database,
}

impl<'a> Ledger<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Stock a medicine for the first time.
    pub fn create(&self, name: &str, initial_quantity: i64) -> Result<LedgerEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if initial_quantity <= 0 {
            return Err(Error::InvalidQuantity(initial_quantity));
        }
        if self.db.get_quantity(name)?.is_some() {
            return Err(Error::DuplicateMedicine(name.to_string()));
        }
        let entry = LedgerEntry::new(name.to_string(), initial_quantity);
        self.db.insert_ledger_entry(&entry)?;
        Ok(entry)
    }

    /// Current stock, or `None` when the medicine was never stocked.
    pub fn get_quantity(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.db.get_quantity(name)?)
    }

    /// Reserve stock for a scheduled dose.
    pub fn debit(&self, name: &str, amount: i64) -> Result<()> {
        let available = self
            .db
            .get_quantity(name)?
            .ok_or_else(|| Error::UnknownMedicine(name.to_string()))?;
        if amount > available {
            return Err(Error::InsufficientStock {
                name: name.to_string(),
                requested: amount,
                available,
            });
        }
        self.db.adjust_quantity(name, -amount)?;
        Ok(())
    }

    /// Return stock from a cancelled dose. A cancelled dose only ever
    /// returns stock to an existing entry; crediting a medicine that was
    /// deleted from the inventory fails rather than resurrecting it.
    pub fn credit(&self, name: &str, amount: i64) -> Result<()> {
        if !self.db.adjust_quantity(name, amount)? {
            return Err(Error::UnknownMedicine(name.to_string()));
        }
        Ok(())
    }

    /// Nothing left on hand. A medicine that was never stocked counts as
    /// depleted.
    pub fn is_depleted(&self, name: &str) -> Result<bool> {
        Ok(self.db.get_quantity(name)?.map_or(true, |q| q <= 0))
    }

    /// Edit flow: replace the name and/or quantity of an existing entry.
    pub fn rename_or_adjust(&self, name: &str, new_name: &str, new_quantity: i64) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::EmptyName);
        }
        if new_quantity <= 0 {
            return Err(Error::InvalidQuantity(new_quantity));
        }
        if new_name != name && self.db.get_quantity(new_name)?.is_some() {
            return Err(Error::DuplicateMedicine(new_name.to_string()));
        }
        if !self.db.update_ledger_entry(name, new_name, new_quantity)? {
            return Err(Error::UnknownMedicine(name.to_string()));
        }
        Ok(())
    }

    /// Explicit user deletion of a ledger entry.
    pub fn remove(&self, name: &str) -> Result<()> {
        if !self.db.delete_ledger_entry(name)? {
            return Err(Error::UnknownMedicine(name.to_string()));
        }
        Ok(())
    }

    /// All entries, ordered by name.
    pub fn list(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.db.list_inventory()?)
    }

    /// Case-insensitive name search.
    pub fn search(&self, query: &str) -> Result<Vec<LedgerEntry>> {
        Ok(self.db.search_inventory(query)?)
    }
}
