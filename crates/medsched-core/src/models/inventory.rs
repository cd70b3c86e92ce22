//! Inventory ledger models.

use serde::{Deserialize, Serialize};

/// Stock count for one medicine. One row per name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    /// Row identifier (UUID)
    pub id: String,
    /// Medicine name, the case-sensitive join key across all tables
    pub name: String,
    /// Units on hand. An edit may drive this to zero; it is never allowed
    /// to crash the ledger if a decrement takes it below.
    pub quantity: i64,
}

impl LedgerEntry {
    /// Create a fresh entry with a generated id.
    pub fn new(name: String, quantity: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            quantity,
        }
    }

    /// A medicine with nothing left on hand.
    pub fn is_depleted(&self) -> bool {
        self.quantity <= 0
    }
}
