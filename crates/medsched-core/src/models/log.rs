//! Intake history models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::dose::PendingDose;
use super::time::truncate_minute;

/// One archived intake. Immutable once written except for `description`,
/// which the user may annotate after the fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    /// Row identifier (UUID)
    pub id: String,
    /// Medicine name
    pub name: String,
    /// Units taken
    pub dosage: i64,
    /// When the dose was scheduled for
    pub scheduled_at: NaiveDateTime,
    /// When the notifier marked it taken
    pub received_at: NaiveDateTime,
    /// Free-form annotation, empty until the user sets one
    pub description: Option<String>,
}

impl HistoryRecord {
    /// Archive a pending dose that came due at `received_at`.
    pub fn taken(dose: &PendingDose, received_at: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: dose.name.clone(),
            dosage: dose.dosage,
            scheduled_at: dose.scheduled_at,
            received_at: truncate_minute(received_at),
            description: None,
        }
    }
}
