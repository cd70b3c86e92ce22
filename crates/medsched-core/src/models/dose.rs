//! Pending dose models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::time::truncate_minute;

/// A scheduled-but-not-yet-taken intake of one medicine.
///
/// Lifecycle: created by a successful schedule, destroyed either by an
/// explicit cancel (stock returns to the ledger) or by the notifier once
/// due (archived to the log, stock already consumed at schedule time).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingDose {
    /// Row identifier (UUID)
    pub id: String,
    /// Medicine name
    pub name: String,
    /// Units to take; always positive
    pub dosage: i64,
    /// When to take it, minute resolution
    pub scheduled_at: NaiveDateTime,
}

impl PendingDose {
    /// Create a fresh dose with a generated id.
    pub fn new(name: String, dosage: i64, scheduled_at: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            dosage,
            scheduled_at: truncate_minute(scheduled_at),
        }
    }

    /// Whether the scheduled time has arrived relative to `now`.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.scheduled_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_new_truncates_to_minute() {
        let dose = PendingDose::new("Aspirin".into(), 2, ts("2025-01-01 08:00:31"));
        assert_eq!(dose.scheduled_at, ts("2025-01-01 08:00:00"));
    }

    #[test]
    fn test_due_at_exact_minute() {
        let dose = PendingDose::new("Aspirin".into(), 2, ts("2025-01-01 08:00:00"));
        assert!(dose.is_due(ts("2025-01-01 08:00:00")));
        assert!(dose.is_due(ts("2025-01-01 08:01:00")));
        assert!(!dose.is_due(ts("2025-01-01 07:59:00")));
    }
}
