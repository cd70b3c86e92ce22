//! SQLite schema definition.

/// Complete database schema for medsched.
///
/// All timestamps are TEXT in `YYYY-MM-DD HH:MM` form; lexicographic
/// comparison equals chronological comparison, so due queries and ordering
/// run directly in SQL.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Inventory ledger: one row per medicine, the current stock count
-- ============================================================================

CREATE TABLE IF NOT EXISTS inventory (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    quantity INTEGER NOT NULL
);

-- ============================================================================
-- Pending doses: scheduled but not yet taken
-- ============================================================================

CREATE TABLE IF NOT EXISTS doses (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    dosage INTEGER NOT NULL,
    scheduled_at TEXT NOT NULL
);

-- Due queries scan by time; rowid keeps insertion order for tie-breaks
CREATE INDEX IF NOT EXISTS idx_doses_scheduled_at ON doses(scheduled_at);

-- ============================================================================
-- Intake log: append-only archive of taken doses
-- ============================================================================

CREATE TABLE IF NOT EXISTS dose_log (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    dosage INTEGER NOT NULL,
    scheduled_at TEXT NOT NULL,
    received_at TEXT NOT NULL,
    description TEXT
);

CREATE INDEX IF NOT EXISTS idx_dose_log_scheduled_at ON dose_log(scheduled_at);
CREATE INDEX IF NOT EXISTS idx_dose_log_name ON dose_log(name);
"#;
