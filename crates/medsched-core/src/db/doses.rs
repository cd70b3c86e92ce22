//! Pending dose database operations.

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{format_minute, parse_minute, PendingDose};

impl Database {
    /// Insert a new pending dose.
    pub fn insert_dose(&self, dose: &PendingDose) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO doses (id, name, dosage, scheduled_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                dose.id,
                dose.name,
                dose.dosage,
                format_minute(dose.scheduled_at)
            ],
        )?;
        Ok(())
    }

    /// Get a pending dose by id.
    pub fn get_dose(&self, dose_id: &str) -> DbResult<Option<PendingDose>> {
        self.conn
            .query_row(
                "SELECT id, name, dosage, scheduled_at FROM doses WHERE id = ?",
                [dose_id],
                |row| {
                    Ok(DoseRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        dosage: row.get(2)?,
                        scheduled_at: row.get(3)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Replace name, dosage, and time of an existing dose.
    /// Returns false when no such dose exists.
    pub fn update_dose(
        &self,
        dose_id: &str,
        name: &str,
        dosage: i64,
        scheduled_at: NaiveDateTime,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE doses SET name = ?2, dosage = ?3, scheduled_at = ?4 WHERE id = ?1",
            params![dose_id, name, dosage, format_minute(scheduled_at)],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a pending dose. Returns false when no such dose exists.
    pub fn delete_dose(&self, dose_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM doses WHERE id = ?", [dose_id])?;
        Ok(rows_affected > 0)
    }

    /// All pending doses in schedule order.
    pub fn list_doses(&self) -> DbResult<Vec<PendingDose>> {
        self.query_doses(
            "SELECT id, name, dosage, scheduled_at FROM doses \
             ORDER BY scheduled_at ASC, rowid ASC",
            params![],
        )
    }

    /// Pending doses whose scheduled time has arrived, ordered by schedule
    /// time ascending with insertion order as the tie-break.
    pub fn due_doses(&self, now: NaiveDateTime) -> DbResult<Vec<PendingDose>> {
        self.query_doses(
            "SELECT id, name, dosage, scheduled_at FROM doses \
             WHERE scheduled_at <= ?1 ORDER BY scheduled_at ASC, rowid ASC",
            params![format_minute(now)],
        )
    }

    /// Case-insensitive substring search on name or scheduled time.
    pub fn search_doses(&self, query: &str) -> DbResult<Vec<PendingDose>> {
        self.query_doses(
            "SELECT id, name, dosage, scheduled_at FROM doses \
             WHERE name LIKE '%' || ?1 || '%' OR scheduled_at LIKE '%' || ?1 || '%' \
             ORDER BY scheduled_at ASC, rowid ASC",
            params![query],
        )
    }

    fn query_doses(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> DbResult<Vec<PendingDose>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(DoseRow {
                id: row.get(0)?,
                name: row.get(1)?,
                dosage: row.get(2)?,
                scheduled_at: row.get(3)?,
            })
        })?;

        let mut doses = Vec::new();
        for row in rows {
            doses.push(row?.try_into()?);
        }
        Ok(doses)
    }
}

/// Intermediate row struct for database mapping.
struct DoseRow {
    id: String,
    name: String,
    dosage: i64,
    scheduled_at: String,
}

impl TryFrom<DoseRow> for PendingDose {
    type Error = DbError;

    fn try_from(row: DoseRow) -> Result<Self, Self::Error> {
        let scheduled_at = parse_minute(&row.scheduled_at).ok_or_else(|| {
            DbError::Constraint(format!("Bad scheduled_at timestamp: {}", row.scheduled_at))
        })?;
        Ok(PendingDose {
            id: row.id,
            name: row.name,
            dosage: row.dosage,
            scheduled_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn ts(s: &str) -> NaiveDateTime {
        parse_minute(s).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        let dose = PendingDose::new("Aspirin".into(), 4, ts("2025-01-01 08:00"));
        db.insert_dose(&dose).unwrap();

        let retrieved = db.get_dose(&dose.id).unwrap().unwrap();
        assert_eq!(retrieved, dose);
        assert!(db.get_dose("missing").unwrap().is_none());
    }

    #[test]
    fn test_update_dose() {
        let db = setup_db();
        let dose = PendingDose::new("Asprin".into(), 4, ts("2025-01-01 08:00"));
        db.insert_dose(&dose).unwrap();

        assert!(db
            .update_dose(&dose.id, "Aspirin", 2, ts("2025-01-01 09:30"))
            .unwrap());
        let updated = db.get_dose(&dose.id).unwrap().unwrap();
        assert_eq!(updated.name, "Aspirin");
        assert_eq!(updated.dosage, 2);
        assert_eq!(updated.scheduled_at, ts("2025-01-01 09:30"));

        assert!(!db.update_dose("missing", "X", 1, ts("2025-01-01 08:00")).unwrap());
    }

    #[test]
    fn test_delete_dose() {
        let db = setup_db();
        let dose = PendingDose::new("Aspirin".into(), 4, ts("2025-01-01 08:00"));
        db.insert_dose(&dose).unwrap();
        assert!(db.delete_dose(&dose.id).unwrap());
        assert!(!db.delete_dose(&dose.id).unwrap());
    }

    #[test]
    fn test_due_doses_boundary_and_order() {
        let db = setup_db();
        let late = PendingDose::new("C".into(), 1, ts("2025-01-01 09:00"));
        let early = PendingDose::new("A".into(), 1, ts("2025-01-01 07:00"));
        let exact = PendingDose::new("B".into(), 1, ts("2025-01-01 08:00"));
        let future = PendingDose::new("D".into(), 1, ts("2025-01-01 08:01"));
        db.insert_dose(&late).unwrap();
        db.insert_dose(&early).unwrap();
        db.insert_dose(&exact).unwrap();
        db.insert_dose(&future).unwrap();

        let due = db.due_doses(ts("2025-01-01 08:00")).unwrap();
        let ids: Vec<&str> = due.iter().map(|d| d.id.as_str()).collect();
        // Exactly-now is due; ordering is by schedule time ascending.
        assert_eq!(ids, vec![early.id.as_str(), exact.id.as_str()]);
    }

    #[test]
    fn test_due_ties_keep_insertion_order() {
        let db = setup_db();
        let first = PendingDose::new("First".into(), 1, ts("2025-01-01 08:00"));
        let second = PendingDose::new("Second".into(), 1, ts("2025-01-01 08:00"));
        db.insert_dose(&first).unwrap();
        db.insert_dose(&second).unwrap();

        let due = db.due_doses(ts("2025-01-01 08:00")).unwrap();
        assert_eq!(due[0].id, first.id);
        assert_eq!(due[1].id, second.id);
    }

    #[test]
    fn test_search_doses() {
        let db = setup_db();
        db.insert_dose(&PendingDose::new("Aspirin".into(), 1, ts("2025-01-01 08:00")))
            .unwrap();
        db.insert_dose(&PendingDose::new("Ibuprofen".into(), 1, ts("2025-02-01 08:00")))
            .unwrap();

        let hits = db.search_doses("aspirin").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Aspirin");

        // Matching on the scheduled date as well
        let hits = db.search_doses("2025-02").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ibuprofen");
    }

    #[test]
    fn test_bad_stored_timestamp_is_constraint_error() {
        let db = setup_db();
        db.conn()
            .execute(
                "INSERT INTO doses (id, name, dosage, scheduled_at) VALUES ('x', 'A', 1, 'garbage')",
                [],
            )
            .unwrap();
        let result = db.get_dose("x");
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }
}
