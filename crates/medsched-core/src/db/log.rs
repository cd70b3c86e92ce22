//! Intake log database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{format_minute, parse_minute, HistoryRecord};

impl Database {
    /// Append a record to the intake log.
    pub fn append_log(&self, record: &HistoryRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO dose_log (id, name, dosage, scheduled_at, received_at, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.name,
                record.dosage,
                format_minute(record.scheduled_at),
                format_minute(record.received_at),
                record.description,
            ],
        )?;
        Ok(())
    }

    /// Get a log record by id.
    pub fn get_log_record(&self, record_id: &str) -> DbResult<Option<HistoryRecord>> {
        self.conn
            .query_row(
                "SELECT id, name, dosage, scheduled_at, received_at, description \
                 FROM dose_log WHERE id = ?",
                [record_id],
                |row| {
                    Ok(LogRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        dosage: row.get(2)?,
                        scheduled_at: row.get(3)?,
                        received_at: row.get(4)?,
                        description: row.get(5)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Overwrite the description of a log record.
    /// Returns false when no such record exists.
    pub fn set_log_description(&self, record_id: &str, text: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE dose_log SET description = ?2 WHERE id = ?1",
            params![record_id, text],
        )?;
        Ok(rows_affected > 0)
    }

    /// All log records, newest scheduled first.
    pub fn list_log(&self) -> DbResult<Vec<HistoryRecord>> {
        self.query_log(
            "SELECT id, name, dosage, scheduled_at, received_at, description \
             FROM dose_log ORDER BY scheduled_at DESC, rowid DESC",
            params![],
        )
    }

    /// Case-insensitive substring search on name or scheduled date,
    /// newest scheduled first.
    pub fn search_log(&self, query: &str) -> DbResult<Vec<HistoryRecord>> {
        self.query_log(
            "SELECT id, name, dosage, scheduled_at, received_at, description \
             FROM dose_log \
             WHERE name LIKE '%' || ?1 || '%' OR scheduled_at LIKE '%' || ?1 || '%' \
             ORDER BY scheduled_at DESC, rowid DESC",
            params![query],
        )
    }

    fn query_log(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> DbResult<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(LogRow {
                id: row.get(0)?,
                name: row.get(1)?,
                dosage: row.get(2)?,
                scheduled_at: row.get(3)?,
                received_at: row.get(4)?,
                description: row.get(5)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }
}

/// Intermediate row struct for database mapping.
struct LogRow {
    id: String,
    name: String,
    dosage: i64,
    scheduled_at: String,
    received_at: String,
    description: Option<String>,
}

impl TryFrom<LogRow> for HistoryRecord {
    type Error = DbError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let scheduled_at = parse_minute(&row.scheduled_at).ok_or_else(|| {
            DbError::Constraint(format!("Bad scheduled_at timestamp: {}", row.scheduled_at))
        })?;
        let received_at = parse_minute(&row.received_at).ok_or_else(|| {
            DbError::Constraint(format!("Bad received_at timestamp: {}", row.received_at))
        })?;
        Ok(HistoryRecord {
            id: row.id,
            name: row.name,
            dosage: row.dosage,
            scheduled_at,
            received_at,
            description: row.description,
        })
    }
}
