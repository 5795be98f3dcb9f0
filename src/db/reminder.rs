//! Reminder repository

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use super::DbPool;
use crate::reminders::{Reminder, ReminderStore};
use crate::time_parse::ClockTime;
use crate::{Error, Result};

/// `SQLite`-backed reminder store
#[derive(Clone)]
pub struct ReminderRepo {
    pool: DbPool,
}

impl ReminderRepo {
    /// Create a new reminder repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<super::DbConn> {
        self.pool.get().map_err(|e| Error::Database(e.to_string()))
    }
}

impl ReminderStore for ReminderRepo {
    fn create(&self, title: &str, time: ClockTime) -> Result<Reminder> {
        let conn = self.conn()?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO reminders (id, title, time, completed, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            [&id, title, &time.to_string(), &now.to_rfc3339()],
        )?;

        tracing::debug!(id, title, time = %time, "reminder created");

        Ok(Reminder {
            id,
            title: title.to_string(),
            time,
            completed: false,
            created_at: now,
        })
    }

    fn list(&self) -> Result<Vec<Reminder>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, time, completed, created_at FROM reminders
             ORDER BY created_at, id",
        )?;
        let reminders = stmt
            .query_map([], row_to_reminder)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reminders)
    }

    fn due_at(&self, time: ClockTime) -> Result<Vec<Reminder>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, time, completed, created_at FROM reminders
             WHERE time = ?1 AND completed = 0
             ORDER BY created_at, id",
        )?;
        let reminders = stmt
            .query_map([time.to_string()], row_to_reminder)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reminders)
    }

    fn set_completed(&self, id: &str, completed: bool) -> Result<()> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE reminders SET completed = ?1 WHERE id = ?2",
            rusqlite::params![i32::from(completed), id],
        )?;

        if changed == 0 {
            return Err(Error::Reminder(format!("no reminder with id {id}")));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;

        let changed = conn.execute("DELETE FROM reminders WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(Error::Reminder(format!("no reminder with id {id}")));
        }
        Ok(())
    }
}

/// Map a result row onto the reminder model
fn row_to_reminder(row: &Row<'_>) -> rusqlite::Result<Reminder> {
    let time_text: String = row.get(2)?;
    let created_at: String = row.get(4)?;

    Ok(Reminder {
        id: row.get(0)?,
        title: row.get(1)?,
        // Stored times are written from a validated ClockTime
        time: time_text.parse().unwrap_or(ClockTime { hour: 0, minute: 0 }),
        completed: row.get::<_, i32>(3)? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc)),
    })
}
