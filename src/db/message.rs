//! Conversation log repository

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DbPool;
use crate::conversation::Sender;
use crate::{Error, Result};

/// A stored conversation turn
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Message repository
#[derive(Clone)]
pub struct MessageRepo {
    pool: DbPool,
}

impl MessageRepo {
    /// Create a new message repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append a conversation turn
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn add(&self, sender: Sender, content: &str) -> Result<StoredMessage> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO messages (id, sender, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            [&id, sender.as_str(), content, &now.to_rfc3339()],
        )?;

        Ok(StoredMessage {
            id,
            sender,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// The most recent `limit` turns, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredMessage>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT id, sender, content, created_at FROM messages
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let limit = limit as i64;
        let mut messages = stmt
            .query_map([limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .filter_map(|(id, sender, content, created_at)| {
                Some(StoredMessage {
                    id,
                    sender: Sender::from_str(&sender)?,
                    content,
                    created_at: parse_datetime(&created_at),
                })
            })
            .collect::<Vec<_>>();

        messages.reverse();
        Ok(messages)
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to now on corruption
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
