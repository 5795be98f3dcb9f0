//! Reminder model and persistence port
//!
//! Reminders are created from voice commands (via the `reminders.create`
//! control signal) or the CLI, and fire a spoken notification when the
//! wall-clock minute matches.

use chrono::{DateTime, Utc};

use crate::time_parse::ClockTime;
use crate::Result;

/// A scheduled reminder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    /// Time of day the reminder fires
    pub time: ClockTime,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// The message displayed and spoken when the reminder fires
    #[must_use]
    pub fn announcement(&self) -> String {
        format!("Reminder: Time to {}", self.title)
    }
}

/// Persists reminders; storage format is the implementation's concern
pub trait ReminderStore: Send + Sync {
    /// Create and persist a new reminder
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be written
    fn create(&self, title: &str, time: ClockTime) -> Result<Reminder>;

    /// All reminders, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be read
    fn list(&self) -> Result<Vec<Reminder>>;

    /// Pending (not completed) reminders scheduled for exactly `time`
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be read
    fn due_at(&self, time: ClockTime) -> Result<Vec<Reminder>>;

    /// Mark a reminder completed or pending again
    ///
    /// # Errors
    ///
    /// Returns error if the reminder does not exist or the store cannot be
    /// written
    fn set_completed(&self, id: &str, completed: bool) -> Result<()>;

    /// Delete a reminder
    ///
    /// # Errors
    ///
    /// Returns error if the reminder does not exist or the store cannot be
    /// written
    fn delete(&self, id: &str) -> Result<()>;
}
