//! Intent classification for normalized voice commands
//!
//! Keyword matching over a fixed priority order; the first matching rule
//! wins, so a command containing several trigger phrases always takes the
//! earliest-listed intent.

use crate::time_parse::{self, ClockTime};

/// Minimum length for a command to be forwarded as a free-form AI query
const MIN_QUERY_CHARS: usize = 3;

/// The classified purpose of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Ask for the current wall-clock time
    TimeQuery,
    /// Open the camera feed
    CameraOpen,
    /// Close the camera feed
    CameraClose,
    /// Create a reminder; `time` is `None` when no time expression parsed
    ReminderCreate {
        title: String,
        time: Option<ClockTime>,
    },
    /// Show the reminder panel
    ReminderList,
    /// Summarize capabilities
    Help,
    /// Stop speaking (does not stop the recognition session)
    Stop,
    /// Free-form prompt for the AI backend
    Query { prompt: String },
}

impl Intent {
    /// Short name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TimeQuery => "time_query",
            Self::CameraOpen => "camera_open",
            Self::CameraClose => "camera_close",
            Self::ReminderCreate { .. } => "reminder_create",
            Self::ReminderList => "reminder_list",
            Self::Help => "help",
            Self::Stop => "stop",
            Self::Query { .. } => "query",
        }
    }
}

/// Classify a normalized (lowercased, trimmed) command.
///
/// Returns `None` when no rule matches and the command is too short to be
/// worth forwarding to the AI backend.
#[must_use]
pub fn classify(command: &str) -> Option<Intent> {
    if contains_any(command, &["what time", "current time", "time is it"]) {
        return Some(Intent::TimeQuery);
    }

    if contains_any(command, &["open camera", "start camera", "show camera"]) {
        return Some(Intent::CameraOpen);
    }

    if contains_any(command, &["close camera", "stop camera", "hide camera"]) {
        return Some(Intent::CameraClose);
    }

    if contains_any(command, &["remind me to", "add reminder"]) {
        let parsed = time_parse::parse_time(command);
        return Some(Intent::ReminderCreate {
            title: parsed.residual,
            time: parsed.time,
        });
    }

    if contains_any(command, &["show reminders", "my reminders"]) {
        return Some(Intent::ReminderList);
    }

    if contains_any(command, &["help", "what can you do"]) {
        return Some(Intent::Help);
    }

    if command == "stop" || command == "stop listening" {
        return Some(Intent::Stop);
    }

    if command.chars().count() > MIN_QUERY_CHARS {
        return Some(Intent::Query {
            prompt: command.to_string(),
        });
    }

    None
}

fn contains_any(command: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| command.contains(phrase))
}
