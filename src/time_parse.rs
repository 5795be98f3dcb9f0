//! Clock-time extraction from natural-language commands
//!
//! Pulls an explicit time of day ("3 pm", "14:30") out of a spoken command
//! and returns the leftover text, which becomes the reminder title.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// 12-hour expression, e.g. "3 pm", "12:45am". Checked first.
static MERIDIEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(1[0-2]|0?[1-9])(?::([0-5][0-9]))?\s*(am|pm)\b").expect("valid regex")
});

/// 24-hour expression, e.g. "14:30". Only consulted if no 12-hour match.
static MILITARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?[0-9]|2[0-3]):([0-5][0-9])\b").expect("valid regex"));

/// The word "at" on its own, stripped from residual text once
static AT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bat\b").expect("valid regex"));

/// Leading command phrase stripped from residual text
static LEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(remind me to|add reminder|to)\s*").expect("valid regex"));

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A time of day extracted from a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
}

impl ClockTime {
    /// Create a clock time, validating ranges
    ///
    /// # Errors
    ///
    /// Returns error if hour > 23 or minute > 59
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::Reminder(format!("invalid time {hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Format as a 12-hour clock string, e.g. "3:05 PM"
    #[must_use]
    pub fn format_12h(&self) -> String {
        let meridiem = if self.hour < 12 { "AM" } else { "PM" };
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{hour}:{:02} {meridiem}", self.minute)
    }
}

impl fmt::Display for ClockTime {
    /// Renders as "HH:MM", the wire form of reminder times
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| Error::Reminder(format!("invalid time {s:?}")))?;
        let hour: u8 = h
            .parse()
            .map_err(|_| Error::Reminder(format!("invalid hour {h:?}")))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| Error::Reminder(format!("invalid minute {m:?}")))?;
        Self::new(hour, minute)
    }
}

/// A command split into an optional clock time and the leftover text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Extracted time, if any expression matched
    pub time: Option<ClockTime>,
    /// The command with the time span and filler words removed
    pub residual: String,
}

/// Extract a clock time and residual text from a command.
///
/// A 12-hour expression takes precedence over a 24-hour one, and the first
/// match wins; no attempt is made to find a "better" match later in the
/// string. When no time is present the residual is the normalized input.
#[must_use]
pub fn parse_time(command: &str) -> ParsedCommand {
    let normalized = normalize(command);

    if let Some(caps) = MERIDIEM_RE.captures(&normalized) {
        let span = caps.get(0).expect("match has span");
        let mut hour: u8 = caps[1].parse().expect("matched digits");
        let minute: u8 = caps
            .get(2)
            .map_or(0, |m| m.as_str().parse().expect("matched digits"));

        match &caps[3] {
            "pm" if hour != 12 => hour += 12,
            "am" if hour == 12 => hour = 0,
            _ => {}
        }

        return ParsedCommand {
            // Range is enforced by the pattern itself
            time: Some(ClockTime { hour, minute }),
            residual: strip_residual(&normalized, span.range()),
        };
    }

    if let Some(caps) = MILITARY_RE.captures(&normalized) {
        let span = caps.get(0).expect("match has span");
        let hour: u8 = caps[1].parse().expect("matched digits");
        let minute: u8 = caps[2].parse().expect("matched digits");

        return ParsedCommand {
            time: Some(ClockTime { hour, minute }),
            residual: strip_residual(&normalized, span.range()),
        };
    }

    ParsedCommand {
        time: None,
        residual: normalized,
    }
}

/// Lowercase, drop periods, collapse whitespace
fn normalize(command: &str) -> String {
    let lowered = command.to_lowercase().replace('.', "");
    SPACES_RE.replace_all(&lowered, " ").trim().to_string()
}

/// Remove the matched time span plus filler words, leaving the title text
fn strip_residual(normalized: &str, span: std::ops::Range<usize>) -> String {
    let mut rest = String::with_capacity(normalized.len());
    rest.push_str(&normalized[..span.start]);
    rest.push_str(&normalized[span.end..]);

    let rest = AT_RE.replace(&rest, "");
    let rest = LEAD_RE.replace(rest.trim_start(), "");
    SPACES_RE.replace_all(&rest, " ").trim().to_string()
}
