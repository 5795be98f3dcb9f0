//! Control signals dispatched to UI collaborators
//!
//! A closed set of named, payload-bearing notifications (camera and
//! reminder surfaces). Dispatch is fire-and-forget, carried over an
//! in-process channel; delivery is best-effort and never propagates errors
//! back to the interpreter.

use tokio::sync::mpsc;

use crate::time_parse::ClockTime;

/// A notification for a UI collaborator outside the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlSignal {
    /// Open the camera feed
    CameraOpen,
    /// Close the camera feed
    CameraClose,
    /// Bring the reminder panel into view
    RemindersShowPanel,
    /// Persist a new reminder
    ReminderCreate { title: String, time: ClockTime },
}

impl ControlSignal {
    /// The signal's wire name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CameraOpen => "camera.open",
            Self::CameraClose => "camera.close",
            Self::RemindersShowPanel => "reminders.showPanel",
            Self::ReminderCreate { .. } => "reminders.create",
        }
    }

    /// Structured payload, for collaborators that speak JSON
    #[must_use]
    pub fn payload(&self) -> Option<serde_json::Value> {
        match self {
            Self::ReminderCreate { title, time } => Some(serde_json::json!({
                "title": title,
                "time": time.to_string(),
            })),
            _ => None,
        }
    }
}

/// Fire-and-forget sink for control signals
pub trait SignalSink: Send + Sync {
    /// Dispatch a signal; failures are logged, never surfaced
    fn dispatch(&self, signal: ControlSignal);
}

/// Channel-backed signal bus connecting the interpreter to collaborators
#[derive(Clone)]
pub struct SignalBus {
    tx: mpsc::UnboundedSender<ControlSignal>,
}

impl SignalBus {
    /// Create a bus and the receiving end for the collaborator loop
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ControlSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SignalSink for SignalBus {
    fn dispatch(&self, signal: ControlSignal) {
        tracing::debug!(signal = signal.name(), "dispatching control signal");
        if self.tx.send(signal).is_err() {
            tracing::warn!("no collaborator listening for control signals");
        }
    }
}
