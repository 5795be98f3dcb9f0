//! Command interpreter
//!
//! Takes a finalized transcript, guards against duplicates and rapid-fire
//! recognition, classifies it into an intent, and drives the side effects:
//! conversation messages, spoken responses, control signals, and AI queries.
//! Every failure is converted into a user-visible message; nothing here
//! crashes the session on a bad input.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tokio::time::Instant;

use crate::ai::AiClient;
use crate::conversation::{ConversationLog, Sender};
use crate::intent::{self, Intent};
use crate::signals::{ControlSignal, SignalSink};
use crate::time_parse::ClockTime;
use crate::voice::SpeechOutput;

/// Minimum spacing between two accepted commands
pub const COOLDOWN: Duration = Duration::from_millis(1000);

/// Best-effort pause after dispatching a control signal, giving the
/// collaborator a chance to begin handling it
pub const DISPATCH_DELAY: Duration = Duration::from_millis(100);

/// Default ceiling on a free-form AI query
pub const AI_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed capability summary for the help intent
const HELP_MSG: &str = "You can ask me: 'what time is it', 'remind me to [task] at [time]', \
    'open camera', 'close camera', 'show reminders', or ask me questions. \
    Say 'stop' to stop me from speaking and listening.";

/// Clarification request when a reminder has no parseable time
const CLARIFY_MSG: &str = "I couldn't understand the time for your reminder. Please try again \
    with a specific time, like 'Remind me to take medicine at 3 PM'";

/// Generic apology for any AI query failure
const APOLOGY_MSG: &str = "Sorry, I had trouble processing your request. Please try again.";

/// Timing knobs for the interpreter
#[derive(Debug, Clone, Copy)]
pub struct InterpreterConfig {
    /// Minimum spacing between accepted commands
    pub cooldown: Duration,
    /// Pause after each control-signal dispatch
    pub dispatch_delay: Duration,
    /// Ceiling on free-form AI queries
    pub ai_timeout: Duration,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            cooldown: COOLDOWN,
            dispatch_delay: DISPATCH_DELAY,
            ai_timeout: AI_TIMEOUT,
        }
    }
}

/// The last accepted command, kept for dedup and cool-down checks
struct CommandRecord {
    /// Raw transcript exactly as the engine reported it
    raw: String,
    /// When it was accepted
    at: Instant,
}

/// Interprets transcripts into side effects
///
/// One interpreter exists per recognition session; its dedup state lives and
/// dies with the session.
pub struct CommandInterpreter {
    config: InterpreterConfig,
    log: Arc<dyn ConversationLog>,
    speech: Arc<SpeechOutput>,
    signals: Arc<dyn SignalSink>,
    ai: Arc<dyn AiClient>,
    last_accepted: Option<CommandRecord>,
    /// Previous free-form prompt, tracked separately from the dedup record
    last_prompt: Option<String>,
}

impl CommandInterpreter {
    /// Create an interpreter over its capability ports
    #[must_use]
    pub fn new(
        config: InterpreterConfig,
        log: Arc<dyn ConversationLog>,
        speech: Arc<SpeechOutput>,
        signals: Arc<dyn SignalSink>,
        ai: Arc<dyn AiClient>,
    ) -> Self {
        Self {
            config,
            log,
            speech,
            signals,
            ai,
            last_accepted: None,
            last_prompt: None,
        }
    }

    /// Process one finalized transcript
    ///
    /// Identical transcripts and commands inside the cool-down window are
    /// dropped, not deferred.
    pub async fn process(&mut self, transcript: &str) {
        if self
            .last_accepted
            .as_ref()
            .is_some_and(|record| record.raw == transcript)
        {
            tracing::debug!(transcript, "duplicate transcript dropped");
            return;
        }

        let now = Instant::now();
        if let Some(record) = &self.last_accepted {
            if now.duration_since(record.at) < self.config.cooldown {
                tracing::debug!(transcript, "command inside cool-down window, dropped");
                return;
            }
        }

        let command = transcript.to_lowercase().trim().to_string();
        self.last_accepted = Some(CommandRecord {
            raw: transcript.to_string(),
            at: now,
        });
        self.log.emit(&command, Sender::User);

        let Some(intent) = intent::classify(&command) else {
            tracing::debug!(%command, "no intent matched");
            return;
        };
        tracing::info!(intent = intent.name(), "command classified");

        match intent {
            Intent::TimeQuery => {
                let response = format!("The current time is {}", current_time_12h());
                self.respond(&response);
            }
            Intent::CameraOpen => {
                self.dispatch(ControlSignal::CameraOpen).await;
                self.respond("Opening camera...");
            }
            Intent::CameraClose => {
                self.dispatch(ControlSignal::CameraClose).await;
                self.respond("Closing camera...");
            }
            Intent::ReminderCreate {
                title,
                time: Some(time),
            } => {
                self.dispatch(ControlSignal::ReminderCreate {
                    title: title.clone(),
                    time,
                })
                .await;
                let response = format!("Adding reminder: {title} at {}", time.format_12h());
                self.respond(&response);
            }
            Intent::ReminderCreate { time: None, .. } => {
                self.respond(CLARIFY_MSG);
            }
            Intent::ReminderList => {
                self.dispatch(ControlSignal::RemindersShowPanel).await;
                self.respond("Here are your reminders...");
            }
            Intent::Help => {
                self.respond(HELP_MSG);
            }
            Intent::Stop => {
                // Stops speaking only; the recognition session keeps running
                self.speech.cancel();
            }
            Intent::Query { prompt } => {
                self.handle_query(prompt).await;
            }
        }
    }

    /// Forward a free-form prompt to the AI port
    async fn handle_query(&mut self, prompt: String) {
        if self.last_prompt.as_deref() == Some(prompt.as_str()) {
            tracing::debug!(%prompt, "repeated free-form prompt suppressed");
            return;
        }
        self.last_prompt = Some(prompt.clone());

        match tokio::time::timeout(self.config.ai_timeout, self.ai.query(&prompt)).await {
            Ok(Ok(answer)) => self.respond(&answer),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "AI query failed");
                self.respond(APOLOGY_MSG);
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.config.ai_timeout, "AI query timed out");
                self.respond(APOLOGY_MSG);
            }
        }
    }

    /// Display and speak a response
    fn respond(&self, text: &str) {
        self.log.emit(text, Sender::Assistant);
        self.speech.speak(text);
    }

    /// Dispatch a control signal, then yield briefly so the collaborator can
    /// begin handling it. Best-effort; no delivery confirmation exists.
    async fn dispatch(&self, signal: ControlSignal) {
        self.signals.dispatch(signal);
        tokio::time::sleep(self.config.dispatch_delay).await;
    }
}

/// Current wall-clock time as "h:mm AM/PM"
fn current_time_12h() -> String {
    let now = chrono::Local::now();
    #[allow(clippy::cast_possible_truncation)]
    let time = ClockTime {
        hour: now.hour() as u8,
        minute: now.minute() as u8,
    };
    time.format_12h()
}
