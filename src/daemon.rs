//! Daemon - the main assistant service
//!
//! Wires the capability ports together: the recognition session feeds the
//! command interpreter, control signals flow to the camera and reminder
//! collaborators, and a periodic tick announces due reminders.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tokio::sync::mpsc;

use crate::ai::{AiClient, GeminiClient, UnconfiguredAi};
use crate::console::{ConsoleRecognition, ConsoleSynthesis};
use crate::conversation::{ConversationLog, Sender};
use crate::db::{self, DbPool, MessageRepo, ReminderRepo};
use crate::interpreter::CommandInterpreter;
use crate::reminders::ReminderStore;
use crate::signals::{ControlSignal, SignalBus};
use crate::time_parse::ClockTime;
use crate::voice::{RecognitionSession, SpeechOutput};
use crate::{Config, Result};

/// The assistant daemon - owns the session and its collaborators
pub struct Daemon {
    config: Config,
    db: DbPool,
}

impl Daemon {
    /// Create a new daemon instance
    ///
    /// # Errors
    ///
    /// Returns error if initialization fails
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.db_path();
        let db = db::init(&db_path)?;

        tracing::info!(path = %db_path.display(), "database initialized");

        Ok(Self { config, db })
    }

    /// Run the daemon until interrupted or input is exhausted
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot start
    pub async fn run(self) -> Result<()> {
        let assistant_name = self.config.assistant_name.clone();
        tracing::info!(assistant = %assistant_name, "daemon running");

        // Conversation log: terminal display plus persistence
        let log: Arc<dyn ConversationLog> = Arc::new(ConsoleConversation {
            assistant_name,
            messages: MessageRepo::new(self.db.clone()),
        });

        // Speech output over the console synthesizer
        let speech = Arc::new(SpeechOutput::new(Arc::new(ConsoleSynthesis::new())));

        // AI query backend
        let ai: Arc<dyn AiClient> = match self.config.ai.api_key.clone() {
            Some(key) => Arc::new(GeminiClient::new(key, self.config.ai.model.clone())?),
            None => {
                tracing::warn!("no Gemini API key configured - free-form queries will fail");
                Arc::new(UnconfiguredAi)
            }
        };

        // Control signal bus and its collaborator loop
        let (bus, signal_rx) = SignalBus::channel();
        let reminders = ReminderRepo::new(self.db.clone());
        tokio::spawn(handle_control_signals(signal_rx, reminders.clone()));

        // Periodic due-reminder announcements
        tokio::spawn(reminder_tick(
            reminders,
            Arc::clone(&log),
            Arc::clone(&speech),
            self.config.reminders.check_interval_secs,
        ));

        let mut interpreter = CommandInterpreter::new(
            self.config.interpreter_config(),
            Arc::clone(&log),
            Arc::clone(&speech),
            Arc::new(bus),
            ai,
        );

        // Set up shutdown signal
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(()).await;
            }
        });

        // Recognition session over the console engine
        let (engine, events) = ConsoleRecognition::with_receiver();
        let mut session = RecognitionSession::new(Box::new(engine), Arc::clone(&log));
        session.start().await?;

        println!("Listening. Type a command ('help' to see what I can do, ctrl-D to quit).");
        session.run(events, &mut interpreter, &mut shutdown_rx).await;

        speech.cancel();
        tracing::info!("daemon stopped");
        Ok(())
    }
}

/// Terminal conversation log backed by the message repository
struct ConsoleConversation {
    assistant_name: String,
    messages: MessageRepo,
}

impl ConversationLog for ConsoleConversation {
    fn emit(&self, text: &str, sender: Sender) {
        match sender {
            Sender::User => println!("You: {text}"),
            Sender::Assistant => println!("{}: {text}", self.assistant_name),
        }

        if let Err(e) = self.messages.add(sender, text) {
            tracing::warn!(error = %e, "failed to store conversation turn");
        }
    }
}

/// Consume control signals on behalf of the camera and reminder surfaces
async fn handle_control_signals(
    mut rx: mpsc::UnboundedReceiver<ControlSignal>,
    reminders: ReminderRepo,
) {
    let mut camera_open = false;

    while let Some(signal) = rx.recv().await {
        tracing::debug!(signal = signal.name(), "control signal received");

        match signal {
            ControlSignal::CameraOpen => {
                if camera_open {
                    tracing::debug!("camera already open");
                } else {
                    camera_open = true;
                    tracing::info!("camera feed opened");
                }
            }
            ControlSignal::CameraClose => {
                if camera_open {
                    camera_open = false;
                    tracing::info!("camera feed closed");
                } else {
                    tracing::debug!("camera already closed");
                }
            }
            ControlSignal::RemindersShowPanel => match reminders.list() {
                Ok(all) if all.is_empty() => println!("  (no reminders)"),
                Ok(all) => {
                    for reminder in all {
                        let mark = if reminder.completed { "x" } else { " " };
                        println!(
                            "  [{mark}] {} at {}",
                            reminder.title,
                            reminder.time.format_12h()
                        );
                    }
                }
                Err(e) => tracing::error!(error = %e, "failed to list reminders"),
            },
            ControlSignal::ReminderCreate { title, time } => {
                if let Err(e) = reminders.create(&title, time) {
                    tracing::error!(error = %e, "failed to persist reminder");
                }
            }
        }
    }
}

/// Announce pending reminders whose time matches the current minute
async fn reminder_tick(
    store: ReminderRepo,
    log: Arc<dyn ConversationLog>,
    speech: Arc<SpeechOutput>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    // Skip the first immediate tick
    interval.tick().await;

    // A minute already announced must not fire again on the next tick
    let mut last_fired: Option<ClockTime> = None;

    loop {
        interval.tick().await;

        let now = chrono::Local::now();
        #[allow(clippy::cast_possible_truncation)]
        let minute = ClockTime {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
        };

        if last_fired == Some(minute) {
            continue;
        }

        match store.due_at(minute) {
            Ok(due) if !due.is_empty() => {
                last_fired = Some(minute);

                let announcements: Vec<String> =
                    due.iter().map(crate::reminders::Reminder::announcement).collect();
                for announcement in &announcements {
                    log.emit(announcement, Sender::Assistant);
                }
                // One utterance for the whole minute; speaking each would
                // cancel all but the last
                speech.speak(&announcements.join(". "));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "reminder check failed"),
        }
    }
}
