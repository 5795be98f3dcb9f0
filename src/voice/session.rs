//! Recognition session manager
//!
//! Owns the lifecycle of one continuous speech-recognition engagement and
//! feeds finalized transcripts to the command interpreter. The engine keeps
//! ending sessions on its own (silence, internal limits); as long as the
//! session has not been told to stop, an "ended" callback restarts it
//! immediately, which is what makes listening continuous.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::conversation::{ConversationLog, Sender};
use crate::interpreter::CommandInterpreter;
use crate::Result;

/// Shown once when the microphone permission is denied
const NOT_ALLOWED_MSG: &str =
    "Microphone access was denied. Please check your microphone settings.";

/// Shown when the engine reports a silent segment
const NO_SPEECH_MSG: &str = "No speech was detected. Please try speaking again.";

/// Shown when the auto-restart itself fails
const RESTART_FAILED_MSG: &str = "Voice recognition stopped unexpectedly. Please try again.";

/// Host speech-recognition capability
///
/// Events are delivered on the channel handed out at construction, in the
/// order the engine produced them.
#[async_trait]
pub trait RecognitionEngine: Send {
    /// Begin recognizing
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotSupported`] if the host has no recognition
    /// capability, or [`crate::Error::EngineStart`] if the engine refused to
    /// start
    async fn start(&mut self) -> Result<()>;

    /// Request the engine stop; fire-and-forget
    fn stop(&mut self);
}

/// An event reported by a recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// The engine is recognizing
    Started,
    /// A partial, still-changing transcript; discarded
    Interim(String),
    /// A finalized transcript for one speech segment
    Final(String),
    /// The engine reported an error
    Error(EngineErrorKind),
    /// The engine stopped recognizing (naturally or after `stop`)
    Ended,
}

/// Classification of engine-reported errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// Microphone permission denied; terminal for the session
    NotAllowed,
    /// Nothing was heard; transient, the session keeps going
    NoSpeech,
    /// Anything else; logged and ignored
    Other(String),
}

/// Recognition session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session running
    Idle,
    /// Start requested, waiting for the engine's started callback
    Starting,
    /// Engine is recognizing
    Active,
    /// Stop requested, waiting for the engine to wind down
    Stopping,
}

/// Manages one continuous recognition session
pub struct RecognitionSession {
    engine: Box<dyn RecognitionEngine>,
    state: SessionState,
    /// While set, an engine "ended" event triggers an immediate restart.
    /// Checked synchronously in the ended handler so a stop request can
    /// never race an in-flight callback.
    should_listen: bool,
    log: Arc<dyn ConversationLog>,
}

impl RecognitionSession {
    /// Create a session over the given engine
    #[must_use]
    pub fn new(engine: Box<dyn RecognitionEngine>, log: Arc<dyn ConversationLog>) -> Self {
        Self {
            engine,
            state: SessionState::Idle,
            should_listen: false,
            log,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Start listening
    ///
    /// The Active transition happens asynchronously when the engine reports
    /// its started callback. No-op if a session is already underway.
    ///
    /// # Errors
    ///
    /// Returns error if the engine is unsupported or refused to start
    pub async fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Idle {
            return Ok(());
        }

        self.should_listen = true;
        if let Err(e) = self.engine.start().await {
            self.should_listen = false;
            return Err(e);
        }

        self.state = SessionState::Starting;
        tracing::info!("recognition session starting");
        Ok(())
    }

    /// Stop listening; idempotent
    ///
    /// Clears the restart flag first so any engine callback already in
    /// flight cannot revive the session.
    pub fn stop(&mut self) {
        if self.state == SessionState::Idle {
            return;
        }

        self.should_listen = false;
        self.state = SessionState::Stopping;
        self.engine.stop();
        self.state = SessionState::Idle;
        tracing::info!("recognition session stopped");
    }

    /// Apply one engine event
    ///
    /// Finalized transcripts are handed to the interpreter and fully
    /// processed (including any awaited AI query) before this returns, which
    /// keeps transcript handling serial.
    pub async fn handle_event(
        &mut self,
        event: RecognitionEvent,
        interpreter: &mut CommandInterpreter,
    ) {
        match event {
            RecognitionEvent::Started => {
                self.state = SessionState::Active;
                tracing::debug!("recognition active");
            }
            RecognitionEvent::Interim(text) => {
                tracing::trace!(%text, "interim result discarded");
            }
            RecognitionEvent::Final(text) => {
                let transcript = text.trim();
                if !transcript.is_empty() {
                    tracing::debug!(transcript, "final transcript");
                    interpreter.process(transcript).await;
                }
            }
            RecognitionEvent::Error(EngineErrorKind::NotAllowed) => {
                tracing::warn!("microphone permission denied, session is over");
                self.should_listen = false;
                self.state = SessionState::Idle;
                self.log.emit(NOT_ALLOWED_MSG, Sender::Assistant);
            }
            RecognitionEvent::Error(EngineErrorKind::NoSpeech) => {
                tracing::debug!("no speech detected");
                self.log.emit(NO_SPEECH_MSG, Sender::Assistant);
            }
            RecognitionEvent::Error(EngineErrorKind::Other(message)) => {
                tracing::warn!(%message, "recognition engine error");
            }
            RecognitionEvent::Ended => self.handle_ended().await,
        }
    }

    /// Drive the session from an engine event stream until shutdown
    ///
    /// Returns when the shutdown channel fires or the engine closes its
    /// event stream.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<RecognitionEvent>,
        interpreter: &mut CommandInterpreter,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("shutdown requested");
                    self.stop();
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle_event(event, interpreter).await;
                        // Terminal: a fatal error or failed restart parked the
                        // session; only an explicit user restart revives it
                        if self.state == SessionState::Idle && !self.should_listen {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("engine event stream closed");
                        self.should_listen = false;
                        self.state = SessionState::Idle;
                        break;
                    }
                }
            }
        }
    }

    /// The ended self-loop: restart while the session should stay alive
    async fn handle_ended(&mut self) {
        if !self.should_listen {
            self.state = SessionState::Idle;
            tracing::debug!("recognition ended");
            return;
        }

        tracing::debug!("recognition ended, restarting");
        self.state = SessionState::Starting;
        if let Err(e) = self.engine.start().await {
            tracing::error!(error = %e, "failed to restart recognition");
            self.should_listen = false;
            self.state = SessionState::Idle;
            self.log.emit(RESTART_FAILED_MSG, Sender::Assistant);
        }
    }
}
