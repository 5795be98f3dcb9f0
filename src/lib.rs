//! Vesper - voice command interpreter and session core for an AI assistant
//!
//! This library provides the core of a voice assistant front-end:
//! - Time expression parsing and intent classification
//! - Command interpretation with dedup and cool-down guards
//! - Recognition session lifecycle with continuous listening
//! - Serialized speech output
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │             Recognition engine (host)                │
//! └────────────────────┬────────────────────────────────┘
//!                      │ finalized transcripts
//! ┌────────────────────▼────────────────────────────────┐
//! │   Recognition Session  →  Command Interpreter        │
//! │        (state machine)     (guards + intents)        │
//! └──────┬──────────────┬───────────────┬───────────────┘
//!        │              │               │
//! ┌──────▼─────┐ ┌──────▼──────┐ ┌──────▼──────────────┐
//! │  Speech    │ │  Control     │ │  AI query /          │
//! │  Output    │ │  signal bus  │ │  conversation log    │
//! └────────────┘ └─────────────┘ └─────────────────────┘
//! ```
//!
//! Everything below the engines is host-independent; the binary wires
//! console engines for development.

pub mod ai;
pub mod config;
pub mod console;
pub mod conversation;
pub mod daemon;
pub mod db;
pub mod error;
pub mod intent;
pub mod interpreter;
pub mod reminders;
pub mod signals;
pub mod time_parse;
pub mod voice;

pub use ai::{AiClient, GeminiClient, UnconfiguredAi};
pub use config::Config;
pub use conversation::{ConversationLog, Sender};
pub use daemon::Daemon;
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
pub use intent::{Intent, classify};
pub use interpreter::{CommandInterpreter, InterpreterConfig};
pub use reminders::{Reminder, ReminderStore};
pub use signals::{ControlSignal, SignalBus, SignalSink};
pub use time_parse::{ClockTime, ParsedCommand, parse_time};
pub use voice::{
    EngineErrorKind, RecognitionEngine, RecognitionEvent, RecognitionSession, SessionState,
    SpeechOutput, SynthesisEngine,
};
