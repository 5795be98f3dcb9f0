//! Shared test utilities
//!
//! Recording implementations of the capability ports, so tests can observe
//! exactly what the interpreter and session drove.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use vesper_assistant::{
    AiClient, ControlSignal, ConversationLog, Error, RecognitionEngine, Result, Sender,
    SignalSink, SynthesisEngine,
};

/// Conversation log that records every turn
#[derive(Default, Clone)]
pub struct RecordingLog {
    entries: Arc<Mutex<Vec<(Sender, String)>>>,
}

impl RecordingLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded turns in order
    pub fn entries(&self) -> Vec<(Sender, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Texts of turns from one sender, in order
    pub fn texts_from(&self, sender: Sender) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == sender)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl ConversationLog for RecordingLog {
    fn emit(&self, text: &str, sender: Sender) {
        self.entries.lock().unwrap().push((sender, text.to_string()));
    }
}

/// Signal sink that records every dispatch
#[derive(Default, Clone)]
pub struct RecordingSink {
    signals: Arc<Mutex<Vec<ControlSignal>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<ControlSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl SignalSink for RecordingSink {
    fn dispatch(&self, signal: ControlSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

/// What the stub AI does with a query
#[derive(Clone)]
pub enum AiBehavior {
    /// Answer every prompt with this text
    Answer(String),
    /// Fail every prompt
    Fail,
    /// Never resolve (exercises the timeout path)
    Hang,
}

/// AI port that records prompts and follows a scripted behavior
#[derive(Clone)]
pub struct StubAi {
    behavior: AiBehavior,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubAi {
    #[must_use]
    pub fn new(behavior: AiBehavior) -> Self {
        Self {
            behavior,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts forwarded so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for StubAi {
    async fn query(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.behavior {
            AiBehavior::Answer(answer) => Ok(answer.clone()),
            AiBehavior::Fail => Err(Error::AiQuery("stub failure".to_string())),
            AiBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
        }
    }
}

/// Synthesis engine that records speak/cancel ordering
///
/// With `hold` set, utterances pend until cancelled, which lets tests
/// observe the at-most-one-active invariant.
#[derive(Clone)]
pub struct MockSynthesis {
    events: Arc<Mutex<Vec<String>>>,
    active: Arc<AtomicUsize>,
    hold: bool,
    cancel_tx: Arc<watch::Sender<u64>>,
}

impl MockSynthesis {
    #[must_use]
    pub fn new(hold: bool) -> Self {
        let (cancel_tx, _rx) = watch::channel(0);
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(AtomicUsize::new(0)),
            hold,
            cancel_tx: Arc::new(cancel_tx),
        }
    }

    /// Recorded events: `speak:<text>` and `cancel`, in order
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Texts spoken so far
    pub fn spoken(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("speak:").map(String::from))
            .collect()
    }

    /// Utterances currently playing
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Decrements the active-utterance counter even when the future is dropped
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SynthesisEngine for MockSynthesis {
    async fn speak(&self, text: &str) -> Result<()> {
        self.events.lock().unwrap().push(format!("speak:{text}"));
        self.active.fetch_add(1, Ordering::SeqCst);
        let _guard = ActiveGuard(Arc::clone(&self.active));

        if self.hold {
            let mut cancelled = self.cancel_tx.subscribe();
            let _ = cancelled.changed().await;
        }

        Ok(())
    }

    fn cancel(&self) {
        self.events.lock().unwrap().push("cancel".to_string());
        self.cancel_tx.send_modify(|generation| *generation += 1);
    }
}

/// Recognition engine that counts lifecycle calls
///
/// Tests drive events directly through the channel they construct; the
/// engine itself only tracks start/stop.
pub struct MockEngine {
    start_calls: Arc<AtomicUsize>,
    stop_calls: Arc<AtomicUsize>,
    fail_start: Arc<AtomicBool>,
}

/// Observer half of a [`MockEngine`]
#[derive(Clone)]
pub struct MockEngineHandle {
    start_calls: Arc<AtomicUsize>,
    stop_calls: Arc<AtomicUsize>,
    fail_start: Arc<AtomicBool>,
}

impl MockEngine {
    #[must_use]
    pub fn new() -> (Self, MockEngineHandle) {
        let start_calls = Arc::new(AtomicUsize::new(0));
        let stop_calls = Arc::new(AtomicUsize::new(0));
        let fail_start = Arc::new(AtomicBool::new(false));
        (
            Self {
                start_calls: Arc::clone(&start_calls),
                stop_calls: Arc::clone(&stop_calls),
                fail_start: Arc::clone(&fail_start),
            },
            MockEngineHandle {
                start_calls,
                stop_calls,
                fail_start,
            },
        )
    }
}

impl MockEngineHandle {
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent start attempts fail
    pub fn fail_next_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecognitionEngine for MockEngine {
    async fn start(&mut self) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(Error::EngineStart("mock start failure".to_string()));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}
