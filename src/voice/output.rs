//! Speech output controller
//!
//! Serializes spoken responses: starting a new utterance always cancels the
//! active one first, so at most one utterance plays at any instant.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::Result;

/// Host text-to-speech capability
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Play an utterance to completion
    ///
    /// Resolves when playback ends naturally and must return promptly after
    /// [`cancel`](Self::cancel).
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails mid-utterance
    async fn speak(&self, text: &str) -> Result<()>;

    /// Interrupt the active utterance, if any
    fn cancel(&self);
}

/// Serializes utterances over a synthesis engine
pub struct SpeechOutput {
    engine: Arc<dyn SynthesisEngine>,
    speaking: Arc<AtomicBool>,
    current: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SpeechOutput {
    /// Create a controller over the given engine
    #[must_use]
    pub fn new(engine: Arc<dyn SynthesisEngine>) -> Self {
        Self {
            engine,
            speaking: Arc::new(AtomicBool::new(false)),
            current: std::sync::Mutex::new(None),
        }
    }

    /// Speak `text`, cancelling any utterance already playing
    pub fn speak(&self, text: &str) {
        self.cancel();

        tracing::debug!(text, "speaking");
        self.speaking.store(true, Ordering::SeqCst);

        let engine = Arc::clone(&self.engine);
        let speaking = Arc::clone(&self.speaking);
        let text = text.to_string();

        let handle = tokio::spawn(async move {
            if let Err(e) = engine.speak(&text).await {
                tracing::warn!(error = %e, "speech synthesis failed");
            }
            speaking.store(false, Ordering::SeqCst);
        });

        *self.current.lock().unwrap() = Some(handle);
    }

    /// Cancel the active utterance
    ///
    /// Clears the speaking flag eagerly, without waiting for the engine to
    /// acknowledge the cancellation.
    pub fn cancel(&self) {
        if let Some(handle) = self.current.lock().unwrap().take() {
            handle.abort();
        }
        self.engine.cancel();
        self.speaking.store(false, Ordering::SeqCst);
    }

    /// Whether an utterance is currently playing
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}
