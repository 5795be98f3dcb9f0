//! Console implementations of the engine capabilities
//!
//! The real recognition and synthesis engines are host capabilities this
//! crate only sees through traits. For development and demos the binary
//! wires these console stand-ins instead: typed lines arrive as finalized
//! transcripts, and spoken output is rendered with a simulated, cancellable
//! playback duration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::voice::{RecognitionEngine, RecognitionEvent, SynthesisEngine};
use crate::{Error, Result};

/// Event channel depth for the stdin reader
const EVENT_BUFFER: usize = 32;

/// Simulated playback speed
const MS_PER_WORD: u64 = 250;

/// Reads finalized "transcripts" from standard input
pub struct ConsoleRecognition {
    tx: mpsc::Sender<RecognitionEvent>,
    reader: Option<JoinHandle<()>>,
    input_closed: Arc<AtomicBool>,
}

impl ConsoleRecognition {
    /// Create the engine and the event stream the session will consume
    #[must_use]
    pub fn with_receiver() -> (Self, mpsc::Receiver<RecognitionEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        (
            Self {
                tx,
                reader: None,
                input_closed: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }
}

#[async_trait]
impl RecognitionEngine for ConsoleRecognition {
    async fn start(&mut self) -> Result<()> {
        if self.input_closed.load(Ordering::SeqCst) {
            return Err(Error::EngineStart("standard input closed".to_string()));
        }
        if self.reader.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        let tx = self.tx.clone();
        let input_closed = Arc::clone(&self.input_closed);

        self.reader = Some(tokio::spawn(async move {
            let _ = tx.send(RecognitionEvent::Started).await;

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let _ = tx.send(RecognitionEvent::Final(line)).await;
                    }
                    Ok(None) => {
                        input_closed.store(true, Ordering::SeqCst);
                        let _ = tx.send(RecognitionEvent::Ended).await;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        input_closed.store(true, Ordering::SeqCst);
                        let _ = tx.send(RecognitionEvent::Ended).await;
                        break;
                    }
                }
            }
        }));

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.reader.take() {
            handle.abort();
        }
        let _ = self.tx.try_send(RecognitionEvent::Ended);
    }
}

/// Renders utterances to the terminal with a simulated playback duration
pub struct ConsoleSynthesis {
    cancel_tx: watch::Sender<u64>,
}

impl ConsoleSynthesis {
    /// Create a console synthesizer
    #[must_use]
    pub fn new() -> Self {
        let (cancel_tx, _rx) = watch::channel(0);
        Self { cancel_tx }
    }
}

impl Default for ConsoleSynthesis {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SynthesisEngine for ConsoleSynthesis {
    async fn speak(&self, text: &str) -> Result<()> {
        // Subscribing marks the current generation seen, so only a cancel
        // issued after this point interrupts the utterance
        let mut cancelled = self.cancel_tx.subscribe();

        println!("\u{1f50a} {text}");

        tokio::select! {
            () = tokio::time::sleep(speaking_duration(text)) => {}
            _ = cancelled.changed() => {
                tracing::debug!("utterance cancelled");
            }
        }

        Ok(())
    }

    fn cancel(&self) {
        self.cancel_tx.send_modify(|generation| *generation += 1);
    }
}

/// Rough reading time for the simulated playback
fn speaking_duration(text: &str) -> Duration {
    let words = text.split_whitespace().count() as u64;
    Duration::from_millis((words * MS_PER_WORD).clamp(500, 10_000))
}
