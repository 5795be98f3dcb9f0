//! Voice processing module
//!
//! Owns the two stateful halves of the voice loop: the recognition session
//! (continuous listening with auto-restart) and the speech output controller
//! (one utterance at a time). The engines themselves are host capabilities
//! behind traits.

mod output;
mod session;

pub use output::{SpeechOutput, SynthesisEngine};
pub use session::{
    EngineErrorKind, RecognitionEngine, RecognitionEvent, RecognitionSession, SessionState,
};
