//! Command interpreter integration tests
//!
//! Drives the interpreter through its capability ports and checks the
//! dedup, cool-down, priority-order, and response invariants.

use std::sync::Arc;
use std::time::Duration;

use vesper_assistant::{
    ClockTime, CommandInterpreter, ControlSignal, InterpreterConfig, Sender, SpeechOutput,
};

mod common;
use common::{AiBehavior, MockSynthesis, RecordingLog, RecordingSink, StubAi};

struct Harness {
    log: RecordingLog,
    sink: RecordingSink,
    synth: MockSynthesis,
    ai: StubAi,
    speech: Arc<SpeechOutput>,
    interpreter: CommandInterpreter,
}

/// Build an interpreter over recording ports
fn harness_with(behavior: AiBehavior, hold_utterances: bool) -> Harness {
    let log = RecordingLog::new();
    let sink = RecordingSink::new();
    let synth = MockSynthesis::new(hold_utterances);
    let ai = StubAi::new(behavior);
    let speech = Arc::new(SpeechOutput::new(Arc::new(synth.clone())));

    let interpreter = CommandInterpreter::new(
        InterpreterConfig::default(),
        Arc::new(log.clone()),
        Arc::clone(&speech),
        Arc::new(sink.clone()),
        Arc::new(ai.clone()),
    );

    Harness {
        log,
        sink,
        synth,
        ai,
        speech,
        interpreter,
    }
}

fn harness() -> Harness {
    harness_with(
        AiBehavior::Answer("Rust is a systems language.".to_string()),
        false,
    )
}

/// Let spawned speech tasks run (the paused clock auto-advances)
async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

/// Step past the cool-down window
async fn past_cooldown() {
    tokio::time::advance(Duration::from_millis(1100)).await;
}

#[tokio::test(start_paused = true)]
async fn duplicate_transcript_accepted_once() {
    let mut h = harness();

    h.interpreter.process("what time is it").await;
    h.interpreter.process("what time is it").await;
    settle().await;

    assert_eq!(h.log.texts_from(Sender::User).len(), 1);
    assert_eq!(h.log.texts_from(Sender::Assistant).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cooldown_drops_rapid_commands() {
    let mut h = harness();

    h.interpreter.process("open camera").await;
    // Different transcripts inside the window are dropped, not queued
    h.interpreter.process("close camera").await;
    h.interpreter.process("show reminders").await;

    assert_eq!(h.log.texts_from(Sender::User), vec!["open camera"]);
    assert_eq!(h.sink.signals(), vec![ControlSignal::CameraOpen]);

    past_cooldown().await;
    h.interpreter.process("close camera").await;

    assert_eq!(
        h.log.texts_from(Sender::User),
        vec!["open camera", "close camera"]
    );
    assert_eq!(
        h.sink.signals(),
        vec![ControlSignal::CameraOpen, ControlSignal::CameraClose]
    );
}

#[tokio::test(start_paused = true)]
async fn time_query_speaks_formatted_time() {
    let mut h = harness();

    h.interpreter.process("what time is it").await;
    settle().await;

    let responses = h.log.texts_from(Sender::Assistant);
    assert_eq!(responses.len(), 1);

    let pattern = regex::Regex::new(r"^The current time is \d{1,2}:\d{2} (AM|PM)$").unwrap();
    assert!(
        pattern.is_match(&responses[0]),
        "unexpected response: {}",
        responses[0]
    );

    // Spoken text matches the displayed text
    assert_eq!(h.synth.spoken(), responses);
}

#[tokio::test(start_paused = true)]
async fn camera_phrase_priority_dispatches_one_signal() {
    let mut h = harness();

    // Carries both an open and a close trigger; the earliest-listed intent
    // wins and exactly one signal goes out
    h.interpreter.process("open camera and show camera").await;
    settle().await;

    assert_eq!(h.sink.signals(), vec![ControlSignal::CameraOpen]);
    assert_eq!(
        h.log.texts_from(Sender::Assistant),
        vec!["Opening camera..."]
    );
}

#[tokio::test(start_paused = true)]
async fn reminder_with_time_signals_create() {
    let mut h = harness();

    h.interpreter
        .process("remind me to take medicine at 3 pm")
        .await;
    settle().await;

    assert_eq!(
        h.sink.signals(),
        vec![ControlSignal::ReminderCreate {
            title: "take medicine".to_string(),
            time: ClockTime { hour: 15, minute: 0 },
        }]
    );
    assert_eq!(
        h.log.texts_from(Sender::Assistant),
        vec!["Adding reminder: take medicine at 3:00 PM"]
    );
}

#[tokio::test(start_paused = true)]
async fn reminder_without_time_asks_for_clarification() {
    let mut h = harness();

    h.interpreter.process("remind me to call mom").await;
    settle().await;

    assert!(h.sink.signals().is_empty(), "no reminder should be created");

    let responses = h.log.texts_from(Sender::Assistant);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].contains("couldn't understand the time"));
}

#[tokio::test(start_paused = true)]
async fn reminder_list_shows_panel() {
    let mut h = harness();

    h.interpreter.process("show reminders").await;
    settle().await;

    assert_eq!(h.sink.signals(), vec![ControlSignal::RemindersShowPanel]);
    assert_eq!(
        h.log.texts_from(Sender::Assistant),
        vec!["Here are your reminders..."]
    );
}

#[tokio::test(start_paused = true)]
async fn help_lists_capabilities() {
    let mut h = harness();

    h.interpreter.process("what can you do").await;
    settle().await;

    let responses = h.log.texts_from(Sender::Assistant);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].contains("what time is it"));
    assert!(responses[0].contains("remind me to"));
    assert!(responses[0].contains("Say 'stop'"));
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_speech_without_responding() {
    let mut h = harness_with(
        AiBehavior::Answer("unused".to_string()),
        true, // utterances pend until cancelled
    );

    h.interpreter.process("what time is it").await;
    settle().await;
    assert!(h.speech.is_speaking());

    past_cooldown().await;
    h.interpreter.process("stop").await;
    settle().await;

    // Speech is cancelled eagerly and no new message is emitted or spoken
    assert!(!h.speech.is_speaking());
    assert_eq!(h.log.texts_from(Sender::Assistant).len(), 1);
    assert_eq!(h.synth.spoken().len(), 1);
    assert_eq!(h.synth.events().last().map(String::as_str), Some("cancel"));
}

#[tokio::test(start_paused = true)]
async fn free_form_query_answers() {
    let mut h = harness();

    h.interpreter.process("how tall is mount everest").await;
    settle().await;

    assert_eq!(h.ai.prompts(), vec!["how tall is mount everest"]);
    assert_eq!(
        h.log.texts_from(Sender::Assistant),
        vec!["Rust is a systems language."]
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_free_form_prompt_suppressed() {
    let mut h = harness();

    // Raw transcripts differ (case), so the dedup guard passes; the
    // normalized prompt is identical and must not be re-issued
    h.interpreter.process("What is rust").await;
    past_cooldown().await;
    h.interpreter.process("what is rust").await;
    settle().await;

    assert_eq!(h.ai.prompts(), vec!["what is rust"]);
    assert_eq!(h.log.texts_from(Sender::User).len(), 2);
    assert_eq!(h.log.texts_from(Sender::Assistant).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn ai_failure_apologizes() {
    let mut h = harness_with(AiBehavior::Fail, false);

    h.interpreter.process("how do magnets work").await;
    settle().await;

    let responses = h.log.texts_from(Sender::Assistant);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].starts_with("Sorry, I had trouble"));
}

#[tokio::test(start_paused = true)]
async fn ai_timeout_apologizes() {
    let mut h = harness_with(AiBehavior::Hang, false);

    // The hung query runs into the bounded timeout, not forever
    h.interpreter.process("how do magnets work").await;
    settle().await;

    let responses = h.log.texts_from(Sender::Assistant);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].starts_with("Sorry, I had trouble"));
}

#[tokio::test(start_paused = true)]
async fn short_commands_emit_user_turn_only() {
    let mut h = harness();

    h.interpreter.process("hi").await;
    settle().await;

    assert_eq!(h.log.entries(), vec![(Sender::User, "hi".to_string())]);
    assert!(h.ai.prompts().is_empty());
    assert!(h.synth.spoken().is_empty());
}
