//! Voice session integration tests
//!
//! Exercises the session state machine end to end with scripted
//! collaborators, so no audio hardware or network access is needed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use taskvox::voice::{AudioSink, AudioSource, SAMPLE_RATE, Synthesizer, Transcriber};
use taskvox::{CommandHandler, Error, Result, SessionState, Status, VoiceSession};

mod common;

/// One poll's worth of loud sine samples
fn speech_chunk(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect()
}

/// Audio source that replays queued chunks, then silence forever
struct ScriptedMic {
    available: Arc<AtomicBool>,
    chunks: VecDeque<Vec<f32>>,
}

impl ScriptedMic {
    /// Mic that produces one clear utterance followed by silence
    fn with_utterance() -> Self {
        let chunks = (0..4).map(|_| speech_chunk(1600)).collect();
        Self {
            available: Arc::new(AtomicBool::new(true)),
            chunks,
        }
    }

    /// Mic that never produces speech
    fn silent() -> Self {
        Self {
            available: Arc::new(AtomicBool::new(true)),
            chunks: VecDeque::new(),
        }
    }

    /// Handle for toggling device availability mid-test
    fn availability(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.available)
    }
}

impl AudioSource for ScriptedMic {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn take_chunk(&mut self) -> Vec<f32> {
        self.chunks.pop_front().unwrap_or_else(|| vec![0.0; 1600])
    }
}

/// Sink that records how many utterances were played
struct RecordingSink {
    played: Arc<Mutex<Vec<usize>>>,
}

impl RecordingSink {
    fn new() -> (Self, Arc<Mutex<Vec<usize>>>) {
        let played = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                played: Arc::clone(&played),
            },
            played,
        )
    }
}

#[async_trait(?Send)]
impl AudioSink for RecordingSink {
    async fn play(&mut self, audio: &[u8]) -> Result<()> {
        self.played.lock().unwrap().push(audio.len());
        Ok(())
    }
}

/// Transcriber that always returns a fixed transcript
struct FixedStt(String);

#[async_trait]
impl Transcriber for FixedStt {
    async fn transcribe(&self, _wav: &[u8]) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Transcriber that always fails
struct FailingStt;

#[async_trait]
impl Transcriber for FailingStt {
    async fn transcribe(&self, _wav: &[u8]) -> Result<String> {
        Err(Error::Stt("service unavailable".to_string()))
    }
}

/// Synthesizer producing a fixed byte blob
struct FixedSynth;

#[async_trait]
impl Synthesizer for FixedSynth {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        Ok(vec![0u8; 64])
    }
}

fn session_with(
    mic: ScriptedMic,
    transcriber: Box<dyn Transcriber>,
) -> (VoiceSession, Arc<Mutex<Vec<usize>>>) {
    let (sink, played) = RecordingSink::new();
    let session = VoiceSession::new(
        CommandHandler::new(common::sample_store()),
        Box::new(mic),
        Box::new(sink),
        transcriber,
        Box::new(FixedSynth),
    )
    .with_dismiss_delay(Duration::ZERO);
    (session, played)
}

#[tokio::test(start_paused = true)]
async fn full_cycle_executes_the_command_and_returns_to_idle() {
    let (mut session, played) = session_with(
        ScriptedMic::with_utterance(),
        Box::new(FixedStt("complete groceries".to_string())),
    );
    let (_tx, mut cancel) = mpsc::channel(1);

    let outcome = session.listen_once(&mut cancel).await.unwrap();

    let outcome = outcome.expect("cycle should produce an outcome");
    assert_eq!(outcome.response, "Completed task: buy groceries");
    assert_eq!(session.state(), &SessionState::Idle);

    let task = session
        .handler()
        .store()
        .tasks()
        .iter()
        .find(|t| t.title == "buy groceries")
        .unwrap();
    assert_eq!(task.status, Status::Completed);

    // The confirmation was spoken exactly once
    assert_eq!(played.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_listening_discards_everything() {
    let (mut session, played) = session_with(
        ScriptedMic::silent(),
        Box::new(FixedStt("delete groceries".to_string())),
    );
    let (tx, mut cancel) = mpsc::channel(1);
    tx.send(()).await.unwrap();

    let outcome = session.listen_once(&mut cancel).await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(session.state(), &SessionState::Idle);
    assert_eq!(session.handler().store().len(), common::sample_store().len());
    assert!(played.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_microphone_errors_without_listening() {
    let mic = ScriptedMic::with_utterance();
    mic.availability().store(false, Ordering::SeqCst);
    let (mut session, played) =
        session_with(mic, Box::new(FixedStt("help".to_string())));
    let (_tx, mut cancel) = mpsc::channel(1);

    let outcome = session.listen_once(&mut cancel).await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(
        session.state(),
        &SessionState::Error(
            "No microphone detected. Please connect a microphone to use voice commands."
                .to_string()
        )
    );
    assert!(played.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn recognition_failure_reports_and_leaves_the_store_alone() {
    let (mut session, played) =
        session_with(ScriptedMic::with_utterance(), Box::new(FailingStt));
    let (_tx, mut cancel) = mpsc::channel(1);

    let outcome = session.listen_once(&mut cancel).await.unwrap();

    assert!(outcome.is_none());
    match session.state() {
        SessionState::Error(message) => {
            assert!(message.starts_with("Speech recognition failed:"), "{message}");
        }
        other => panic!("expected error state, got {other:?}"),
    }
    assert_eq!(session.handler().store().len(), common::sample_store().len());
    assert!(played.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn error_state_clears_when_the_next_cycle_starts() {
    let mic = ScriptedMic::with_utterance();
    let available = mic.availability();
    available.store(false, Ordering::SeqCst);

    let (mut session, _played) =
        session_with(mic, Box::new(FixedStt("go home".to_string())));
    let (_tx, mut cancel) = mpsc::channel(1);

    session.listen_once(&mut cancel).await.unwrap();
    assert!(matches!(session.state(), SessionState::Error(_)));

    // Device comes back; the next cycle starts from a clean state
    available.store(true, Ordering::SeqCst);
    let outcome = session.listen_once(&mut cancel).await.unwrap();

    let outcome = outcome.expect("cycle should produce an outcome");
    assert_eq!(outcome.response, "Showing all tasks");
    assert_eq!(session.state(), &SessionState::Idle);
}
