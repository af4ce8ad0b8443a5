//! Voice session controller
//!
//! Drives one listen cycle: check the microphone, capture until an
//! utterance is endpointed, transcribe it, run the command handler, and
//! speak the response. State machine:
//!
//! ```text
//! Idle -> Listening -> Processing -> Idle
//!   \        \
//!    \        +-> Error -> Idle   (capture/recognition failure)
//!     +-> Error -> Idle           (no microphone)
//! ```
//!
//! Exactly one transcript is consumed per cycle and the handler's store
//! mutation completes before the response is spoken. Cancelling while
//! listening discards everything and mutates nothing.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::command::{CommandHandler, CommandOutcome};
use crate::voice::{AudioSink, AudioSource, SAMPLE_RATE, Transcriber, Synthesizer, UtteranceDetector, samples_to_wav};
use crate::Result;

/// Poll interval for draining capture chunks
const CHUNK_INTERVAL: Duration = Duration::from_millis(100);

/// How long the confirmation stays up before the session returns to idle
const DISMISS_DELAY: Duration = Duration::from_millis(1500);

/// Session lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No active capture
    Idle,
    /// Capture device streaming, waiting for an utterance
    Listening,
    /// One transcript handed to the command handler
    Processing,
    /// Per-attempt failure with a human-readable message; auto-returns
    /// to idle on the next cycle
    Error(String),
}

/// Orchestrates listen cycles over the command pipeline
pub struct VoiceSession {
    handler: CommandHandler,
    source: Box<dyn AudioSource>,
    sink: Box<dyn AudioSink>,
    transcriber: Box<dyn Transcriber>,
    synthesizer: Box<dyn Synthesizer>,
    state: SessionState,
    dismiss_delay: Duration,
}

impl VoiceSession {
    /// Assemble a session from the command handler and its collaborators
    #[must_use]
    pub fn new(
        handler: CommandHandler,
        source: Box<dyn AudioSource>,
        sink: Box<dyn AudioSink>,
        transcriber: Box<dyn Transcriber>,
        synthesizer: Box<dyn Synthesizer>,
    ) -> Self {
        Self {
            handler,
            source,
            sink,
            transcriber,
            synthesizer,
            state: SessionState::Idle,
            dismiss_delay: DISMISS_DELAY,
        }
    }

    /// Override the confirmation dismissal delay
    #[must_use]
    pub const fn with_dismiss_delay(mut self, delay: Duration) -> Self {
        self.dismiss_delay = delay;
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// The command handler (and through it, the task store)
    #[must_use]
    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    /// Mutable handler access for the non-voice CRUD path
    pub fn handler_mut(&mut self) -> &mut CommandHandler {
        &mut self.handler
    }

    /// Run one listen cycle
    ///
    /// Returns the command outcome, or `None` if the cycle was cancelled
    /// or failed; failures are carried in [`VoiceSession::state`] rather
    /// than propagated, and never touch the task store.
    ///
    /// # Errors
    ///
    /// Currently infallible at this boundary; the `Result` is kept so
    /// collaborator traits can surface fatal errors in the future.
    pub async fn listen_once(
        &mut self,
        cancel: &mut mpsc::Receiver<()>,
    ) -> Result<Option<CommandOutcome>> {
        // A previous attempt's error state clears when a new one starts
        if matches!(self.state, SessionState::Error(_)) {
            self.state = SessionState::Idle;
        }

        // Precondition: never enter Listening without an input device
        if !self.source.is_available() {
            self.fail("No microphone detected. Please connect a microphone to use voice commands.");
            return Ok(None);
        }

        if let Err(e) = self.source.start() {
            self.fail(format!("Could not start audio capture: {e}"));
            return Ok(None);
        }
        self.state = SessionState::Listening;
        tracing::debug!("listening");

        let mut detector = UtteranceDetector::new();
        let samples = loop {
            tokio::select! {
                _ = cancel.recv() => {
                    self.source.stop();
                    self.state = SessionState::Idle;
                    tracing::debug!("listening cancelled, transcript discarded");
                    return Ok(None);
                }
                () = tokio::time::sleep(CHUNK_INTERVAL) => {
                    let chunk = self.source.take_chunk();
                    if detector.process(&chunk) {
                        break detector.take_utterance();
                    }
                }
            }
        };

        self.source.stop();
        self.state = SessionState::Processing;

        let wav = match samples_to_wav(&samples, SAMPLE_RATE) {
            Ok(wav) => wav,
            Err(e) => {
                self.fail(format!("Audio encoding failed: {e}"));
                return Ok(None);
            }
        };

        let transcript = match self.transcriber.transcribe(&wav).await {
            Ok(text) => text,
            Err(e) => {
                self.fail(format!("Speech recognition failed: {e}"));
                return Ok(None);
            }
        };
        tracing::info!(transcript = %transcript, "command received");

        // The mutation completes here, before any speech output starts
        let outcome = self.handler.handle(&transcript);

        if !outcome.response.is_empty() {
            self.speak(&outcome.response).await;
        }

        tokio::time::sleep(self.dismiss_delay).await;
        self.state = SessionState::Idle;
        Ok(Some(outcome))
    }

    /// Speak a response; synthesis or playback failures are logged and
    /// never fail the cycle (the store mutation has already happened)
    async fn speak(&mut self, text: &str) {
        match self.synthesizer.synthesize(text).await {
            Ok(audio) => {
                if let Err(e) = self.sink.play(&audio).await {
                    tracing::warn!(error = %e, "speech playback failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "speech synthesis failed");
            }
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "voice session error");
        self.source.stop();
        self.state = SessionState::Error(message);
    }
}
