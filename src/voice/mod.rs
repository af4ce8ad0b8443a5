//! Voice I/O: microphone capture, utterance endpointing, speech-to-text,
//! text-to-speech, and speaker playback
//!
//! The speech engines are external collaborators behind the
//! [`Transcriber`] and [`Synthesizer`] traits so the command pipeline is
//! testable with scripted transcripts and a silent sink.

mod capture;
mod endpoint;
mod playback;
mod stt;
mod tts;

pub use capture::{AudioSource, MicCapture, SAMPLE_RATE, input_device_available, samples_to_wav};
pub use endpoint::UtteranceDetector;
pub use playback::{AudioPlayback, AudioSink};
pub use stt::{Transcriber, WhisperStt};
pub use tts::{OpenAiTts, SpeechParams, Synthesizer};
