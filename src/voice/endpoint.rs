//! Utterance endpointing
//!
//! Segments the capture stream into one spoken utterance per listening
//! session using RMS energy: speech starts accumulation, sustained
//! silence after enough speech ends it. Recognition is one-shot and
//! non-continuous — partial results are never produced.

/// Minimum RMS energy to consider a chunk speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum accumulated speech to accept an utterance (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing silence that ends an utterance (0.5s at 16kHz)
const SILENCE_SAMPLES: usize = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndpointState {
    /// Waiting for speech energy
    Quiet,
    /// Accumulating a candidate utterance
    Capturing,
}

/// Accumulates one utterance from streamed audio chunks
pub struct UtteranceDetector {
    state: EndpointState,
    buffer: Vec<f32>,
    speech_len: usize,
    silence_run: usize,
}

impl UtteranceDetector {
    /// New detector, waiting for speech
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: EndpointState::Quiet,
            buffer: Vec::new(),
            speech_len: 0,
            silence_run: 0,
        }
    }

    /// Feed a chunk of samples; returns true when a full utterance has
    /// been endpointed and can be taken
    pub fn process(&mut self, samples: &[f32]) -> bool {
        if samples.is_empty() {
            return false;
        }

        let energy = rms_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            EndpointState::Quiet => {
                if is_speech {
                    self.state = EndpointState::Capturing;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.speech_len = samples.len();
                    self.silence_run = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            EndpointState::Capturing => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.speech_len += samples.len();
                    self.silence_run = 0;
                } else {
                    self.silence_run += samples.len();
                }

                if self.silence_run > SILENCE_SAMPLES && self.speech_len > MIN_SPEECH_SAMPLES {
                    tracing::debug!(samples = self.buffer.len(), "utterance endpointed");
                    return true;
                }

                // Long silence without enough speech: false start
                if self.silence_run > SILENCE_SAMPLES * 2 {
                    tracing::trace!("false start, resetting");
                    self.reset();
                }
            }
        }

        false
    }

    /// Take the accumulated utterance, clearing the buffer
    pub fn take_utterance(&mut self) -> Vec<f32> {
        self.state = EndpointState::Quiet;
        self.speech_len = 0;
        self.silence_run = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Discard any accumulated audio and wait for speech again
    pub fn reset(&mut self) {
        self.state = EndpointState::Quiet;
        self.buffer.clear();
        self.speech_len = 0;
        self.silence_run = 0;
    }
}

impl Default for UtteranceDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// RMS energy of a sample block
#[allow(clippy::cast_precision_loss)]
fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(duration_secs: f32, amplitude: f32) -> Vec<f32> {
        let n = (16000.0 * duration_secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / 16000.0;
                amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect()
    }

    fn silence(duration_secs: f32) -> Vec<f32> {
        vec![0.0; (16000.0 * duration_secs) as usize]
    }

    #[test]
    fn energy_separates_speech_from_silence() {
        assert!(rms_energy(&silence(0.1)) < 0.001);
        assert!(rms_energy(&tone(0.1, 0.5)) > 0.3);
    }

    #[test]
    fn silence_alone_never_completes() {
        let mut detector = UtteranceDetector::new();
        assert!(!detector.process(&silence(2.0)));
        assert!(detector.take_utterance().is_empty());
    }

    #[test]
    fn speech_then_silence_completes_an_utterance() {
        let mut detector = UtteranceDetector::new();
        assert!(!detector.process(&tone(0.5, 0.3)));
        assert!(detector.process(&silence(0.6)));

        let utterance = detector.take_utterance();
        assert!(utterance.len() > MIN_SPEECH_SAMPLES);
    }

    #[test]
    fn take_resets_for_the_next_utterance() {
        let mut detector = UtteranceDetector::new();
        detector.process(&tone(0.5, 0.3));
        detector.process(&silence(0.6));
        detector.take_utterance();

        // A fresh cycle works the same way
        assert!(!detector.process(&tone(0.5, 0.3)));
        assert!(detector.process(&silence(0.6)));
    }

    #[test]
    fn short_blip_is_a_false_start() {
        let mut detector = UtteranceDetector::new();
        // 0.1s of speech is below the minimum, then a long silence
        assert!(!detector.process(&tone(0.1, 0.3)));
        assert!(!detector.process(&silence(1.5)));
        assert!(detector.take_utterance().len() < MIN_SPEECH_SAMPLES);
    }
}
