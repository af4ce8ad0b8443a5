//! Microphone capture
//!
//! cpal streams are not `Send`, so capture lives on the session's thread;
//! the stream callback only appends samples into a locked buffer.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Source of microphone audio for a voice session
///
/// Abstracted so sessions can be driven by scripted audio in tests.
pub trait AudioSource {
    /// Whether an input device can be found at all
    fn is_available(&self) -> bool;

    /// Begin streaming audio into the internal buffer
    ///
    /// # Errors
    ///
    /// Returns an error if the capture device cannot be opened.
    fn start(&mut self) -> Result<()>;

    /// Stop streaming and discard the stream
    fn stop(&mut self);

    /// Drain the samples captured since the last call
    fn take_chunk(&mut self) -> Vec<f32>;
}

/// Check whether any audio input device is present
///
/// Session precondition: without a device the session goes straight to
/// its error state and never starts listening.
#[must_use]
pub fn input_device_available() -> bool {
    cpal::default_host().default_input_device().is_some()
}

/// Captures mono 16kHz audio from the default input device
pub struct MicCapture {
    config: Option<StreamConfig>,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl MicCapture {
    /// Create a capture instance; device negotiation happens on `start`
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        }
    }

    fn negotiate_config() -> Result<StreamConfig> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable input config found".to_string()))?;

        let config = supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "microphone configured"
        );

        Ok(config)
    }
}

impl Default for MicCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MicCapture {
    fn is_available(&self) -> bool {
        input_device_available()
    }

    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        if self.config.is_none() {
            self.config = Some(Self::negotiate_config()?);
        }
        let config = self
            .config
            .clone()
            .ok_or_else(|| Error::Audio("capture not configured".to_string()))?;

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device".to_string()))?;

        let buffer = Arc::clone(&self.buffer);
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "microphone capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("microphone capture started");
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            if let Ok(mut buf) = self.buffer.lock() {
                buf.clear();
            }
            tracing::debug!("microphone capture stopped");
        }
    }

    fn take_chunk(&mut self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns an error if WAV encoding fails.
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_bytes_carry_riff_header() {
        let samples = vec![0.0f32; 160];
        let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert!(wav.len() > 44);
    }

    #[test]
    fn wav_round_trips_through_hound() {
        let original = vec![0.0f32, 0.5, -0.5, 1.0, -1.0];
        let wav = samples_to_wav(&original, SAMPLE_RATE).unwrap();

        let mut reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.spec().channels, 1);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), original.len());
    }
}
