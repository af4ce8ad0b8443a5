//! Text-to-speech collaborator
//!
//! Accepts an utterance string and produces audio. Speech parameters are
//! bounded (rate 0.1-10, pitch 0-2, volume 0-1) and default to neutral.

use async_trait::async_trait;

use crate::{Error, Result};

/// Bounded speech rendering parameters
///
/// Values outside the bounds are clamped at construction, so a
/// `SpeechParams` is always valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechParams {
    /// Speaking rate, 0.1 to 10.0
    pub rate: f32,
    /// Voice pitch, 0.0 to 2.0
    pub pitch: f32,
    /// Output volume, 0.0 to 1.0
    pub volume: f32,
}

impl SpeechParams {
    /// Create parameters, clamping each value into its bound
    #[must_use]
    pub fn new(rate: f32, pitch: f32, volume: f32) -> Self {
        Self {
            rate: rate.clamp(0.1, 10.0),
            pitch: pitch.clamp(0.0, 2.0),
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl Default for SpeechParams {
    /// Neutral values: rate 1.0, pitch 1.0, volume 1.0
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Renders text to audio bytes
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize speech for `text`
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis fails.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// OpenAI-style HTTP text-to-speech
pub struct OpenAiTts {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    model: String,
    params: SpeechParams,
}

impl OpenAiTts {
    /// Create a TTS instance
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing.
    pub fn new(api_key: String, voice: String, model: String, params: SpeechParams) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice,
            model,
            params,
        })
    }
}

#[async_trait]
impl Synthesizer for OpenAiTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        // The API supports a narrower speed range than the parameter bound
        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.params.rate.clamp(0.25, 4.0),
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("TTS API error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_default_to_neutral() {
        let params = SpeechParams::default();
        assert_eq!(params, SpeechParams::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn params_clamp_to_bounds() {
        let params = SpeechParams::new(50.0, -1.0, 3.0);
        assert_eq!(params.rate, 10.0);
        assert_eq!(params.pitch, 0.0);
        assert_eq!(params.volume, 1.0);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            OpenAiTts::new(
                String::new(),
                "alloy".to_string(),
                "tts-1".to_string(),
                SpeechParams::default()
            ),
            Err(Error::Config(_))
        ));
    }
}
