//! Speech-to-text collaborator
//!
//! One-shot, non-continuous recognition: one WAV buffer in, one final
//! transcript out. The recognizer's confidence scores are not consumed.

use async_trait::async_trait;

use crate::{Error, Result};

/// Fixed recognition locale
const LANGUAGE: &str = "en";

/// Converts one utterance of audio into a final transcript
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV audio bytes to text
    ///
    /// # Errors
    ///
    /// Returns an error if recognition fails; no partial transcript is
    /// ever produced.
    async fn transcribe(&self, wav: &[u8]) -> Result<String>;
}

/// Response from a Whisper-style transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Whisper-backed speech-to-text over HTTP
pub struct WhisperStt {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl WhisperStt {
    /// Create a Whisper transcriber
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperStt {
    async fn transcribe(&self, wav: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = wav.len(), "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(wav.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", LANGUAGE);

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse transcription response");
            e
        })?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            WhisperStt::new(String::new(), "whisper-1".to_string()),
            Err(Error::Config(_))
        ));
    }
}
