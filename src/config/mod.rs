//! Configuration management
//!
//! Precedence for every setting: environment variable, then the TOML
//! config file, then the built-in default.

pub mod file;

use std::path::PathBuf;

use crate::voice::SpeechParams;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding persisted task state
    pub data_dir: PathBuf,

    /// Voice configuration
    pub voice: VoiceConfig,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable the voice entry point
    pub enabled: bool,

    /// STT model identifier
    pub stt_model: String,

    /// TTS model identifier
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// Bounded speech rendering parameters
    pub speech: SpeechParams,

    /// OpenAI API key (Whisper STT and TTS)
    pub openai_api_key: Option<String>,
}

impl Config {
    /// Load configuration (env > toml > default)
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();

        let data_dir = std::env::var("TASKVOX_STORE_DIR")
            .map(PathBuf::from)
            .ok()
            .or_else(|| fc.store.dir.map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        let enabled = std::env::var("TASKVOX_DISABLE_VOICE")
            .map(|v| !(v == "1" || v.eq_ignore_ascii_case("true")))
            .ok()
            .or(fc.voice.enabled)
            .unwrap_or(true);

        let speech = SpeechParams::new(
            fc.voice.rate.unwrap_or(1.0),
            fc.voice.pitch.unwrap_or(1.0),
            fc.voice.volume.unwrap_or(1.0),
        );

        let voice = VoiceConfig {
            enabled,
            stt_model: std::env::var("TASKVOX_STT_MODEL")
                .ok()
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            tts_model: std::env::var("TASKVOX_TTS_MODEL")
                .ok()
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: std::env::var("TASKVOX_TTS_VOICE")
                .ok()
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "alloy".to_string()),
            speech,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
        };

        Self { data_dir, voice }
    }
}

/// Default data directory: `~/.local/share/taskvox` on Linux
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("taskvox"))
}
