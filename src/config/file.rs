//! TOML configuration file loading
//!
//! Supports `~/.config/taskvox/config.toml` as a persistent config
//! source. All fields are optional — the file is a partial overlay on
//! top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TaskvoxConfigFile {
    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Task storage configuration
    #[serde(default)]
    pub store: StoreFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// Speaking rate (0.1 to 10.0)
    pub rate: Option<f32>,

    /// Voice pitch (0.0 to 2.0)
    pub pitch: Option<f32>,

    /// Output volume (0.0 to 1.0)
    pub volume: Option<f32>,
}

/// Task storage configuration
#[derive(Debug, Default, Deserialize)]
pub struct StoreFileConfig {
    /// Data directory override
    pub dir: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `TaskvoxConfigFile::default()` if the file doesn't exist or
/// can't be parsed.
pub fn load_config_file() -> TaskvoxConfigFile {
    let Some(path) = config_file_path() else {
        return TaskvoxConfigFile::default();
    };

    if !path.exists() {
        return TaskvoxConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TaskvoxConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TaskvoxConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/taskvox/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("taskvox").join("config.toml"))
}
