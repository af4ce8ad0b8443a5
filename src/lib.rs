//! taskvox - voice-controlled personal task manager
//!
//! This library provides the application core:
//! - Task model and store (create/read/update/delete/list, persistence)
//! - Voice command pipeline (normalization, intent classification,
//!   fuzzy task matching, execution)
//! - Voice session control (capture, endpointing, STT, TTS)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  Interfaces                      │
//! │      CLI (forms/CRUD)   │   Microphone           │
//! └──────────────┬──────────────────┬────────────────┘
//!                │                  │
//!                │   ┌──────────────▼───────────────┐
//!                │   │        Voice Session         │
//!                │   │  Capture │ Endpoint │ STT/TTS │
//!                │   └──────────────┬───────────────┘
//!                │                  │
//!                │   ┌──────────────▼───────────────┐
//!                │   │       Command Pipeline        │
//!                │   │ Normalize │ Classify │ Match  │
//!                │   └──────────────┬───────────────┘
//!                │                  │
//! ┌──────────────▼──────────────────▼────────────────┐
//! │                   Task Store                     │
//! │       in-memory collection + JSON persistence    │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod session;
pub mod task;
pub mod voice;

pub use command::{CommandHandler, CommandOutcome, IntentKind, Navigation};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{SessionState, VoiceSession};
pub use task::{
    JsonFileStore, Priority, StateStore, Status, TASKS_KEY, Task, TaskDraft, TaskFilter, TaskPatch,
    TaskStore,
};
pub use voice::{SpeechParams, Synthesizer, Transcriber};
