//! Voice command interpretation pipeline
//!
//! A raw transcript flows through normalization, intent classification,
//! task matching, and execution; the result is a spoken response and at
//! most one task store mutation.

mod handler;
mod intent;
mod matcher;
mod normalize;

pub use handler::{CommandHandler, CommandOutcome, Navigation};
pub use intent::{IntentKind, classify};
pub use matcher::find_by_keyword;
pub use normalize::normalize;
