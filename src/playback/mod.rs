//! Read-aloud playback with synchronized word highlighting.
//!
//! The synchronizer owns the playback session and never touches the engine
//! itself. Each command or engine event goes through a transition function
//! that returns the effects the caller has to carry out.
//!
//! ## Flow
//!
//! ```text
//!  speak / pause / seek            SynthesisEvent (boundary, end, error)
//!         │                                   │
//!         ▼                                   ▼
//!  ┌──────────────────────────────────────────────────────┐
//!  │                PlaybackSynchronizer                  │
//!  │  session id check ─▶ cursor ─▶ mirrored cursor       │
//!  └──────────────────────────────────────────────────────┘
//!         │
//!         ▼
//!  Vec<PlaybackEffect>  ─▶  SpeechSynthesizer (cancel, pause, speak)
//!                      ─▶  reader (advance to next verse)
//! ```

mod synchronizer;
mod voice;

pub use synchronizer::{
    PlaybackEffect, PlaybackState, PlaybackSynchronizer, DEFAULT_SPEECH_RATE, SPEECH_RATES,
};
pub use voice::select_voice;
