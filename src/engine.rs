//! Control surfaces of the platform speech engines and the events they emit.
//!
//! The reader never talks to an audio stack directly. Hosts implement
//! [`SpeechSynthesizer`] and [`SpeechRecognizer`] over whatever engine they
//! have, and feed engine callbacks back in as [`SynthesisEvent`] and
//! [`RecognitionEvent`] values tagged with the session or attempt they
//! belong to.

use crate::language::Language;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A synthesis voice as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP-47 tag, e.g. "el-GR"
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// One request to the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Playback session the utterance belongs to. `None` for fire-and-forget
    /// utterances whose events nobody listens to (single-word seeks).
    pub session_id: Option<u64>,
    pub text: String,
    pub language: Language,
    pub rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Word,
    Sentence,
}

/// Callbacks from an utterance that carried a session id.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisEvent {
    /// The engine reached `char_index` (in characters) of the utterance text.
    Boundary {
        session_id: u64,
        char_index: usize,
        kind: BoundaryKind,
    },
    End {
        session_id: u64,
    },
    Error {
        session_id: u64,
        message: String,
    },
}

impl SynthesisEvent {
    pub fn session_id(&self) -> u64 {
        match self {
            SynthesisEvent::Boundary { session_id, .. }
            | SynthesisEvent::End { session_id }
            | SynthesisEvent::Error { session_id, .. } => *session_id,
        }
    }
}

pub trait SpeechSynthesizer {
    /// Voices currently installed. May be empty.
    fn voices(&self) -> Vec<Voice>;
    fn speak(&mut self, utterance: &Utterance, voice: Option<&Voice>);
    /// Drops the current and all queued utterances.
    fn cancel(&mut self);
    fn pause(&mut self);
}

/// One entry of a recognition result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn finalized(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Callbacks from a recognition attempt started with [`SpeechRecognizer::start`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Results not yet delivered for this attempt, in order.
    Results {
        attempt: u64,
        results: Vec<RecognitionResult>,
    },
    Error {
        attempt: u64,
        message: String,
    },
    /// The engine stopped listening on its own.
    End {
        attempt: u64,
    },
}

impl RecognitionEvent {
    pub fn attempt(&self) -> u64 {
        match self {
            RecognitionEvent::Results { attempt, .. }
            | RecognitionEvent::Error { attempt, .. }
            | RecognitionEvent::End { attempt } => *attempt,
        }
    }
}

pub trait SpeechRecognizer {
    /// Whether the platform offers recognition at all. Probed once.
    fn is_available(&self) -> bool;
    /// Starts continuous recognition with interim results. Events for this
    /// run must carry `attempt`.
    fn start(&mut self, attempt: u64, language: Language) -> Result<()>;
    fn stop(&mut self);
}
