use crate::engine::{RecognitionEvent, RecognitionResult};
use crate::language::Language;
use crate::text::{normalize_word, normalize_words, tokenize};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Word index -> whether it was pronounced correctly.
pub type PracticeResults = BTreeMap<usize, bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeState {
    Idle,
    Listening,
}

/// What a recognition event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeOutcome {
    /// New verdicts to merge into the language's results.
    Scored {
        language: Language,
        updates: PracticeResults,
    },
    /// The session ended (engine error or the engine stopping on its own).
    Ended { language: Language },
}

#[derive(Debug, Clone)]
struct PracticeSession {
    language: Language,
    attempt: u64,
    target: Vec<String>,
    cursor: usize,
}

/// Scores recognized speech against a verse, one word at a time.
///
/// Each finalized spoken word is compared with the target word under the
/// cursor and the cursor always moves on, so a skipped or inserted word
/// shifts every later verdict. There is no lookback or resynchronization.
#[derive(Debug, Default)]
pub struct PracticeMatcher {
    last_attempt: u64,
    session: Option<PracticeSession>,
}

impl PracticeMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a new attempt on `target_text`, replacing any running one.
    /// Returns the attempt id the recognizer must tag its events with.
    pub fn start(&mut self, language: Language, target_text: &str) -> u64 {
        self.last_attempt += 1;
        let target = normalize_words(target_text);
        info!(
            "Practice attempt {} in {} over {} words",
            self.last_attempt,
            language,
            target.len()
        );
        self.session = Some(PracticeSession {
            language,
            attempt: self.last_attempt,
            target,
            cursor: 0,
        });
        self.last_attempt
    }

    /// Ends the running attempt, if any, and returns its language.
    pub fn stop(&mut self) -> Option<Language> {
        let session = self.session.take()?;
        debug!(
            "Practice attempt {} in {} stopped at word {}",
            session.attempt, session.language, session.cursor
        );
        Some(session.language)
    }

    pub fn state(&self) -> PracticeState {
        if self.session.is_some() {
            PracticeState::Listening
        } else {
            PracticeState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn language(&self) -> Option<Language> {
        self.session.as_ref().map(|s| s.language)
    }

    pub fn attempt(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.attempt)
    }

    /// Next target word to be scored.
    pub fn cursor(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.cursor)
    }

    /// Normalized target words of the running attempt.
    pub fn target(&self) -> &[String] {
        self.session
            .as_ref()
            .map(|s| s.target.as_slice())
            .unwrap_or_default()
    }

    /// Moves the cursor back to the first word without ending the attempt.
    pub fn rewind(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.cursor = 0;
        }
    }

    /// Applies a recognition event. Events from an attempt other than the
    /// running one are ignored.
    pub fn on_event(&mut self, event: &RecognitionEvent) -> Option<PracticeOutcome> {
        let current = self.attempt();
        if current != Some(event.attempt()) {
            debug!(
                "Dropping recognition event from attempt {} (current {:?})",
                event.attempt(),
                current
            );
            return None;
        }

        match event {
            RecognitionEvent::Results { results, .. } => {
                let session = self.session.as_mut()?;
                let updates = score(&session.target, &mut session.cursor, results);
                if updates.is_empty() {
                    return None;
                }
                debug!(
                    "Scored {} words in {}, cursor at {}",
                    updates.len(),
                    session.language,
                    session.cursor
                );
                Some(PracticeOutcome::Scored {
                    language: session.language,
                    updates,
                })
            }
            RecognitionEvent::Error { message, .. } => {
                warn!("Speech recognition failed: {}", message);
                self.stop().map(|language| PracticeOutcome::Ended { language })
            }
            RecognitionEvent::End { .. } => self
                .stop()
                .map(|language| PracticeOutcome::Ended { language }),
        }
    }
}

/// Scores the finalized entries of `results` against `target` starting at
/// `cursor`, advancing it. Interim entries are skipped and spoken words past
/// the end of the target are discarded.
pub fn score(target: &[String], cursor: &mut usize, results: &[RecognitionResult]) -> PracticeResults {
    let mut updates = PracticeResults::new();
    for result in results.iter().filter(|r| r.is_final) {
        for spoken in tokenize(&result.transcript).into_iter().map(normalize_word) {
            let Some(expected) = target.get(*cursor) else {
                break;
            };
            updates.insert(*cursor, spoken == *expected);
            *cursor += 1;
        }
    }
    updates
}
