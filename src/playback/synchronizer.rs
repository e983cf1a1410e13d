use crate::alignment::map_index;
use crate::engine::{BoundaryKind, SynthesisEvent, Utterance};
use crate::language::Language;
use crate::text::tokenize_owned;
use crate::verse::Corpus;
use log::{debug, info, warn};

/// Speech rates offered to the reader.
pub const SPEECH_RATES: [f32; 3] = [0.5, 1.0, 1.5];
pub const DEFAULT_SPEECH_RATE: f32 = 1.0;

/// What the caller has to do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEffect {
    /// Cancel everything the synthesizer is speaking or has queued.
    Cancel,
    /// Pause the synthesizer in place.
    Pause,
    Speak(Utterance),
    /// Playback moved on to the verse at `index` by itself. The verse change
    /// must not stop playback.
    AdvanceVerse { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Speaking,
    Paused,
}

#[derive(Debug, Clone)]
struct PlaybackSession {
    language: Language,
    verse_index: usize,
    spoken_words: Vec<String>,
    other_words: Vec<String>,
    /// First word of the utterance currently handed to the engine.
    utterance_start: usize,
    cursor: usize,
    mirrored: Option<usize>,
    paused: bool,
}

impl PlaybackSession {
    fn move_cursor(&mut self, index: usize) {
        self.cursor = index;
        self.mirrored = map_index(index, self.spoken_words.len(), self.other_words.len());
    }

    /// Word index (into the full verse) that `char_index` of the current
    /// utterance falls on. Offsets are counted in characters with one
    /// separator between words.
    fn word_at_offset(&self, char_index: usize) -> usize {
        let words = &self.spoken_words[self.utterance_start..];
        let mut local = 0;
        let mut pos = 0;
        for (i, word) in words.iter().enumerate() {
            if pos >= char_index {
                local = i;
                break;
            }
            pos += word.chars().count() + 1;
            local = i + 1;
        }
        let local = local.min(words.len().saturating_sub(1));
        self.utterance_start + local
    }
}

/// Drives one read-aloud session at a time.
///
/// Every (re)start bumps `session_id`; engine events tagged with an older id
/// are dropped, which is the only way a superseded utterance is cancelled.
pub struct PlaybackSynchronizer {
    session_id: u64,
    session: Option<PlaybackSession>,
    rate: f32,
    auto_continue: bool,
}

impl Default for PlaybackSynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_SPEECH_RATE, false)
    }
}

impl PlaybackSynchronizer {
    pub fn new(rate: f32, auto_continue: bool) -> Self {
        Self {
            session_id: 0,
            session: None,
            rate,
            auto_continue,
        }
    }

    pub fn state(&self) -> PlaybackState {
        match &self.session {
            None => PlaybackState::Stopped,
            Some(session) if session.paused => PlaybackState::Paused,
            Some(_) => PlaybackState::Speaking,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.paused)
    }

    /// Language being read aloud, if any.
    pub fn language(&self) -> Option<Language> {
        self.session.as_ref().map(|s| s.language)
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Word currently spoken, as an index into the spoken verse text.
    pub fn cursor(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.cursor)
    }

    /// The cursor projected onto the other language's text.
    pub fn mirrored_cursor(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.mirrored)
    }

    pub fn verse_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.verse_index)
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn auto_continue(&self) -> bool {
        self.auto_continue
    }

    /// Changes the speech rate. Only allowed while nothing is being read and
    /// only to one of [`SPEECH_RATES`]. Returns whether the rate was applied.
    pub fn set_rate(&mut self, rate: f32) -> bool {
        if self.session.is_some() {
            debug!("Ignoring rate change to {} while speaking", rate);
            return false;
        }
        if !SPEECH_RATES.contains(&rate) {
            warn!("Unsupported speech rate {}", rate);
            return false;
        }
        self.rate = rate;
        true
    }

    pub fn set_auto_continue(&mut self, enabled: bool) {
        self.auto_continue = enabled;
    }

    /// Reads `text` aloud from the first word, mirroring onto `other_text`.
    ///
    /// While another language is being read the request is rejected. Asking
    /// again for the language already being read stops it.
    pub fn speak(
        &mut self,
        verse_index: usize,
        language: Language,
        text: &str,
        other_text: &str,
    ) -> Vec<PlaybackEffect> {
        match self.language() {
            Some(active) if active != language => {
                debug!(
                    "Rejecting speak in {} while {} is being read",
                    language, active
                );
                Vec::new()
            }
            Some(_) => self.stop(),
            None => self.begin(
                verse_index,
                language,
                tokenize_owned(text),
                tokenize_owned(other_text),
                0,
            ),
        }
    }

    pub fn stop(&mut self) -> Vec<PlaybackEffect> {
        self.session_id += 1;
        if let Some(session) = self.session.take() {
            info!(
                "Stopped reading {} (session {})",
                session.language, self.session_id
            );
        }
        vec![PlaybackEffect::Cancel]
    }

    /// Pauses a running session, or resumes a paused one from its cursor.
    pub fn toggle_pause(&mut self) -> Vec<PlaybackEffect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if !session.paused {
            session.paused = true;
            debug!("Paused at word {}", session.cursor);
            return vec![PlaybackEffect::Pause];
        }

        let PlaybackSession {
            language,
            verse_index,
            spoken_words,
            other_words,
            cursor,
            ..
        } = session.clone();
        debug!("Resuming from word {}", cursor);
        self.begin(verse_index, language, spoken_words, other_words, cursor)
    }

    pub fn previous_word(&mut self) -> Vec<PlaybackEffect> {
        self.seek(-1)
    }

    pub fn next_word(&mut self) -> Vec<PlaybackEffect> {
        self.seek(1)
    }

    /// Moves the cursor one word and speaks only that word. Leaves the
    /// session paused; resuming continues from the new position.
    fn seek(&mut self, direction: isize) -> Vec<PlaybackEffect> {
        let rate = self.rate;
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.spoken_words.is_empty() {
            return Vec::new();
        }

        self.session_id += 1;
        session.paused = true;
        let last = session.spoken_words.len() - 1;
        let target = session.cursor.saturating_add_signed(direction).min(last);
        session.move_cursor(target);

        vec![
            PlaybackEffect::Cancel,
            PlaybackEffect::Speak(Utterance {
                session_id: None,
                text: session.spoken_words[target].clone(),
                language: session.language,
                rate,
            }),
        ]
    }

    /// Applies an engine callback. Events from any session other than the
    /// current one are ignored.
    pub fn on_event(&mut self, event: &SynthesisEvent, corpus: &Corpus) -> Vec<PlaybackEffect> {
        if event.session_id() != self.session_id || self.session.is_none() {
            debug!(
                "Dropping synthesis event from stale session {} (current {})",
                event.session_id(),
                self.session_id
            );
            return Vec::new();
        }

        match event {
            SynthesisEvent::Boundary {
                char_index,
                kind: BoundaryKind::Word,
                ..
            } => {
                if let Some(session) = self.session.as_mut() {
                    let index = session.word_at_offset(*char_index);
                    session.move_cursor(index);
                }
                Vec::new()
            }
            SynthesisEvent::Boundary { .. } => Vec::new(),
            SynthesisEvent::End { .. } => self.on_end(corpus),
            SynthesisEvent::Error { message, .. } => {
                warn!("Speech synthesis failed: {}", message);
                self.session = None;
                Vec::new()
            }
        }
    }

    fn on_end(&mut self, corpus: &Corpus) -> Vec<PlaybackEffect> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };

        if self.auto_continue {
            let next_index = session.verse_index + 1;
            if let Some(next) = corpus.get(next_index).filter(|v| v.is_playable()) {
                let (spoken, other) = next.texts(session.language);
                info!("Continuing to verse {} in {}", next_index, session.language);
                let mut effects = vec![PlaybackEffect::AdvanceVerse { index: next_index }];
                effects.extend(self.begin(
                    next_index,
                    session.language,
                    tokenize_owned(spoken),
                    tokenize_owned(other),
                    0,
                ));
                return effects;
            }
        }

        debug!("Finished reading verse {}", session.verse_index);
        Vec::new()
    }

    fn begin(
        &mut self,
        verse_index: usize,
        language: Language,
        spoken_words: Vec<String>,
        other_words: Vec<String>,
        start: usize,
    ) -> Vec<PlaybackEffect> {
        self.session_id += 1;
        let mut effects = vec![PlaybackEffect::Cancel];

        if spoken_words.is_empty() {
            debug!("Nothing to read in {} for verse {}", language, verse_index);
            self.session = None;
            return effects;
        }

        let start = start.min(spoken_words.len() - 1);
        let text = spoken_words[start..].join(" ");
        let mut session = PlaybackSession {
            language,
            verse_index,
            spoken_words,
            other_words,
            utterance_start: start,
            cursor: start,
            mirrored: None,
            paused: false,
        };
        session.move_cursor(start);
        self.session = Some(session);

        info!(
            "Reading verse {} in {} from word {} (session {})",
            verse_index, language, start, self.session_id
        );
        effects.push(PlaybackEffect::Speak(Utterance {
            session_id: Some(self.session_id),
            text,
            language,
            rate: self.rate,
        }));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verse::Verse;

    const EN: &str = "In the beginning was the Word";
    const EL: &str = "Ἐν ἀρχῇ ἦν ὁ λόγος";

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Verse::new("Jn", 1, 1, EN, EL),
            Verse::new("Jn", 1, 2, "The same was", "οὗτος ἦν"),
            Verse::new("Jn", 1, 3, "All things", ""),
        ])
    }

    fn boundary(session_id: u64, char_index: usize) -> SynthesisEvent {
        SynthesisEvent::Boundary {
            session_id,
            char_index,
            kind: BoundaryKind::Word,
        }
    }

    fn spoken_text(effects: &[PlaybackEffect]) -> Option<&str> {
        effects.iter().find_map(|e| match e {
            PlaybackEffect::Speak(u) => Some(u.text.as_str()),
            _ => None,
        })
    }

    #[test]
    fn test_speak_starts_session() {
        let mut sync = PlaybackSynchronizer::default();
        let effects = sync.speak(0, Language::English, EN, EL);

        assert_eq!(effects[0], PlaybackEffect::Cancel);
        assert_eq!(
            effects[1],
            PlaybackEffect::Speak(Utterance {
                session_id: Some(1),
                text: EN.to_string(),
                language: Language::English,
                rate: 1.0,
            })
        );
        assert_eq!(sync.state(), PlaybackState::Speaking);
        assert_eq!(sync.cursor(), Some(0));
        assert_eq!(sync.mirrored_cursor(), Some(0));
    }

    #[test]
    fn test_boundary_moves_both_cursors() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        let id = sync.session_id();

        // "beginning" starts at offset 7
        assert!(sync.on_event(&boundary(id, 7), &corpus).is_empty());
        assert_eq!(sync.cursor(), Some(2));
        assert_eq!(sync.mirrored_cursor(), Some(2));

        sync.on_event(&boundary(id, 0), &corpus);
        assert_eq!(sync.cursor(), Some(0));

        // past the end clamps to the last word
        sync.on_event(&boundary(id, 1000), &corpus);
        assert_eq!(sync.cursor(), Some(5));
        assert_eq!(sync.mirrored_cursor(), Some(4));
    }

    #[test]
    fn test_sentence_boundaries_ignored() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        let event = SynthesisEvent::Boundary {
            session_id: sync.session_id(),
            char_index: 17,
            kind: BoundaryKind::Sentence,
        };
        sync.on_event(&event, &corpus);
        assert_eq!(sync.cursor(), Some(0));
    }

    #[test]
    fn test_stale_boundary_does_not_move_cursor() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        let old = sync.session_id();
        sync.stop();
        sync.speak(0, Language::English, EN, EL);
        assert_ne!(sync.session_id(), old);

        sync.on_event(&boundary(old, 7), &corpus);
        assert_eq!(sync.cursor(), Some(0));

        // a late end from the old session must not stop the new one
        sync.on_event(&SynthesisEvent::End { session_id: old }, &corpus);
        assert_eq!(sync.state(), PlaybackState::Speaking);
    }

    #[test]
    fn test_events_after_stop_ignored() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        let id = sync.session_id();
        assert_eq!(sync.stop(), vec![PlaybackEffect::Cancel]);

        sync.on_event(&boundary(id, 7), &corpus);
        assert_eq!(sync.state(), PlaybackState::Stopped);
        assert_eq!(sync.cursor(), None);
    }

    #[test]
    fn test_same_language_toggles_off() {
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::Greek, EL, EN);
        let effects = sync.speak(0, Language::Greek, EL, EN);
        assert_eq!(effects, vec![PlaybackEffect::Cancel]);
        assert_eq!(sync.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_other_language_rejected_while_speaking() {
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        let id = sync.session_id();
        assert!(sync.speak(0, Language::Greek, EL, EN).is_empty());
        assert_eq!(sync.language(), Some(Language::English));
        assert_eq!(sync.session_id(), id);
    }

    #[test]
    fn test_empty_text_stops() {
        let mut sync = PlaybackSynchronizer::default();
        let effects = sync.speak(2, Language::Greek, "  ", "All things");
        assert_eq!(effects, vec![PlaybackEffect::Cancel]);
        assert_eq!(sync.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_pause_then_resume_from_cursor() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        sync.on_event(&boundary(sync.session_id(), 7), &corpus);

        assert_eq!(sync.toggle_pause(), vec![PlaybackEffect::Pause]);
        assert_eq!(sync.state(), PlaybackState::Paused);

        let before = sync.session_id();
        let effects = sync.toggle_pause();
        assert_eq!(effects[0], PlaybackEffect::Cancel);
        assert_eq!(spoken_text(&effects), Some("beginning was the Word"));
        assert_eq!(sync.state(), PlaybackState::Speaking);
        assert!(sync.session_id() > before);
        assert_eq!(sync.cursor(), Some(2));

        // offsets are now relative to the resumed utterance: "was" at 10
        sync.on_event(&boundary(sync.session_id(), 10), &corpus);
        assert_eq!(sync.cursor(), Some(3));
    }

    #[test]
    fn test_toggle_pause_without_session() {
        let mut sync = PlaybackSynchronizer::default();
        assert!(sync.toggle_pause().is_empty());
    }

    #[test]
    fn test_seek_speaks_single_word_and_pauses() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        let id = sync.session_id();

        let effects = sync.next_word();
        assert_eq!(effects[0], PlaybackEffect::Cancel);
        match &effects[1] {
            PlaybackEffect::Speak(u) => {
                assert_eq!(u.session_id, None);
                assert_eq!(u.text, "the");
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(sync.state(), PlaybackState::Paused);
        assert_eq!(sync.cursor(), Some(1));
        assert_eq!(sync.mirrored_cursor(), Some(1));

        // the interrupted utterance can no longer move the cursor
        sync.on_event(&boundary(id, 17), &corpus);
        assert_eq!(sync.cursor(), Some(1));

        sync.previous_word();
        let effects = sync.previous_word();
        assert_eq!(spoken_text(&effects), Some("In"));
        assert_eq!(sync.cursor(), Some(0));

        let effects = sync.toggle_pause();
        assert_eq!(spoken_text(&effects), Some(EN));
    }

    #[test]
    fn test_seek_clamps_at_last_word() {
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(1, Language::Greek, "οὗτος ἦν", "The same was");
        sync.next_word();
        let effects = sync.next_word();
        assert_eq!(spoken_text(&effects), Some("ἦν"));
        assert_eq!(sync.cursor(), Some(1));
        assert_eq!(sync.mirrored_cursor(), Some(2));
    }

    #[test]
    fn test_end_without_auto_continue_stops() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        let effects = sync.on_event(
            &SynthesisEvent::End {
                session_id: sync.session_id(),
            },
            &corpus,
        );
        assert!(effects.is_empty());
        assert_eq!(sync.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_auto_continue_advances_to_next_playable_verse() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::new(1.0, true);
        sync.speak(0, Language::Greek, EL, EN);

        let effects = sync.on_event(
            &SynthesisEvent::End {
                session_id: sync.session_id(),
            },
            &corpus,
        );
        assert_eq!(effects[0], PlaybackEffect::AdvanceVerse { index: 1 });
        assert_eq!(spoken_text(&effects), Some("οὗτος ἦν"));
        assert_eq!(sync.verse_index(), Some(1));
        assert_eq!(sync.language(), Some(Language::Greek));
        assert_eq!(sync.cursor(), Some(0));

        // verse 3 has no Greek text, so playback ends here
        let effects = sync.on_event(
            &SynthesisEvent::End {
                session_id: sync.session_id(),
            },
            &corpus,
        );
        assert!(effects.is_empty());
        assert_eq!(sync.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_auto_continue_stops_at_corpus_end() {
        let corpus = Corpus::new(vec![Verse::new("Jn", 1, 1, EN, EL)]);
        let mut sync = PlaybackSynchronizer::new(1.0, true);
        sync.speak(0, Language::English, EN, EL);
        sync.on_event(
            &SynthesisEvent::End {
                session_id: sync.session_id(),
            },
            &corpus,
        );
        assert_eq!(sync.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_error_stops_session() {
        let corpus = corpus();
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(0, Language::English, EN, EL);
        let event = SynthesisEvent::Error {
            session_id: sync.session_id(),
            message: "audio-busy".to_string(),
        };
        assert!(sync.on_event(&event, &corpus).is_empty());
        assert_eq!(sync.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_rate_only_changes_when_stopped() {
        let mut sync = PlaybackSynchronizer::default();
        assert!(!sync.set_rate(2.0));
        assert!(sync.set_rate(1.5));

        let effects = sync.speak(0, Language::English, EN, EL);
        match &effects[1] {
            PlaybackEffect::Speak(u) => assert_eq!(u.rate, 1.5),
            other => panic!("unexpected effect {:?}", other),
        }
        assert!(!sync.set_rate(0.5));
        assert_eq!(sync.rate(), 1.5);
    }

    #[test]
    fn test_mirror_absent_when_other_side_empty() {
        let mut sync = PlaybackSynchronizer::default();
        sync.speak(2, Language::English, "All things", "");
        assert_eq!(sync.cursor(), Some(0));
        assert_eq!(sync.mirrored_cursor(), None);
    }
}
