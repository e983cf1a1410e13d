//! The reader session: one verse on screen, at most one language being read
//! aloud or practiced, and the practice verdicts for both languages.
//!
//! `Reader` is the single owner of all session state. Hosts forward user
//! commands and engine callbacks to it and render from its accessors.

use crate::engine::{RecognitionEvent, SpeechRecognizer, SpeechSynthesizer, SynthesisEvent};
use crate::language::Language;
use crate::playback::{select_voice, PlaybackEffect, PlaybackSynchronizer};
use crate::practice::{PracticeMatcher, PracticeOutcome, PracticeResults, PracticeStore};
use crate::settings::ReaderSettings;
use crate::verse::{Corpus, Verse};
use log::{debug, info, warn};

/// Practice verdicts for the verse on screen, per language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct VerseResults {
    english: PracticeResults,
    greek: PracticeResults,
}

impl VerseResults {
    fn get(&self, language: Language) -> &PracticeResults {
        match language {
            Language::English => &self.english,
            Language::Greek => &self.greek,
        }
    }

    fn get_mut(&mut self, language: Language) -> &mut PracticeResults {
        match language {
            Language::English => &mut self.english,
            Language::Greek => &mut self.greek,
        }
    }
}

pub struct Reader {
    corpus: Corpus,
    current: usize,
    playback: PlaybackSynchronizer,
    practice: PracticeMatcher,
    results: VerseResults,
    store: PracticeStore,
    synthesizer: Box<dyn SpeechSynthesizer>,
    recognizer: Box<dyn SpeechRecognizer>,
    stt_available: bool,
    /// Set while results are being replaced from the store, so that the
    /// replacement is not written straight back.
    hydrating: bool,
    /// Set while playback itself moves to the next verse, so that the verse
    /// change does not stop it.
    auto_advancing: bool,
}

impl Reader {
    pub fn new(
        corpus: Corpus,
        store: PracticeStore,
        synthesizer: Box<dyn SpeechSynthesizer>,
        recognizer: Box<dyn SpeechRecognizer>,
        settings: &ReaderSettings,
    ) -> Self {
        let stt_available = recognizer.is_available();
        if !stt_available {
            warn!("Speech recognition is not available, practice is disabled");
        }

        let mut reader = Self {
            corpus,
            current: 0,
            playback: PlaybackSynchronizer::new(settings.speech_rate, settings.auto_continue),
            practice: PracticeMatcher::new(),
            results: VerseResults::default(),
            store,
            synthesizer,
            recognizer,
            stt_available,
            hydrating: false,
            auto_advancing: false,
        };
        reader.hydrate();
        info!("Reader ready with {} verses", reader.corpus.len());
        reader
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_verse(&self) -> Option<&Verse> {
        self.corpus.get(self.current)
    }

    pub fn stt_available(&self) -> bool {
        self.stt_available
    }

    pub fn playback(&self) -> &PlaybackSynchronizer {
        &self.playback
    }

    pub fn practice(&self) -> &PracticeMatcher {
        &self.practice
    }

    pub fn speaking_language(&self) -> Option<Language> {
        self.playback.language()
    }

    pub fn practice_language(&self) -> Option<Language> {
        self.practice.language()
    }

    // navigation

    /// Shows the verse at `index`. Returns false when it is out of range.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.corpus.len() {
            debug!("Ignoring navigation to verse {} of {}", index, self.corpus.len());
            return false;
        }
        self.set_current(index);
        true
    }

    pub fn next(&mut self) {
        self.set_current(self.corpus.next(self.current));
    }

    pub fn previous(&mut self) {
        self.set_current(self.corpus.previous(self.current));
    }

    pub fn go_to_reference(&mut self, book: &str, chapter: u32, verse: u32) -> bool {
        match self.corpus.index_of(book, chapter, verse) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    /// Jumps to the first verse of `book`.
    pub fn select_book(&mut self, book: &str) -> bool {
        match self.corpus.first_of_book(book) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    /// Jumps to the first verse of `chapter` in the current book.
    pub fn select_chapter(&mut self, chapter: u32) -> bool {
        let Some(book) = self.current_verse().map(|v| v.book.clone()) else {
            return false;
        };
        match self.corpus.first_of_chapter(&book, chapter) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    fn set_current(&mut self, index: usize) {
        if index == self.current {
            return;
        }
        self.current = index;
        self.hydrate();

        if self.auto_advancing {
            self.auto_advancing = false;
            return;
        }
        self.stop_practice();
        self.stop_speaking();
    }

    // read-aloud

    /// Reads the current verse in `language`, or stops if that language is
    /// already being read. Returns false when the request was refused.
    pub fn speak(&mut self, language: Language) -> bool {
        if let Some(practicing) = self.practice.language() {
            debug!(
                "Refusing to read {} while practicing {}",
                language, practicing
            );
            return false;
        }
        if matches!(self.playback.language(), Some(active) if active != language) {
            debug!("Refusing to read {} while another language is being read", language);
            return false;
        }
        let Some(verse) = self.corpus.get(self.current) else {
            return false;
        };
        let (spoken, other) = verse.texts(language);
        let effects = self.playback.speak(self.current, language, spoken, other);
        self.apply_playback(effects);
        true
    }

    pub fn stop_speaking(&mut self) {
        let effects = self.playback.stop();
        self.apply_playback(effects);
    }

    pub fn toggle_pause(&mut self) {
        let effects = self.playback.toggle_pause();
        self.apply_playback(effects);
    }

    pub fn previous_word(&mut self) {
        let effects = self.playback.previous_word();
        self.apply_playback(effects);
    }

    pub fn next_word(&mut self) {
        let effects = self.playback.next_word();
        self.apply_playback(effects);
    }

    pub fn set_rate(&mut self, rate: f32) -> bool {
        self.playback.set_rate(rate)
    }

    pub fn set_auto_continue(&mut self, enabled: bool) {
        self.playback.set_auto_continue(enabled);
    }

    pub fn on_synthesis_event(&mut self, event: &SynthesisEvent) {
        let effects = self.playback.on_event(event, &self.corpus);
        self.apply_playback(effects);
    }

    fn apply_playback(&mut self, effects: Vec<PlaybackEffect>) {
        for effect in effects {
            match effect {
                PlaybackEffect::Cancel => self.synthesizer.cancel(),
                PlaybackEffect::Pause => self.synthesizer.pause(),
                PlaybackEffect::Speak(utterance) => {
                    let voices = self.synthesizer.voices();
                    let voice = select_voice(&voices, utterance.language);
                    if voice.is_none() {
                        debug!("No {} voice installed, using engine default", utterance.language);
                    }
                    self.synthesizer.speak(&utterance, voice);
                }
                PlaybackEffect::AdvanceVerse { index } => {
                    self.auto_advancing = true;
                    self.set_current(index);
                    // set_current leaves the flag alone when the index did not change
                    self.auto_advancing = false;
                }
            }
        }
    }

    // practice

    /// Starts practicing the current verse in `language`, or stops if that
    /// language is already being practiced. Returns false when refused.
    pub fn start_practice(&mut self, language: Language) -> bool {
        if !self.stt_available {
            debug!("Practice requested but speech recognition is unavailable");
            return false;
        }
        if let Some(speaking) = self.playback.language() {
            debug!(
                "Refusing to practice {} while reading {}",
                language, speaking
            );
            return false;
        }
        if self.practice.language() == Some(language) {
            self.stop_practice();
            return true;
        }
        self.stop_practice();

        let Some(text) = self
            .corpus
            .get(self.current)
            .map(|v| v.text_for(language).to_string())
        else {
            return false;
        };

        self.results.get_mut(language).clear();
        self.sync_results();

        let attempt = self.practice.start(language, &text);
        if let Err(e) = self.recognizer.start(attempt, language) {
            warn!("Failed to start speech recognition: {:#}", e);
            self.practice.stop();
            return false;
        }
        true
    }

    pub fn stop_practice(&mut self) {
        if self.practice.stop().is_some() {
            self.recognizer.stop();
        }
    }

    pub fn on_recognition_event(&mut self, event: &RecognitionEvent) {
        match self.practice.on_event(event) {
            Some(PracticeOutcome::Scored { language, updates }) => {
                self.results.get_mut(language).extend(updates);
                self.sync_results();
            }
            Some(PracticeOutcome::Ended { language }) => {
                info!("Practice in {} ended", language);
                self.recognizer.stop();
            }
            None => {}
        }
    }

    /// Forgets the practice verdicts of the current verse in `language`.
    pub fn reset_practice(&mut self, language: Language) {
        let Some(key) = self.current_verse().map(|v| v.key(language)) else {
            return;
        };
        self.store.clear(&key);
        self.results.get_mut(language).clear();
        self.sync_results();
        if self.practice.language() == Some(language) {
            self.practice.rewind();
        }
    }

    pub fn results(&self, language: Language) -> &PracticeResults {
        self.results.get(language)
    }

    pub fn has_results(&self, language: Language) -> bool {
        !self.results.get(language).is_empty()
    }

    /// Word to highlight in `language`'s text: the practice cursor, else the
    /// spoken word, else the word mirrored from the other language.
    pub fn highlight(&self, language: Language) -> Option<usize> {
        if self.practice.language() == Some(language) {
            return self.practice.cursor();
        }
        match self.playback.language() {
            Some(speaking) if speaking == language => self.playback.cursor(),
            Some(_) => self.playback.mirrored_cursor(),
            None => None,
        }
    }

    fn hydrate(&mut self) {
        let Some(verse) = self.corpus.get(self.current) else {
            return;
        };
        let loaded = VerseResults {
            english: self.store.load(&verse.key(Language::English)),
            greek: self.store.load(&verse.key(Language::Greek)),
        };
        self.hydrating = true;
        self.results = loaded;
        self.practice.rewind();
        self.sync_results();
    }

    /// Writes both languages' results for the current verse to the store.
    fn sync_results(&mut self) {
        if self.hydrating {
            self.hydrating = false;
            return;
        }
        let Some(verse) = self.corpus.get(self.current) else {
            return;
        };
        for language in Language::ALL {
            self.store
                .save(&verse.key(language), self.results.get(language));
        }
    }
}
