//! Verses and the ordered corpus they belong to.
//!
//! Rows come from the dataset collaborator already filtered; nothing here
//! re-validates them beyond emptiness checks.

use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// One aligned verse. Field names on the wire follow the dataset columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    #[serde(rename = "Book")]
    pub book: String,
    #[serde(rename = "Chapter")]
    pub chapter: u32,
    #[serde(rename = "Verse")]
    pub verse: u32,
    /// English display text
    #[serde(rename = "Text")]
    pub text: String,
    /// Greek display text
    #[serde(rename = "greek_text")]
    pub greek_text: String,
}

impl Verse {
    pub fn new(
        book: impl Into<String>,
        chapter: u32,
        verse: u32,
        text: impl Into<String>,
        greek_text: impl Into<String>,
    ) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
            text: text.into(),
            greek_text: greek_text.into(),
        }
    }

    pub fn text_for(&self, language: Language) -> &str {
        match language {
            Language::English => &self.text,
            Language::Greek => &self.greek_text,
        }
    }

    /// Returns `(spoken, other)` texts when reading this verse aloud in `language`.
    pub fn texts(&self, language: Language) -> (&str, &str) {
        (self.text_for(language), self.text_for(language.other()))
    }

    /// Both sides carry text, so the verse can be spoken with a mirrored highlight.
    pub fn is_playable(&self) -> bool {
        !self.text.trim().is_empty() && !self.greek_text.trim().is_empty()
    }

    pub fn key(&self, language: Language) -> VerseKey {
        VerseKey::new(&self.book, self.chapter, self.verse, language)
    }
}

/// Persistence key for a verse in one language: `book:chapter:verse:language`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseKey(String);

impl VerseKey {
    pub fn new(book: &str, chapter: u32, verse: u32, language: Language) -> Self {
        Self(format!("{}:{}:{}:{}", book, chapter, verse, language.tag()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The whole ordered corpus. Adjacent indices are adjacent verses.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    verses: Vec<Verse>,
    /// `book:chapter:verse` -> first index carrying that reference
    lookup: HashMap<(String, u32, u32), usize>,
}

impl Corpus {
    pub fn new(verses: Vec<Verse>) -> Self {
        let mut lookup = HashMap::new();
        for (idx, verse) in verses.iter().enumerate() {
            lookup
                .entry((verse.book.clone(), verse.chapter, verse.verse))
                .or_insert(idx);
        }
        Self { verses, lookup }
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Verse> {
        self.verses.get(index)
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn index_of(&self, book: &str, chapter: u32, verse: u32) -> Option<usize> {
        self.lookup
            .get(&(book.to_string(), chapter, verse))
            .copied()
    }

    /// Books in the order they first appear.
    pub fn books(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.verses
            .iter()
            .filter(|v| seen.insert(v.book.as_str()))
            .map(|v| v.book.as_str())
            .collect()
    }

    pub fn chapters(&self, book: &str) -> Vec<u32> {
        let chapters: BTreeSet<u32> = self
            .verses
            .iter()
            .filter(|v| v.book == book)
            .map(|v| v.chapter)
            .collect();
        chapters.into_iter().collect()
    }

    pub fn verse_numbers(&self, book: &str, chapter: u32) -> Vec<u32> {
        let numbers: BTreeSet<u32> = self
            .verses
            .iter()
            .filter(|v| v.book == book && v.chapter == chapter)
            .map(|v| v.verse)
            .collect();
        numbers.into_iter().collect()
    }

    /// Index of the first verse of `book`'s first chapter.
    pub fn first_of_book(&self, book: &str) -> Option<usize> {
        let chapter = *self.chapters(book).first()?;
        self.first_of_chapter(book, chapter)
    }

    pub fn first_of_chapter(&self, book: &str, chapter: u32) -> Option<usize> {
        let verse = *self.verse_numbers(book, chapter).first()?;
        self.index_of(book, chapter, verse)
    }

    pub fn previous(&self, index: usize) -> usize {
        index.saturating_sub(1)
    }

    pub fn next(&self, index: usize) -> usize {
        (index + 1).min(self.verses.len().saturating_sub(1))
    }
}
