pub mod alignment;
pub mod cli;
pub mod engine;
pub mod language;
pub mod playback;
pub mod practice;
pub mod reader;
pub mod settings;
pub mod storage;
pub mod text;
pub mod transliterate;
pub mod verse;

pub use alignment::map_index;
pub use language::Language;
pub use playback::{PlaybackEffect, PlaybackState, PlaybackSynchronizer};
pub use practice::{PracticeMatcher, PracticeResults, PracticeStore};
pub use reader::Reader;
pub use settings::ReaderSettings;
pub use transliterate::{transliterate, transliterate_words};
pub use verse::{Corpus, Verse, VerseKey};
