use crate::alignment::map_index;
use crate::engine::{RecognitionEvent, RecognitionResult};
use crate::language::Language;
use crate::practice::{PracticeMatcher, PracticeOutcome, PracticeResults, PracticeStore};
use crate::settings::{ReaderSettings, SETTINGS_STORE_PATH};
use crate::storage::JsonFileStore;
use crate::transliterate::{transliterate, transliterate_words};
use crate::verse::VerseKey;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "manuscripts", about = "Parallel Greek/English reader tools")]
pub struct CliArgs {
    /// Settings file to read
    #[arg(long, global = true, default_value = SETTINGS_STORE_PATH)]
    pub settings: PathBuf,

    /// Enable debug mode with verbose logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the Latin pronunciation of Greek text
    Transliterate {
        /// Print each word next to its pronunciation
        #[arg(long)]
        words: bool,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Map a word index onto a text with a different word count
    Align {
        #[arg(long)]
        source_len: usize,
        #[arg(long)]
        target_len: usize,
        index: usize,
    },
    /// Score finalized transcript fragments against a target text
    Score {
        #[arg(long)]
        target: String,
        #[arg(long, default_value = "en-US")]
        language: Language,
        fragments: Vec<String>,
    },
    /// Show or clear a stored practice record
    Record {
        #[arg(long)]
        book: String,
        #[arg(long)]
        chapter: u32,
        #[arg(long)]
        verse: u32,
        #[arg(long)]
        language: Language,
        /// Remove the record instead of showing it
        #[arg(long)]
        reset: bool,
    },
}

/// Runs `command` and returns what should be printed.
pub fn execute(command: &Command, settings: &ReaderSettings) -> Result<String> {
    match command {
        Command::Transliterate { words, text } => {
            let text = text.join(" ");
            if *words {
                Ok(transliterate_words(&text)
                    .into_iter()
                    .map(|(greek, latin)| format!("{}\t{}", greek, latin))
                    .collect::<Vec<_>>()
                    .join("\n"))
            } else {
                Ok(transliterate(&text))
            }
        }
        Command::Align {
            source_len,
            target_len,
            index,
        } => Ok(match map_index(*index, *source_len, *target_len) {
            Some(mapped) => mapped.to_string(),
            None => "none".to_string(),
        }),
        Command::Score {
            target,
            language,
            fragments,
        } => {
            let results = score_fragments(*language, target, fragments);
            Ok(serde_json::to_string(&results)?)
        }
        Command::Record {
            book,
            chapter,
            verse,
            language,
            reset,
        } => {
            let backend = JsonFileStore::open(&settings.practice_store_path).with_context(|| {
                format!("Failed to open practice store {}", settings.practice_store_path)
            })?;
            let mut store = PracticeStore::new(Box::new(backend));
            let key = VerseKey::new(book, *chapter, *verse, *language);
            if *reset {
                store.clear(&key);
                Ok(format!("cleared {}", key))
            } else {
                Ok(serde_json::to_string(&store.load(&key))?)
            }
        }
    }
}

/// Feeds each fragment to a fresh practice attempt as one finalized result.
fn score_fragments(language: Language, target: &str, fragments: &[String]) -> PracticeResults {
    let mut matcher = PracticeMatcher::new();
    let attempt = matcher.start(language, target);
    let mut results = PracticeResults::new();
    for fragment in fragments {
        let event = RecognitionEvent::Results {
            attempt,
            results: vec![RecognitionResult::finalized(fragment.as_str())],
        };
        if let Some(PracticeOutcome::Scored { updates, .. }) = matcher.on_event(&event) {
            results.extend(updates);
        }
    }
    results
}
