//! Pronunciation practice: scoring recognized speech against a verse and
//! remembering the verdicts per verse and language.

mod matcher;
mod store;

pub use matcher::{score, PracticeMatcher, PracticeOutcome, PracticeResults, PracticeState};
pub use store::PracticeStore;
