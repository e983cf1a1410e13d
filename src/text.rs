//! Word splitting and comparison normalization shared by playback and practice.

use unicode_normalization::UnicodeNormalization;

/// Splits display text into its words on runs of whitespace.
///
/// Empty fragments are never produced, so `tokenize("  ")` is empty.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Owned variant of [`tokenize`] for state that outlives the source text.
pub fn tokenize_owned(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Reduces a display word to its comparison form.
///
/// The word is decomposed (NFD), combining diacritics are dropped, anything
/// outside Latin letters, digits and the Greek blocks is removed, and the
/// remainder is lowercased. Normalizing twice gives the same result.
pub fn normalize_word(word: &str) -> String {
    let stripped: String = word
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| is_comparable(*c))
        .collect();
    stripped.to_lowercase()
}

/// Tokenizes and normalizes in one go, keeping positions aligned with
/// [`tokenize`] (a word made only of punctuation normalizes to "").
pub fn normalize_words(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(normalize_word).collect()
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn is_comparable(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('\u{0370}'..='\u{03FF}').contains(&c)
        || ('\u{1F00}'..='\u{1FFF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  In the\tbeginning\n was "), vec!["In", "the", "beginning", "was"]);
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_word("Word,"), "word");
        assert_eq!(normalize_word("\"God.\""), "god");
        assert_eq!(normalize_word("1:1"), "11");
    }

    #[test]
    fn test_normalize_strips_greek_diacritics() {
        assert_eq!(normalize_word("Ἐν"), "εν");
        assert_eq!(normalize_word("ἀρχῇ"), "αρχη");
        assert_eq!(normalize_word("λόγος·"), "λογος");
        assert_eq!(normalize_word("ΛΟΓΟΣ"), "λογος");
    }

    #[test]
    fn test_normalize_drops_foreign_scripts() {
        assert_eq!(normalize_word("שָׁלוֹם"), "");
        assert_eq!(normalize_word("café"), "cafe");
    }

    #[test]
    fn test_normalize_words_keeps_positions() {
        assert_eq!(normalize_words("In the — beginning"), vec!["in", "the", "", "beginning"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn property_normalize_is_idempotent(word in "\\PC{0,24}") {
            let once = normalize_word(&word);
            prop_assert_eq!(normalize_word(&once), once);
        }

        #[test]
        fn property_normalize_is_idempotent_on_greek(word in "[\u{0370}-\u{03FF}\u{1F00}-\u{1FFF}A-Za-z0-9]{0,16}") {
            let once = normalize_word(&word);
            prop_assert_eq!(normalize_word(&once), once);
        }
    }
}
