//! Latin-script pronunciation guide for polytonic Greek.
//!
//! Diphthongs are rewritten first, then every remaining character goes
//! through a single-character table. Breathing marks become a leading `h`,
//! accents carry over to the Latin vowel, and anything the table does not
//! know passes through untouched.

use crate::text::tokenize;
use log::warn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Critical-apparatus markers (U+2E00..=U+2E0F) carried by some editions.
const EDITORIAL_MARKS: std::ops::RangeInclusive<char> = '\u{2E00}'..='\u{2E0F}';

/// A gamma in front of one of these is pronounced as a nasal.
const GAMMA_NASALS: [char; 4] = ['γ', 'κ', 'ξ', 'χ'];

/// Applied in order. Each rewrite sees the output of the previous ones.
static DIPHTHONGS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("αι", "ai"),
        ("ει", "ei"),
        ("οι", "oi"),
        ("υι", "yi"),
        ("αυ", "av"),
        ("ευ", "ev"),
        ("ου", "ou"),
        ("ηυ", "iv"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| {
        match Regex::new(&format!("(?i){}", pattern)) {
            Ok(re) => Some((re, replacement)),
            Err(e) => {
                warn!("Failed to compile diphthong pattern '{}': {}", pattern, e);
                None
            }
        }
    })
    .collect()
});

/// Lowercase Greek (plus two punctuation marks) to Latin. Keys are NFC.
static SINGLE_MAP: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert('α', "a");
    m.insert('ά', "á");
    m.insert('ὰ', "à");
    m.insert('ᾶ', "â");
    m.insert('ἀ', "a");
    m.insert('ἁ', "ha");
    m.insert('ἄ', "á");
    m.insert('ἅ', "há");
    m.insert('ἂ', "à");
    m.insert('ἃ', "hà");
    m.insert('ἆ', "â");
    m.insert('ἇ', "hâ");
    m.insert('ᾳ', "a");
    m.insert('ᾴ', "á");
    m.insert('ᾲ', "à");
    m.insert('ᾷ', "â");
    m.insert('ᾀ', "a");
    m.insert('ᾁ', "ha");
    m.insert('ᾄ', "á");
    m.insert('ᾅ', "há");
    m.insert('ᾂ', "à");
    m.insert('ᾃ', "hà");
    m.insert('ᾆ', "â");
    m.insert('ᾇ', "hâ");

    m.insert('ε', "e");
    m.insert('έ', "é");
    m.insert('ὲ', "è");
    m.insert('ἐ', "e");
    m.insert('ἑ', "he");
    m.insert('ἔ', "é");
    m.insert('ἕ', "hé");
    m.insert('ἒ', "è");
    m.insert('ἓ', "hè");

    m.insert('η', "ē");
    m.insert('ή', "ḗ");
    m.insert('ὴ', "ḕ");
    m.insert('ῆ', "ê");
    m.insert('ἠ', "ē");
    m.insert('ἡ', "hē");
    m.insert('ἤ', "ḗ");
    m.insert('ἥ', "hḗ");
    m.insert('ἢ', "ḕ");
    m.insert('ἣ', "hḕ");
    m.insert('ἦ', "ê");
    m.insert('ἧ', "hê");
    m.insert('ῃ', "ē");
    m.insert('ῄ', "ḗ");
    m.insert('ῂ', "ḕ");
    m.insert('ῇ', "ê");
    m.insert('ᾐ', "ē");
    m.insert('ᾑ', "hē");
    m.insert('ᾔ', "ḗ");
    m.insert('ᾕ', "hḗ");
    m.insert('ᾒ', "ḕ");
    m.insert('ᾓ', "hḕ");
    m.insert('ᾖ', "ê");
    m.insert('ᾗ', "hê");

    m.insert('ι', "i");
    m.insert('ί', "í");
    m.insert('ὶ', "ì");
    m.insert('ῖ', "î");
    m.insert('ἰ', "i");
    m.insert('ἱ', "hi");
    m.insert('ἴ', "í");
    m.insert('ἵ', "hí");
    m.insert('ἲ', "ì");
    m.insert('ἳ', "hì");
    m.insert('ἶ', "î");
    m.insert('ἷ', "hî");
    m.insert('ϊ', "i");
    m.insert('ΐ', "í");
    m.insert('ῒ', "ì");
    m.insert('ῗ', "î");

    m.insert('ο', "o");
    m.insert('ό', "ó");
    m.insert('ὸ', "ò");
    m.insert('ὀ', "o");
    m.insert('ὁ', "ho");
    m.insert('ὄ', "ó");
    m.insert('ὅ', "hó");
    m.insert('ὂ', "ò");
    m.insert('ὃ', "hò");

    m.insert('υ', "y");
    m.insert('ύ', "ý");
    m.insert('ὺ', "ỳ");
    m.insert('ῦ', "ŷ");
    m.insert('ὐ', "y");
    m.insert('ὑ', "hy");
    m.insert('ὔ', "ý");
    m.insert('ὕ', "hý");
    m.insert('ὒ', "ỳ");
    m.insert('ὓ', "hỳ");
    m.insert('ὖ', "ŷ");
    m.insert('ὗ', "hŷ");
    m.insert('ϋ', "y");
    m.insert('ΰ', "ý");
    m.insert('ῢ', "ỳ");
    m.insert('ῧ', "ŷ");

    m.insert('ω', "ō");
    m.insert('ώ', "ṓ");
    m.insert('ὼ', "ṑ");
    m.insert('ῶ', "ô");
    m.insert('ὠ', "ō");
    m.insert('ὡ', "hō");
    m.insert('ὤ', "ṓ");
    m.insert('ὥ', "hṓ");
    m.insert('ὢ', "ṑ");
    m.insert('ὣ', "hṑ");
    m.insert('ὦ', "ô");
    m.insert('ὧ', "hô");
    m.insert('ῳ', "ō");
    m.insert('ῴ', "ṓ");
    m.insert('ῲ', "ṑ");
    m.insert('ῷ', "ô");
    m.insert('ᾠ', "ō");
    m.insert('ᾡ', "hō");
    m.insert('ᾤ', "ṓ");
    m.insert('ᾥ', "hṓ");
    m.insert('ᾢ', "ṑ");
    m.insert('ᾣ', "hṑ");
    m.insert('ᾦ', "ô");
    m.insert('ᾧ', "hô");

    // consonants
    m.insert('β', "v");
    m.insert('γ', "g");
    m.insert('δ', "d");
    m.insert('ζ', "z");
    m.insert('θ', "th");
    m.insert('κ', "k");
    m.insert('λ', "l");
    m.insert('μ', "m");
    m.insert('ν', "n");
    m.insert('ξ', "x");
    m.insert('π', "p");
    m.insert('ρ', "r");
    m.insert('ῥ', "rh");
    m.insert('ῤ', "r");
    m.insert('σ', "s");
    m.insert('ς', "s");
    m.insert('τ', "t");
    m.insert('φ', "ph");
    m.insert('χ', "ch");
    m.insert('ψ', "ps");

    // punctuation
    m.insert('·', ";");
    m.insert(';', "?");
    m
});

/// Transliterates `text` into its Latin pronunciation.
///
/// Capitalization of the first letter of each mapped unit is preserved, so
/// `"Αυτος"` becomes `"Avtos"`. Whitespace, digits and Latin text are kept
/// as they are.
pub fn transliterate(text: &str) -> String {
    let normalized: String = text
        .nfc()
        .filter(|c| !EDITORIAL_MARKS.contains(c))
        .collect();

    let mut s = normalized;
    for (re, replacement) in DIPHTHONGS.iter() {
        s = re
            .replace_all(&s, |caps: &Captures| {
                let starts_upper = caps[0].chars().next().is_some_and(char::is_uppercase);
                if starts_upper {
                    capitalize(replacement)
                } else {
                    (*replacement).to_string()
                }
            })
            .into_owned();
    }

    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &ch) in chars.iter().enumerate() {
        let lower = single_lowercase(ch);

        if lower == Some('γ') {
            let next_is_velar = chars
                .get(i + 1)
                .and_then(|&next| single_lowercase(next))
                .is_some_and(|next| GAMMA_NASALS.contains(&next));
            if next_is_velar {
                out.push(if ch.is_uppercase() { 'N' } else { 'n' });
                continue;
            }
        }

        match lower.and_then(|l| SINGLE_MAP.get(&l)) {
            Some(mapped) if ch.is_uppercase() => out.push_str(&capitalize(mapped)),
            Some(mapped) => out.push_str(mapped),
            None => out.push(ch),
        }
    }
    out
}

/// Transliterates each whitespace-separated word of `text` on its own,
/// pairing it with the source word it came from.
pub fn transliterate_words(text: &str) -> Vec<(&str, String)> {
    tokenize(text)
        .into_iter()
        .map(|word| (word, transliterate(word)))
        .collect()
}

/// Lowercase form of `c` when it lowercases to exactly one character.
fn single_lowercase(c: char) -> Option<char> {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => Some(l),
        _ => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
