use crate::engine::Voice;
use crate::language::Language;

/// Picks the first installed voice whose tag starts with the language's
/// primary subtag ("el" matches "el-GR" and "el-CY").
///
/// No match is not an error; the engine then falls back to its default voice.
pub fn select_voice(voices: &[Voice], language: Language) -> Option<&Voice> {
    voices
        .iter()
        .find(|voice| voice.lang.starts_with(language.primary_subtag()))
}
