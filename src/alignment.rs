//! Proportional word-index mapping between the two parallel texts.
//!
//! The English and Greek sides of a verse rarely have the same word count,
//! so the highlight on the mirrored side is placed at the same relative
//! position rather than at the same index.

/// Maps a word index in a text of `source_len` words onto a text of
/// `target_len` words.
///
/// The result is `round(source_index * target_len / source_len)` with halves
/// rounded up, clamped to the last target word. Returns `None` when either
/// side has no words.
pub fn map_index(source_index: usize, source_len: usize, target_len: usize) -> Option<usize> {
    if source_len == 0 || target_len == 0 {
        return None;
    }
    // round-half-up in integers: floor((2*s*t + l) / (2*l))
    let numerator = 2 * (source_index as u128) * (target_len as u128) + source_len as u128;
    let rounded = numerator / (2 * source_len as u128);
    let last = (target_len - 1) as u128;
    Some(rounded.min(last) as usize)
}
