//! Character-offset helpers over `&str`.

/// Number of characters in `text`
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the character at `char_offset`, or `text.len()` past the end
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}

/// Slice `text` by character offsets, clamping both ends to the text
pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> &str {
    let start = byte_offset(text, from);
    let rest = &text[start..];
    let end = start + byte_offset(rest, to.saturating_sub(from));
    &text[start..end]
}

/// Length in characters of the longest common tail of `a` and `b`
pub(crate) fn common_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Length in characters of the longest common head of `a` and `b`
pub(crate) fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}
