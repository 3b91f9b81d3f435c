//! Relocating an [`Anchor`] inside an edited document.

use super::text::{char_len, common_prefix_len, common_suffix_len};
use super::{Anchor, Position};

/// Finds where an anchor's text lives in a document.
///
/// Implementations must be total: when nothing plausible matches they
/// return `None` instead of failing. A collapsed position is allowed and
/// means "the context was found but the anchored text was not".
pub trait AnchorResolver {
    fn resolve(&self, doc: &str, anchor: &Anchor) -> Option<Position>;
}

impl<F> AnchorResolver for F
where
    F: Fn(&str, &Anchor) -> Option<Position>,
{
    fn resolve(&self, doc: &str, anchor: &Anchor) -> Option<Position> {
        self(doc, anchor)
    }
}

/// Default resolver: exact text match, disambiguated by surrounding context.
///
/// Every occurrence of `exact` is scored by how much of the anchor's
/// prefix and suffix still sits next to it. The best score wins and the
/// earliest occurrence wins a tie. An anchor with empty `exact` resolves
/// to the collapsed gap between its prefix and suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextQuoteResolver;

impl AnchorResolver for TextQuoteResolver {
    fn resolve(&self, doc: &str, anchor: &Anchor) -> Option<Position> {
        let candidates: Vec<(usize, usize)> = if !anchor.exact.is_empty() {
            occurrences(doc, &anchor.exact)
                .map(|start| (start, start + anchor.exact.len()))
                .collect()
        } else if !anchor.prefix.is_empty() {
            occurrences(doc, &anchor.prefix)
                .map(|start| start + anchor.prefix.len())
                .map(|gap| (gap, gap))
                .collect()
        } else if !anchor.suffix.is_empty() {
            occurrences(doc, &anchor.suffix)
                .map(|gap| (gap, gap))
                .collect()
        } else {
            return None;
        };

        let mut best: Option<((usize, usize), usize)> = None;
        for (start, end) in candidates {
            let score = common_suffix_len(&doc[..start], &anchor.prefix)
                + common_prefix_len(&doc[end..], &anchor.suffix);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some(((start, end), score));
            }
        }

        best.map(|((start, end), _)| {
            let from = char_len(&doc[..start]);
            Position::new(from, from + char_len(&doc[start..end]))
        })
    }
}

/// Byte offsets of every (possibly overlapping) occurrence of `needle`
fn occurrences<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        let found = cursor + haystack.get(cursor..)?.find(needle)?;
        // Step one character past the match start so overlapping matches are seen
        cursor = found
            + haystack[found..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
        Some(found)
    })
}
