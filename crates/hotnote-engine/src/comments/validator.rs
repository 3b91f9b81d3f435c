//! Keep, snap or delete: re-validating comment positions after an edit.
//!
//! Character offsets are not stable across edits, so nothing here tries to
//! track a comment through individual changes. Each validation starts from
//! scratch with the current text and the comment's stored anchor and
//! fallback:
//!
//! ```text
//! anchor resolves to a real selection        -> Keep
//! otherwise, a word near the reference spot  -> Snap
//! otherwise                                  -> Delete
//! ```
//!
//! Every function here is total. Bad input degrades to "no match" or
//! `Delete` so a broken comment can never take rendering down with it.

use regex::Regex;
use std::sync::OnceLock;

use super::anchoring::{AnchorResolver, TextQuoteResolver};
use super::text::{char_len, char_slice};
use super::{Comment, CommentValidation, Position, ValidationResult};

/// Default search radius, in characters each way, for [`find_nearest_word`]
pub const DEFAULT_SNAP_DISTANCE: usize = 100;

/// Only ASCII letters and digits count as word characters. Markdown syntax
/// (`#`, `*`, `_`, backticks) never does, and neither does non-ASCII text.
fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| Regex::new(r"[a-zA-Z0-9]+").expect("Invalid word regex"))
}

/// True for a missing position or a zero-width one
pub fn is_collapsed_selection(position: Option<&Position>) -> bool {
    position.is_none_or(Position::is_collapsed)
}

/// Find the word closest to `position` within `max_distance` characters.
///
/// `position` is clamped into the document first. A word's distance is the
/// distance from `position` to whichever of its ends is nearer; on an exact
/// tie the leftmost word wins. Returns `None` when the window holds no word.
pub fn find_nearest_word(doc: &str, position: usize, max_distance: usize) -> Option<Position> {
    let len = char_len(doc);
    let position = position.min(len);
    let window_start = position.saturating_sub(max_distance);
    let window_end = position.saturating_add(max_distance).min(len);
    let window = char_slice(doc, window_start, window_end);

    let mut nearest: Option<(Position, usize)> = None;
    let mut chars_before = 0;
    let mut bytes_seen = 0;
    for word in word_regex().find_iter(window) {
        // Words are ASCII, but the gaps between them may not be
        chars_before += char_len(&window[bytes_seen..word.start()]);
        bytes_seen = word.end();

        let from = window_start + chars_before;
        let to = from + word.len();
        chars_before += word.len();

        let distance = position.abs_diff(from).min(position.abs_diff(to));
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((Position::new(from, to), distance));
        }
    }

    nearest.map(|(word, _)| word)
}

/// True when no word lies within `max_distance` of `position`
pub fn should_delete_comment(doc: &str, position: usize, max_distance: usize) -> bool {
    find_nearest_word(doc, position, max_distance).is_none()
}

/// Validate one comment with the default resolver and snap distance
pub fn validate_comment_position(doc: &str, comment: &Comment) -> ValidationResult {
    CommentValidator::default().validate(doc, comment)
}

/// Validate a list of comments with the default resolver and snap distance
pub fn validate_all_comments(doc: &str, comments: &[Comment]) -> Vec<CommentValidation> {
    CommentValidator::default().validate_all(doc, comments)
}

/// An anchor resolver paired with the snap radius used for fallbacks
#[derive(Debug, Clone)]
pub struct CommentValidator<R = TextQuoteResolver> {
    resolver: R,
    max_distance: usize,
}

impl Default for CommentValidator<TextQuoteResolver> {
    fn default() -> Self {
        Self::new(TextQuoteResolver, DEFAULT_SNAP_DISTANCE)
    }
}

impl<R: AnchorResolver> CommentValidator<R> {
    pub fn new(resolver: R, max_distance: usize) -> Self {
        Self {
            resolver,
            max_distance,
        }
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    pub fn validate(&self, doc: &str, comment: &Comment) -> ValidationResult {
        let resolved = self.resolver.resolve(doc, &comment.anchor);

        if let Some(position) = resolved
            && position.from < position.to
            && position.to <= char_len(doc)
        {
            return ValidationResult::Keep(position);
        }

        // A collapsed hit still says where the text used to be, and beats
        // whatever was stored on the comment
        let reference = match resolved {
            Some(position) => position.from,
            None => match &comment.fallback_position {
                Some(fallback) => fallback.from.offset(),
                None => {
                    log::debug!("comment {}: no anchor match and no fallback", comment.id);
                    return ValidationResult::Delete;
                }
            },
        };

        match find_nearest_word(doc, reference, self.max_distance) {
            Some(word) => {
                log::debug!(
                    "comment {}: snapped from {reference} to {}..{}",
                    comment.id,
                    word.from,
                    word.to
                );
                ValidationResult::Snap(word)
            }
            None => {
                log::debug!("comment {}: no word near {reference}", comment.id);
                ValidationResult::Delete
            }
        }
    }

    pub fn validate_all(&self, doc: &str, comments: &[Comment]) -> Vec<CommentValidation> {
        comments
            .iter()
            .map(|comment| CommentValidation {
                comment_id: comment.id.clone(),
                result: self.validate(doc, comment),
            })
            .collect()
    }
}
