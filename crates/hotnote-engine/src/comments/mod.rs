//! Comment anchoring.
//!
//! A comment remembers the text it was attached to through an [`Anchor`]
//! (the selected text plus some surrounding context) and a fallback
//! position recorded the last time it was placed. Offsets throughout this
//! module are character offsets into the document's plain text, not bytes.
//!
//! Whenever the document changes the host re-validates every comment:
//!
//! - the anchor still resolves to a real selection: **keep** it there
//! - it does not, but a word exists near the old spot: **snap** to it
//! - nothing usable is nearby: **delete** the comment
//!
//! See [`validator`] for the decision logic and [`anchoring`] for the
//! anchor search.

pub mod anchoring;
pub(crate) mod text;
pub mod validator;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use anchoring::{AnchorResolver, TextQuoteResolver};
pub use validator::{
    CommentValidator, DEFAULT_SNAP_DISTANCE, find_nearest_word, is_collapsed_selection,
    should_delete_comment, validate_all_comments, validate_comment_position,
};

/// Half-open character range `from..to` into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub from: usize,
    pub to: usize,
}

impl Position {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// A zero-width position is a caret, not a selection
    pub fn is_collapsed(&self) -> bool {
        self.from == self.to
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Context-based description of the text a comment was attached to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Anchor {
    #[serde(default)]
    pub prefix: String,
    pub exact: String,
    #[serde(default)]
    pub suffix: String,
}

impl Anchor {
    pub fn new(
        prefix: impl Into<String>,
        exact: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            exact: exact.into(),
            suffix: suffix.into(),
        }
    }

    /// Build an anchor for `position` in `doc`, keeping up to
    /// `context_chars` characters of context on either side.
    ///
    /// Out-of-range positions are clamped to the document.
    pub fn capture(doc: &str, position: Position, context_chars: usize) -> Self {
        let len = text::char_len(doc);
        let to = position.to.min(len);
        let from = position.from.min(to);

        Self {
            prefix: text::char_slice(doc, from.saturating_sub(context_chars), from).to_string(),
            exact: text::char_slice(doc, from, to).to_string(),
            suffix: text::char_slice(doc, to, to.saturating_add(context_chars).min(len))
                .to_string(),
        }
    }
}

/// One end of a stored fallback position.
///
/// Older comment files recorded `{line, col}` pairs instead of flat
/// offsets. Both shapes deserialize; [`FallbackPoint::offset`] resolves
/// either to a character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FallbackPoint {
    Offset(usize),
    LineCol {
        #[serde(default)]
        line: usize,
        col: usize,
    },
}

impl FallbackPoint {
    /// Legacy points were written from single-line views where `col` was
    /// already the flat offset, so the line is ignored.
    pub fn offset(&self) -> usize {
        match self {
            FallbackPoint::Offset(offset) => *offset,
            FallbackPoint::LineCol { col, .. } => *col,
        }
    }
}

/// Last known location of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPosition {
    pub from: FallbackPoint,
    pub to: FallbackPoint,
}

impl From<Position> for FallbackPosition {
    fn from(position: Position) -> Self {
        Self {
            from: FallbackPoint::Offset(position.from),
            to: FallbackPoint::Offset(position.to),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub anchor: Anchor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_position: Option<FallbackPosition>,
}

impl Comment {
    /// Attach a new comment to `position` in `doc`
    pub fn new(doc: &str, position: Position, context_chars: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            anchor: Anchor::capture(doc, position, context_chars),
            fallback_position: Some(position.into()),
        }
    }

    /// Record a validation outcome on this comment.
    ///
    /// Kept and snapped positions become the new fallback so the next
    /// validation starts from the corrected location. Returns `false` when
    /// the comment should be removed.
    pub fn apply(&mut self, result: &ValidationResult) -> bool {
        match result.position() {
            Some(position) => {
                self.fallback_position = Some(position.into());
                true
            }
            None => false,
        }
    }
}

/// What the host should do with a comment after its document changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "position", rename_all = "lowercase")]
pub enum ValidationResult {
    /// The anchor still matches; highlight it at this position
    Keep(Position),
    /// The anchored text is gone; highlight the nearest word instead
    Snap(Position),
    /// Nothing nearby to attach to
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationAction {
    Keep,
    Snap,
    Delete,
}

impl ValidationResult {
    pub fn action(&self) -> ValidationAction {
        match self {
            ValidationResult::Keep(_) => ValidationAction::Keep,
            ValidationResult::Snap(_) => ValidationAction::Snap,
            ValidationResult::Delete => ValidationAction::Delete,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            ValidationResult::Keep(position) | ValidationResult::Snap(position) => Some(*position),
            ValidationResult::Delete => None,
        }
    }
}

/// A [`ValidationResult`] tagged with the comment it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentValidation {
    pub comment_id: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Validate every comment against `doc`, persist kept and snapped
/// positions, and drop the comments that should be deleted.
///
/// Results are returned in the original comment order, deleted ones
/// included.
pub fn reconcile_comments(
    validator: &CommentValidator<impl AnchorResolver>,
    doc: &str,
    comments: &mut Vec<Comment>,
) -> Vec<CommentValidation> {
    let results = validator.validate_all(doc, comments.as_slice());
    let mut outcomes = results.iter();
    comments.retain_mut(|comment| match outcomes.next() {
        Some(validation) => comment.apply(&validation.result),
        None => true,
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position_collapsed() {
        assert!(Position::new(3, 3).is_collapsed());
        assert!(!Position::new(3, 4).is_collapsed());
        assert_eq!(Position::new(3, 8).len(), 5);
    }

    #[test]
    fn test_capture_anchor_with_context() {
        let doc = "Hello world this is text";

        let anchor = Anchor::capture(doc, Position::new(6, 11), 6);

        assert_eq!(anchor, Anchor::new("Hello ", "world", " this "));
    }

    #[test]
    fn test_capture_anchor_clamps_to_document() {
        let doc = "short";

        let anchor = Anchor::capture(doc, Position::new(2, 50), 32);

        assert_eq!(anchor, Anchor::new("sh", "ort", ""));
    }

    #[test]
    fn test_capture_anchor_counts_characters_not_bytes() {
        let doc = "Hello 世界 world";

        let anchor = Anchor::capture(doc, Position::new(6, 8), 2);

        assert_eq!(anchor, Anchor::new("o ", "世界", " w"));
    }

    #[test]
    fn test_legacy_line_col_fallback_resolves_to_col() {
        let point = FallbackPoint::LineCol { line: 4, col: 17 };
        assert_eq!(point.offset(), 17);
        assert_eq!(FallbackPoint::Offset(9).offset(), 9);
    }

    #[test]
    fn test_comment_deserializes_modern_and_legacy_shapes() {
        let json = r#"[
            {"id": "a", "anchor": {"prefix": "", "exact": "x", "suffix": ""},
             "fallbackPosition": {"from": 6, "to": 11}},
            {"id": "b", "anchor": {"exact": "y"},
             "fallbackPosition": {"from": {"line": 0, "col": 2}, "to": {"line": 0, "col": 5}}},
            {"id": "c", "anchor": {"exact": "z"}}
        ]"#;

        let comments: Vec<Comment> = serde_json::from_str(json).unwrap();

        assert_eq!(
            comments[0].fallback_position,
            Some(Position::new(6, 11).into())
        );
        assert_eq!(
            comments[1].fallback_position,
            Some(FallbackPosition {
                from: FallbackPoint::LineCol { line: 0, col: 2 },
                to: FallbackPoint::LineCol { line: 0, col: 5 },
            })
        );
        assert_eq!(comments[2].fallback_position, None);
    }

    #[test]
    fn test_legacy_point_without_line() {
        let json = r#"{"id": "d", "anchor": {"exact": "w"},
            "fallbackPosition": {"from": {"col": 2}, "to": {"col": 5}}}"#;

        let comment: Comment = serde_json::from_str(json).unwrap();
        let fallback = comment.fallback_position.unwrap();

        assert_eq!(fallback.from, FallbackPoint::LineCol { line: 0, col: 2 });
        assert_eq!(fallback.to.offset(), 5);
    }

    #[test]
    fn test_new_comment_records_selection() {
        let doc = "Hello world this is text";

        let comment = Comment::new(doc, Position::new(6, 11), 32);

        assert_eq!(comment.anchor.exact, "world");
        assert_eq!(
            comment.fallback_position,
            Some(Position::new(6, 11).into())
        );
        assert!(Uuid::parse_str(&comment.id).is_ok());
    }

    #[test]
    fn test_apply_snap_updates_fallback() {
        let mut comment = Comment::new("Hello world", Position::new(6, 11), 32);

        let keep = comment.apply(&ValidationResult::Snap(Position::new(0, 5)));

        assert!(keep);
        assert_eq!(
            comment.fallback_position,
            Some(Position::new(0, 5).into())
        );
    }

    #[test]
    fn test_apply_delete_requests_removal() {
        let mut comment = Comment::new("Hello world", Position::new(6, 11), 32);
        let before = comment.fallback_position;

        assert!(!comment.apply(&ValidationResult::Delete));
        assert_eq!(comment.fallback_position, before);
    }

    #[test]
    fn test_reconcile_drops_deleted_and_keeps_order() {
        let original = "Hello world this is text";
        let mut comments = vec![
            Comment::new(original, Position::new(0, 5), 32),
            Comment::new(original, Position::new(6, 11), 32),
        ];
        let ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();

        // Given a document where "world" was removed but "Hello" survives
        let edited = "Hello      ";

        // When reconciling
        let results = reconcile_comments(&CommentValidator::default(), edited, &mut comments);

        // Then both results are reported but the comments snap onto "Hello"
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].comment_id, ids[0]);
        assert_eq!(results[0].result, ValidationResult::Keep(Position::new(0, 5)));
        assert_eq!(results[1].comment_id, ids[1]);
        assert_eq!(results[1].result, ValidationResult::Snap(Position::new(0, 5)));
        assert_eq!(comments.len(), 2);
        assert_eq!(
            comments[1].fallback_position,
            Some(Position::new(0, 5).into())
        );
    }

    #[test]
    fn test_reconcile_removes_comments_in_blank_document() {
        let original = "Hello world";
        let mut comments = vec![Comment::new(original, Position::new(6, 11), 32)];

        let results = reconcile_comments(&CommentValidator::default(), "     ", &mut comments);

        assert_eq!(results[0].result, ValidationResult::Delete);
        assert!(comments.is_empty());
    }

    #[test]
    fn test_validation_result_serializes_with_action_tag() {
        let keep = CommentValidation {
            comment_id: "c1".to_string(),
            result: ValidationResult::Keep(Position::new(6, 11)),
        };
        let delete = CommentValidation {
            comment_id: "c2".to_string(),
            result: ValidationResult::Delete,
        };

        assert_eq!(
            serde_json::to_value(&keep).unwrap(),
            serde_json::json!({"commentId": "c1", "action": "keep", "position": {"from": 6, "to": 11}})
        );
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            serde_json::json!({"commentId": "c2", "action": "delete"})
        );
    }
}
