//! Text edits and their application.

use serde::Serialize;
use thiserror::Error;

use crate::syntax::Span;

/// Errors raised when a set of edits cannot be applied.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("edit {start}..{end} is outside the {len}-byte source")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("edits {first:?} and {second:?} overlap")]
    Overlap {
        first: (usize, usize),
        second: (usize, usize),
    },
    #[error("edit {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },
}

/// Replace the bytes `start..end` with `replacement`. An empty range is a
/// pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
    /// What the edit does, for reporting.
    pub message: String,
}

impl Edit {
    pub fn new(span: Span, replacement: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            start: span.start_byte,
            end: span.end_byte,
            replacement: replacement.into(),
            message: message.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            replacement: text.into(),
            message: message.into(),
        }
    }

    /// Whether the two edits touch the same bytes. Two insertions at one
    /// offset also conflict, since their order would be ambiguous.
    pub fn overlaps(&self, other: &Edit) -> bool {
        if self.start == other.start {
            return true;
        }
        self.start < other.end && other.start < self.end
    }
}

/// Apply non-overlapping edits to `source` in one pass, back to front.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.start, e.end));

    for edit in &sorted {
        if edit.start > edit.end || edit.end > source.len() {
            return Err(EditError::OutOfBounds {
                start: edit.start,
                end: edit.end,
                len: source.len(),
            });
        }
        if !source.is_char_boundary(edit.start) || !source.is_char_boundary(edit.end) {
            return Err(EditError::NotCharBoundary {
                start: edit.start,
                end: edit.end,
            });
        }
    }
    for pair in sorted.windows(2) {
        if pair[0].overlaps(pair[1]) {
            return Err(EditError::Overlap {
                first: (pair[0].start, pair[0].end),
                second: (pair[1].start, pair[1].end),
            });
        }
    }

    let mut result = source.to_string();
    for edit in sorted.iter().rev() {
        result.replace_range(edit.start..edit.end, &edit.replacement);
    }
    Ok(result)
}
