//! Minimal syntax layer shared by the C# and Visual Basic front-ends.
//!
//! The analyzer does not need a full parser. Each front-end lexes the
//! source with a [`Lexer`] driven by its own token rules and then walks the
//! token stream looking for the handful of shapes the rule cares about.

mod lexer;

pub use lexer::{LexRule, Lexer};

use std::fmt;
use std::ops::Range;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed, in characters).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed, in characters).
    pub end_col: usize,
}

impl Span {
    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Byte range covered by the span.
    pub fn byte_range(&self) -> Range<usize> {
        self.start_byte..self.end_byte
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Maps byte offsets to 1-indexed line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// Line and column (both 1-indexed) of a byte offset.
    pub fn position(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let col = source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - line_start);
        (line + 1, col + 1)
    }

    /// Build a [`Span`] for a byte range.
    pub fn span(&self, source: &str, start: usize, end: usize) -> Span {
        let (start_line, start_col) = self.position(source, start);
        let (end_line, end_col) = self.position(source, end);
        Span {
            start_byte: start,
            end_byte: end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

/// Coarse token classes. Keywords are identifiers; front-ends compare text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Punct,
    /// Only emitted by grammars where line breaks end statements.
    Newline,
    /// Text no rule could match, or an unterminated literal/comment.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// A lexed compilation unit.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub source: String,
    pub tokens: Vec<Token>,
    pub line_index: LineIndex,
    /// Whether lexing hit malformed input anywhere in the file.
    pub has_errors: bool,
}

impl SyntaxTree {
    pub fn new(source: &str, tokens: Vec<Token>, has_errors: bool) -> Self {
        Self {
            source: source.to_string(),
            tokens,
            line_index: LineIndex::new(source),
            has_errors,
        }
    }

    /// Text of the token at `index`, or `""` past the end.
    pub fn text(&self, index: usize) -> &str {
        self.tokens
            .get(index)
            .map(|t| &self.source[t.start..t.end])
            .unwrap_or("")
    }

    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    /// Whether the token at `index` is the punctuation `p`.
    pub fn is_punct(&self, index: usize, p: &str) -> bool {
        self.kind(index) == Some(TokenKind::Punct) && self.text(index) == p
    }

    /// Span from the start of token `first` to the end of token `last`.
    pub fn token_span(&self, first: usize, last: usize) -> Span {
        let start = self.tokens[first].start;
        let end = self.tokens[last].end;
        self.line_index.span(&self.source, start, end)
    }

    /// Span for an arbitrary byte range.
    pub fn byte_span(&self, start: usize, end: usize) -> Span {
        self.line_index.span(&self.source, start, end)
    }

    /// Index of the bracket closing the one at `open`, honoring nesting of
    /// the same bracket pair.
    pub fn matching_close(&self, open: usize, open_p: &str, close_p: &str) -> Option<usize> {
        let mut depth = 0usize;
        for i in open..self.tokens.len() {
            if self.is_punct(i, open_p) {
                depth += 1;
            } else if self.is_punct(i, close_p) {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Index of the unmatched `open_p` enclosing token `index`, searching
    /// backwards.
    pub fn enclosing_open(&self, index: usize, open_p: &str, close_p: &str) -> Option<usize> {
        let mut depth = 0usize;
        for i in (0..index).rev() {
            if self.is_punct(i, close_p) {
                depth += 1;
            } else if self.is_punct(i, open_p) {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
        }
        None
    }

    /// Whether any token in `range` is an error token.
    pub fn has_error_in(&self, range: Range<usize>) -> bool {
        self.tokens[range.start.min(self.tokens.len())..range.end.min(self.tokens.len())]
            .iter()
            .any(|t| t.kind == TokenKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_positions() {
        let source = "ab\ncd\n\nef";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source, 0), (1, 1));
        assert_eq!(index.position(source, 1), (1, 2));
        assert_eq!(index.position(source, 3), (2, 1));
        assert_eq!(index.position(source, 7), (4, 1));
    }

    #[test]
    fn test_span_contains() {
        let source = "new int[0];";
        let index = LineIndex::new(source);
        let outer = index.span(source, 0, 10);
        let inner = index.span(source, 4, 7);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert_eq!(outer.to_string(), "1:1");
    }
}
