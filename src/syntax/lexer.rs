//! Regex-driven lexer.

use regex::Regex;

use super::{SyntaxTree, Token, TokenKind};

/// One token rule. Rules are tried in order and the first non-empty match
/// wins, so longer or more specific patterns must come first.
pub struct LexRule {
    /// Token produced by the rule; `None` marks trivia that is dropped.
    pub kind: Option<TokenKind>,
    /// Pattern anchored with `^`.
    pub pattern: Regex,
}

impl LexRule {
    pub fn token(kind: TokenKind, pattern: &str) -> Self {
        Self {
            kind: Some(kind),
            pattern: Regex::new(pattern).expect("lexer pattern must compile"),
        }
    }

    pub fn trivia(pattern: &str) -> Self {
        Self {
            kind: None,
            pattern: Regex::new(pattern).expect("lexer pattern must compile"),
        }
    }
}

pub struct Lexer<'r> {
    rules: &'r [LexRule],
}

impl<'r> Lexer<'r> {
    pub fn new(rules: &'r [LexRule]) -> Self {
        Self { rules }
    }

    /// Tokenize `source`. Never fails: unmatched characters become
    /// [`TokenKind::Error`] tokens and mark the tree as erroneous.
    pub fn tokenize(&self, source: &str) -> SyntaxTree {
        let mut tokens = Vec::new();
        let mut has_errors = false;
        let mut pos = 0;

        while pos < source.len() {
            let rest = &source[pos..];
            let matched = self.rules.iter().find_map(|rule| {
                rule.pattern
                    .find(rest)
                    .filter(|m| m.start() == 0 && m.end() > 0)
                    .map(|m| (rule.kind, m.end()))
            });

            match matched {
                Some((kind, len)) => {
                    if let Some(kind) = kind {
                        has_errors |= kind == TokenKind::Error;
                        tokens.push(Token {
                            kind,
                            start: pos,
                            end: pos + len,
                        });
                    }
                    pos += len;
                }
                None => {
                    let len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                    has_errors = true;
                    tokens.push(Token {
                        kind: TokenKind::Error,
                        start: pos,
                        end: pos + len,
                    });
                    pos += len;
                }
            }
        }

        SyntaxTree::new(source, tokens, has_errors)
    }
}
