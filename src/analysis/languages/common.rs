//! Token-walking helpers shared by the front-ends.

use std::ops::Range;

use crate::analysis::site::{ArrayCreationSite, ArrayLevel, ExprToken, Initializer, SiteContext};
use crate::syntax::{Span, SyntaxTree, TokenKind};

/// Copy the tokens in `range` out of the tree. Line breaks inside
/// brackets are implicit continuations and are dropped.
pub(crate) fn expr_tokens(tree: &SyntaxTree, range: Range<usize>) -> Vec<ExprToken> {
    range
        .filter(|&i| tree.tokens[i].kind != TokenKind::Newline)
        .map(|i| ExprToken::new(tree.tokens[i].kind, tree.text(i)))
        .collect()
}

/// Split the tokens strictly between `open` and `close` at top-level
/// commas. An empty list yields a single empty piece.
pub(crate) fn split_commas(tree: &SyntaxTree, open: usize, close: usize) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = open + 1;
    for i in open + 1..close {
        if tree.kind(i) != Some(TokenKind::Punct) {
            continue;
        }
        match tree.text(i) {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            "," if depth == 0 => {
                pieces.push(start..i);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(start..close);
    pieces
}

/// Number of arguments in a call's argument list.
pub(crate) fn argument_count(tree: &SyntaxTree, open: usize, close: usize) -> usize {
    if (open + 1..close).all(|i| tree.kind(i) == Some(TokenKind::Newline)) {
        0
    } else {
        split_commas(tree, open, close).len()
    }
}

/// Build an array level from a bracketed dimension list.
pub(crate) fn level_between(tree: &SyntaxTree, open: usize, close: usize) -> ArrayLevel {
    let sizes: Vec<Option<Vec<ExprToken>>> = split_commas(tree, open, close)
        .into_iter()
        .map(|piece| {
            let tokens = expr_tokens(tree, piece);
            if tokens.is_empty() {
                None
            } else {
                Some(tokens)
            }
        })
        .collect();
    ArrayLevel {
        rank: sizes.len(),
        sizes,
    }
}

/// The initializer list between the braces at `open` and `close`.
pub(crate) fn initializer(tree: &SyntaxTree, open: usize, close: usize) -> Initializer {
    Initializer {
        span: tree.token_span(open, close),
        contents: expr_tokens(tree, open + 1..close),
    }
}

/// Spell type tokens back as source text. Adjacent words get one space
/// and commas are followed by one, everything else is packed.
pub(crate) fn spell_parts(parts: &[ExprToken]) -> String {
    let mut out = String::new();
    let mut prev: Option<&ExprToken> = None;
    for part in parts {
        if let Some(p) = prev {
            let p_word = matches!(p.kind, TokenKind::Ident | TokenKind::Number);
            let word = matches!(part.kind, TokenKind::Ident | TokenKind::Number);
            if (p_word && word) || p.is_punct(",") {
                out.push(' ');
            }
        }
        out.push_str(&part.text);
        prev = Some(part);
    }
    out
}

/// Mark sites that sit inside any of the attribute spans.
pub(crate) fn mark_attribute_context(sites: &mut [ArrayCreationSite], attributes: &[Span]) {
    for site in sites.iter_mut() {
        if attributes.iter().any(|a| a.contains(&site.span)) {
            site.context = SiteContext::AttributeArgument;
        }
    }
}

/// Join a run of name tokens (`System`, `.`, `Collections`) into a path.
pub(crate) fn join_name(tree: &SyntaxTree, range: Range<usize>) -> String {
    range.map(|i| tree.text(i)).collect()
}

/// A parameter array declared in the file: `params T[] xs` / `ParamArray xs As T()`.
#[derive(Debug, Clone)]
pub(crate) struct ParamArrayDecl {
    /// Name of the declaring method.
    pub name: String,
    /// Number of parameters before the parameter array.
    pub fixed: usize,
    pub element: crate::analysis::site::ElementType,
    pub levels: Vec<ArrayLevel>,
}

/// Count parameters before the token at `index` in the list opened at `open`.
pub(crate) fn params_before(tree: &SyntaxTree, open: usize, index: usize) -> usize {
    let mut depth = 0usize;
    let mut count = 0;
    for i in open + 1..index {
        if tree.kind(i) != Some(TokenKind::Punct) {
            continue;
        }
        match tree.text(i) {
            "(" | "[" | "{" | "<" => depth += 1,
            ")" | "]" | "}" | ">" => depth = depth.saturating_sub(1),
            "," if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, text: &str) -> ExprToken {
        ExprToken::new(kind, text)
    }

    #[test]
    fn test_spell_parts_spacing() {
        let parts = vec![
            tok(TokenKind::Ident, "Dictionary"),
            tok(TokenKind::Punct, "<"),
            tok(TokenKind::Ident, "string"),
            tok(TokenKind::Punct, ","),
            tok(TokenKind::Ident, "int"),
            tok(TokenKind::Punct, ">"),
        ];
        assert_eq!(spell_parts(&parts), "Dictionary<string, int>");

        let vb = vec![
            tok(TokenKind::Ident, "List"),
            tok(TokenKind::Punct, "("),
            tok(TokenKind::Ident, "Of"),
            tok(TokenKind::Ident, "Integer"),
            tok(TokenKind::Punct, ")"),
        ];
        assert_eq!(spell_parts(&vb), "List(Of Integer)");
    }
}
