//! Visual Basic front-end.
//!
//! Visual Basic spells array bounds as upper bounds (`New Integer(-1) { }` is
//! empty), is case-insensitive, and ends statements at line breaks, so the
//! lexer keeps newlines as tokens.

use std::path::Path;

use lazy_static::lazy_static;

use crate::analysis::fold::{fold, parse_digits, FoldDialect};
use crate::analysis::site::{
    ArrayCreationSite, ArrayLevel, Constants, ElementType, ExprToken, GenericMethod, Import,
    Initializer, SiteContext, SiteOrigin, SizeExpr,
};
use crate::analysis::{LanguageFacts, ParsedFile};
use crate::config::Factory;
use crate::syntax::{LexRule, Lexer, Span, SyntaxTree, TokenKind};

use super::common::{
    argument_count, expr_tokens, initializer, join_name, level_between, mark_attribute_context,
    params_before, spell_parts, ParamArrayDecl,
};

lazy_static! {
    static ref RULES: Vec<LexRule> = vec![
        LexRule::trivia(r"^[ \t\r\f]+"),
        // Line continuation
        LexRule::trivia(r"^_[ \t]*\r?\n"),
        LexRule::trivia(r"^'[^\n]*"),
        LexRule::trivia(r"^(?i:rem)\b[^\n]*"),
        LexRule::token(TokenKind::Newline, r"^\n"),
        // Date literal
        LexRule::token(TokenKind::Str, r"^#[0-9][^#\n]*#"),
        // Preprocessor directives
        LexRule::trivia(r"^#[^\n]*"),
        LexRule::token(TokenKind::Str, r#"^"(?:[^"\n]|"")*"[cC]?"#),
        LexRule::token(TokenKind::Error, r#"^"[^\n]*"#),
        LexRule::token(TokenKind::Number, r"^(?i)&h[0-9a-f_]+[a-z%&]*"),
        LexRule::token(TokenKind::Number, r"^(?i)&o[0-7_]+[a-z%&]*"),
        LexRule::token(TokenKind::Number, r"^(?i)&b[01_]+[a-z%&]*"),
        LexRule::token(
            TokenKind::Number,
            r"^(?i)[0-9][0-9_]*(?:\.[0-9][0-9_]*)?(?:e[+-]?[0-9]+)?(?:us|ui|ul|s|i|l|d|f|r|%|&|@|!|#)?"
        ),
        LexRule::token(TokenKind::Ident, r"^\[[\p{L}_][\p{L}\p{N}_]*\]"),
        LexRule::token(TokenKind::Ident, r"^[\p{L}_][\p{L}\p{N}_]*"),
        LexRule::token(TokenKind::Punct, r"^[{}\[\]().,:;?<>=+\-*/\\^&!]"),
    ];
}

/// Lowercase words that can never begin a type.
const NON_TYPE_KEYWORDS: &[&str] = &[
    "new", "with", "from", "of", "as", "dim", "return", "nothing", "function", "sub", "end", "if",
    "then", "else", "byval", "byref", "optional", "paramarray", "me", "mybase", "myclass", "true",
    "false", "not", "and", "or", "andalso", "orelse", "xor", "is", "isnot", "typeof", "gettype",
    "call", "const", "private", "public", "protected", "friend", "shared", "static", "readonly",
    "class", "structure", "module", "interface", "namespace", "imports", "to", "step", "in",
    "each", "for", "next", "while", "do", "loop", "select", "case", "property", "event",
    "handles", "implements", "inherits", "redim", "preserve", "operator", "declare",
];

/// Lowercase words after which `Name(` is still a call.
const CALL_PREFIX_KEYWORDS: &[&str] = &[
    "call", "return", "then", "else", "await", "not", "and", "or", "andalso", "orelse", "xor",
    "in", "to", "is", "isnot", "do", "while", "until", "case",
];

/// Lowercase declaration keywords whose parenthesized list after the name is
/// a parameter list, not an array bound.
const MEMBER_KEYWORDS: &[&str] = &["property", "function", "sub", "event", "operator"];

/// Lowercase conversion functions that keep an integral value unchanged.
const CONVERSIONS: &[&str] = &[
    "cbyte", "csbyte", "cshort", "cushort", "cint", "cuint", "clng", "culng", "ctype",
    "directcast",
];

/// Language facts for Visual Basic.
pub struct BasicFacts;

impl BasicFacts {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BasicFacts {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldDialect for BasicFacts {
    fn integer_literal(&self, text: &str) -> Option<i128> {
        let lower = text.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix('&') {
            let (radix, digits) = match rest.chars().next()? {
                'h' => (16, &rest[1..]),
                'o' => (8, &rest[1..]),
                'b' => (2, &rest[1..]),
                _ => return None,
            };
            return parse_digits(digits.trim_end_matches(['u', 's', 'i', 'l', '%', '&']), radix);
        }
        // Floating-point and decimal type characters.
        if lower.ends_with(['d', 'f', 'r', '@', '!', '#']) {
            return None;
        }
        parse_digits(lower.trim_end_matches(['u', 's', 'i', 'l', '%', '&']), 10)
    }

    fn prefix_cast(&self, _tokens: &[ExprToken]) -> Option<usize> {
        None
    }

    fn is_conversion(&self, name: &str) -> bool {
        CONVERSIONS.contains(&name.to_ascii_lowercase().as_str())
    }
}

impl LanguageFacts for BasicFacts {
    fn language_id(&self) -> &'static str {
        "vb"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["vb"]
    }

    fn parse(&self, path: &Path, source: &str) -> ParsedFile {
        let tree = Lexer::new(&RULES).tokenize(source);
        let (sites, imports, constants, generic_methods) = {
            let scanner = Scanner { tree: &tree };
            let param_arrays = scanner.param_arrays();
            let mut sites = Vec::new();
            for i in 0..tree.tokens.len() {
                if let Some(site) = scanner.creation_at(i) {
                    sites.push(site);
                }
                if let Some(site) = scanner.declaration_at(i) {
                    sites.push(site);
                }
                if let Some(site) = scanner.param_array_call_at(i, &param_arrays) {
                    sites.push(site);
                }
            }
            mark_attribute_context(&mut sites, &scanner.attribute_spans());
            sites.sort_by_key(|s| (s.span.start_byte, s.span.end_byte));
            (
                sites,
                scanner.imports(),
                scanner.constants(),
                scanner.generic_methods(),
            )
        };

        ParsedFile {
            path: path.to_string_lossy().to_string(),
            tree,
            sites,
            imports,
            constants,
            generic_methods,
        }
    }

    /// A bound is either `upper` or `0 To upper`; the length is `upper + 1`.
    fn dimension_length(&self, size: &SizeExpr, constants: &Constants) -> Option<i128> {
        let to = size
            .iter()
            .position(|t| t.kind == TokenKind::Ident && t.text.eq_ignore_ascii_case("to"));
        let upper = match to {
            Some(to) => {
                if fold(&size[..to], self, constants)? != 0 {
                    return None;
                }
                fold(&size[to + 1..], self, constants)?
            }
            None => fold(size, self, constants)?,
        };
        upper.checked_add(1).filter(|len| *len >= 0)
    }

    fn render_invocation(&self, qualifier: Option<&str>, factory: &Factory, type_argument: &str) -> String {
        match qualifier {
            Some(q) => format!(
                "{}.{}.{}(Of {})()",
                q, factory.type_name, factory.method, type_argument
            ),
            None => format!(
                "{}.{}(Of {})()",
                factory.type_name, factory.method, type_argument
            ),
        }
    }

    fn rank_suffix(&self, rank: usize) -> String {
        format!("({})", ",".repeat(rank.saturating_sub(1)))
    }

    fn spell_type(&self, element: &ElementType) -> Option<String> {
        if element.is_pointer || !element.resolved {
            return None;
        }
        Some(spell_parts(&element.parts))
    }

    fn names_equal(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}

/// Drop a leading `Global.` qualifier.
fn strip_global(name: String) -> String {
    match name.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("global.") => name[7..].to_string(),
        _ => name,
    }
}

struct TypeSyntax {
    start: usize,
    /// One past the element type, before any bounds.
    base_end: usize,
    levels: Vec<ArrayLevel>,
    end: usize,
}

struct Scanner<'t> {
    tree: &'t SyntaxTree,
}

impl<'t> Scanner<'t> {
    fn is_ident(&self, i: usize) -> bool {
        self.tree.kind(i) == Some(TokenKind::Ident)
    }

    /// Whether token `i` is the keyword `word` (given in lowercase).
    fn kw(&self, i: usize, word: &str) -> bool {
        self.is_ident(i) && self.tree.text(i).eq_ignore_ascii_case(word)
    }

    fn lower(&self, i: usize) -> String {
        self.tree.text(i).to_ascii_lowercase()
    }

    /// Whether token `i` begins a statement.
    fn at_statement_start(&self, i: usize) -> bool {
        i == 0 || self.tree.kind(i - 1) == Some(TokenKind::Newline) || self.tree.is_punct(i - 1, ":")
    }

    /// `(Of ...)` starting at `open`.
    fn is_type_arguments(&self, open: usize) -> bool {
        self.tree.is_punct(open, "(") && self.kw(open + 1, "of")
    }

    fn parse_type(&self, start: usize) -> Option<TypeSyntax> {
        let t = self.tree;
        let mut i = start;
        loop {
            if !self.is_ident(i) || NON_TYPE_KEYWORDS.contains(&self.lower(i).as_str()) {
                return None;
            }
            i += 1;
            if self.is_type_arguments(i) {
                i = t.matching_close(i, "(", ")")? + 1;
            }
            if t.is_punct(i, ".") && self.is_ident(i + 1) {
                i += 1;
            } else {
                break;
            }
        }
        if t.is_punct(i, "?") {
            i += 1;
        }
        let base_end = i;

        let mut levels = Vec::new();
        while t.is_punct(i, "(") && !self.is_type_arguments(i) {
            let close = t.matching_close(i, "(", ")")?;
            levels.push(level_between(t, i, close));
            i = close + 1;
        }

        Some(TypeSyntax {
            start,
            base_end,
            levels,
            end: i,
        })
    }

    fn element(&self, ty: &TypeSyntax) -> ElementType {
        ElementType::new(expr_tokens(self.tree, ty.start..ty.base_end), false)
    }

    /// `New T(bound) { }`. Without the braces `New C(x)` is a constructor call.
    fn creation_at(&self, i: usize) -> Option<ArrayCreationSite> {
        let t = self.tree;
        if !self.kw(i, "new") {
            return None;
        }
        let ty = self.parse_type(i + 1)?;
        if ty.levels.is_empty() || !t.is_punct(ty.end, "{") {
            return None;
        }
        let close = t.matching_close(ty.end, "{", "}")?;

        let mut element = self.element(&ty);
        if t.has_error_in(i..close + 1) {
            element.resolved = false;
        }
        let malformed = ty.levels[1..].iter().any(ArrayLevel::has_sizes);

        Some(ArrayCreationSite {
            span: t.token_span(i, close),
            origin: SiteOrigin::Explicit,
            context: SiteContext::Code,
            element,
            levels: ty.levels,
            initializer: Some(initializer(t, ty.end, close)),
            malformed,
        })
    }

    /// Bounds written on a declared name: `arr()` in `Dim arr() As Integer`.
    fn name_levels(&self, as_index: usize) -> Option<Vec<ArrayLevel>> {
        let t = self.tree;
        let mut levels = Vec::new();
        let mut end = as_index;
        while end > 0 && t.is_punct(end - 1, ")") {
            let open = t.enclosing_open(end - 1, "(", ")")?;
            levels.push(level_between(t, open, end - 1));
            end = open;
        }
        if levels.is_empty() {
            return Some(levels);
        }
        let name = end.checked_sub(1).filter(|&n| self.is_ident(n))?;
        if name > 0 && MEMBER_KEYWORDS.contains(&self.lower(name - 1).as_str()) {
            return Some(Vec::new());
        }
        levels.reverse();
        Some(levels)
    }

    /// `Dim arr As Integer() = { }`.
    fn declaration_at(&self, i: usize) -> Option<ArrayCreationSite> {
        let t = self.tree;
        if !self.kw(i, "as") || self.kw(i + 1, "new") {
            return None;
        }
        let ty = self.parse_type(i + 1)?;
        if !t.is_punct(ty.end, "=") {
            return None;
        }
        // Implicit continuation after `=`
        let mut open = ty.end + 1;
        while t.kind(open) == Some(TokenKind::Newline) {
            open += 1;
        }
        if !t.is_punct(open, "{") {
            return None;
        }
        let mut levels = self.name_levels(i)?;
        levels.extend(ty.levels.iter().cloned());
        if levels.is_empty() || levels.iter().any(ArrayLevel::has_sizes) {
            return None;
        }

        let close = t.matching_close(open, "{", "}")?;
        let mut element = self.element(&ty);
        if t.has_error_in(open..close + 1) {
            element.resolved = false;
        }

        Some(ArrayCreationSite {
            span: t.token_span(open, close),
            origin: SiteOrigin::ImplicitInitializer,
            context: SiteContext::Code,
            element,
            levels,
            initializer: Some(initializer(t, open, close)),
            malformed: false,
        })
    }

    /// Methods declaring a `ParamArray` parameter.
    fn param_arrays(&self) -> Vec<ParamArrayDecl> {
        let t = self.tree;
        (0..t.tokens.len())
            .filter(|&i| self.kw(i, "paramarray"))
            .filter_map(|i| {
                let open = t.enclosing_open(i, "(", ")")?;
                let name = open.checked_sub(1).filter(|&n| self.is_ident(n))?;

                // ParamArray args() As T / ParamArray args As T()
                let mut pos = i + 2;
                let mut levels = Vec::new();
                while t.is_punct(pos, "(") {
                    let close = t.matching_close(pos, "(", ")")?;
                    levels.push(level_between(t, pos, close));
                    pos = close + 1;
                }
                if !self.kw(pos, "as") {
                    return None;
                }
                let ty = self.parse_type(pos + 1)?;
                levels.extend(ty.levels.iter().cloned());
                if levels.is_empty() {
                    return None;
                }
                Some(ParamArrayDecl {
                    name: t.text(name).to_string(),
                    fixed: params_before(t, open, i),
                    element: self.element(&ty),
                    levels,
                })
            })
            .collect()
    }

    /// `F()` where `F` takes a `ParamArray` and nothing is passed for it.
    fn param_array_call_at(&self, i: usize, decls: &[ParamArrayDecl]) -> Option<ArrayCreationSite> {
        let t = self.tree;
        if decls.is_empty() || !self.is_ident(i) || !t.is_punct(i + 1, "(") {
            return None;
        }
        if i > 0 && self.is_ident(i - 1) && !CALL_PREFIX_KEYWORDS.contains(&self.lower(i - 1).as_str()) {
            return None;
        }
        let close = t.matching_close(i + 1, "(", ")")?;
        if (i + 2..close).any(|k| self.kw(k, "paramarray")) {
            return None;
        }
        let args = argument_count(t, i + 1, close);
        let decl = decls
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(t.text(i)) && d.fixed == args)?;

        let insert_at = t.tokens[close].start;
        Some(ArrayCreationSite {
            span: t.token_span(i, close),
            origin: SiteOrigin::ParamArray {
                insert_at,
                needs_separator: args > 0,
            },
            context: SiteContext::Code,
            element: decl.element.clone(),
            levels: decl.levels.clone(),
            initializer: Some(Initializer {
                span: t.byte_span(insert_at, insert_at),
                contents: Vec::new(),
            }),
            malformed: false,
        })
    }

    /// Attribute blocks: `<Obsolete>` before a declaration or parameter.
    fn attribute_spans(&self) -> Vec<Span> {
        let t = self.tree;
        let mut spans = Vec::new();
        for i in 0..t.tokens.len() {
            if !t.is_punct(i, "<") || !self.is_ident(i + 1) {
                continue;
            }
            let close = match self.attribute_close(i) {
                Some(close) => close,
                None => continue,
            };
            let is_attribute = self.at_statement_start(i)
                || ((t.is_punct(i.saturating_sub(1), "(") || t.is_punct(i.saturating_sub(1), ","))
                    && i > 0
                    && self.is_ident(close + 1));
            if is_attribute {
                spans.push(t.token_span(i, close));
            }
        }
        spans
    }

    /// The `>` closing an attribute block opened at `open`, on the same
    /// logical line.
    fn attribute_close(&self, open: usize) -> Option<usize> {
        let t = self.tree;
        let mut depth = 0usize;
        for i in open + 1..t.tokens.len() {
            match t.kind(i)? {
                TokenKind::Newline => return None,
                TokenKind::Punct => match t.text(i) {
                    "(" | "{" => depth += 1,
                    ")" | "}" => depth = depth.saturating_sub(1),
                    ">" if depth == 0 => return Some(i),
                    _ => {}
                },
                _ => {}
            }
        }
        None
    }

    /// `Imports X.Y, A = X.Z` statements.
    fn imports(&self) -> Vec<Import> {
        let t = self.tree;
        let mut imports = Vec::new();
        for i in 0..t.tokens.len() {
            if !self.kw(i, "imports") || !self.at_statement_start(i) {
                continue;
            }
            let mut j = i + 1;
            loop {
                let clause_start = j;
                if t.is_punct(j, "<") {
                    // XML namespace import
                    while j < t.tokens.len() && !t.is_punct(j, ">") {
                        j += 1;
                    }
                    j += 1;
                } else {
                    let mut alias = None;
                    if self.is_ident(j) && t.is_punct(j + 1, "=") {
                        alias = Some(t.text(j).to_string());
                        j += 2;
                    }
                    let start = j;
                    while self.is_ident(j) || t.is_punct(j, ".") {
                        j += 1;
                    }
                    if self.is_type_arguments(j) {
                        j = match t.matching_close(j, "(", ")") {
                            Some(close) => close + 1,
                            None => break,
                        };
                    }
                    if j > start {
                        let path = strip_global(join_name(t, start..j));
                        imports.push(Import {
                            path,
                            alias,
                            span: t.token_span(clause_start, j - 1),
                        });
                    }
                }
                if !t.is_punct(j, ",") {
                    break;
                }
                j += 1;
            }
        }
        imports
    }

    /// `Const Zero As Integer = 0, One = 1`
    fn constants(&self) -> Constants {
        let t = self.tree;
        let mut constants = Constants::new(false);
        for i in 0..t.tokens.len() {
            if !self.kw(i, "const") {
                continue;
            }
            let mut pos = i + 1;
            while self.is_ident(pos) {
                let name = t.text(pos);
                let mut eq = pos + 1;
                while eq < t.tokens.len()
                    && !t.is_punct(eq, "=")
                    && t.kind(eq) != Some(TokenKind::Newline)
                {
                    eq += 1;
                }
                if !t.is_punct(eq, "=") {
                    break;
                }
                let value_start = eq + 1;
                let mut end = value_start;
                let mut depth = 0usize;
                while end < t.tokens.len() && t.kind(end) != Some(TokenKind::Newline) {
                    if t.is_punct(end, "(") {
                        depth += 1;
                    } else if t.is_punct(end, ")") {
                        depth = depth.saturating_sub(1);
                    } else if depth == 0 && (t.is_punct(end, ",") || t.is_punct(end, ":")) {
                        break;
                    }
                    end += 1;
                }
                constants.insert(name, expr_tokens(t, value_start..end));
                if !t.is_punct(end, ",") {
                    break;
                }
                pos = end + 1;
            }
        }
        constants
    }

    /// Generic `Function`/`Sub` declarations inside a class or module.
    fn generic_methods(&self) -> Vec<GenericMethod> {
        enum Scope {
            Namespace(String),
            Type(String),
        }

        let t = self.tree;
        let mut methods = Vec::new();
        let mut stack: Vec<Scope> = Vec::new();

        for i in 0..t.tokens.len() {
            if !self.is_ident(i) {
                continue;
            }
            let prev = if i > 0 { self.lower(i - 1) } else { String::new() };
            match self.lower(i).as_str() {
                "namespace" if prev == "end" => {
                    while let Some(scope) = stack.pop() {
                        if matches!(scope, Scope::Namespace(_)) {
                            break;
                        }
                    }
                }
                "class" | "structure" | "module" | "interface" if prev == "end" => {
                    while let Some(scope) = stack.pop() {
                        if matches!(scope, Scope::Type(_)) {
                            break;
                        }
                    }
                }
                "namespace" => {
                    let start = i + 1;
                    let mut end = start;
                    while self.is_ident(end) || t.is_punct(end, ".") {
                        end += 1;
                    }
                    let name = strip_global(join_name(t, start..end));
                    stack.push(Scope::Namespace(name));
                }
                "class" | "structure" | "module" | "interface"
                    if self.is_ident(i + 1) && prev != "as" && !t.is_punct(i.saturating_sub(1), ".") =>
                {
                    stack.push(Scope::Type(t.text(i + 1).to_string()));
                }
                "function" | "sub"
                    if !matches!(prev.as_str(), "end" | "exit" | "declare")
                        && self.is_ident(i + 1)
                        && self.is_type_arguments(i + 2) =>
                {
                    let type_name = stack.iter().rev().find_map(|s| match s {
                        Scope::Type(name) => Some(name.clone()),
                        _ => None,
                    });
                    let type_name = match type_name {
                        Some(type_name) => type_name,
                        None => continue,
                    };
                    let namespace = stack
                        .iter()
                        .filter_map(|s| match s {
                            Scope::Namespace(ns) => Some(ns.as_str()),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join(".");
                    methods.push(GenericMethod {
                        namespace,
                        type_name,
                        method: t.text(i + 1).to_string(),
                    });
                }
                _ => {}
            }
        }
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedFile {
        BasicFacts::new().parse(Path::new("Test.vb"), source)
    }

    fn tok(kind: TokenKind, text: &str) -> ExprToken {
        ExprToken::new(kind, text)
    }

    #[test]
    fn test_creation_requires_initializer() {
        let parsed = parse("Dim a = New Integer(-1) { }\nDim c = New C(-1)\n");
        assert_eq!(parsed.sites.len(), 1);
        assert_eq!(parsed.sites[0].origin, SiteOrigin::Explicit);
        assert_eq!(parsed.sites[0].span.start_col, 9);
    }

    #[test]
    fn test_upper_bound_lengths() {
        let facts = BasicFacts::new();
        let constants = Constants::new(false);
        let minus_one = vec![tok(TokenKind::Punct, "-"), tok(TokenKind::Number, "1")];
        assert_eq!(facts.dimension_length(&minus_one, &constants), Some(0));

        let zero = vec![tok(TokenKind::Number, "0")];
        assert_eq!(facts.dimension_length(&zero, &constants), Some(1));

        let range = vec![
            tok(TokenKind::Number, "0"),
            tok(TokenKind::Ident, "To"),
            tok(TokenKind::Punct, "-"),
            tok(TokenKind::Number, "1"),
        ];
        assert_eq!(facts.dimension_length(&range, &constants), Some(0));

        let minus_two = vec![tok(TokenKind::Punct, "-"), tok(TokenKind::Number, "2")];
        assert_eq!(facts.dimension_length(&minus_two, &constants), None);
    }

    #[test]
    fn test_integer_literals() {
        let facts = BasicFacts::new();
        assert_eq!(facts.integer_literal("0"), Some(0));
        assert_eq!(facts.integer_literal("0L"), Some(0));
        assert_eq!(facts.integer_literal("0US"), Some(0));
        assert_eq!(facts.integer_literal("&HFF"), Some(255));
        assert_eq!(facts.integer_literal("&O17"), Some(15));
        assert_eq!(facts.integer_literal("0D"), None);
        assert_eq!(facts.integer_literal("0#"), None);
        assert!(facts.is_conversion("CLng"));
        assert!(facts.is_conversion("ctype"));
    }

    #[test]
    fn test_implicit_declaration_with_name_bounds() {
        let parsed = parse("Dim a() As Integer = { }\nDim b As Byte()() = { }\nDim c As Integer = 0\n");
        assert_eq!(parsed.sites.len(), 2);
        assert_eq!(parsed.sites[0].levels.len(), 1);
        assert_eq!(parsed.sites[1].levels.len(), 2);
        assert!(parsed
            .sites
            .iter()
            .all(|s| s.origin == SiteOrigin::ImplicitInitializer));
    }

    #[test]
    fn test_property_parameters_are_not_bounds() {
        let parsed = parse("Property P() As Integer = { }\n");
        assert!(parsed.sites.is_empty());
    }

    #[test]
    fn test_collection_initializer_is_not_a_site() {
        let parsed = parse("Dim list As List(Of Integer) = New List(Of Integer) From { }\n");
        assert!(parsed.sites.is_empty());
    }

    #[test]
    fn test_attribute_context() {
        let parsed = parse(
            "<System.Runtime.CompilerServices.Dynamic(new Boolean(-1) {})> _\nClass C\nEnd Class\n",
        );
        assert_eq!(parsed.sites.len(), 1);
        assert_eq!(parsed.sites[0].context, SiteContext::AttributeArgument);
    }

    #[test]
    fn test_comparison_is_not_an_attribute() {
        let parsed = parse("If a < b Then x = New Integer(-1) { }\n");
        assert_eq!(parsed.sites.len(), 1);
        assert_eq!(parsed.sites[0].context, SiteContext::Code);
    }

    #[test]
    fn test_imports() {
        let parsed = parse("Imports System\r\nImports IO = System.IO, System.Linq\nImports <xmlns:a=\"x\">\n");
        let paths: Vec<_> = parsed.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["System", "System.IO", "System.Linq"]);
        let facts = BasicFacts::new();
        assert!(facts.imports_namespace(&parsed, "system"));
        assert!(!facts.imports_namespace(&parsed, "System.IO"));
    }

    #[test]
    fn test_constants_are_case_insensitive() {
        let parsed = parse("Const Last As Integer = -1\n");
        let facts = BasicFacts::new();
        let size = vec![tok(TokenKind::Ident, "LAST")];
        assert_eq!(facts.dimension_length(&size, &parsed.constants), Some(0));
    }

    #[test]
    fn test_declares_factory() {
        let parsed = parse(
            "Namespace System\n    Public Class Array\n       Public Shared Function Empty(Of T)() As T()\n           Return Nothing\n       End Function\n    End Class\nEnd Namespace\n",
        );
        assert_eq!(
            parsed.generic_methods,
            vec![GenericMethod {
                namespace: "System".to_string(),
                type_name: "Array".to_string(),
                method: "Empty".to_string(),
            }]
        );
        assert!(BasicFacts::new().declares_factory(&parsed, &Factory::default()));
    }

    #[test]
    fn test_param_array_call() {
        let parsed = parse(
            "Class C\n    Private Sub F(ParamArray args As String())\n    End Sub\n\nPrivate Sub G()\n        F()\n    End Sub\nEnd Class\n",
        );
        assert_eq!(parsed.sites.len(), 1);
        let site = &parsed.sites[0];
        assert!(site.origin.is_compiler_generated());
        assert_eq!(site.span.start_line, 6);
        assert_eq!(spell_parts(&site.element.parts), "String");
    }

    #[test]
    fn test_render_invocation() {
        let facts = BasicFacts::new();
        let factory = Factory::default();
        assert_eq!(
            facts.render_invocation(None, &factory, "Integer()"),
            "Array.Empty(Of Integer())()"
        );
        assert_eq!(
            facts.render_invocation(Some("System"), &factory, "Byte"),
            "System.Array.Empty(Of Byte)()"
        );
        assert_eq!(facts.rank_suffix(2), "(,)");
    }

    #[test]
    fn test_line_continuation_and_comments() {
        let parsed = parse("Dim a As Integer() = _\n    { } ' trailing\nREM whole line\n");
        assert_eq!(parsed.sites.len(), 1);
        assert!(!parsed.has_errors());
    }
}
