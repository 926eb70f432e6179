//! C# front-end.

use std::path::Path;

use lazy_static::lazy_static;

use crate::analysis::fold::{fold, parse_digits, FoldDialect};
use crate::analysis::site::{
    ArrayCreationSite, ArrayLevel, Constants, ElementType, ExprToken, GenericMethod, Import,
    SiteContext, SiteOrigin, SizeExpr,
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
        LexRule::trivia(r"^\s+"),
        LexRule::trivia(r"^//[^\n]*"),
        LexRule::trivia(r"^/\*(?s:.*?)\*/"),
        LexRule::token(TokenKind::Error, r"^/\*(?s:.*)"),
        // Preprocessor directives
        LexRule::trivia(r"^#[^\n]*"),
        LexRule::token(TokenKind::Str, r#"^(?:\$@|@\$|@)"(?:[^"]|"")*""#),
        LexRule::token(TokenKind::Str, r#"^\$?"(?:[^"\\\n]|\\.)*""#),
        LexRule::token(TokenKind::Str, r"^'(?:[^'\\\n]|\\.)+'"),
        LexRule::token(TokenKind::Error, r#"^(?:\$|@)*["'][^\n]*"#),
        LexRule::token(TokenKind::Number, r"^0[xX][0-9a-fA-F_]+[uUlL]*"),
        LexRule::token(TokenKind::Number, r"^0[bB][01_]+[uUlL]*"),
        LexRule::token(
            TokenKind::Number,
            r"^[0-9][0-9_]*(?:\.[0-9][0-9_]*)?(?:[eE][+-]?[0-9]+)?[uUlLfFdDmM]*"
        ),
        LexRule::token(TokenKind::Ident, r"^@?[\p{L}_][\p{L}\p{N}_]*"),
        LexRule::token(TokenKind::Punct, r"^[{}\[\]().,;:?<>=+\-*/%&|^!~]"),
    ];
}

/// Words that can never begin a type.
const NON_TYPE_KEYWORDS: &[&str] = &[
    "new", "return", "this", "base", "typeof", "sizeof", "nameof", "default", "null", "true",
    "false", "await", "throw", "is", "as", "in", "out", "ref", "stackalloc", "checked",
    "unchecked", "case", "goto", "yield", "else", "using", "namespace", "class", "struct",
    "interface", "enum", "record", "delegate", "public", "private", "protected", "internal",
    "static", "readonly", "const", "params", "operator", "implicit", "explicit", "where", "if",
    "while", "for", "foreach", "do", "switch", "lock", "fixed", "unsafe", "try", "catch",
    "finally", "break", "continue", "abstract", "virtual", "override", "sealed", "extern",
    "volatile", "async", "partial", "event", "global",
];

/// Words after which an identifier followed by `(` is still a call.
const CALL_PREFIX_KEYWORDS: &[&str] = &["return", "await", "throw", "else", "in", "yield"];

/// Type keywords accepted in a numeric cast such as `(long)0`.
const INTEGRAL_TYPES: &[&str] = &[
    "sbyte", "byte", "short", "ushort", "int", "uint", "long", "ulong", "nint", "nuint", "SByte",
    "Byte", "Int16", "UInt16", "Int32", "UInt32", "Int64", "UInt64", "IntPtr", "UIntPtr",
];

/// Language facts for C#.
pub struct CSharpFacts;

impl CSharpFacts {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CSharpFacts {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldDialect for CSharpFacts {
    fn integer_literal(&self, text: &str) -> Option<i128> {
        let lower = text.to_ascii_lowercase();
        let body = lower.trim_end_matches(['u', 'l']);
        if let Some(hex) = body.strip_prefix("0x") {
            parse_digits(hex, 16)
        } else if let Some(bin) = body.strip_prefix("0b") {
            parse_digits(bin, 2)
        } else {
            parse_digits(body, 10)
        }
    }

    fn prefix_cast(&self, tokens: &[ExprToken]) -> Option<usize> {
        if !tokens.first()?.is_punct("(") {
            return None;
        }
        // (long) / (System.Int64)
        let mut i = 1;
        let mut last = None;
        while let Some(token) = tokens.get(i) {
            if token.kind != TokenKind::Ident {
                return None;
            }
            last = Some(token.text.as_str());
            i += 1;
            if tokens.get(i).map(|t| t.is_punct(".")).unwrap_or(false) {
                i += 1;
            } else {
                break;
            }
        }
        let ty = last?;
        if !INTEGRAL_TYPES.contains(&ty) || !tokens.get(i)?.is_punct(")") {
            return None;
        }
        // A cast needs an operand.
        tokens.get(i + 1)?;
        Some(i + 1)
    }

    fn is_conversion(&self, name: &str) -> bool {
        matches!(name, "checked" | "unchecked")
    }
}

impl LanguageFacts for CSharpFacts {
    fn language_id(&self) -> &'static str {
        "csharp"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["cs"]
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
                sites.extend(scanner.declarations_at(i));
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

    fn dimension_length(&self, size: &SizeExpr, constants: &Constants) -> Option<i128> {
        fold(size, self, constants).filter(|len| *len >= 0)
    }

    fn render_invocation(&self, qualifier: Option<&str>, factory: &Factory, type_argument: &str) -> String {
        match qualifier {
            Some(q) => format!(
                "{}.{}.{}<{}>()",
                q, factory.type_name, factory.method, type_argument
            ),
            None => format!("{}.{}<{}>()", factory.type_name, factory.method, type_argument),
        }
    }

    fn rank_suffix(&self, rank: usize) -> String {
        format!("[{}]", ",".repeat(rank.saturating_sub(1)))
    }

    fn spell_type(&self, element: &ElementType) -> Option<String> {
        if element.is_pointer || !element.resolved {
            return None;
        }
        Some(spell_parts(&element.parts))
    }
}

/// A type reference found in the token stream.
struct TypeSyntax {
    /// First token of the type.
    start: usize,
    /// One past the last token of the element type (before any `[`).
    base_end: usize,
    is_pointer: bool,
    levels: Vec<ArrayLevel>,
    /// One past the last token of the whole type.
    end: usize,
}

struct Scanner<'t> {
    tree: &'t SyntaxTree,
}

impl<'t> Scanner<'t> {
    fn is_ident(&self, i: usize) -> bool {
        self.tree.kind(i) == Some(TokenKind::Ident)
    }

    fn prev_text(&self, i: usize) -> Option<&'t str> {
        if i == 0 {
            None
        } else {
            Some(self.tree.text(i - 1))
        }
    }

    /// Close of a generic argument list opened at `open`, if the contents
    /// look like type arguments.
    fn generic_close(&self, open: usize) -> Option<usize> {
        let t = self.tree;
        let mut depth = 0usize;
        for i in open..t.tokens.len() {
            match t.kind(i)? {
                TokenKind::Ident => {}
                TokenKind::Punct => match t.text(i) {
                    "<" => depth += 1,
                    ">" => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(i);
                        }
                    }
                    "," | "." | "?" | "[" | "]" | "(" | ")" | "*" | ":" => {}
                    _ => return None,
                },
                _ => return None,
            }
        }
        None
    }

    fn parse_type(&self, start: usize) -> Option<TypeSyntax> {
        let t = self.tree;
        let mut i = start;
        if t.is_punct(i, "(") {
            // Tuple type
            i = t.matching_close(i, "(", ")")? + 1;
        } else {
            loop {
                if !self.is_ident(i) || NON_TYPE_KEYWORDS.contains(&t.text(i)) {
                    // `global::` is the one keyword allowed in a type name.
                    if !(t.text(i) == "global" && t.is_punct(i + 1, ":")) {
                        return None;
                    }
                }
                i += 1;
                if t.is_punct(i, "<") {
                    i = self.generic_close(i)? + 1;
                }
                if t.is_punct(i, ".") && self.is_ident(i + 1) {
                    i += 1;
                } else if t.is_punct(i, ":") && t.is_punct(i + 1, ":") && self.is_ident(i + 2) {
                    i += 2;
                } else {
                    break;
                }
            }
        }

        let mut is_pointer = false;
        while t.is_punct(i, "?") || t.is_punct(i, "*") {
            is_pointer |= t.is_punct(i, "*");
            i += 1;
        }
        let base_end = i;

        let mut levels = Vec::new();
        while t.is_punct(i, "[") {
            let close = t.matching_close(i, "[", "]")?;
            levels.push(level_between(t, i, close));
            i = close + 1;
        }

        Some(TypeSyntax {
            start,
            base_end,
            is_pointer,
            levels,
            end: i,
        })
    }

    fn element(&self, ty: &TypeSyntax) -> ElementType {
        ElementType::new(expr_tokens(self.tree, ty.start..ty.base_end), ty.is_pointer)
    }

    /// `new T[n]`, `new T[] { }`, `new[] { }`.
    fn creation_at(&self, i: usize) -> Option<ArrayCreationSite> {
        let t = self.tree;
        if !self.is_ident(i) || t.text(i) != "new" {
            return None;
        }
        let next = i + 1;

        if t.is_punct(next, "[") {
            // Implicitly typed: new[] { ... }
            let close = t.matching_close(next, "[", "]")?;
            let level = level_between(t, next, close);
            if level.has_sizes() || !t.is_punct(close + 1, "{") {
                return None;
            }
            let init_close = t.matching_close(close + 1, "{", "}")?;
            return Some(ArrayCreationSite {
                span: t.token_span(i, init_close),
                origin: SiteOrigin::Explicit,
                context: SiteContext::Code,
                element: ElementType::unresolved(),
                levels: vec![level],
                initializer: Some(initializer(t, close + 1, init_close)),
                malformed: false,
            });
        }

        let ty = self.parse_type(next)?;
        if ty.levels.is_empty() {
            return None;
        }
        let mut last = ty.end - 1;
        let init = if t.is_punct(ty.end, "{") {
            let close = t.matching_close(ty.end, "{", "}")?;
            last = close;
            Some(initializer(t, ty.end, close))
        } else {
            None
        };

        let mut element = self.element(&ty);
        if t.has_error_in(i..last + 1) {
            element.resolved = false;
        }
        let malformed = ty.levels[1..].iter().any(ArrayLevel::has_sizes);

        Some(ArrayCreationSite {
            span: t.token_span(i, last),
            origin: SiteOrigin::Explicit,
            context: SiteContext::Code,
            element,
            levels: ty.levels,
            initializer: init,
            malformed,
        })
    }

    /// `T[] a = { }, b = { };` and collection expressions `T[] c = [];`.
    fn declarations_at(&self, i: usize) -> Vec<ArrayCreationSite> {
        let t = self.tree;
        let mut sites = Vec::new();
        if matches!(self.prev_text(i), Some(".") | Some("new") | Some(":")) {
            return sites;
        }
        let ty = match self.parse_type(i) {
            Some(ty) if !ty.levels.is_empty() && !ty.levels.iter().any(ArrayLevel::has_sizes) => ty,
            _ => return sites,
        };
        let element = self.element(&ty);

        let mut pos = ty.end;
        // Nullable array annotation: `int[]? xs`
        if t.is_punct(pos, "?") && self.is_ident(pos + 1) {
            pos += 1;
        }
        while self.is_ident(pos) {
            let brackets = if t.is_punct(pos + 2, "{") {
                Some(("{", "}"))
            } else if t.is_punct(pos + 2, "[") {
                Some(("[", "]"))
            } else {
                None
            };
            if let (true, Some((open_p, close_p))) = (t.is_punct(pos + 1, "="), brackets) {
                let open = pos + 2;
                let close = match t.matching_close(open, open_p, close_p) {
                    Some(close) => close,
                    None => break,
                };
                let mut element = element.clone();
                if t.has_error_in(open..close + 1) {
                    element.resolved = false;
                }
                sites.push(ArrayCreationSite {
                    span: t.token_span(open, close),
                    origin: SiteOrigin::ImplicitInitializer,
                    context: SiteContext::Code,
                    element,
                    levels: ty.levels.clone(),
                    initializer: Some(initializer(t, open, close)),
                    malformed: false,
                });
                pos = close + 1;
            } else if t.is_punct(pos + 1, ",") || t.is_punct(pos + 1, ";") {
                pos += 1;
            } else {
                break;
            }
            if !t.is_punct(pos, ",") {
                break;
            }
            pos += 1;
        }
        sites
    }

    /// Methods declaring a trailing `params` array.
    fn param_arrays(&self) -> Vec<ParamArrayDecl> {
        let t = self.tree;
        (0..t.tokens.len())
            .filter(|&i| self.is_ident(i) && t.text(i) == "params")
            .filter_map(|i| {
                let open = t.enclosing_open(i, "(", ")")?;
                let name = open.checked_sub(1).filter(|&n| self.is_ident(n))?;
                let ty = self.parse_type(i + 1)?;
                if ty.levels.is_empty() {
                    return None;
                }
                Some(ParamArrayDecl {
                    name: t.text(name).to_string(),
                    fixed: params_before(t, open, i),
                    element: self.element(&ty),
                    levels: ty.levels,
                })
            })
            .collect()
    }

    /// `F()` where `F` takes a parameter array and no variadic argument is
    /// passed: the compiler allocates an empty array here.
    fn param_array_call_at(&self, i: usize, decls: &[ParamArrayDecl]) -> Option<ArrayCreationSite> {
        let t = self.tree;
        if decls.is_empty() || !self.is_ident(i) || !t.is_punct(i + 1, "(") {
            return None;
        }
        if i > 0 && self.is_ident(i - 1) && !CALL_PREFIX_KEYWORDS.contains(&t.text(i - 1)) {
            return None;
        }
        let close = t.matching_close(i + 1, "(", ")")?;
        if (i + 2..close).any(|k| t.text(k) == "params") {
            return None;
        }
        let args = argument_count(t, i + 1, close);
        let decl = decls
            .iter()
            .find(|d| d.name == t.text(i) && d.fixed == args)?;

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
            initializer: Some(crate::analysis::site::Initializer {
                span: t.byte_span(insert_at, insert_at),
                contents: Vec::new(),
            }),
            malformed: false,
        })
    }

    /// Attribute sections: `[Obsolete]`, `[assembly: X(...)]`.
    fn attribute_spans(&self) -> Vec<Span> {
        let t = self.tree;
        let mut spans = Vec::new();
        let mut last_attribute_close = None;
        for i in 0..t.tokens.len() {
            if !t.is_punct(i, "[") || !self.is_ident(i + 1) || t.text(i + 1) == "new" {
                continue;
            }
            let close = match t.matching_close(i, "[", "]") {
                Some(close) => close,
                None => continue,
            };
            let after = close + 1;
            let is_attribute = match self.prev_text(i) {
                None | Some(";") | Some("{") | Some("}") => {
                    !(t.is_punct(after, "=")
                        || t.is_punct(after, ".")
                        || t.is_punct(after, ";")
                        || t.is_punct(after, ",")
                        || t.is_punct(after, ")"))
                }
                Some("]") => last_attribute_close == Some(i - 1),
                Some("(") | Some(",") => self.is_ident(after) || t.is_punct(after, "["),
                _ => false,
            };
            if is_attribute {
                spans.push(t.token_span(i, close));
                last_attribute_close = Some(close);
            }
        }
        spans
    }

    /// `using X.Y;` and `global using X.Y;` outside any braces.
    fn imports(&self) -> Vec<Import> {
        let t = self.tree;
        let mut imports = Vec::new();
        let mut depth = 0usize;
        for i in 0..t.tokens.len() {
            if t.is_punct(i, "{") {
                depth += 1;
                continue;
            }
            if t.is_punct(i, "}") {
                depth = depth.saturating_sub(1);
                continue;
            }
            if depth != 0 || !self.is_ident(i) || t.text(i) != "using" {
                continue;
            }
            if !matches!(
                self.prev_text(i),
                None | Some(";") | Some("}") | Some("]") | Some("global")
            ) {
                continue;
            }

            let mut j = i + 1;
            if t.text(j) == "static" {
                continue;
            }
            let mut alias = None;
            if self.is_ident(j) && t.is_punct(j + 1, "=") {
                alias = Some(t.text(j).to_string());
                j += 2;
            }
            let start = j;
            while self.is_ident(j) || t.is_punct(j, ".") || t.is_punct(j, ":") {
                j += 1;
            }
            if j == start || !t.is_punct(j, ";") {
                continue;
            }
            let path = join_name(t, start..j);
            let path = path.strip_prefix("global::").unwrap_or(&path).to_string();
            imports.push(Import {
                path,
                alias,
                span: t.token_span(i, j),
            });
        }
        imports
    }

    /// `const int Zero = 0, One = 1;`
    fn constants(&self) -> Constants {
        let t = self.tree;
        let mut constants = Constants::new(true);
        for i in 0..t.tokens.len() {
            if !self.is_ident(i) || t.text(i) != "const" {
                continue;
            }
            let ty = match self.parse_type(i + 1) {
                Some(ty) => ty,
                None => continue,
            };
            let mut pos = ty.end;
            while self.is_ident(pos) && t.is_punct(pos + 1, "=") {
                let name = t.text(pos);
                let value_start = pos + 2;
                let mut end = value_start;
                let mut depth = 0usize;
                while end < t.tokens.len() {
                    if t.is_punct(end, "(") {
                        depth += 1;
                    } else if t.is_punct(end, ")") {
                        depth = depth.saturating_sub(1);
                    } else if depth == 0 && (t.is_punct(end, ",") || t.is_punct(end, ";")) {
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

    /// Generic methods with the namespace and type that declare them.
    fn generic_methods(&self) -> Vec<GenericMethod> {
        enum Scope {
            Namespace(String),
            Type(String),
            Block,
        }

        let t = self.tree;
        let mut methods = Vec::new();
        let mut stack: Vec<Scope> = Vec::new();
        let mut pending: Option<Scope> = None;
        let mut file_namespace: Option<String> = None;

        for i in 0..t.tokens.len() {
            if t.is_punct(i, "{") {
                stack.push(pending.take().unwrap_or(Scope::Block));
                continue;
            }
            if t.is_punct(i, "}") {
                stack.pop();
                continue;
            }
            if t.is_punct(i, ";") {
                pending = None;
                continue;
            }
            if !self.is_ident(i) {
                continue;
            }
            match t.text(i) {
                "namespace" => {
                    let start = i + 1;
                    let mut end = start;
                    while self.is_ident(end) || t.is_punct(end, ".") {
                        end += 1;
                    }
                    let name = join_name(t, start..end);
                    if t.is_punct(end, ";") {
                        file_namespace = Some(name);
                    } else {
                        pending = Some(Scope::Namespace(name));
                    }
                }
                "class" | "struct" | "interface" | "record" if self.is_ident(i + 1) => {
                    pending = Some(Scope::Type(t.text(i + 1).to_string()));
                }
                name if t.is_punct(i + 1, "<") => {
                    // A declaration follows its return type; a call follows
                    // an operator, `.` or a keyword.
                    let declares = match self.prev_text(i) {
                        Some(">") | Some("]") | Some("?") => true,
                        Some(p) => self.is_ident(i - 1) && !NON_TYPE_KEYWORDS.contains(&p),
                        None => false,
                    };
                    if !declares {
                        continue;
                    }
                    let type_name = stack.iter().rev().find_map(|s| match s {
                        Scope::Type(name) => Some(name.clone()),
                        _ => None,
                    });
                    let (type_name, close) = match (type_name, self.generic_close(i + 1)) {
                        (Some(type_name), Some(close)) => (type_name, close),
                        _ => continue,
                    };
                    if !t.is_punct(close + 1, "(") {
                        continue;
                    }
                    let namespace = file_namespace
                        .iter()
                        .cloned()
                        .chain(stack.iter().filter_map(|s| match s {
                            Scope::Namespace(ns) => Some(ns.clone()),
                            _ => None,
                        }))
                        .collect::<Vec<_>>()
                        .join(".");
                    methods.push(GenericMethod {
                        namespace,
                        type_name,
                        method: name.to_string(),
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
    use crate::analysis::languages::common::split_commas;

    fn parse(source: &str) -> ParsedFile {
        CSharpFacts::new().parse(Path::new("Test.cs"), source)
    }

    fn tok(kind: TokenKind, text: &str) -> ExprToken {
        ExprToken::new(kind, text)
    }

    #[test]
    fn test_explicit_creation_levels() {
        let parsed = parse("class C { void M() { var a = new int[0][,]; } }");
        assert_eq!(parsed.sites.len(), 1);
        let site = &parsed.sites[0];
        assert_eq!(site.origin, SiteOrigin::Explicit);
        assert_eq!(site.jagged_depth(), 2);
        assert_eq!(site.rank(), 1);
        assert_eq!(site.levels[1].rank, 2);
        assert_eq!(&parsed.source_str()[site.span.byte_range()], "new int[0][,]");
    }

    #[test]
    fn test_object_creation_is_not_a_site() {
        let parsed = parse("var list = new List<int>() { };\nvar anon = new { A = 1 };");
        assert!(parsed.sites.is_empty());
    }

    #[test]
    fn test_implicit_declarations() {
        let parsed = parse("class C { static readonly int[] A = { }, B = { 1 }; }");
        assert_eq!(parsed.sites.len(), 2);
        assert!(parsed
            .sites
            .iter()
            .all(|s| s.origin == SiteOrigin::ImplicitInitializer));
        assert_eq!(parsed.sites[0].span.start_col, 37);
    }

    #[test]
    fn test_collection_expression_declaration() {
        let parsed = parse("class C { void M() { int[] a = []; int[] b = [1]; } }");
        assert_eq!(parsed.sites.len(), 2);
        assert!(parsed.sites[0].initializer.as_ref().unwrap().contents.is_empty());
        assert_eq!(&parsed.source_str()[parsed.sites[0].span.byte_range()], "[]");
    }

    #[test]
    fn test_pointer_element() {
        let parsed = parse("unsafe class C { void M() { int*[] p = new int*[0]; } }");
        let site = parsed
            .sites
            .iter()
            .find(|s| s.origin == SiteOrigin::Explicit)
            .unwrap();
        assert!(site.element.is_pointer);
    }

    #[test]
    fn test_attribute_context() {
        let parsed = parse("[System.Runtime.CompilerServices.Dynamic(new bool[0])]\nclass C { }");
        assert_eq!(parsed.sites.len(), 1);
        assert_eq!(parsed.sites[0].context, SiteContext::AttributeArgument);
    }

    #[test]
    fn test_indexer_is_not_an_attribute() {
        let parsed = parse("class C { void M(int[] x) { x[0] = 1; var y = new int[0]; } }");
        assert_eq!(parsed.sites.len(), 1);
        assert_eq!(parsed.sites[0].context, SiteContext::Code);
    }

    #[test]
    fn test_imports() {
        let parsed = parse(
            "using System;\nusing static System.Math;\nusing IO = System.IO;\nglobal using System.Linq;\nnamespace N { using System.Text; }",
        );
        let paths: Vec<_> = parsed.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["System", "System.IO", "System.Linq"]);
        assert_eq!(parsed.imports[1].alias.as_deref(), Some("IO"));

        let facts = CSharpFacts::new();
        assert!(facts.imports_namespace(&parsed, "System"));
        assert!(!facts.imports_namespace(&parsed, "System.IO"));
        assert!(!facts.imports_namespace(&parsed, "System.Text"));
    }

    #[test]
    fn test_integer_literals() {
        let facts = CSharpFacts::new();
        assert_eq!(facts.integer_literal("0"), Some(0));
        assert_eq!(facts.integer_literal("0L"), Some(0));
        assert_eq!(facts.integer_literal("0UL"), Some(0));
        assert_eq!(facts.integer_literal("0x10"), Some(16));
        assert_eq!(facts.integer_literal("0b_101"), Some(5));
        assert_eq!(facts.integer_literal("1_000"), Some(1000));
        assert_eq!(facts.integer_literal("0.0"), None);
        assert_eq!(facts.integer_literal("0f"), None);
    }

    #[test]
    fn test_dimension_length_with_casts() {
        let facts = CSharpFacts::new();
        let constants = Constants::new(true);
        let long_zero = vec![
            tok(TokenKind::Punct, "("),
            tok(TokenKind::Ident, "long"),
            tok(TokenKind::Punct, ")"),
            tok(TokenKind::Number, "0"),
        ];
        assert_eq!(facts.dimension_length(&long_zero, &constants), Some(0));

        let negative = vec![tok(TokenKind::Punct, "-"), tok(TokenKind::Number, "1")];
        assert_eq!(facts.dimension_length(&negative, &constants), None);

        let variable = vec![tok(TokenKind::Ident, "n")];
        assert_eq!(facts.dimension_length(&variable, &constants), None);
    }

    #[test]
    fn test_constants_fold() {
        let parsed = parse("class C { const int Zero = 0, One = 1; const long Big = (long)Zero; }");
        let facts = CSharpFacts::new();
        let zero = vec![tok(TokenKind::Ident, "Big")];
        assert_eq!(facts.dimension_length(&zero, &parsed.constants), Some(0));
        let one = vec![tok(TokenKind::Ident, "One")];
        assert_eq!(facts.dimension_length(&one, &parsed.constants), Some(1));
    }

    #[test]
    fn test_param_array_call() {
        let parsed = parse(
            "class C {\n void F(int a, params string[] rest) { }\n void G() { F(1); F(1, \"x\"); }\n}",
        );
        let synthesized: Vec<_> = parsed
            .sites
            .iter()
            .filter(|s| s.origin.is_compiler_generated())
            .collect();
        assert_eq!(synthesized.len(), 1);
        assert_eq!(synthesized[0].span.start_line, 3);
        assert_eq!(
            synthesized[0].origin,
            SiteOrigin::ParamArray {
                insert_at: parsed.source_str().find("F(1)").unwrap() + 3,
                needs_separator: true,
            }
        );
    }

    #[test]
    fn test_declares_factory() {
        let parsed = parse(
            "namespace System { public class Array { public static T[] Empty<T>() { return null; } } }",
        );
        let facts = CSharpFacts::new();
        assert_eq!(parsed.generic_methods.len(), 1);
        assert!(facts.declares_factory(&parsed, &Factory::default()));
    }

    #[test]
    fn test_render_invocation() {
        let facts = CSharpFacts::new();
        let factory = Factory::default();
        assert_eq!(
            facts.render_invocation(None, &factory, "int[]"),
            "Array.Empty<int[]>()"
        );
        assert_eq!(
            facts.render_invocation(Some("System"), &factory, "int"),
            "System.Array.Empty<int>()"
        );
        assert_eq!(facts.rank_suffix(1), "[]");
        assert_eq!(facts.rank_suffix(3), "[,,]");
    }

    #[test]
    fn test_unterminated_string_marks_errors() {
        let parsed = parse("class C { string s = \"abc\n; }");
        assert!(parsed.has_errors());
    }

    #[test]
    fn test_error_tokens_leave_element_unresolved() {
        let parsed = parse("class C { object o = new int[0] { § }; }");
        assert_eq!(parsed.sites.len(), 1);
        assert!(!parsed.sites[0].element.resolved);
    }

    #[test]
    fn test_split_commas_used_for_ranks() {
        let parsed = parse("var x = new int[0, 0];");
        let tree = &parsed.tree;
        let open = (0..tree.tokens.len()).find(|&i| tree.is_punct(i, "[")).unwrap();
        let close = tree.matching_close(open, "[", "]").unwrap();
        assert_eq!(split_commas(tree, open, close).len(), 2);
    }
}
