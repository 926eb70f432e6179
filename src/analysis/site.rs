//! Language-neutral model of array creation sites.

use std::collections::HashMap;
use std::fmt;

use crate::syntax::{Span, TokenKind};

/// A token copied out of the syntax tree, kept for constant folding and
/// type spelling after the tree walk is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprToken {
    pub kind: TokenKind,
    pub text: String,
}

impl ExprToken {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }
}

/// The tokens of one dimension-size expression.
pub type SizeExpr = Vec<ExprToken>;

/// One level of an array type: `[,]` in C#, `(,)` in Visual Basic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLevel {
    /// Number of dimensions.
    pub rank: usize,
    /// One entry per dimension; `None` where the size is omitted.
    pub sizes: Vec<Option<SizeExpr>>,
}

impl ArrayLevel {
    /// A level with no explicit sizes, as in a type name.
    pub fn unsized_rank(rank: usize) -> Self {
        Self {
            rank,
            sizes: vec![None; rank],
        }
    }

    /// Whether any dimension carries an explicit size.
    pub fn has_sizes(&self) -> bool {
        self.sizes.iter().any(Option::is_some)
    }
}

/// The innermost, non-array element type of a creation site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementType {
    /// Tokens spelling the type, as written.
    pub parts: Vec<ExprToken>,
    pub is_pointer: bool,
    /// False when the type could not be determined from the source.
    pub resolved: bool,
}

impl ElementType {
    pub fn new(parts: Vec<ExprToken>, is_pointer: bool) -> Self {
        let resolved = !parts.is_empty() && parts.iter().all(|p| p.kind != TokenKind::Error);
        Self {
            parts,
            is_pointer,
            resolved,
        }
    }

    pub fn unresolved() -> Self {
        Self {
            parts: Vec::new(),
            is_pointer: false,
            resolved: false,
        }
    }
}

/// A braced initializer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initializer {
    pub span: Span,
    /// Tokens between the braces.
    pub contents: Vec<ExprToken>,
}

/// How the allocation appears in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOrigin {
    /// `new T[n]`, `new T[] { }`, `New T(n) { }`.
    Explicit,
    /// `T[] x = { }`, `Dim x As T() = { }`.
    ImplicitInitializer,
    /// Empty parameter array the compiler materializes for a call that
    /// passes no variadic arguments. There is no allocation syntax, so a
    /// rewrite inserts the argument at `insert_at`.
    ParamArray {
        insert_at: usize,
        needs_separator: bool,
    },
}

impl SiteOrigin {
    pub fn is_compiler_generated(&self) -> bool {
        matches!(self, SiteOrigin::ParamArray { .. })
    }
}

/// Where the allocation sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteContext {
    Code,
    /// Inside an attribute argument list, where only constants are legal.
    AttributeArgument,
}

/// What is known about the length of one allocated dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthEvidence {
    ConstantZero,
    ConstantNonZero,
    Unknown,
    ImplicitFromEmptyInitializer,
}

impl LengthEvidence {
    pub fn is_zero(&self) -> bool {
        matches!(
            self,
            LengthEvidence::ConstantZero | LengthEvidence::ImplicitFromEmptyInitializer
        )
    }
}

impl fmt::Display for LengthEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LengthEvidence::ConstantZero => "constant zero",
            LengthEvidence::ConstantNonZero => "constant non-zero",
            LengthEvidence::Unknown => "unknown",
            LengthEvidence::ImplicitFromEmptyInitializer => "empty initializer",
        };
        write!(f, "{}", s)
    }
}

/// One syntactic array allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayCreationSite {
    /// Span of the whole creation expression (of the call, for
    /// [`SiteOrigin::ParamArray`]).
    pub span: Span,
    pub origin: SiteOrigin,
    pub context: SiteContext,
    pub element: ElementType,
    /// Array levels, outermost (allocated) first. Never empty.
    pub levels: Vec<ArrayLevel>,
    pub initializer: Option<Initializer>,
    /// Sizes given on an inner jagged level, which no grammar allows.
    pub malformed: bool,
}

impl ArrayCreationSite {
    /// The level whose length is actually allocated.
    pub fn allocated_level(&self) -> &ArrayLevel {
        &self.levels[0]
    }

    /// Rank of the allocated level.
    pub fn rank(&self) -> usize {
        self.allocated_level().rank
    }

    /// Number of chained array-of-array levels.
    pub fn jagged_depth(&self) -> usize {
        self.levels.len()
    }

    /// Levels that survive into the element type of the allocated array.
    pub fn inner_levels(&self) -> &[ArrayLevel] {
        &self.levels[1..]
    }
}

/// An import directive (`using X;` / `Imports X`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The imported namespace.
    pub path: String,
    /// Alias name for `using A = X;` / `Imports A = X`.
    pub alias: Option<String>,
    pub span: Span,
}

/// A generic method declared in source, used to detect a source-level
/// definition of the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericMethod {
    pub namespace: String,
    pub type_name: String,
    pub method: String,
}

/// Named constants declared in a file (`const int Zero = 0;`).
#[derive(Debug, Clone, Default)]
pub struct Constants {
    case_sensitive: bool,
    values: HashMap<String, SizeExpr>,
}

impl Constants {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            values: HashMap::new(),
        }
    }

    fn key(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }

    /// Record a constant. The first declaration of a name wins.
    pub fn insert(&mut self, name: &str, value: SizeExpr) {
        let key = self.key(name);
        self.values.entry(key).or_insert(value);
    }

    pub fn get(&self, name: &str) -> Option<&SizeExpr> {
        self.values.get(&self.key(name))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_resolution() {
        let int = ElementType::new(vec![ExprToken::new(TokenKind::Ident, "int")], false);
        assert!(int.resolved);

        let broken = ElementType::new(vec![ExprToken::new(TokenKind::Error, "§")], false);
        assert!(!broken.resolved);

        assert!(!ElementType::unresolved().resolved);
    }

    #[test]
    fn test_constants_case_folding() {
        let mut vb = Constants::new(false);
        vb.insert("Zero", vec![ExprToken::new(TokenKind::Number, "0")]);
        assert!(vb.get("ZERO").is_some());

        let mut cs = Constants::new(true);
        cs.insert("Zero", vec![ExprToken::new(TokenKind::Number, "0")]);
        assert!(cs.get("zero").is_none());
        assert_eq!(cs.len(), 1);
    }

    #[test]
    fn test_length_evidence_is_zero() {
        assert!(LengthEvidence::ConstantZero.is_zero());
        assert!(LengthEvidence::ImplicitFromEmptyInitializer.is_zero());
        assert!(!LengthEvidence::ConstantNonZero.is_zero());
        assert!(!LengthEvidence::Unknown.is_zero());
    }
}
