//! Core traits for language analysis.

use std::path::Path;

use crate::config::Factory;
use crate::syntax::SyntaxTree;

use super::site::{
    ArrayCreationSite, Constants, ElementType, GenericMethod, Import, Initializer, SizeExpr,
};

/// A lexed file together with everything the front-end recognized in it.
///
/// This is the "tree plus symbols" the classifier and rewriter consume.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// The file path (for reporting).
    pub path: String,
    pub tree: SyntaxTree,
    /// Array creation sites in document order.
    pub sites: Vec<ArrayCreationSite>,
    /// File-level imports.
    pub imports: Vec<Import>,
    /// Named constants declared in the file.
    pub constants: Constants,
    /// Generic methods declared in the file, with their enclosing type and
    /// namespace.
    pub generic_methods: Vec<GenericMethod>,
}

impl ParsedFile {
    /// Get the source code as a string slice.
    pub fn source_str(&self) -> &str {
        &self.tree.source
    }

    /// Whether the file contained malformed input.
    pub fn has_errors(&self) -> bool {
        self.tree.has_errors
    }
}

/// Everything the rule needs to know about one concrete syntax.
///
/// The classifier and rewriter are written once against this trait; C# and
/// Visual Basic each implement it.
pub trait LanguageFacts: Send + Sync {
    /// Returns the language identifier (e.g., "csharp", "vb").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this front-end handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Lex and scan a source file. Malformed input never fails; it shows up
    /// as error tokens and unresolved sites.
    fn parse(&self, path: &Path, source: &str) -> ParsedFile;

    /// Allocated length of one dimension, if its size expression is a
    /// compile-time constant.
    fn dimension_length(&self, size: &SizeExpr, constants: &Constants) -> Option<i128>;

    /// Whether an initializer list has no elements.
    fn is_empty_initializer(&self, initializer: &Initializer) -> bool {
        initializer.contents.is_empty()
    }

    /// Spell a generic invocation of the factory, e.g. `Array.Empty<int>()`.
    fn render_invocation(&self, qualifier: Option<&str>, factory: &Factory, type_argument: &str) -> String;

    /// Spelling of one array level of the given rank, e.g. `[,]`.
    fn rank_suffix(&self, rank: usize) -> String;

    /// Spell an element type as source text, `None` if it cannot be used as
    /// a type argument.
    fn spell_type(&self, element: &ElementType) -> Option<String>;

    /// Compare identifiers under the language's case rules.
    fn names_equal(&self, a: &str, b: &str) -> bool {
        a == b
    }

    /// Whether the file imports `namespace` at file level (aliases don't count).
    fn imports_namespace(&self, parsed: &ParsedFile, namespace: &str) -> bool {
        parsed
            .imports
            .iter()
            .any(|i| i.alias.is_none() && self.names_equal(&i.path, namespace))
    }

    /// Whether the file itself defines the factory method.
    fn declares_factory(&self, parsed: &ParsedFile, factory: &Factory) -> bool {
        parsed.generic_methods.iter().any(|m| {
            self.names_equal(&m.namespace, &factory.namespace)
                && self.names_equal(&m.type_name, &factory.type_name)
                && self.names_equal(&m.method, &factory.method)
        })
    }

    /// Check if this front-end handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}
