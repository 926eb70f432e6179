//! Rewrite flagged allocations into calls to the empty-array factory.

use crate::analysis::{LanguageFacts, ParsedFile, SiteOrigin};
use crate::config::Factory;
use crate::detect::Finding;

use super::edit::Edit;

/// Builds edits for the findings of one file.
///
/// Whether the factory can be named by its short form is decided once, from
/// the file's imports.
pub struct Rewriter<'a> {
    facts: &'a dyn LanguageFacts,
    factory: &'a Factory,
    short_form: bool,
}

impl<'a> Rewriter<'a> {
    pub fn for_file(parsed: &ParsedFile, facts: &'a dyn LanguageFacts, factory: &'a Factory) -> Self {
        Self {
            facts,
            factory,
            short_form: facts.imports_namespace(parsed, &factory.namespace),
        }
    }

    /// Whether replacements use the short `Array.Empty` form.
    pub fn uses_short_form(&self) -> bool {
        self.short_form
    }

    /// The factory call replacing a finding, qualified as needed.
    pub fn replacement_text(&self, finding: &Finding) -> String {
        let qualifier = if self.short_form {
            None
        } else {
            Some(self.factory.namespace.as_str())
        };
        self.facts
            .render_invocation(qualifier, self.factory, &finding.type_argument)
    }

    /// The edit for one finding. An empty type argument cannot be rendered,
    /// so no edit is produced.
    pub fn rewrite(&self, finding: &Finding) -> Option<Edit> {
        if finding.type_argument.is_empty() {
            return None;
        }
        let invocation = self.replacement_text(finding);
        let message = format!("Use {} instead", invocation);
        let edit = match finding.origin {
            SiteOrigin::Explicit | SiteOrigin::ImplicitInitializer => {
                Edit::new(finding.span, invocation, message)
            }
            SiteOrigin::ParamArray {
                insert_at,
                needs_separator,
            } => {
                let text = if needs_separator {
                    format!(", {}", invocation)
                } else {
                    invocation
                };
                Edit::insert(insert_at, text, message)
            }
        };
        Some(edit)
    }

    /// Edits for all findings, dropping any that overlap an edit already
    /// kept so the set always applies cleanly.
    pub fn fix_all<I>(&self, findings: I) -> Vec<Edit>
    where
        I: IntoIterator<Item = Finding>,
    {
        let mut edits: Vec<Edit> = Vec::new();
        for edit in findings.into_iter().filter_map(|f| self.rewrite(&f)) {
            if edits.iter().any(|kept| kept.overlaps(&edit)) {
                tracing::debug!(start = edit.start, end = edit.end, "dropping overlapping edit");
                continue;
            }
            edits.push(edit);
        }
        edits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BasicFacts, CSharpFacts};
    use crate::detect::{classify, ClassifyOptions};
    use crate::fix::apply_edits;
    use std::path::Path;

    fn fix(facts: &dyn LanguageFacts, name: &str, source: &str) -> String {
        fix_with(facts, name, source, &ClassifyOptions::default())
    }

    fn fix_with(
        facts: &dyn LanguageFacts,
        name: &str,
        source: &str,
        options: &ClassifyOptions,
    ) -> String {
        let factory = Factory::default();
        let parsed = facts.parse(Path::new(name), source);
        let rewriter = Rewriter::for_file(&parsed, facts, &factory);
        let edits = rewriter.fix_all(classify(&parsed, facts, options));
        apply_edits(source, &edits).unwrap()
    }

    #[test]
    fn test_csharp_qualified_and_short_forms() {
        let facts = CSharpFacts::new();
        assert_eq!(
            fix(&facts, "a.cs", "int[] a = new int[0]; // yes"),
            "int[] a = System.Array.Empty<int>(); // yes"
        );
        assert_eq!(
            fix(&facts, "a.cs", "using System;\nint[][] a = new int[0][];"),
            "using System;\nint[][] a = Array.Empty<int[]>();"
        );
    }

    #[test]
    fn test_aliased_import_is_not_short_form() {
        let facts = CSharpFacts::new();
        let parsed = facts.parse(Path::new("a.cs"), "using S = System;\nvar a = new int[0];");
        let factory = Factory::default();
        assert!(!Rewriter::for_file(&parsed, &facts, &factory).uses_short_form());
    }

    #[test]
    fn test_basic_forms() {
        let facts = BasicFacts::new();
        assert_eq!(
            fix(&facts, "a.vb", "Dim a As Byte() = { }\n"),
            "Dim a As Byte() = System.Array.Empty(Of Byte)()\n"
        );
        assert_eq!(
            fix(&facts, "a.vb", "Imports System\nDim a = New Integer(-1)(,) { }\n"),
            "Imports System\nDim a = Array.Empty(Of Integer(,))()\n"
        );
    }

    #[test]
    fn test_sized_creation_with_empty_initializer() {
        let facts = CSharpFacts::new();
        assert_eq!(
            fix(&facts, "a.cs", "var a = new object[0] { };"),
            "var a = System.Array.Empty<object>();"
        );
    }

    #[test]
    fn test_param_array_insertion() {
        let facts = CSharpFacts::new();
        let options = ClassifyOptions {
            compiler_generated: crate::config::CompilerGeneratedPolicy::Flag,
            ..Default::default()
        };
        let source = "class C {\n void F(int a, params string[] rest) { }\n void G() { F(1); }\n}";
        assert_eq!(
            fix_with(&facts, "a.cs", source, &options),
            "class C {\n void F(int a, params string[] rest) { }\n void G() { F(1, System.Array.Empty<string>()); }\n}"
        );
    }
}
