//! Zero-length allocation classifier.
//!
//! Every array creation site the front-end recognized gets a [`Decision`].
//! Only the allocated (outermost) level's length matters: inner jagged
//! levels are never allocated when the outer level is empty, so they are
//! only carried along for rendering.

use crate::analysis::{
    render_type_argument, ArrayCreationSite, Constants, LanguageFacts, LengthEvidence,
    ParsedFile, SiteContext,
};
use crate::config::{CompilerGeneratedPolicy, Config};

use super::types::{Decision, Finding, SkipReason, UnsupportedShape};

/// Per-compilation switches for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Whether the factory exists in the compilation at all.
    pub factory_available: bool,
    /// Skip files with syntax errors entirely.
    pub tolerate_compile_errors: bool,
    pub compiler_generated: CompilerGeneratedPolicy,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            factory_available: true,
            tolerate_compile_errors: false,
            compiler_generated: CompilerGeneratedPolicy::Skip,
        }
    }
}

impl ClassifyOptions {
    pub fn from_config(config: &Config, factory_available: bool) -> Self {
        Self {
            factory_available,
            tolerate_compile_errors: config.tolerate_compile_errors,
            compiler_generated: config.compiler_generated,
        }
    }
}

/// What is known about the allocated level's length.
pub fn length_evidence(
    site: &ArrayCreationSite,
    facts: &dyn LanguageFacts,
    constants: &Constants,
) -> LengthEvidence {
    match site.allocated_level().sizes.first() {
        Some(Some(size)) => match facts.dimension_length(size, constants) {
            Some(0) => LengthEvidence::ConstantZero,
            Some(_) => LengthEvidence::ConstantNonZero,
            None => LengthEvidence::Unknown,
        },
        _ => match &site.initializer {
            Some(init) if facts.is_empty_initializer(init) => {
                LengthEvidence::ImplicitFromEmptyInitializer
            }
            Some(_) => LengthEvidence::ConstantNonZero,
            None => LengthEvidence::Unknown,
        },
    }
}

/// Decide what to do with one site.
pub fn decide(
    site: &ArrayCreationSite,
    facts: &dyn LanguageFacts,
    constants: &Constants,
    options: &ClassifyOptions,
) -> Decision {
    if site.context == SiteContext::AttributeArgument {
        return Decision::Skip(SkipReason::AttributeArgument);
    }
    if site.origin.is_compiler_generated()
        && options.compiler_generated == CompilerGeneratedPolicy::Skip
    {
        return Decision::Skip(SkipReason::CompilerGenerated);
    }
    if site.malformed {
        return Decision::Skip(SkipReason::MalformedSyntax);
    }
    if site.rank() > 1 {
        return Decision::SkipUnsupportedShape(UnsupportedShape::MultiDimensional);
    }
    if site.element.is_pointer {
        return Decision::SkipUnsupportedShape(UnsupportedShape::PointerElement);
    }
    match length_evidence(site, facts, constants) {
        LengthEvidence::ConstantNonZero => return Decision::SkipKnownNonZero,
        LengthEvidence::Unknown => return Decision::Skip(SkipReason::UnknownLength),
        LengthEvidence::ConstantZero | LengthEvidence::ImplicitFromEmptyInitializer => {}
    }
    if !site.element.resolved {
        return Decision::Skip(SkipReason::UnresolvedType);
    }
    Decision::Flag
}

/// Lazily classify every site of `parsed`, yielding findings in document
/// order. Yields nothing when the factory is unavailable, or when the file
/// has errors and the options say to tolerate them.
pub fn classify<'a>(
    parsed: &'a ParsedFile,
    facts: &'a dyn LanguageFacts,
    options: &ClassifyOptions,
) -> impl Iterator<Item = Finding> + 'a {
    let options = *options;
    let enabled =
        options.factory_available && !(options.tolerate_compile_errors && parsed.has_errors());

    parsed
        .sites
        .iter()
        .enumerate()
        .filter(move |_| enabled)
        .filter_map(move |(site_index, site)| {
            let decision = decide(site, facts, &parsed.constants, &options);
            if !decision.is_flag() {
                tracing::trace!(path = %parsed.path, line = site.span.start_line, ?decision, "site skipped");
                return None;
            }
            let type_argument = match render_type_argument(site, facts) {
                Some(argument) => argument,
                None => {
                    let decision = Decision::Skip(SkipReason::RenderFailure);
                    tracing::trace!(path = %parsed.path, line = site.span.start_line, ?decision, "site skipped");
                    return None;
                }
            };
            Some(Finding {
                site_index,
                span: site.span,
                origin: site.origin,
                evidence: length_evidence(site, facts, &parsed.constants),
                type_argument,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BasicFacts, CSharpFacts};
    use std::path::Path;

    fn decisions(facts: &dyn LanguageFacts, name: &str, source: &str) -> Vec<Decision> {
        let parsed = facts.parse(Path::new(name), source);
        parsed
            .sites
            .iter()
            .map(|s| decide(s, facts, &parsed.constants, &ClassifyOptions::default()))
            .collect()
    }

    fn cs(source: &str) -> Vec<Decision> {
        decisions(&CSharpFacts::new(), "a.cs", source)
    }

    fn vb(source: &str) -> Vec<Decision> {
        decisions(&BasicFacts::new(), "a.vb", source)
    }

    #[test]
    fn test_csharp_decisions() {
        assert_eq!(cs("var a = new int[0];"), vec![Decision::Flag]);
        assert_eq!(cs("var a = new int[0x0L];"), vec![Decision::Flag]);
        assert_eq!(cs("var a = new int[1];"), vec![Decision::SkipKnownNonZero]);
        assert_eq!(
            cs("var a = new int[n];"),
            vec![Decision::Skip(SkipReason::UnknownLength)]
        );
        assert_eq!(
            cs("var a = new int[0, 0];"),
            vec![Decision::SkipUnsupportedShape(UnsupportedShape::MultiDimensional)]
        );
        assert_eq!(
            cs("var a = new int*[0];"),
            vec![Decision::SkipUnsupportedShape(UnsupportedShape::PointerElement)]
        );
        assert_eq!(
            cs("var a = new[] { };"),
            vec![Decision::Skip(SkipReason::UnresolvedType)]
        );
        assert_eq!(
            cs("var a = new int[0][1];"),
            vec![Decision::Skip(SkipReason::MalformedSyntax)]
        );
    }

    /// C# facts that can never spell a type.
    struct Unspellable(CSharpFacts);

    impl LanguageFacts for Unspellable {
        fn language_id(&self) -> &'static str {
            self.0.language_id()
        }

        fn file_extensions(&self) -> &'static [&'static str] {
            self.0.file_extensions()
        }

        fn parse(&self, path: &Path, source: &str) -> ParsedFile {
            self.0.parse(path, source)
        }

        fn dimension_length(&self, size: &crate::analysis::SizeExpr, constants: &Constants) -> Option<i128> {
            self.0.dimension_length(size, constants)
        }

        fn render_invocation(
            &self,
            qualifier: Option<&str>,
            factory: &crate::config::Factory,
            type_argument: &str,
        ) -> String {
            self.0.render_invocation(qualifier, factory, type_argument)
        }

        fn rank_suffix(&self, rank: usize) -> String {
            self.0.rank_suffix(rank)
        }

        fn spell_type(&self, _element: &crate::analysis::ElementType) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_render_failure_yields_no_finding() {
        let facts = Unspellable(CSharpFacts::new());
        let parsed = facts.parse(Path::new("a.cs"), "var a = new int[0];");
        let options = ClassifyOptions::default();
        assert_eq!(
            decide(&parsed.sites[0], &facts, &parsed.constants, &options),
            Decision::Flag
        );
        assert_eq!(classify(&parsed, &facts, &options).count(), 0);
    }

    #[test]
    fn test_basic_decisions() {
        assert_eq!(vb("Dim a = New Integer(-1) { }\n"), vec![Decision::Flag]);
        assert_eq!(vb("Dim a = New Integer(0) { }\n"), vec![Decision::SkipKnownNonZero]);
        assert_eq!(vb("Dim a = New Integer(CLng(-1)) { }\n"), vec![Decision::Flag]);
        assert_eq!(
            vb("Dim a = New Integer(-1, -1) { }\n"),
            vec![Decision::SkipUnsupportedShape(UnsupportedShape::MultiDimensional)]
        );
        assert_eq!(vb("Dim a As Integer() = { -1 }\n"), vec![Decision::SkipKnownNonZero]);
    }

    #[test]
    fn test_evidence_kinds() {
        let facts = CSharpFacts::new();
        let parsed = facts.parse(
            Path::new("a.cs"),
            "int[] a = { }; var b = new int[0]; var c = new int[] { 1 };",
        );
        let evidence: Vec<_> = parsed
            .sites
            .iter()
            .map(|s| length_evidence(s, &facts, &parsed.constants))
            .collect();
        assert_eq!(
            evidence,
            vec![
                LengthEvidence::ImplicitFromEmptyInitializer,
                LengthEvidence::ConstantZero,
                LengthEvidence::ConstantNonZero,
            ]
        );
    }

    #[test]
    fn test_classify_is_empty_without_factory() {
        let facts = CSharpFacts::new();
        let parsed = facts.parse(Path::new("a.cs"), "var a = new int[0];");
        let options = ClassifyOptions {
            factory_available: false,
            ..Default::default()
        };
        assert_eq!(classify(&parsed, &facts, &options).count(), 0);
        assert_eq!(
            classify(&parsed, &facts, &ClassifyOptions::default()).count(),
            1
        );
    }

    #[test]
    fn test_tolerate_compile_errors() {
        let facts = CSharpFacts::new();
        let parsed = facts.parse(
            Path::new("a.cs"),
            "var a = new int[0];\nvar s = \"unterminated;\n",
        );
        assert!(parsed.has_errors());
        assert_eq!(
            classify(&parsed, &facts, &ClassifyOptions::default()).count(),
            1
        );
        let tolerant = ClassifyOptions {
            tolerate_compile_errors: true,
            ..Default::default()
        };
        assert_eq!(classify(&parsed, &facts, &tolerant).count(), 0);
    }

    #[test]
    fn test_compiler_generated_policy() {
        let facts = BasicFacts::new();
        let parsed = facts.parse(
            Path::new("a.vb"),
            "Class C\n    Sub F(ParamArray args As String())\n    End Sub\n    Sub G()\n        F()\n    End Sub\nEnd Class\n",
        );
        assert_eq!(
            classify(&parsed, &facts, &ClassifyOptions::default()).count(),
            0
        );
        let flag = ClassifyOptions {
            compiler_generated: CompilerGeneratedPolicy::Flag,
            ..Default::default()
        };
        let findings: Vec<_> = classify(&parsed, &facts, &flag).collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].type_argument, "String");
        assert_eq!(findings[0].evidence, LengthEvidence::ImplicitFromEmptyInitializer);
    }

    #[test]
    fn test_findings_in_document_order() {
        let facts = CSharpFacts::new();
        let parsed = facts.parse(
            Path::new("a.cs"),
            "var a = new int[0][];\nvar b = new byte[0];\nvar c = new string[1];\n",
        );
        let findings: Vec<_> = classify(&parsed, &facts, &ClassifyOptions::default()).collect();
        let args: Vec<_> = findings.iter().map(|f| f.type_argument.as_str()).collect();
        assert_eq!(args, vec!["int[]", "byte"]);
        assert!(findings[0].span.start_byte < findings[1].span.start_byte);
    }
}
