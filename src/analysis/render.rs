//! Spelling of the factory's type argument.

use super::site::ArrayCreationSite;
use super::LanguageFacts;

/// The element type of the allocated array, as a type argument: the
/// innermost element followed by every level below the allocated one.
///
/// `new int[0][,]` yields `int[,]`; `New Integer(-1)()() { }` yields
/// `Integer()()`. Returns `None` for pointer or unresolved element types.
pub fn render_type_argument(site: &ArrayCreationSite, facts: &dyn LanguageFacts) -> Option<String> {
    let mut rendered = facts.spell_type(&site.element)?;
    for level in site.inner_levels() {
        rendered.push_str(&facts.rank_suffix(level.rank));
    }
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::languages::{BasicFacts, CSharpFacts};
    use std::path::Path;

    fn first_site_argument(facts: &dyn LanguageFacts, name: &str, source: &str) -> Option<String> {
        let parsed = facts.parse(Path::new(name), source);
        render_type_argument(&parsed.sites[0], facts)
    }

    #[test]
    fn test_csharp_jagged_levels() {
        let facts = CSharpFacts::new();
        assert_eq!(
            first_site_argument(&facts, "a.cs", "var a = new int[0][][][];").as_deref(),
            Some("int[][][]")
        );
        assert_eq!(
            first_site_argument(&facts, "a.cs", "var a = new int[0][,];").as_deref(),
            Some("int[,]")
        );
        assert_eq!(
            first_site_argument(&facts, "a.cs", "var a = new Dictionary<string,int>[0];").as_deref(),
            Some("Dictionary<string, int>")
        );
    }

    #[test]
    fn test_basic_jagged_levels() {
        let facts = BasicFacts::new();
        assert_eq!(
            first_site_argument(&facts, "a.vb", "Dim a = New Integer(  -1)()()() { }\n").as_deref(),
            Some("Integer()()()")
        );
        assert_eq!(
            first_site_argument(&facts, "a.vb", "Dim a = New Integer(-1)(,) { }\n").as_deref(),
            Some("Integer(,)")
        );
    }

    #[test]
    fn test_pointer_and_unresolved_have_no_argument() {
        let facts = CSharpFacts::new();
        assert_eq!(first_site_argument(&facts, "a.cs", "var p = new int*[0];"), None);
        assert_eq!(first_site_argument(&facts, "a.cs", "var a = new[] { };"), None);
    }
}
