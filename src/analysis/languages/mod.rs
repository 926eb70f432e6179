//! Language front-end implementations.

mod basic;
pub(crate) mod common;
mod csharp;

pub use basic::BasicFacts;
pub use csharp::CSharpFacts;

use super::LanguageFacts;
use once_cell::sync::OnceCell;

/// Static storage for the C# front-end.
static CSHARP_FACTS: OnceCell<CSharpFacts> = OnceCell::new();

/// Static storage for the Visual Basic front-end.
static BASIC_FACTS: OnceCell<BasicFacts> = OnceCell::new();

/// Register all available language front-ends.
///
/// Idempotent; lookups call it on demand, so this only moves the cost of
/// compiling the lexers up front.
pub fn register_languages() {
    csharp();
    basic();
}

fn csharp() -> &'static dyn LanguageFacts {
    CSHARP_FACTS.get_or_init(CSharpFacts::new)
}

fn basic() -> &'static dyn LanguageFacts {
    BASIC_FACTS.get_or_init(BasicFacts::new)
}

/// Get the front-end for a file extension (without dot, any case).
pub fn get_facts(ext: &str) -> Option<&'static dyn LanguageFacts> {
    [csharp(), basic()]
        .into_iter()
        .find(|f| f.handles_extension(ext))
}

/// Get a front-end by language ID (`csharp`, `vb`).
pub fn get_facts_by_id(lang_id: &str) -> Option<&'static dyn LanguageFacts> {
    [csharp(), basic()]
        .into_iter()
        .find(|f| f.language_id() == lang_id)
}

/// All file extensions with a registered front-end.
pub fn registered_extensions() -> Vec<&'static str> {
    [csharp(), basic()]
        .into_iter()
        .flat_map(|f| f.file_extensions().iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_extension() {
        assert_eq!(get_facts("cs").map(|f| f.language_id()), Some("csharp"));
        assert_eq!(get_facts("VB").map(|f| f.language_id()), Some("vb"));
        assert!(get_facts("rs").is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        assert!(get_facts_by_id("vb").is_some());
        assert!(get_facts_by_id("fsharp").is_none());
        assert_eq!(registered_extensions(), vec!["cs", "vb"]);
    }
}
