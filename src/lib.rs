//! emptycheck - find and fix zero-length array allocations.
//!
//! Allocating `new int[0]` in C# (or `New Integer(-1) { }` in Visual Basic)
//! creates a fresh array every time, although all empty arrays of a type
//! are interchangeable. emptycheck reports such allocations as `CA1825`
//! and rewrites them to the shared `System.Array.Empty<T>()` instance.
//!
//! # Architecture
//!
//! - `syntax`: Token-level syntax trees built by rule-driven lexers
//! - `analysis`: Language front-ends recognizing array creation sites
//! - `detect`: The classifier, suppressions and the compilation runner
//! - `fix`: Rewriting findings into text edits
//! - `config`: YAML configuration schema
//! - `report`: Output formatting (pretty, JSON, SARIF)
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement the
//! `LanguageFacts` trait and register it in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod fix;
pub mod report;
pub mod syntax;

pub use analysis::{
    get_facts, register_languages, ArrayCreationSite, BasicFacts, CSharpFacts, LanguageFacts,
    ParsedFile,
};
pub use config::{Config, Factory};
pub use detect::{
    classify, ClassifyOptions, Compilation, Decision, DetectionResult, Diagnostic, Finding,
    Runner,
};
pub use fix::{apply_edits, Edit, Rewriter};
