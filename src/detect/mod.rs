//! Detection of zero-length array allocations.

mod classify;
mod runner;
mod suppress;
mod types;

pub use classify::{classify, decide, length_evidence, ClassifyOptions};
pub use runner::{CompiledFile, Compilation, FileFix, Runner};
pub use suppress::{
    filter_suppressed, matches_suppression, parse_suppressions, SuppressedDiagnostic,
    Suppression, SuppressionType,
};
pub use types::{
    Decision, DetectionResult, Diagnostic, Finding, Severity, SkipReason, UnsupportedShape,
    RULE_ID, RULE_NAME,
};
