//! Core types for detection results.

use serde::{Deserialize, Serialize};

use crate::analysis::{LengthEvidence, SiteOrigin};
use crate::syntax::Span;

/// Identifier of the zero-length allocation rule.
pub const RULE_ID: &str = "CA1825";

/// Human-readable rule name, accepted in suppressions.
pub const RULE_NAME: &str = "avoid_zero_length_array_allocations";

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Array shapes the factory cannot replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedShape {
    /// Rank > 1 on the allocated level.
    MultiDimensional,
    /// `T*[]`: a pointer cannot be a generic type argument.
    PointerElement,
}

/// Why a site was passed over without a verdict on its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The allocated length is not a compile-time constant.
    UnknownLength,
    /// The element type cannot be determined or spelled.
    UnresolvedType,
    /// Sizes on an inner jagged level.
    MalformedSyntax,
    /// Inside an attribute argument list.
    AttributeArgument,
    /// Compiler-synthesized parameter array, skipped by policy.
    CompilerGenerated,
    /// The factory type argument could not be spelled.
    RenderFailure,
}

/// The classifier's verdict on one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Flag,
    SkipKnownNonZero,
    SkipUnsupportedShape(UnsupportedShape),
    Skip(SkipReason),
}

impl Decision {
    pub fn is_flag(&self) -> bool {
        matches!(self, Decision::Flag)
    }
}

/// A flagged site with the rendered factory type argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Index of the site in [`crate::analysis::ParsedFile::sites`].
    pub site_index: usize,
    /// Span of the creation expression.
    pub span: Span,
    pub origin: SiteOrigin,
    pub evidence: LengthEvidence,
    /// Element type of the allocated array, spelled as a type argument
    /// (`int[]` for `new int[0][]`).
    pub type_argument: String,
}

/// A reported diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    /// Short-form factory call, e.g. `Array.Empty<int>()`.
    pub argument: String,
    pub language: String,
}

impl Diagnostic {
    /// Create a unique key for this diagnostic (for deduplication/comparison).
    pub fn key(&self) -> String {
        format!("{}|{}|{}:{}", self.rule_id, self.file, self.line, self.column)
    }
}

/// Results of running detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics that were suppressed by inline comments
    #[serde(default)]
    pub suppressed: Vec<super::SuppressedDiagnostic>,
    /// Number of files scanned
    pub scanned: usize,
}

impl DetectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: DetectionResult) {
        self.diagnostics.extend(other.diagnostics);
        self.suppressed.extend(other.suppressed);
        self.scanned += other.scanned;
    }

    /// Number of suppressed diagnostics.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }

    /// Check if there are any error-severity diagnostics.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
