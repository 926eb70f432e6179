//! Inline suppression of diagnostics via comments.
//!
//! Supports suppression comments like:
//! - `// emptycheck:ignore CA1825 - <reason>`
//! - `// emptycheck:ignore-next-line CA1825 - <reason>`
//! - `' emptycheck:ignore-file * - <reason>` (Visual Basic)

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::{RULE_ID, RULE_NAME};
use super::Diagnostic;

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionType {
    /// Applies to the same line
    Line,
    /// Applies to the next line
    NextLine,
    /// Applies to the entire file
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suppression {
    /// Rule to suppress ("CA1825", the rule name) or "*" for all
    pub rule: String,
    /// Human-readable reason
    pub reason: String,
    /// File containing the suppression
    pub file: String,
    /// Line number (0 for file-level)
    pub line: usize,
    /// How the suppression applies
    pub suppression_type: SuppressionType,
}

/// A diagnostic that was suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedDiagnostic {
    pub diagnostic: Diagnostic,
    pub suppression: Suppression,
}

lazy_static::lazy_static! {
    /// Patterns for matching suppression comments.
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        // C# line comments: // emptycheck:...
        Regex::new(r"//\s*emptycheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
        // Block comment style: /* emptycheck:... */
        Regex::new(r"/\*\s*emptycheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*?))?\s*\*/").unwrap(),
        // Visual Basic: ' emptycheck:... or REM emptycheck:...
        Regex::new(r"(?:'|(?i:\brem\b))\s*emptycheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
    ];
}

/// Lines before the first code line may carry file-level suppressions.
const FILE_HEADER_LINES: usize = 10;

/// Parse suppression directives from file content.
pub fn parse_suppressions(file_path: &str, content: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    let mut in_header = true;

    for (line_num, line) in content.lines().enumerate() {
        let line_number = line_num + 1;
        let trimmed = line.trim();

        if in_header && !is_comment_or_empty(trimmed) {
            in_header = false;
        }

        for pattern in SUPPRESSION_PATTERNS.iter() {
            let caps = match pattern.captures(line) {
                Some(caps) => caps,
                None => continue,
            };
            let directive = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let rule = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let reason = caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            let suppression_type = match directive {
                "ignore-file" => {
                    if !in_header && line_number > FILE_HEADER_LINES {
                        continue;
                    }
                    SuppressionType::File
                }
                "ignore-next-line" => SuppressionType::NextLine,
                "ignore" => {
                    // Alone on its line it covers the next line, after code
                    // it covers its own.
                    let before = caps.get(0).map(|m| &line[..m.start()]).unwrap_or("");
                    if before.trim().is_empty() {
                        SuppressionType::NextLine
                    } else {
                        SuppressionType::Line
                    }
                }
                _ => continue,
            };

            suppressions.push(Suppression {
                rule: rule.to_string(),
                reason,
                file: file_path.to_string(),
                line: if suppression_type == SuppressionType::File {
                    0
                } else {
                    line_number
                },
                suppression_type,
            });
            break; // Only one suppression per line
        }
    }

    suppressions
}

/// Check if a line is a comment or empty, in either syntax.
fn is_comment_or_empty(line: &str) -> bool {
    line.is_empty()
        || ["//", "/*", "*", "'"].iter().any(|p| line.starts_with(p))
        || line
            .get(..4)
            .map(|p| p.eq_ignore_ascii_case("rem "))
            .unwrap_or(false)
}

/// Whether a suppression's rule selector names this rule.
fn rule_matches(selector: &str) -> bool {
    selector == "*" || selector.eq_ignore_ascii_case(RULE_ID) || selector.eq_ignore_ascii_case(RULE_NAME)
}

/// Check if a diagnostic matches a suppression.
pub fn matches_suppression(diagnostic: &Diagnostic, suppression: &Suppression) -> bool {
    if diagnostic.file != suppression.file || !rule_matches(&suppression.rule) {
        return false;
    }

    match suppression.suppression_type {
        SuppressionType::File => true,
        SuppressionType::Line => diagnostic.line == suppression.line,
        SuppressionType::NextLine => diagnostic.line == suppression.line + 1,
    }
}

/// Separate diagnostics into active and suppressed based on suppressions.
pub fn filter_suppressed(
    diagnostics: Vec<Diagnostic>,
    suppressions: &[Suppression],
) -> (Vec<Diagnostic>, Vec<SuppressedDiagnostic>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for diagnostic in diagnostics {
        match suppressions
            .iter()
            .find(|s| matches_suppression(&diagnostic, s))
        {
            Some(suppression) => suppressed.push(SuppressedDiagnostic {
                diagnostic,
                suppression: suppression.clone(),
            }),
            None => active.push(diagnostic),
        }
    }

    (active, suppressed)
}
