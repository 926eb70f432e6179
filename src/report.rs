//! Output formatting for emptycheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::detect::{
    DetectionResult, Diagnostic, FileFix, Severity, SuppressedDiagnostic, SuppressionType,
    RULE_ID, RULE_NAME,
};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub clean: bool,
    pub files_scanned: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedDiagnostic>,
    pub suppressed_count: usize,
}

/// One diagnostic in the JSON report.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub rule: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    /// Factory call to use instead.
    pub argument: String,
}

/// Suppressed diagnostic with suppression info.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppressedDiagnostic {
    pub diagnostic: JsonDiagnostic,
    pub suppression: JsonSuppression,
}

/// Suppression directive info.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppression {
    pub rule: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    pub file: String,
    pub line: usize,
    #[serde(rename = "type")]
    pub suppression_type: String,
}

/// Build the JSON report for a detection result.
pub fn json_report(path: &str, config_path: Option<&str>, result: &DetectionResult) -> JsonReport {
    let suppressed = result
        .suppressed
        .iter()
        .map(|sd| JsonSuppressedDiagnostic {
            diagnostic: diagnostic_to_json(&sd.diagnostic),
            suppression: JsonSuppression {
                rule: sd.suppression.rule.clone(),
                reason: sd.suppression.reason.clone(),
                file: sd.suppression.file.clone(),
                line: sd.suppression.line,
                suppression_type: format!("{:?}", sd.suppression.suppression_type)
                    .to_lowercase(),
            },
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.map(str::to_string),
        clean: result.is_clean(),
        files_scanned: result.scanned,
        diagnostics: result.diagnostics.iter().map(diagnostic_to_json).collect(),
        suppressed,
        suppressed_count: result.suppressed_count(),
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    config_path: Option<&str>,
    result: &DetectionResult,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(path, config_path, result))?;
    println!("{}", json);
    Ok(())
}

fn diagnostic_to_json(d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        rule: d.rule_id.clone(),
        severity: d.severity.to_string(),
        file: d.file.clone(),
        line: d.line,
        column: d.column,
        message: d.message.clone(),
        argument: d.argument.clone(),
    }
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "emptycheck";
const INFO_URI: &str = "https://github.com/zen-systems/emptycheck";

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(rename = "informationUri")]
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "fullDescription", skip_serializing_if = "Option::is_none")]
    pub full_description: Option<SarifMessage>,
    #[serde(rename = "helpUri", skip_serializing_if = "Option::is_none")]
    pub help_uri: Option<String>,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
    #[serde(rename = "startColumn")]
    pub start_column: usize,
    #[serde(rename = "endLine")]
    pub end_line: usize,
    #[serde(rename = "endColumn")]
    pub end_column: usize,
}

fn map_severity_to_level(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.to_string_lossy().is_empty() {
        return file_path.to_string();
    }

    let file = Path::new(file_path);

    // If they're the same (single file scan), return just the filename
    if file == base_path {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string());
    }

    file.strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.to_string())
}

fn rule_descriptor(default_level: &str) -> SarifRule {
    SarifRule {
        id: RULE_ID.to_string(),
        name: RULE_NAME.to_string(),
        short_description: SarifMessage {
            text: "Avoid zero-length array allocations".to_string(),
        },
        full_description: Some(SarifMessage {
            text: "Allocating a zero-length array wastes memory; every empty array of a type is interchangeable, so use the shared instance returned by Array.Empty instead.".to_string(),
        }),
        help_uri: Some(format!("{}#ca1825", INFO_URI)),
        default_config: SarifRuleConfig {
            level: default_level.to_string(),
        },
    }
}

/// Build the SARIF report for a detection result.
pub fn sarif_report(base_path: &Path, result: &DetectionResult) -> SarifReport {
    let default_level = result
        .diagnostics
        .first()
        .map(|d| map_severity_to_level(&d.severity))
        .unwrap_or("warning");

    let results: Vec<SarifResult> = result
        .diagnostics
        .iter()
        .map(|d| SarifResult {
            rule_id: d.rule_id.clone(),
            level: map_severity_to_level(&d.severity).to_string(),
            message: SarifMessage {
                text: d.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: make_relative_path(&d.file, base_path),
                    },
                    region: SarifRegion {
                        start_line: d.line.max(1),
                        start_column: d.column.max(1),
                        end_line: d.end_line.max(1),
                        end_column: d.end_column.max(1),
                    },
                },
            }],
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: INFO_URI.to_string(),
                    rules: vec![rule_descriptor(default_level)],
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(base_path: &Path, result: &DetectionResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&sarif_report(base_path, result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(
    path: &str,
    config_path: Option<&str>,
    result: &DetectionResult,
    show_suppressed: bool,
) {
    write_header(path, config_path);

    // Result summary
    write_result_summary(result);
    println!();

    if !result.diagnostics.is_empty() {
        write_diagnostics(&result.diagnostics);
        println!();
    }

    if !result.suppressed.is_empty() {
        write_suppressed_summary(&result.suppressed, show_suppressed);
        println!();
    }
}

fn write_header(path: &str, config_path: Option<&str>) {
    println!();
    print!("  ");
    print!("{}", "emptycheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Config:   ".dimmed());
    println!("{}", config_path.unwrap_or("(defaults)"));
    println!();
}

fn write_result_summary(result: &DetectionResult) {
    if result.is_clean() {
        print!("  {}", "✓ CLEAN".green());
    } else {
        print!("  {}", "✗ FOUND".red());
    }

    let count = result.diagnostics.len();
    let plural = if count != 1 { "s" } else { "" };
    print!(
        "  {} zero-length allocation{} in {} file{}",
        count.to_string().bold(),
        plural,
        result.scanned,
        if result.scanned != 1 { "s" } else { "" }
    );

    if result.suppressed_count() > 0 {
        print!(
            "  {}",
            format!("({} suppressed)", result.suppressed_count()).dimmed()
        );
    }

    println!();
}

fn write_diagnostics(diagnostics: &[Diagnostic]) {
    println!("  {} ({}):", "Diagnostics".bold(), diagnostics.len());
    println!();

    for d in diagnostics {
        write_severity_tag(&d.severity);
        print!("   ");
        print!("{:<8}", d.rule_id.dimmed());
        print!("{}", d.file.blue());
        print!("{}", format!(":{}:{}", d.line, d.column).dimmed());
        println!();

        // Message on next line, indented
        println!("            {}", d.message);
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_suppressed_summary(suppressed: &[SuppressedDiagnostic], show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), suppressed.len());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    println!();
    for sd in suppressed {
        let d = &sd.diagnostic;
        let s = &sd.suppression;

        print!("    {:<8}", d.rule_id.dimmed());
        print!("{}", d.file.blue());
        if s.suppression_type == SuppressionType::File {
            print!("{}", ":* (file)".dimmed());
        } else {
            print!("{}", format!(":{}:{}", d.line, d.column).dimmed());
        }
        println!();

        if !s.reason.is_empty() {
            println!("            {}", format!("reason: {:?}", s.reason).dimmed());
        }
    }
}

/// Summarize the edits made (or, for a dry run, proposed) by `fix`.
pub fn write_fix_summary(path: &str, fixes: &[FileFix], dry_run: bool) {
    write_header(path, None);

    let changed: Vec<&FileFix> = fixes.iter().filter(|f| !f.is_unchanged()).collect();
    let edits: usize = changed.iter().map(|f| f.edits.len()).sum();
    let verb = if dry_run { "Would rewrite" } else { "Rewrote" };

    if changed.is_empty() {
        println!("  {}  nothing to fix", "✓ CLEAN".green());
        println!();
        return;
    }

    println!(
        "  {} {} allocation{} in {} file{}",
        verb,
        edits.to_string().bold(),
        if edits != 1 { "s" } else { "" },
        changed.len(),
        if changed.len() != 1 { "s" } else { "" }
    );
    println!();
    for fix in changed {
        println!("    {}", fix.path.blue());
        for edit in &fix.edits {
            println!("            {}", edit.message.dimmed());
        }
    }
    println!();
}
