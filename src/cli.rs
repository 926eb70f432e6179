//! Command-line interface for emptycheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::detect::Runner;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Find zero-length array allocations in C# and Visual Basic code.
///
/// Every `new T[0]`, `new T[] { }` or `New T(-1) { }` allocates a fresh
/// empty array. emptycheck reports them and rewrites them to the shared
/// instance returned by `Array.Empty<T>()`.
#[derive(Parser)]
#[command(name = "emptycheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report zero-length array allocations
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// Rewrite zero-length array allocations in place
    Fix(FixArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Show suppressed diagnostics in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the fix command.
#[derive(Parser)]
pub struct FixArgs {
    /// Path to fix (file or directory)
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the rewritten files instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "emptycheck.yaml")]
    pub output: PathBuf,
}

/// Resolve the scan root and load its configuration.
///
/// A discovered configuration is looked up next to the scanned directory
/// (or the scanned file's directory).
fn prepare(path: &Path, explicit: Option<&Path>) -> Result<(PathBuf, Config, Option<PathBuf>), String> {
    let abs_path = path
        .canonicalize()
        .map_err(|e| format!("cannot access path {:?}: {}", path, e))?;

    let search_dir = if abs_path.is_dir() {
        abs_path.clone()
    } else {
        abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| abs_path.clone())
    };

    let config_path = explicit
        .map(Path::to_path_buf)
        .or_else(|| Config::discover(&search_dir));
    let config = Config::load(config_path.as_deref(), &search_dir)
        .map_err(|e| format!("invalid configuration: {}", e))?;

    Ok((abs_path, config, config_path))
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" && args.format != "sarif" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (abs_path, config, config_path) = match prepare(&args.path, args.config.as_deref()) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let runner = Runner::new(&abs_path);
    let result = runner.run(&config)?;
    if result.scanned == 0 {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }
    tracing::debug!(
        scanned = result.scanned,
        diagnostics = result.diagnostics.len(),
        suppressed = result.suppressed_count(),
        "lint finished"
    );

    let config_path_str = config_path.map(|p| p.to_string_lossy().to_string());
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => {
            report::write_json(&path_str, config_path_str.as_deref(), &result)?;
        }
        "sarif" => {
            report::write_sarif(&abs_path, &result)?;
        }
        _ => {
            report::write_pretty(
                &path_str,
                config_path_str.as_deref(),
                &result,
                args.show_suppressed,
            );
        }
    }

    // Return appropriate exit code
    if result.is_clean() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the fix command.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let (abs_path, config, _) = match prepare(&args.path, args.config.as_deref()) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let compilation = Runner::new(&abs_path).compile(&config)?;
    let fixes = compilation.fixes()?;

    if args.dry_run {
        for fix in fixes.iter().filter(|f| !f.is_unchanged()) {
            println!("// {}", fix.path);
            print!("{}", fix.fixed);
            if !fix.fixed.ends_with('\n') {
                println!();
            }
        }
        return Ok(EXIT_SUCCESS);
    }

    for fix in fixes.iter().filter(|f| !f.is_unchanged()) {
        if let Err(e) = std::fs::write(&fix.path, &fix.fixed) {
            eprintln!("Error: failed to write {}: {}", fix.path, e);
            return Ok(EXIT_ERROR);
        }
        tracing::debug!(path = %fix.path, edits = fix.edits.len(), "wrote fixes");
    }

    report::write_fix_summary(&args.path.to_string_lossy(), &fixes, false);
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let config = Config {
        excluded_paths: vec!["**/obj/**".to_string(), "**/bin/**".to_string()],
        ..Default::default()
    };
    config::validate(&config)?;

    if let Err(e) = std::fs::write(&args.output, config.to_yaml()?) {
        eprintln!("Error: failed to write configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize the factory or policies", args.output.display());
    println!("  2. Run: emptycheck lint . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
