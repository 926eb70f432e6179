//! Detection runner: parse a set of files as one compilation, classify,
//! apply suppressions and build fixes.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::analysis::{get_facts, LanguageFacts, ParsedFile};
use crate::config::Config;
use crate::fix::{apply_edits, Edit, Rewriter};

use super::{
    classify, filter_suppressed, matches_suppression, parse_suppressions, ClassifyOptions,
    Diagnostic, DetectionResult, Finding, RULE_ID,
};

/// One parsed file and the front-end that parsed it.
pub struct CompiledFile {
    pub parsed: ParsedFile,
    pub facts: &'static dyn LanguageFacts,
}

/// The rewritten text of one file.
#[derive(Debug, Clone)]
pub struct FileFix {
    pub path: String,
    pub edits: Vec<Edit>,
    pub fixed: String,
}

impl FileFix {
    pub fn is_unchanged(&self) -> bool {
        self.edits.is_empty()
    }
}

/// A set of files analyzed together.
///
/// Whether the factory exists is a property of the whole compilation: one
/// file defining it makes it available to every other file.
pub struct Compilation {
    config: Config,
    files: Vec<CompiledFile>,
    factory_available: bool,
}

impl Compilation {
    /// Build a compilation from in-memory sources. Files whose extension has
    /// no front-end are skipped.
    pub fn from_sources<I, P, S>(sources: I, config: Config) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let sources: Vec<(PathBuf, String)> = sources
            .into_iter()
            .map(|(p, s)| (p.as_ref().to_path_buf(), s.as_ref().to_string()))
            .collect();

        let mut files: Vec<CompiledFile> = sources
            .par_iter()
            .filter_map(|(path, source)| {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                let Some(facts) = get_facts(ext) else {
                    tracing::debug!(path = %path.display(), "no front-end for file, skipping");
                    return None;
                };
                Some(CompiledFile {
                    parsed: facts.parse(path, source),
                    facts,
                })
            })
            .collect();
        files.sort_by(|a, b| a.parsed.path.cmp(&b.parsed.path));

        let declared = files
            .iter()
            .any(|f| f.facts.declares_factory(&f.parsed, &config.factory));
        let factory_available = config.assume_factory_available || declared;
        if !factory_available {
            tracing::debug!(
                namespace = %config.factory.namespace,
                type_name = %config.factory.type_name,
                "factory not available, nothing will be reported"
            );
        }

        Self {
            config,
            files,
            factory_available,
        }
    }

    /// Read and parse files from disk. Unreadable files are logged and
    /// skipped.
    pub fn load(paths: &[PathBuf], config: Config) -> Self {
        let sources: Vec<(PathBuf, String)> = paths
            .par_iter()
            .filter_map(|path| match std::fs::read_to_string(path) {
                Ok(source) => Some((path.clone(), source)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read file");
                    None
                }
            })
            .collect();
        Self::from_sources(sources, config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn files(&self) -> &[CompiledFile] {
        &self.files
    }

    pub fn factory_available(&self) -> bool {
        self.factory_available
    }

    pub fn options(&self) -> ClassifyOptions {
        ClassifyOptions::from_config(&self.config, self.factory_available)
    }

    /// Findings of one file, in document order.
    pub fn findings<'a>(&'a self, file: &'a CompiledFile) -> impl Iterator<Item = Finding> + 'a {
        classify(&file.parsed, file.facts, &self.options())
    }

    /// Diagnostics for the whole compilation, with inline suppressions
    /// applied.
    pub fn diagnostics(&self) -> DetectionResult {
        let per_file: Vec<DetectionResult> = self
            .files
            .par_iter()
            .map(|file| self.file_diagnostics(file))
            .collect();

        let mut result = DetectionResult::new();
        for file_result in per_file {
            result.merge(file_result);
        }
        result
    }

    fn file_diagnostics(&self, file: &CompiledFile) -> DetectionResult {
        let parsed = &file.parsed;
        let diagnostics: Vec<Diagnostic> = self
            .findings(file)
            .map(|finding| self.diagnostic(file, &finding))
            .collect();

        let suppressions = parse_suppressions(&parsed.path, parsed.source_str());
        let (diagnostics, suppressed) = filter_suppressed(diagnostics, &suppressions);
        DetectionResult {
            diagnostics,
            suppressed,
            scanned: 1,
        }
    }

    fn diagnostic(&self, file: &CompiledFile, finding: &Finding) -> Diagnostic {
        let argument =
            file.facts
                .render_invocation(None, &self.config.factory, &finding.type_argument);
        Diagnostic {
            rule_id: RULE_ID.to_string(),
            severity: self.config.severity,
            file: file.parsed.path.clone(),
            line: finding.span.start_line,
            column: finding.span.start_col,
            end_line: finding.span.end_line,
            end_column: finding.span.end_col,
            message: format!(
                "Avoid unnecessary zero-length array allocations. Use {} instead.",
                argument
            ),
            argument,
            language: file.facts.language_id().to_string(),
        }
    }

    /// Rewritten text for every file, including unchanged ones.
    ///
    /// Suppressed diagnostics are not rewritten.
    pub fn fixes(&self) -> anyhow::Result<Vec<FileFix>> {
        self.files
            .par_iter()
            .map(|file| self.file_fix(file))
            .collect()
    }

    fn file_fix(&self, file: &CompiledFile) -> anyhow::Result<FileFix> {
        let parsed = &file.parsed;
        let suppressions = parse_suppressions(&parsed.path, parsed.source_str());
        let rewriter = Rewriter::for_file(parsed, file.facts, &self.config.factory);

        let findings = self.findings(file).filter(|finding| {
            let diagnostic = self.diagnostic(file, finding);
            !suppressions
                .iter()
                .any(|s| matches_suppression(&diagnostic, s))
        });
        let edits = rewriter.fix_all(findings);
        let fixed = apply_edits(parsed.source_str(), &edits)
            .map_err(|e| anyhow::anyhow!("{}: {}", parsed.path, e))?;
        tracing::debug!(path = %parsed.path, edits = edits.len(), "computed fixes");

        Ok(FileFix {
            path: parsed.path.clone(),
            edits,
            fixed,
        })
    }
}

/// Walks a directory tree and runs the rule over every supported file.
pub struct Runner {
    base_dir: PathBuf,
}

impl Runner {
    /// Create a new detection runner.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Collect the source files under the base directory (or the base path
    /// itself, if it is a file).
    pub fn collect_files(&self, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
        if self.base_dir.is_file() {
            return Ok(vec![self.base_dir.clone()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.base_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                // Skip hidden and build output directories
                !(e.file_type().is_dir()
                    && e.depth() > 0
                    && (name.starts_with('.') || name == "bin" || name == "obj"))
            })
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if get_facts(ext).is_none() {
                continue;
            }
            let relative = path.strip_prefix(&self.base_dir).unwrap_or(path);
            if config.is_path_excluded(relative) {
                tracing::debug!(path = %relative.display(), "excluded by configuration");
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();
        Ok(files)
    }

    /// Load every file into one compilation.
    pub fn compile(&self, config: &Config) -> anyhow::Result<Compilation> {
        let files = self.collect_files(config)?;
        tracing::debug!(count = files.len(), "collected files");
        Ok(Compilation::load(&files, config.clone()))
    }

    /// Run detection over the base directory.
    pub fn run(&self, config: &Config) -> anyhow::Result<DetectionResult> {
        Ok(self.compile(config)?.diagnostics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerGeneratedPolicy;
    use crate::detect::Severity;
    use tempfile::TempDir;

    #[test]
    fn test_compilation_diagnostics() {
        let compilation = Compilation::from_sources(
            vec![
                ("b.vb", "Dim a As Byte() = { }\n"),
                ("a.cs", "class C { int[] a = new int[0]; }"),
                ("notes.txt", "new int[0]"),
            ],
            Config::default(),
        );
        assert_eq!(compilation.files().len(), 2);

        let result = compilation.diagnostics();
        assert_eq!(result.scanned, 2);
        assert_eq!(result.diagnostics.len(), 2);

        let cs = &result.diagnostics[0];
        assert_eq!(cs.file, "a.cs");
        assert_eq!((cs.line, cs.column), (1, 21));
        assert_eq!(cs.argument, "Array.Empty<int>()");
        assert_eq!(
            cs.message,
            "Avoid unnecessary zero-length array allocations. Use Array.Empty<int>() instead."
        );
        assert_eq!(cs.severity, Severity::Warning);

        let vb = &result.diagnostics[1];
        assert_eq!(vb.language, "vb");
        assert_eq!(vb.argument, "Array.Empty(Of Byte)()");
    }

    #[test]
    fn test_factory_availability() {
        let config = Config {
            assume_factory_available: false,
            ..Default::default()
        };
        let sources = vec![("a.cs", "class C { int[] a = new int[0]; }")];
        let compilation = Compilation::from_sources(sources.clone(), config.clone());
        assert!(!compilation.factory_available());
        assert!(compilation.diagnostics().is_clean());

        let mut with_factory = sources;
        with_factory.push((
            "array.cs",
            "namespace System { public class Array { public static T[] Empty<T>() { return null; } } }",
        ));
        let compilation = Compilation::from_sources(with_factory, config);
        assert!(compilation.factory_available());
        assert_eq!(compilation.diagnostics().diagnostics.len(), 1);
    }

    #[test]
    fn test_suppressed_sites_are_reported_and_not_fixed() {
        let source = "class C {\n    int[] a = new int[0]; // emptycheck:ignore CA1825 - interop\n    int[] b = new int[0];\n}\n";
        let compilation = Compilation::from_sources(vec![("a.cs", source)], Config::default());

        let result = compilation.diagnostics();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line, 3);
        assert_eq!(result.suppressed_count(), 1);

        let fixes = compilation.fixes().unwrap();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].edits.len(), 1);
        assert!(fixes[0].fixed.contains("int[] a = new int[0];"));
        assert!(fixes[0].fixed.contains("int[] b = System.Array.Empty<int>();"));
    }

    #[test]
    fn test_config_severity_and_policy() {
        let config = Config {
            severity: Severity::Error,
            compiler_generated: CompilerGeneratedPolicy::Flag,
            ..Default::default()
        };
        let source = "class C {\n    void F(params int[] xs) { }\n    void G() { F(); }\n}\n";
        let result = Compilation::from_sources(vec![("a.cs", source)], config).diagnostics();
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].line, 3);
    }

    #[test]
    fn test_runner_walks_and_excludes() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::create_dir_all(temp.path().join("generated")).unwrap();
        std::fs::create_dir_all(temp.path().join("obj")).unwrap();
        std::fs::write(
            temp.path().join("src/A.cs"),
            "class A { int[] a = new int[0]; }",
        )
        .unwrap();
        std::fs::write(
            temp.path().join("generated/B.cs"),
            "class B { int[] b = new int[0]; }",
        )
        .unwrap();
        std::fs::write(
            temp.path().join("obj/C.cs"),
            "class C { int[] c = new int[0]; }",
        )
        .unwrap();
        std::fs::write(temp.path().join("README.md"), "new int[0]").unwrap();

        let config = Config {
            excluded_paths: vec!["generated/**".to_string()],
            ..Default::default()
        };
        let runner = Runner::new(temp.path());
        let files = runner.collect_files(&config).unwrap();
        assert_eq!(files, vec![temp.path().join("src/A.cs")]);

        let result = runner.run(&config).unwrap();
        assert_eq!(result.scanned, 1);
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_runner_single_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("M.vb");
        std::fs::write(&file, "Module M\n    Dim a As Integer() = New Integer(-1) { }\nEnd Module\n").unwrap();

        let result = Runner::new(&file).run(&Config::default()).unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].argument, "Array.Empty(Of Integer)()");
    }
}
