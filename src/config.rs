//! Configuration file schema for emptycheck.
//!
//! A configuration names the empty-array factory to rewrite to and tunes
//! how the rule treats erroneous files and compiler-generated arrays.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::detect::Severity;

/// File names searched for when no configuration is given explicitly.
pub const CONFIG_FILE_NAMES: &[&str] = &["emptycheck.yaml", ".emptycheck.yaml"];

/// Errors found while validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid factory {field} {value:?}: must be a dotted identifier")]
    InvalidFactory { field: &'static str, value: String },
    #[error("invalid excluded_paths pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// The generic empty-array factory, `System.Array.Empty` by default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Factory {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_type_name")]
    pub type_name: String,
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_namespace() -> String {
    "System".to_string()
}

fn default_type_name() -> String {
    "Array".to_string()
}

fn default_method() -> String {
    "Empty".to_string()
}

impl Default for Factory {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            type_name: default_type_name(),
            method: default_method(),
        }
    }
}

/// What to do with empty parameter arrays the compiler materializes for
/// calls that pass no variadic arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerGeneratedPolicy {
    /// Never report them; there is no allocation expression in the source.
    #[default]
    Skip,
    /// Report them, and fix by passing the factory call explicitly.
    Flag,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub factory: Factory,
    /// Whether the factory exists in every compilation, even when no
    /// source file defines it (default: true).
    #[serde(default = "default_true")]
    pub assume_factory_available: bool,
    /// Skip files containing syntax errors entirely (default: false).
    #[serde(default)]
    pub tolerate_compile_errors: bool,
    #[serde(default)]
    pub compiler_generated: CompilerGeneratedPolicy,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/obj/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_severity() -> Severity {
    Severity::Warning
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            factory: Factory::default(),
            assume_factory_available: true,
            tolerate_compile_errors: false,
            compiler_generated: CompilerGeneratedPolicy::default(),
            severity: default_severity(),
            excluded_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        validate(&config)?;
        Ok(config)
    }

    /// Find a configuration file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Load the explicit configuration if given, else a discovered one, else
    /// the defaults.
    pub fn load(explicit: Option<&Path>, search_dir: &Path) -> anyhow::Result<Self> {
        match explicit
            .map(Path::to_path_buf)
            .or_else(|| Self::discover(search_dir))
        {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::parse_file(&path)
                    .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
            }
            None => Ok(Self::default()),
        }
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        self.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|glob| glob.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }

    /// Render the configuration as YAML, for `emptycheck init`.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn is_dotted_identifier(s: &str, allow_dots: bool) -> bool {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    };
    if allow_dots {
        s.split('.').all(valid_part)
    } else {
        valid_part(s)
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let factory = &config.factory;
    for (field, value, allow_dots) in [
        ("namespace", &factory.namespace, true),
        ("type_name", &factory.type_name, false),
        ("method", &factory.method, false),
    ] {
        if !is_dotted_identifier(value, allow_dots) {
            return Err(ConfigError::InvalidFactory {
                field,
                value: value.clone(),
            });
        }
    }

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
version: "1"
factory:
  namespace: MyCompany.Collections
  type_name: Arrays
  method: None
tolerate_compile_errors: true
compiler_generated: flag
severity: error
excluded_paths:
  - "**/obj/**"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.factory.namespace, "MyCompany.Collections");
        assert_eq!(config.factory.type_name, "Arrays");
        assert!(config.tolerate_compile_errors);
        assert!(config.assume_factory_available);
        assert_eq!(config.compiler_generated, CompilerGeneratedPolicy::Flag);
        assert_eq!(config.severity, Severity::Error);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("version: \"1\"").unwrap();
        assert_eq!(config.factory, Factory::default());
        assert_eq!(config.compiler_generated, CompilerGeneratedPolicy::Skip);
        assert_eq!(config.severity, Severity::Warning);
        assert!(!config.tolerate_compile_errors);
    }

    #[test]
    fn test_validate_rejects_bad_factory() {
        let mut config = Config::default();
        config.factory.method = "Empty<T>".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidFactory { field: "method", .. })
        ));

        let mut config = Config::default();
        config.excluded_paths = vec!["[".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::InvalidGlob { .. })));
    }

    #[test]
    fn test_excluded_paths() {
        let config = Config {
            excluded_paths: vec!["**/obj/**".to_string()],
            ..Default::default()
        };
        assert!(config.is_path_excluded(Path::new("src/obj/Debug/Gen.cs")));
        assert!(!config.is_path_excluded(Path::new("src/Program.cs")));
    }

    #[test]
    fn test_discover_and_load() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());
        let loaded = Config::load(None, temp.path()).unwrap();
        assert_eq!(loaded.factory, Factory::default());

        std::fs::write(
            temp.path().join(".emptycheck.yaml"),
            "factory:\n  namespace: Acme\n",
        )
        .unwrap();
        let loaded = Config::load(None, temp.path()).unwrap();
        assert_eq!(loaded.factory.namespace, "Acme");
        assert_eq!(loaded.factory.type_name, "Array");
    }

    #[test]
    fn test_round_trip_yaml() {
        let yaml = Config::default().to_yaml().unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.factory, Factory::default());
    }
}
