//! Optional exclusion filters loaded from a TOML file.
//!
//! Media trees tend to carry junk alongside the media: `Thumbs.db`,
//! `.DS_Store`, half-finished `.part` downloads, NAS index folders. When the
//! operator passes `--config`, files matching the exclude rules are passed
//! over before they are counted or transferred. Without a config file every
//! file in the source tree is processed.
//!
//! # Configuration File Format
//!
//! ```toml
//! [exclude]
//! filenames = ["Thumbs.db", ".DS_Store"]
//! extensions = ["tmp", "part"]
//! patterns = ["**/@eaDir/**"]
//! regex = ["^~\\$"]
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading or compiling filter rules.
#[derive(Debug)]
pub enum ConfigError {
    /// No file at the given path.
    NotFound(PathBuf),
    /// The file exists but could not be read.
    Unreadable { path: PathBuf, source: std::io::Error },
    /// The file is not valid TOML for this schema.
    Parse { path: PathBuf, reason: String },
    /// A glob pattern failed to compile.
    InvalidGlob { pattern: String, reason: String },
    /// A regex failed to compile.
    InvalidRegex { pattern: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::Unreadable { path, source } => {
                write!(
                    f,
                    "Could not read configuration {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, reason } => {
                write!(f, "Invalid configuration {}: {}", path.display(), reason)
            }
            ConfigError::InvalidGlob { pattern, reason } => {
                write!(f, "Invalid glob pattern '{}': {}", pattern, reason)
            }
            ConfigError::InvalidRegex { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Filter rules as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub exclude: ExcludeRules,
}

/// Rules deciding which files to pass over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Extensions without the dot, case-insensitive (e.g. "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Glob patterns matched against the full path.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl FilterConfig {
    /// Loads filter rules from an explicitly named TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Compiles the rules into matchers, validating every pattern up front.
    pub fn compile(&self) -> Result<CompiledFilters, ConfigError> {
        let globs = self
            .exclude
            .patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| ConfigError::InvalidGlob {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = self
            .exclude
            .regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidRegex {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledFilters {
            filenames: self.exclude.filenames.iter().cloned().collect(),
            extensions: self
                .exclude
                .extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            globs,
            regexes,
        })
    }
}

/// Precompiled exclusion matchers applied once per file during traversal.
#[derive(Debug, Default)]
pub struct CompiledFilters {
    filenames: HashSet<String>,
    extensions: HashSet<String>,
    globs: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl CompiledFilters {
    /// Filters that exclude nothing. Used when no config file is given.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns true when the file should be organized.
    pub fn should_include(&self, path: &Path) -> bool {
        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return true,
        };

        if self.filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = path.extension()
            && self.extensions.contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        if self.globs.iter().any(|g| g.matches_path(path)) {
            return false;
        }

        if self.regexes.iter().any(|r| r.is_match(&file_name)) {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compile(toml_text: &str) -> CompiledFilters {
        let config: FilterConfig = toml::from_str(toml_text).expect("bad test toml");
        config.compile().expect("compile failed")
    }

    #[test]
    fn test_allow_all_includes_everything() {
        let filters = CompiledFilters::allow_all();
        assert!(filters.should_include(Path::new("/media/a.jpg")));
        assert!(filters.should_include(Path::new("/media/.DS_Store")));
    }

    #[test]
    fn test_filename_exclusion() {
        let filters = compile(r#"[exclude]
filenames = ["Thumbs.db"]"#);
        assert!(!filters.should_include(Path::new("/media/Thumbs.db")));
        assert!(filters.should_include(Path::new("/media/photo.jpg")));
    }

    #[test]
    fn test_extension_exclusion_is_case_insensitive() {
        let filters = compile(r#"[exclude]
extensions = ["TMP"]"#);
        assert!(!filters.should_include(Path::new("/media/half.tmp")));
        assert!(!filters.should_include(Path::new("/media/half.TMP")));
        assert!(filters.should_include(Path::new("/media/full.mp4")));
    }

    #[test]
    fn test_glob_exclusion_matches_full_path() {
        let filters = compile(r#"[exclude]
patterns = ["**/@eaDir/**"]"#);
        assert!(!filters.should_include(Path::new("/media/@eaDir/thumb.jpg")));
        assert!(filters.should_include(Path::new("/media/album/thumb.jpg")));
    }

    #[test]
    fn test_regex_exclusion_matches_file_name() {
        let filters = compile(r#"[exclude]
regex = ["^~\\$"]"#);
        assert!(!filters.should_include(Path::new("/media/~$draft.docx")));
        assert!(filters.should_include(Path::new("/media/draft.docx")));
    }

    #[test]
    fn test_invalid_regex_fails_compilation() {
        let config: FilterConfig = toml::from_str(
            r#"[exclude]
regex = ["("]"#,
        )
        .unwrap();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("filters.toml");
        assert!(matches!(
            FilterConfig::load(&missing),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_and_compile_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("filters.toml");
        fs::write(
            &path,
            r#"[exclude]
filenames = [".DS_Store"]
extensions = ["part"]"#,
        )
        .unwrap();

        let filters = FilterConfig::load(&path)
            .expect("load failed")
            .compile()
            .expect("compile failed");
        assert!(!filters.should_include(Path::new("/m/.DS_Store")));
        assert!(!filters.should_include(Path::new("/m/movie.part")));
        assert!(filters.should_include(Path::new("/m/movie.mkv")));
    }
}
