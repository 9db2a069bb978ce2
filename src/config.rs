//! Source item filters.
//!
//! Filters decide which entries of the source folder take part in a sift run.
//! Sieve folders are never filtered. The rules come from a TOML file:
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["*.part", "*.crdownload"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! Every rule looks at the item's file name only. With no file at all,
//! nothing is filtered out, hidden items included.

use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the filter file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".siftrc.toml";

#[derive(Debug, Clone)]
pub enum ConfigError {
    /// An explicitly given filter file does not exist.
    NotFound(PathBuf),
    Unreadable { path: PathBuf, reason: String },
    /// The TOML text does not describe a filter table.
    Malformed(String),
    BadGlob(String),
    BadRegex { pattern: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "no filter file at {}", path.display())
            }
            ConfigError::Unreadable { path, reason } => {
                write!(f, "cannot read filter file {}: {}", path.display(), reason)
            }
            ConfigError::Malformed(reason) => write!(f, "malformed filter file: {}", reason),
            ConfigError::BadGlob(pattern) => write!(f, "bad glob pattern '{}'", pattern),
            ConfigError::BadRegex { pattern, reason } => {
                write!(f, "bad regex '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Contents of a filter file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: FilterRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Whether items whose name starts with "." are sifted.
    pub enable_hidden_files: bool,
    pub exclude: ExcludeRules,
    /// Globs that let an item through whatever the other rules say.
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExcludeRules {
    pub filenames: Vec<String>,
    pub patterns: Vec<String>,
    /// Compared without the dot and ignoring case.
    pub extensions: Vec<String>,
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IncludeRules {
    pub patterns: Vec<String>,
}

/// Places searched for a filter file when none is given, in order.
fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(home) = std::env::var_os("HOME") {
        locations.push(Path::new(&home).join(".config/sift/config.toml"));
    }
    locations
}

impl FilterConfig {
    /// Reads the filter file for a run.
    ///
    /// An explicit `config_path` must exist. Otherwise `./.siftrc.toml` and
    /// then `~/.config/sift/config.toml` are tried, and the built-in defaults
    /// apply when neither is present.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => match default_locations().into_iter().find(|p| p.is_file()) {
                Some(found) => found,
                None => return Ok(Self::default()),
            },
        };

        let text = fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Compiles every glob and regex once, ahead of the run.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        let FilterRules {
            enable_hidden_files,
            exclude,
            include,
        } = self.filters;

        Ok(CompiledFilters {
            hidden: enable_hidden_files,
            include: globs(&include.patterns)?,
            names: exclude.filenames.into_iter().collect(),
            extensions: exclude.extensions.iter().map(|e| e.to_lowercase()).collect(),
            globs: globs(&exclude.patterns)?,
            regexes: exclude
                .regex
                .iter()
                .map(|pattern| {
                    Regex::new(pattern).map_err(|e| ConfigError::BadRegex {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

fn globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(|_| ConfigError::BadGlob(p.clone())))
        .collect()
}

/// Filter rules ready for matching.
pub struct CompiledFilters {
    hidden: bool,
    include: Vec<Pattern>,
    names: HashSet<String>,
    extensions: HashSet<String>,
    globs: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl CompiledFilters {
    /// True if the item at `item_path` takes part in sifting.
    ///
    /// Include globs win over everything else.
    pub fn should_include(&self, item_path: &Path) -> bool {
        let name = item_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.include.iter().any(|p| p.matches(&name)) || !self.excludes(item_path, &name)
    }

    fn excludes(&self, item_path: &Path, name: &str) -> bool {
        let extension = item_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());

        (!self.hidden && name.starts_with('.'))
            || self.names.contains(name)
            || extension.is_some_and(|e| self.extensions.contains(&e))
            || self.globs.iter().any(|p| p.matches(name))
            || self.regexes.iter().any(|r| r.is_match(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compiled(toml: &str) -> CompiledFilters {
        FilterConfig::parse(toml)
            .expect("valid config")
            .compile()
            .expect("valid patterns")
    }

    #[test]
    fn test_default_includes_everything() {
        let filters = FilterConfig::default().compile().unwrap();
        assert!(filters.should_include(Path::new("/src/.hidden")));
        assert!(filters.should_include(Path::new("/src/movie.mkv")));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = FilterConfig::parse("").unwrap();
        assert!(config.filters.enable_hidden_files);
    }

    #[test]
    fn test_hidden_items_can_be_disabled() {
        let filters = compiled("[filters]\nenable_hidden_files = false\n");
        assert!(!filters.should_include(Path::new("/src/.DS_Store")));
        assert!(filters.should_include(Path::new("/src/notes.txt")));
    }

    #[test]
    fn test_exclude_rules() {
        let filters = compiled(
            r#"
            [filters.exclude]
            filenames = ["Thumbs.db"]
            patterns = ["*.part"]
            extensions = ["tmp"]
            regex = ['^~\$']
            "#,
        );

        assert!(!filters.should_include(Path::new("/src/Thumbs.db")));
        assert!(!filters.should_include(Path::new("/src/movie.mkv.part")));
        assert!(!filters.should_include(Path::new("/src/cache.TMP")));
        assert!(!filters.should_include(Path::new("/src/~$report.docx")));
        assert!(filters.should_include(Path::new("/src/report.docx")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let filters = compiled(
            r#"
            [filters]
            enable_hidden_files = false

            [filters.include]
            patterns = [".keep*"]
            "#,
        );

        assert!(filters.should_include(Path::new("/src/.keepme")));
        assert!(!filters.should_include(Path::new("/src/.other")));
    }

    #[test]
    fn test_invalid_patterns_return_error() {
        let bad_regex = compile_err("[filters.exclude]\nregex = [\"[invalid(\"]\n");
        assert!(matches!(bad_regex, ConfigError::BadRegex { .. }));

        let bad_glob = compile_err("[filters.exclude]\npatterns = [\"[invalid\"]\n");
        assert!(matches!(bad_glob, ConfigError::BadGlob(_)));
    }

    fn compile_err(toml: &str) -> ConfigError {
        match FilterConfig::parse(toml).expect("valid toml").compile() {
            Ok(_) => panic!("patterns should not compile"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            FilterConfig::parse("[filters"),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file() {
        let result = FilterConfig::load(Some(Path::new("/non/existent/sift.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_explicit_file_is_read() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("sift.toml");
        fs::write(&path, "[filters.exclude]\nextensions = [\"nfo\"]\n")
            .expect("Failed to write config");

        let config = FilterConfig::load(Some(&path)).expect("Failed to load config");
        assert_eq!(config.filters.exclude.extensions, vec!["nfo".to_string()]);
    }
}
