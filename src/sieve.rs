//! Sieve compilation.
//!
//! The sieve is the destination folder. Each of its immediate subfolders is a
//! [`DestinationFolder`], and every word-group in a folder name becomes a
//! [`ScoredPattern`] that refers back to its folder by index. All patterns of
//! all folders are kept in one table sorted by (score, folder, group), which
//! is the order the matcher relies on.

use crate::item_actions::{SiftError, SiftResult};
use crate::word_group::{PatternGroup, parse_folder_name};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Position of a folder in the sieve's folder list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FolderIndex(usize);

impl FolderIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for FolderIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A subfolder of the sieve that items can be placed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationFolder {
    path: PathBuf,
    name: String,
}

impl DestinationFolder {
    fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw folder name the word-groups were parsed from.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A word-group tied to the folder it came from, with its complexity score.
///
/// Field order drives the derived ordering: score first, then folder index,
/// then the group content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScoredPattern {
    score: usize,
    folder: FolderIndex,
    group: PatternGroup,
}

impl ScoredPattern {
    pub fn score(&self) -> usize {
        self.score
    }

    pub fn folder(&self) -> FolderIndex {
        self.folder
    }

    pub fn group(&self) -> &PatternGroup {
        &self.group
    }
}

/// The compiled pattern table for one sift run.
///
/// Owns the destination folders and every scored pattern. Built once and
/// never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Sieve {
    folders: Vec<DestinationFolder>,
    patterns: Vec<ScoredPattern>,
}

impl Sieve {
    /// Compiles a sieve from destination folder names or paths.
    ///
    /// The folders are sorted before compilation so that the result does
    /// not depend on the order they were listed in.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::sieve::Sieve;
    ///
    /// let sieve = Sieve::build(["Science", "Science Fiction (sci-fi, space opera)"]);
    /// assert_eq!(sieve.folders().len(), 2);
    /// assert_eq!(sieve.patterns().len(), 4);
    /// ```
    pub fn build<I, P>(folders: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut paths: Vec<PathBuf> = folders.into_iter().map(Into::into).collect();
        paths.sort();

        let folders: Vec<DestinationFolder> =
            paths.into_iter().map(DestinationFolder::new).collect();

        let mut patterns = Vec::new();
        for (index, folder) in folders.iter().enumerate() {
            for group in parse_folder_name(folder.name()) {
                let score = group.score();
                debug!(folder = %folder.name(), group = %group, score, "compiled word-group");
                patterns.push(ScoredPattern {
                    score,
                    folder: FolderIndex(index),
                    group,
                });
            }
        }
        patterns.sort();

        debug!(
            folders = folders.len(),
            patterns = patterns.len(),
            "sieve compiled"
        );

        Self { folders, patterns }
    }

    /// Compiles the sieve from the immediate subdirectories of `sieve_path`.
    ///
    /// Plain files inside the sieve folder are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SiftError::InvalidDirectory` if `sieve_path` is not a directory
    /// and `SiftError::ReadDirFailed` if it cannot be listed.
    pub fn from_directory(sieve_path: &Path) -> SiftResult<Self> {
        if !sieve_path.is_dir() {
            return Err(SiftError::InvalidDirectory {
                path: sieve_path.to_path_buf(),
            });
        }

        let entries = fs::read_dir(sieve_path).map_err(|e| SiftError::ReadDirFailed {
            path: sieve_path.to_path_buf(),
            source: e,
        })?;

        let folders = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir());

        Ok(Self::build(folders))
    }

    pub fn folders(&self) -> &[DestinationFolder] {
        &self.folders
    }

    /// Looks up a folder by the index carried in a pattern or match result.
    pub fn folder(&self, index: FolderIndex) -> &DestinationFolder {
        &self.folders[index.0]
    }

    /// All patterns, in ascending (score, folder, group) order.
    pub fn patterns(&self) -> &[ScoredPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn folder_names(sieve: &Sieve) -> Vec<&str> {
        sieve.folders().iter().map(|f| f.name()).collect()
    }

    #[test]
    fn test_build_sorts_folders_by_name() {
        let sieve = Sieve::build(["Science", "Horror", "E-books (epub)"]);
        assert_eq!(folder_names(&sieve), vec!["E-books (epub)", "Horror", "Science"]);
    }

    #[test]
    fn test_patterns_reference_their_folder() {
        let sieve = Sieve::build(["Science Fiction (sci-fi, space opera)", "Science"]);
        // "Science" sorts before "Science Fiction ..."
        assert_eq!(sieve.folder(FolderIndex(0)).name(), "Science");

        let sci_fi = sieve
            .patterns()
            .iter()
            .find(|p| p.group().source() == "sci-fi")
            .expect("sci-fi group");
        assert_eq!(sci_fi.folder(), FolderIndex(1));
    }

    #[test]
    fn test_patterns_sorted_by_score_then_folder() {
        let sieve = Sieve::build(["Science Fiction (sci-fi, space opera)", "Science"]);
        let order: Vec<(usize, usize, &str)> = sieve
            .patterns()
            .iter()
            .map(|p| (p.score(), p.folder().get(), p.group().source()))
            .collect();
        assert_eq!(
            order,
            vec![
                (5, 1, "sci-fi"),
                (6, 0, "science"),
                (9, 1, "space opera"),
                (13, 1, "science fiction"),
            ]
        );
    }

    #[test]
    fn test_equal_scores_tie_break_on_folder_then_content() {
        let sieve = Sieve::build(["b (zombie, comedy)", "a (zombie)"]);
        let order: Vec<(usize, &str)> = sieve
            .patterns()
            .iter()
            .map(|p| (p.folder().get(), p.group().source()))
            .collect();
        assert_eq!(
            order,
            vec![(0, "a"), (1, "b"), (0, "zombie"), (1, "comedy"), (1, "zombie")]
        );
    }

    #[test]
    fn test_build_is_independent_of_listing_order() {
        let forward = Sieve::build(["Horror (zombie, !comedy)", "Horror Comedy (zombie, comedy)"]);
        let backward = Sieve::build(["Horror Comedy (zombie, comedy)", "Horror (zombie, !comedy)"]);
        assert_eq!(forward.patterns(), backward.patterns());
    }

    #[test]
    fn test_blank_folder_names_contribute_no_patterns() {
        let sieve = Sieve::build(["(,)", "Music"]);
        assert_eq!(sieve.folders().len(), 2);
        assert_eq!(sieve.patterns().len(), 1);
    }

    #[test]
    fn test_from_directory_uses_subfolders_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        fs::create_dir(base_path.join("Horror")).expect("Failed to create folder");
        fs::create_dir(base_path.join("Music (mp3, flac)")).expect("Failed to create folder");
        fs::write(base_path.join("notes.txt"), "not a folder").expect("Failed to write file");

        let sieve = Sieve::from_directory(base_path).expect("Failed to build sieve");
        assert_eq!(folder_names(&sieve), vec!["Horror", "Music (mp3, flac)"]);
        assert_eq!(sieve.folder(FolderIndex(0)).path(), base_path.join("Horror"));
    }

    #[test]
    fn test_from_directory_rejects_missing_path() {
        let result = Sieve::from_directory(Path::new("/non/existent/sieve"));
        assert!(matches!(result, Err(SiftError::InvalidDirectory { .. })));
    }
}
