/// Filesystem actions for placing sifted items into sieve folders.
///
/// This module moves, hard-links or copies a source item (file or folder)
/// into a destination folder. Folders are replicated for link and copy with an
/// explicit depth-first worklist, so deep trees do not grow the call stack.
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Errors that can occur while reading folders or placing items.
#[derive(Debug)]
pub enum SiftError {
    /// The path is missing or is not a directory.
    InvalidDirectory { path: PathBuf },
    /// Failed to list a directory.
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Something already exists where the item would be placed.
    DestinationExists { path: PathBuf },
    /// Failed to move an item into its sieve folder.
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to hard-link a file.
    LinkFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to copy a file.
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to create a folder while replicating a folder tree.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for SiftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory { path } => {
                write!(f, "Not an existing directory: {}", path.display())
            }
            Self::ReadDirFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::DestinationExists { path } => {
                write!(f, "Destination already exists: {}", path.display())
            }
            Self::MoveFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::LinkFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to link {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::CopyFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for SiftError {}

/// Result type for sift filesystem operations.
pub type SiftResult<T> = Result<T, SiftError>;

/// How files are reproduced when an item is placed without moving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneMethod {
    /// Hard-link files. Source and destination must share a filesystem.
    HardLink,
    /// Copy file contents.
    Copy,
}

/// A failure met while replicating an item.
#[derive(Debug)]
pub struct CloneFailure {
    pub error: SiftError,
    /// True for entries below the item itself.
    pub nested: bool,
}

/// Outcome of linking or copying one item.
#[derive(Debug, Default)]
pub struct CloneReport {
    /// Files linked or copied and folders created.
    pub entries: usize,
    pub failures: Vec<CloneFailure>,
}

impl CloneReport {
    /// True if the item itself could be placed, regardless of nested failures.
    pub fn item_placed(&self) -> bool {
        !self.failures.iter().any(|f| !f.nested)
    }
}

/// Executes the placement of one item.
///
/// `destination` is the full target path, i.e. the sieve folder joined with
/// the item's file name.
pub trait ItemActions {
    fn move_item(&self, source: &Path, destination: &Path) -> SiftResult<()>;

    fn clone_item(&self, source: &Path, destination: &Path, method: CloneMethod) -> CloneReport;
}

/// Performs item actions on the real filesystem.
pub struct FsActions;

impl ItemActions for FsActions {
    /// Renames the item into place. Refuses to replace an existing entry.
    fn move_item(&self, source: &Path, destination: &Path) -> SiftResult<()> {
        if destination.symlink_metadata().is_ok() {
            return Err(SiftError::DestinationExists {
                path: destination.to_path_buf(),
            });
        }

        fs::rename(source, destination).map_err(|e| SiftError::MoveFailed {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source_error: e,
        })
    }

    /// Links or copies a file, or replicates a folder tree.
    ///
    /// Folders that already exist at the destination are merged into.
    /// Failures do not stop the walk; they are collected in the report.
    fn clone_item(&self, source: &Path, destination: &Path, method: CloneMethod) -> CloneReport {
        let mut report = CloneReport::default();
        let mut worklist: Vec<(PathBuf, PathBuf, bool)> =
            vec![(source.to_path_buf(), destination.to_path_buf(), false)];

        while let Some((src, dst, nested)) = worklist.pop() {
            if src.is_dir() {
                match fs::create_dir(&dst) {
                    Ok(()) => report.entries += 1,
                    Err(e) => {
                        let exists = e.kind() == std::io::ErrorKind::AlreadyExists && dst.is_dir();
                        report.failures.push(CloneFailure {
                            error: SiftError::DirectoryCreationFailed {
                                path: dst.clone(),
                                source: e,
                            },
                            nested,
                        });
                        if !exists {
                            continue;
                        }
                    }
                }

                let entries = match fs::read_dir(&src) {
                    Ok(entries) => entries,
                    Err(e) => {
                        report.failures.push(CloneFailure {
                            error: SiftError::ReadDirFailed {
                                path: src.clone(),
                                source: e,
                            },
                            nested,
                        });
                        continue;
                    }
                };

                let mut children: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
                // Reverse so the stack pops children in name order.
                children.sort_by(|a, b| b.cmp(a));
                for child in children {
                    if let Some(name) = child.file_name() {
                        let child_dst = dst.join(name);
                        worklist.push((child, child_dst, true));
                    }
                }
            } else if src.is_file() {
                match clone_file(&src, &dst, method) {
                    Ok(()) => report.entries += 1,
                    Err(error) => report.failures.push(CloneFailure { error, nested }),
                }
            } else {
                trace!(path = %src.display(), "skipping entry that is neither file nor folder");
            }
        }

        report
    }
}

fn clone_file(source: &Path, destination: &Path, method: CloneMethod) -> SiftResult<()> {
    match method {
        CloneMethod::HardLink => {
            fs::hard_link(source, destination).map_err(|e| SiftError::LinkFailed {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
                source_error: e,
            })
        }
        CloneMethod::Copy => {
            if destination.symlink_metadata().is_ok() {
                return Err(SiftError::DestinationExists {
                    path: destination.to_path_buf(),
                });
            }
            fs::copy(source, destination)
                .map(|_| ())
                .map_err(|e| SiftError::CopyFailed {
                    source: source.to_path_buf(),
                    destination: destination.to_path_buf(),
                    source_error: e,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_move_item() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");
        fs::create_dir(base_path.join("Documents")).expect("Failed to create folder");

        let destination = base_path.join("Documents").join("test.txt");
        FsActions
            .move_item(&file_path, &destination)
            .expect("Failed to move file");

        assert!(!file_path.exists());
        assert!(destination.exists());
    }

    #[test]
    fn test_move_item_refuses_to_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "new").expect("Failed to write test file");
        fs::create_dir(base_path.join("Documents")).expect("Failed to create folder");
        let destination = base_path.join("Documents").join("test.txt");
        fs::write(&destination, "old").expect("Failed to write existing file");

        let result = FsActions.move_item(&file_path, &destination);
        assert!(matches!(result, Err(SiftError::DestinationExists { .. })));
        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "old");
    }

    #[test]
    fn test_move_item_missing_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let result = FsActions.move_item(&base_path.join("gone.txt"), &base_path.join("x.txt"));
        assert!(matches!(result, Err(SiftError::MoveFailed { .. })));
    }

    #[test]
    fn test_link_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("song.mp3");
        fs::write(&file_path, "audio").expect("Failed to write test file");
        let destination = base_path.join("song-link.mp3");

        let report = FsActions.clone_item(&file_path, &destination, CloneMethod::HardLink);
        assert!(report.failures.is_empty());
        assert_eq!(report.entries, 1);
        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "audio");
    }

    #[test]
    fn test_link_existing_file_is_top_level_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("song.mp3");
        fs::write(&file_path, "audio").expect("Failed to write test file");
        let destination = base_path.join("taken.mp3");
        fs::write(&destination, "other").expect("Failed to write test file");

        let report = FsActions.clone_item(&file_path, &destination, CloneMethod::HardLink);
        assert!(!report.item_placed());
        assert!(matches!(
            report.failures[0].error,
            SiftError::LinkFailed { .. }
        ));
    }

    #[test]
    fn test_copy_folder_tree() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let album = base_path.join("album");
        fs::create_dir_all(album.join("disc 1")).expect("Failed to create folders");
        fs::write(album.join("cover.jpg"), "jpg").expect("Failed to write file");
        fs::write(album.join("disc 1").join("track.flac"), "flac").expect("Failed to write file");

        let destination = base_path.join("album copy");
        let report = FsActions.clone_item(&album, &destination, CloneMethod::Copy);

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert_eq!(report.entries, 4);
        assert!(destination.join("cover.jpg").is_file());
        assert_eq!(
            fs::read_to_string(destination.join("disc 1").join("track.flac")).unwrap(),
            "flac"
        );
        assert!(album.join("cover.jpg").exists());
    }

    #[test]
    fn test_clone_merges_into_existing_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let album = base_path.join("album");
        fs::create_dir(&album).expect("Failed to create folder");
        fs::write(album.join("a.txt"), "a").expect("Failed to write file");
        fs::write(album.join("b.txt"), "b").expect("Failed to write file");

        let destination = base_path.join("existing");
        fs::create_dir(&destination).expect("Failed to create folder");
        fs::write(destination.join("a.txt"), "old").expect("Failed to write file");

        let report = FsActions.clone_item(&album, &destination, CloneMethod::HardLink);

        // The folder itself already existed and a.txt collided.
        assert_eq!(report.failures.len(), 2);
        assert!(!report.failures[0].nested);
        assert!(report.failures[1].nested);
        assert_eq!(report.entries, 1);
        assert!(destination.join("b.txt").exists());
        assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "old");
    }
}
