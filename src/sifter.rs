//! The sift driver.
//!
//! Collects the source items, runs each one through the sieve in a fixed
//! order and hands matches to the item actions:
//! - `Move` places an item in the first matching folder only.
//! - `Link` and `Copy` place an item in every matching folder.
//! - `Test` touches nothing and reports the items that match no folder.
//!
//! Items are handled strictly one after another. In move mode the order
//! matters, since a moved item is gone from the source.

use crate::config::CompiledFilters;
use crate::item_actions::{CloneMethod, ItemActions, SiftError, SiftResult};
use crate::output::SiftReporter;
use crate::sieve::{FolderIndex, Sieve};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// What to do with a matching item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiftMode {
    Move,
    Link,
    Copy,
    /// Only report items that match nothing.
    #[default]
    Test,
}

impl SiftMode {
    /// Verb used in action lines.
    pub fn verb(self) -> &'static str {
        match self {
            SiftMode::Move => "move",
            SiftMode::Link => "link",
            SiftMode::Copy => "copy",
            SiftMode::Test => "test",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            SiftMode::Move => "moved",
            SiftMode::Link => "linked",
            SiftMode::Copy => "copied",
            SiftMode::Test => "tested",
        }
    }
}

/// Options for one sift run, fixed before the run starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiftOptions {
    pub mode: SiftMode,
    /// Sift the children of the source's subfolders instead of the source's
    /// own children.
    pub deep: bool,
    pub verbose: bool,
    pub quiet: bool,
}

/// A source entry to be sifted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// File name as text, for matching only. Bytes that are not valid UTF-8
    /// are replaced.
    pub name: String,
    pub path: PathBuf,
}

impl Item {
    fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        Some(Self { name, path })
    }

    /// The raw file name placed in destination folders.
    pub fn file_name(&self) -> &OsStr {
        self.path
            .file_name()
            .unwrap_or_else(|| OsStr::new(&self.name))
    }
}

/// Totals of a sift run.
#[derive(Debug, Default)]
pub struct SiftReport {
    /// Items examined.
    pub items: usize,
    /// Items that matched at least one pattern.
    pub matched: usize,
    /// Items that matched nothing, in processing order.
    pub unmatched: Vec<PathBuf>,
    /// Successful moves, links or copies.
    pub placed: usize,
    /// Files linked or copied and folders created, nested ones included.
    pub entries: usize,
    /// Failed placements, including failures inside replicated folders.
    pub failures: Vec<SiftError>,
}

/// Lists the items to sift from `source`, sorted by path.
///
/// In deep mode the children of every subfolder of `source` are listed
/// instead, and files directly inside `source` are ignored. Items rejected by
/// `filters` are skipped.
pub fn collect_items(
    source: &Path,
    deep: bool,
    filters: &CompiledFilters,
) -> SiftResult<Vec<Item>> {
    let mut paths = list_dir(source)?;

    if deep {
        let mut nested = Vec::new();
        for folder in paths.iter().filter(|p| p.is_dir()) {
            nested.extend(list_dir(folder)?);
        }
        paths = nested;
    }

    paths.sort();

    Ok(paths
        .into_iter()
        .filter(|path| filters.should_include(path))
        .filter_map(Item::from_path)
        .collect())
}

fn list_dir(path: &Path) -> SiftResult<Vec<PathBuf>> {
    let entries = fs::read_dir(path).map_err(|e| SiftError::ReadDirFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(entries.flatten().map(|entry| entry.path()).collect())
}

/// Runs items through a sieve and dispatches the matches.
pub struct Sifter<'a, A: ItemActions> {
    sieve: &'a Sieve,
    options: &'a SiftOptions,
    actions: A,
}

impl<'a, A: ItemActions> Sifter<'a, A> {
    pub fn new(sieve: &'a Sieve, options: &'a SiftOptions, actions: A) -> Self {
        Self {
            sieve,
            options,
            actions,
        }
    }

    /// Sifts `items` in the given order.
    ///
    /// Per-item failures are reported and counted; they never stop the run.
    pub fn run(&self, items: &[Item], reporter: &mut dyn SiftReporter) -> SiftReport {
        let mut report = SiftReport::default();
        reporter.begin(items.len());

        for item in items {
            self.sift_item(item, &mut report, reporter);
            reporter.item_done();
        }

        debug!(
            items = report.items,
            matched = report.matched,
            placed = report.placed,
            failed = report.failures.len(),
            "sift finished"
        );
        reporter.finish(&report);
        report
    }

    fn sift_item(&self, item: &Item, report: &mut SiftReport, reporter: &mut dyn SiftReporter) {
        report.items += 1;

        let folders = match self.options.mode {
            SiftMode::Move | SiftMode::Test => {
                self.sieve.first_match(&item.name).into_iter().collect()
            }
            SiftMode::Link | SiftMode::Copy => self.sieve.matching_folders(&item.name),
        };

        if folders.is_empty() {
            trace!(item = %item.name, "no match");
            if self.options.mode == SiftMode::Test {
                reporter.unmatched(&item.path);
            }
            report.unmatched.push(item.path.clone());
            return;
        }

        report.matched += 1;
        for folder in folders {
            self.place(item, folder, report, reporter);
        }
    }

    fn place(
        &self,
        item: &Item,
        folder: FolderIndex,
        report: &mut SiftReport,
        reporter: &mut dyn SiftReporter,
    ) {
        let destination = self.sieve.folder(folder).path().join(item.file_name());
        let mode = self.options.mode;
        trace!(item = %item.name, folder = %folder, mode = mode.verb(), "matched");
        reporter.action(mode, &item.path, &destination);

        let method = match mode {
            SiftMode::Test => return,
            SiftMode::Move => {
                match self.actions.move_item(&item.path, &destination) {
                    Ok(()) => report.placed += 1,
                    Err(error) => {
                        reporter.warning(&error, false);
                        report.failures.push(error);
                    }
                }
                return;
            }
            SiftMode::Link => CloneMethod::HardLink,
            SiftMode::Copy => CloneMethod::Copy,
        };

        let clone = self.actions.clone_item(&item.path, &destination, method);
        if clone.item_placed() {
            report.placed += 1;
        }
        report.entries += clone.entries;
        for failure in clone.failures {
            reporter.warning(&failure.error, failure.nested);
            report.failures.push(failure.error);
        }
    }
}
