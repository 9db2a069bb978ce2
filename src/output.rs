//! Output formatting and reporting.
//!
//! `OutputFormatter` styles individual lines. `ConsoleReporter` decides which
//! lines a sift run prints, based on the verbose and quiet options, and draws
//! a progress bar for long runs.

use crate::item_actions::SiftError;
use crate::sifter::{SiftMode, SiftOptions, SiftReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Styles CLI output consistently.
///
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Action lines (bold verb, dimmed destination)
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sift::output::OutputFormatter;
    /// OutputFormatter::error("source must be an existing directory");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow to stderr.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints one action line: the verb, then source and destination.
    pub fn action(verb: &str, source: &Path, destination: &Path) {
        println!(
            "{}\t{}\n\t{}",
            verb.bold(),
            source.display(),
            destination.display().to_string().dimmed()
        );
    }

    /// Creates a progress bar for sifting `total` items.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints the closing summary of a sift run.
    pub fn summary(report: &SiftReport, mode: SiftMode) {
        let item_word = |n: usize| if n == 1 { "item" } else { "items" };

        println!(
            "\n{} {} {}, {} matched, {} unmatched",
            "Sifted".bold(),
            report.items.to_string().green(),
            item_word(report.items),
            report.matched.to_string().green(),
            report.unmatched.len().to_string().yellow(),
        );

        match mode {
            SiftMode::Test => {}
            SiftMode::Move => println!(
                "  {}: {}",
                mode.past_tense(),
                report.placed.to_string().green()
            ),
            SiftMode::Link | SiftMode::Copy => println!(
                "  {}: {} ({} entries)",
                mode.past_tense(),
                report.placed.to_string().green(),
                report.entries
            ),
        }
        if !report.failures.is_empty() {
            println!("  failed: {}", report.failures.len().to_string().red());
        }
    }
}

/// Receives the events of a sift run as they happen.
pub trait SiftReporter {
    /// A run over `total` items is about to start.
    fn begin(&mut self, _total: usize) {}

    /// An item is being placed (or, in test mode, would be placed).
    fn action(&mut self, mode: SiftMode, source: &Path, destination: &Path);

    /// A placement failed. `nested` is set for entries inside a replicated folder.
    fn warning(&mut self, error: &SiftError, nested: bool);

    /// An item matched no pattern. Only reported in test mode.
    fn unmatched(&mut self, item: &Path);

    /// One item has been handled.
    fn item_done(&mut self) {}

    fn finish(&mut self, _report: &SiftReport) {}
}

/// Prints sift events to the terminal.
///
/// Action lines appear only when verbose. Warnings appear unless quiet
/// (verbose overrides quiet), and warnings about nested entries appear only
/// when verbose.
pub struct ConsoleReporter {
    verbose: bool,
    quiet: bool,
    mode: SiftMode,
    progress: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(options: &SiftOptions) -> Self {
        Self {
            verbose: options.verbose,
            quiet: options.quiet,
            mode: options.mode,
            progress: None,
        }
    }

    fn shows_warning(&self, nested: bool) -> bool {
        if nested {
            self.verbose
        } else {
            self.verbose || !self.quiet
        }
    }

    fn print_line(&self, line: impl FnOnce()) {
        match &self.progress {
            Some(pb) => pb.suspend(line),
            None => line(),
        }
    }
}

impl SiftReporter for ConsoleReporter {
    fn begin(&mut self, total: usize) {
        if self.mode != SiftMode::Test && !self.verbose && !self.quiet && total > 0 {
            self.progress = Some(OutputFormatter::create_progress_bar(total as u64));
        }
    }

    fn action(&mut self, mode: SiftMode, source: &Path, destination: &Path) {
        if self.verbose {
            self.print_line(|| OutputFormatter::action(mode.verb(), source, destination));
        }
    }

    fn warning(&mut self, error: &SiftError, nested: bool) {
        if self.shows_warning(nested) {
            let message = format!("Warning! {}", error);
            self.print_line(|| OutputFormatter::warning(&message));
        }
    }

    fn unmatched(&mut self, item: &Path) {
        let message = format!("No match: {}", item.display());
        self.print_line(|| OutputFormatter::plain(&message));
    }

    fn item_done(&mut self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    fn finish(&mut self, report: &SiftReport) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
        if !self.quiet || self.verbose {
            OutputFormatter::summary(report, self.mode);
        }
    }
}
