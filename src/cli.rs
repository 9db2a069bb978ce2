//! Command-line interface for sift.
//!
//! Parses the arguments into an immutable `SiftOptions`, validates the source
//! and sieve folders, and drives one sift run with console reporting.

use crate::config::FilterConfig;
use crate::item_actions::FsActions;
use crate::output::ConsoleReporter;
use crate::sieve::Sieve;
use crate::sifter::{SiftMode, SiftOptions, SiftReport, Sifter, collect_items};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;

const LONG_ABOUT: &str = "\
sift moves or links items (files or folders) in a source folder to matching
subfolders of a destination \"sieve\" folder. A destination subfolder matches
if its name contains a word-group whose words are all found in the name of
the item being tested. With --move the item goes to the first matching folder.

Word-groups are separated by ',', ')' or '('. Prefix a word with '!' to require
that it does NOT occur in the item name. Word order, spaces and case (a-z/A-Z)
are ignored when matching.

Example destination subfolder names:

  /sieve/Science Fiction (sci-fi, space opera)/
  /sieve/Science/
  /sieve/E-books, (epub, pdf, cbr, cbz, djvu, mobi, azw3)/

Word-groups are tried in order of decreasing complexity, measured as the
length of the word-group minus its number of words. Fewer, longer words are
considered harder to match than the same words split into shorter ones.

Destination and source folders must be on the same filesystem for --move and
--link. With --deep a previous sieve folder can be used as the next source, to
refine the sifting in several chained steps.";

/// A file sifter.
#[derive(Debug, Parser)]
#[command(
    name = "sift",
    version,
    about = "sift - a file sifter",
    long_about = LONG_ABOUT,
    args_override_self = true
)]
pub struct Cli {
    /// Move items (files and/or folders).
    #[arg(short, long, overrides_with_all = ["link", "copy", "test"])]
    pub r#move: bool,

    /// Make folders in destination, hardlink files from source.
    #[arg(short, long, overrides_with_all = ["move", "copy", "test"])]
    pub link: bool,

    /// Make folders in destination, copy files from source.
    #[arg(short, long, overrides_with_all = ["move", "link", "test"])]
    pub copy: bool,

    /// Report items failing to match anything (default).
    #[arg(short, long, overrides_with_all = ["move", "link", "copy"])]
    pub test: bool,

    /// Sift deeper, using the items inside the source's subfolders.
    #[arg(short, long)]
    pub deep: bool,

    /// Don't show warnings about failed moves and links.
    #[arg(short, long)]
    pub quiet: bool,

    /// Output info about moved/linked items.
    #[arg(short, long)]
    pub verbose: bool,

    /// Item filter configuration file (TOML).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Folder holding the items to sift.
    pub source: PathBuf,

    /// Sieve folder whose subfolders receive the items.
    pub destination: PathBuf,
}

impl Cli {
    /// The run options selected by the flags. Test mode unless another mode
    /// was given; of several modes the last one wins.
    pub fn options(&self) -> SiftOptions {
        let mode = if self.r#move {
            SiftMode::Move
        } else if self.link {
            SiftMode::Link
        } else if self.copy {
            SiftMode::Copy
        } else {
            SiftMode::Test
        };

        SiftOptions {
            mode,
            deep: self.deep,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

/// Runs one sift from `source` into the sieve at `destination`.
///
/// Both folders are checked before anything is touched. Failures while
/// placing individual items are reported and counted in the returned
/// `SiftReport`; they do not make this function fail.
///
/// # Examples
///
/// ```no_run
/// use sift::cli::run_cli;
/// use sift::sifter::SiftOptions;
/// use std::path::Path;
///
/// let options = SiftOptions::default();
/// let result = run_cli(&options, Path::new("/downloads"), Path::new("/library"), None);
/// match result {
///     Ok(report) => println!("{} items unmatched", report.unmatched.len()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(
    options: &SiftOptions,
    source: &Path,
    destination: &Path,
    config_path: Option<&Path>,
) -> Result<SiftReport, String> {
    if !source.is_dir() || !destination.is_dir() {
        return Err("source and destination must be specified and exist!".to_string());
    }

    let filters = FilterConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?
        .compile()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    let sieve = Sieve::from_directory(destination).map_err(|e| e.to_string())?;
    let items = collect_items(source, options.deep, &filters).map_err(|e| e.to_string())?;
    debug!(
        source = %source.display(),
        destination = %destination.display(),
        items = items.len(),
        mode = options.mode.verb(),
        "starting sift"
    );

    let mut reporter = ConsoleReporter::new(options);
    Ok(Sifter::new(&sieve, options, FsActions).run(&items, &mut reporter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sift").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn test_default_mode_is_test() {
        let cli = parse(&["src", "dst"]);
        let options = cli.options();
        assert_eq!(options.mode, SiftMode::Test);
        assert!(!options.deep && !options.verbose && !options.quiet);
        assert_eq!(cli.source, PathBuf::from("src"));
        assert_eq!(cli.destination, PathBuf::from("dst"));
    }

    #[test]
    fn test_last_mode_wins() {
        assert_eq!(parse(&["-m", "-l", "src", "dst"]).options().mode, SiftMode::Link);
        assert_eq!(parse(&["--link", "--move", "src", "dst"]).options().mode, SiftMode::Move);
        assert_eq!(parse(&["-m", "-t", "src", "dst"]).options().mode, SiftMode::Test);
        assert_eq!(parse(&["-t", "-c", "src", "dst"]).options().mode, SiftMode::Copy);
    }

    #[test]
    fn test_flags() {
        let options = parse(&["-d", "-q", "-v", "--move", "src", "dst"]).options();
        assert_eq!(options.mode, SiftMode::Move);
        assert!(options.deep && options.quiet && options.verbose);
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        assert!(Cli::try_parse_from(["sift", "--bogus", "src", "dst"]).is_err());
    }

    #[test]
    fn test_missing_destination_is_an_error() {
        assert!(Cli::try_parse_from(["sift", "src"]).is_err());
    }

    #[test]
    fn test_run_cli_rejects_missing_folders() {
        let result = run_cli(
            &SiftOptions::default(),
            Path::new("/non/existent/source"),
            Path::new("/non/existent/sieve"),
            None,
        );
        assert!(result.is_err());
    }
}
