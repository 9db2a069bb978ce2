//! sift - sort files and folders into a "sieve" of destination folders
//!
//! Every subfolder of the sieve describes, in its own name, which items belong
//! in it: word-groups separated by `(`, `)` or `,`, with `!` marking words that
//! must not occur. This library parses those names into scored patterns,
//! matches item names against them from the most to the least complex, and
//! moves, links or copies the items accordingly.

pub mod cli;
pub mod config;
pub mod item_actions;
pub mod matcher;
pub mod output;
pub mod sieve;
pub mod sifter;
pub mod word_group;

pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use item_actions::{FsActions, ItemActions, SiftError, SiftResult};
pub use sieve::{DestinationFolder, FolderIndex, ScoredPattern, Sieve};
pub use sifter::{Item, SiftMode, SiftOptions, SiftReport, Sifter};
pub use word_group::{PatternGroup, Word, parse_folder_name};

pub use cli::run_cli;
