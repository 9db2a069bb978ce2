//! Word-group parsing for sieve folder names.
//!
//! A sieve folder name encodes one or more word-groups. Groups are separated
//! by `(`, `)` or `,`; words inside a group are separated by spaces. A word
//! prefixed with `!` must NOT occur in a matching item name.
//!
//! # Examples
//!
//! ```
//! use sift::word_group::parse_folder_name;
//!
//! let groups = parse_folder_name("Science Fiction (sci-fi, space opera)");
//! assert_eq!(groups.len(), 3);
//! assert_eq!(groups[0].source(), "science fiction");
//! assert_eq!(groups[0].score(), 13);
//! ```

use std::fmt;

/// Characters that separate word-groups inside a folder name.
pub const GROUP_DELIMITERS: [char; 3] = ['(', ')', ','];

/// Prefix marking a word that must not occur in the item name.
pub const NEGATION_PREFIX: char = '!';

/// A single lower-cased word of a word-group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word {
    text: String,
    negated: bool,
}

impl Word {
    /// Parses one space-delimited token. A leading `!` is stripped and
    /// recorded as negation.
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix(NEGATION_PREFIX) {
            Some(rest) => Self {
                text: rest.to_string(),
                negated: true,
            },
            None => Self {
                text: token.to_string(),
                negated: false,
            },
        }
    }

    /// The word without its negation prefix.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True if the word must be absent from a matching item name.
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "{}{}", NEGATION_PREFIX, self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

/// One word-group of a sieve folder name.
///
/// Keeps the trimmed, lower-cased source text the group was parsed from, so
/// that its complexity score can be derived and it can be shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternGroup {
    words: Vec<Word>,
    source: String,
}

impl PatternGroup {
    /// Parses a single already-delimited segment.
    ///
    /// Returns `None` when the segment is blank after trimming.
    pub fn parse(segment: &str) -> Option<Self> {
        let source = segment.trim();
        if source.is_empty() {
            return None;
        }

        let words = source
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(Word::parse)
            .collect();

        Some(Self {
            words,
            source: source.to_string(),
        })
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// The group text as it appeared in the folder name, trimmed and lower-cased.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Complexity of the group: its character length minus its word count.
    ///
    /// Fewer, longer words score higher than the same text split into many
    /// short words. Every word is at least one character long, so the
    /// subtraction cannot underflow.
    pub fn score(&self) -> usize {
        self.source.chars().count() - self.words.len()
    }
}

impl fmt::Display for PatternGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Splits a sieve folder name into its word-groups.
///
/// The name is trimmed and lower-cased (ASCII letters only) before splitting.
/// Blank segments, including the ones produced by adjacent delimiters, are
/// dropped silently.
pub fn parse_folder_name(raw_name: &str) -> Vec<PatternGroup> {
    let name = raw_name.trim().to_ascii_lowercase();

    name.split(GROUP_DELIMITERS)
        .filter_map(PatternGroup::parse)
        .collect()
}
