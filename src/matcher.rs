//! Matching item names against a compiled sieve.
//!
//! Patterns are tried from the most complex to the least complex, that is
//! from the end of the sorted table towards its start. The first satisfied
//! pattern decides where a moved item goes; linked and copied items go to
//! every folder with a satisfied pattern.
//!
//! A group made only of negated words is satisfied by every name that
//! contains none of them.

use crate::sieve::{FolderIndex, ScoredPattern, Sieve};
use crate::word_group::PatternGroup;

impl PatternGroup {
    /// Checks a lower-cased item name against this group.
    ///
    /// Every plain word must occur in the name as a substring and no negated
    /// word may occur in it.
    pub fn is_satisfied_by(&self, lowered_name: &str) -> bool {
        self.words()
            .iter()
            .all(|word| lowered_name.contains(word.text()) != word.is_negated())
    }
}

impl Sieve {
    /// Every pattern satisfied by `item_name`, most complex first.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::sieve::Sieve;
    ///
    /// let sieve = Sieve::build(["Science", "Science Fiction (sci-fi, space opera)"]);
    /// let groups: Vec<_> = sieve
    ///     .matches("Hard Science Fiction Epic")
    ///     .map(|p| p.group().source().to_string())
    ///     .collect();
    /// assert_eq!(groups, vec!["science fiction", "science"]);
    /// ```
    pub fn matches<'a>(&'a self, item_name: &str) -> impl Iterator<Item = &'a ScoredPattern> + 'a {
        let lowered = item_name.to_ascii_lowercase();
        self.patterns()
            .iter()
            .rev()
            .filter(move |pattern| pattern.group().is_satisfied_by(&lowered))
    }

    /// The folder of the highest-priority pattern satisfied by `item_name`.
    pub fn first_match(&self, item_name: &str) -> Option<FolderIndex> {
        self.matches(item_name).next().map(ScoredPattern::folder)
    }

    /// Distinct folders with a satisfied pattern, in priority order.
    pub fn matching_folders(&self, item_name: &str) -> Vec<FolderIndex> {
        let mut folders: Vec<FolderIndex> = Vec::new();
        for pattern in self.matches(item_name) {
            if !folders.contains(&pattern.folder()) {
                folders.push(pattern.folder());
            }
        }
        folders
    }
}
