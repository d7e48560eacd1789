// Capitalization classes of dictionary words

use crate::character::{is_upper, lower_chars, upper_chars};

/// Capitalization class of a dictionary word.
///
/// The class decides which literal casings of an input word may resolve to
/// the entry: an all-lowercase entry admits any casing, a capitalized entry
/// admits forms starting with an uppercase letter, and the remaining classes
/// require the exact spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capitalization {
    /// Equal to its own lowercase form: "cat", "123".
    AllLower,
    /// Only the first character differs from the lowercase form: "Paris".
    Capitalized,
    /// Equal to its own uppercase form: "NATO".
    AllCapitalized,
    /// Any other mix: "McDonald", "iPhone".
    Funny,
}

impl Capitalization {
    /// Classify a word.
    pub fn of(word: &[char]) -> Self {
        let lower = lower_chars(word);
        if lower.as_slice() == word {
            return Capitalization::AllLower;
        }
        if lower[1..] == word[1..] {
            return Capitalization::Capitalized;
        }
        if upper_chars(word).as_slice() == word {
            Capitalization::AllCapitalized
        } else {
            Capitalization::Funny
        }
    }

    /// Short name used in rendered entries.
    pub fn name(self) -> &'static str {
        match self {
            Capitalization::AllLower => "none",
            Capitalization::Capitalized => "cap",
            Capitalization::AllCapitalized => "all",
            Capitalization::Funny => "funny",
        }
    }

    /// Whether `input` is an admissible casing of `word`, which has this class.
    ///
    /// `word` and `input` are already known to be equal ignoring case.
    pub fn admits(self, word: &[char], input: &[char]) -> bool {
        match self {
            Capitalization::AllLower => true,
            Capitalization::Capitalized => input.first().is_some_and(|&c| is_upper(c)),
            Capitalization::AllCapitalized | Capitalization::Funny => word == input,
        }
    }

    /// Relaxed admission used while an ignore-case affix is being tried:
    /// lowercase and capitalized entries accept any casing, the rest still
    /// require the exact spelling.
    pub fn admits_lower(self, word: &[char], input: &[char]) -> bool {
        match self {
            Capitalization::AllLower | Capitalization::Capitalized => true,
            Capitalization::AllCapitalized | Capitalization::Funny => word == input,
        }
    }
}
