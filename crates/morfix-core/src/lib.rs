//! Affix rule data model for the morfix morphological analyzer.
//!
//! This crate holds everything that is built once at load time and read
//! concurrently afterwards: character conditions, flag sets, affix entries,
//! the affix lookup tries, the compiled rule chain and the dictionaries.
//!
//! # Architecture
//!
//! - [`character`] -- Simple case mapping and dash classification
//! - [`case`] -- Capitalization classes of dictionary words
//! - [`condition`] -- Character conditions, interned condition sets, check memo
//! - [`flags`] -- Interned flag sets
//! - [`affix`] -- Affix entries and affix groups
//! - [`trie`] -- Affix lookup trie with strip buckets
//! - [`rules`] -- Rule chain assembly and compound flags
//! - [`dict`] -- Dictionary arena and the lexicon interface

pub mod affix;
pub mod case;
pub mod character;
pub mod condition;
pub mod dict;
pub mod flags;
pub mod rules;
pub mod trie;

pub use affix::{Affix, AffixEntry, AffixEntryId, Direction, EntrySpec, LoadOptions, MorphTag};
pub use case::Capitalization;
pub use condition::{Condition, ConditionMemo, ConditionPool, ConditionSet, parse_conditions};
pub use dict::{Dictionaries, Dictionary, EntryId, EntryRef, Lexicon, RawEntry};
pub use flags::{FlagPool, FlagSet};
pub use rules::{CompoundFlags, DerivatorPlacement, Placement, Rules, RulesBuilder, RulesId};
pub use trie::{AffixIndex, Bucket, NodeId};

/// Error raised while building rules or dictionaries.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid condition: {0}")]
    InvalidCondition(String),
    #[error("affix {affix}: strip >>{strip}<< does not satisfy {condition}")]
    StripViolatesConditions {
        affix: char,
        strip: String,
        condition: String,
    },
    #[error("unknown affix flag {0:?}")]
    UnknownAffix(char),
    #[error("affix flag {0:?} already declared with the other direction")]
    AffixDirectionConflict(char),
    #[error("affix {0:?} is sealed")]
    AffixSealed(char),
    #[error("unknown dictionary entry {0}")]
    UnknownEntry(usize),
    #[error("entry {0:?} cannot be its own root")]
    SelfRoot(String),
    #[error("root link of {0:?} would close a cycle")]
    RootCycle(String),
}

/// Maximum length of an analysed word, in characters. Longer input gets no
/// analysis.
pub const MAX_WORD_LENGTH: usize = 64;
