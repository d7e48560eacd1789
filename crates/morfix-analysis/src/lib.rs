//! Rule-based morphological analysis over affix rules and dictionaries.
//!
//! Given compiled [`morfix_core::Rules`] and a [`morfix_core::Lexicon`],
//! the [`Analyser`] explains a word as a dictionary form, an inflection by
//! one prefix or suffix, a cross of a prefix and a suffix, a chain of
//! derivations through the nested rule levels, or a compound of independently
//! resolvable components.
//!
//! # Architecture
//!
//! - [`control`] -- Analysis depth, compound options and affix policies
//! - [`context`] -- Per-session state: options, scratch frames, compound caches
//! - [`cache`] -- Bounded LRU map used by the compound caches
//! - [`affix_cache`] -- Per-word scratch of admitted affix entries
//! - [`stem`] -- Dictionary, derived and compound stems
//! - [`analyser`] -- The staged search driver
//! - [`compound`] -- Compound decomposition
//! - [`controller`] -- Compound legality policies
//! - [`analysis`] -- Rendered analysis results
//! - [`istem`] -- Ispell-style verdicts
//! - [`lemma`] -- Base words behind the analyses
//! - `handle` -- Owning facade (feature `handle`)

pub mod affix_cache;
pub mod analyser;
pub mod analysis;
pub mod cache;
pub mod compound;
mod consumer;
pub mod context;
pub mod control;
pub mod controller;
#[cfg(feature = "handle")]
pub mod handle;
pub mod istem;
pub mod lemma;
pub mod stem;

pub use analyser::Analyser;
pub use analysis::{Analysis, AppliedAffix, RootLevel};
pub use cache::LruCache;
pub use compound::CompoundLevel;
pub use context::{AnalysisContext, DEFAULT_CACHE_CAPACITY};
pub use control::{
    AffixIdentifier, AffixOrder, AnalysisControl, CompoundControl, CompoundHint, Depth,
};
pub use controller::{AnyController, CompoundController, FlagController, PosController};
#[cfg(feature = "handle")]
pub use handle::{MorfixError, Morphology};
pub use istem::IStem;
pub use lemma::Lemma;
pub use stem::Stem;

/// Error raised by invalid analysis options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("minimum compound component length {0} outside 1..=6")]
    CompoundMin(usize),
    #[error("maximum compound component count {0} outside 2..=32")]
    CompoundMax(usize),
    #[error("unknown analysis depth {0:?}")]
    UnknownDepth(String),
    #[error("unknown affix identifier {0:?}")]
    UnknownIdentifier(String),
    #[error("unknown compound hint {0:?}")]
    UnknownHint(String),
}
