// Per-caller analysis state: options, scratch frames and compound caches

use std::rc::Rc;

use morfix_core::{Lexicon, Rules, RulesId};

use crate::ControlError;
use crate::affix_cache::AffixCache;
use crate::cache::LruCache;
use crate::compound::PartKey;
use crate::control::AnalysisControl;
use crate::stem::Stem;

/// Default number of entries in each compound cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Mutable state of one analysis caller.
///
/// A context serves one analysis at a time; `&mut` access serializes its
/// use. The compound caches hold stems borrowed from the lexicon and rules
/// of lifetime `'a`, and are dropped whenever the context is used with a
/// different rules value or lexicon, or its options change.
pub struct AnalysisContext<'a> {
    control: AnalysisControl,
    follows: Option<(RulesId, usize)>,
    free: Vec<AffixCache<'a>>,
    condition_sets: usize,
    pub(crate) stems: LruCache<PartKey, Rc<[Stem<'a>]>>,
    pub(crate) decompositions: LruCache<PartKey, Rc<[Stem<'a>]>>,
    /// Reused buffer for lexicon keys.
    pub(crate) key: String,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(control: AnalysisControl) -> Self {
        Self {
            control,
            follows: None,
            free: Vec::new(),
            condition_sets: 0,
            stems: LruCache::new(DEFAULT_CACHE_CAPACITY),
            decompositions: LruCache::new(DEFAULT_CACHE_CAPACITY),
            key: String::new(),
        }
    }

    /// Context with the options [`AnalysisControl::for_rules`] derives.
    pub fn for_rules(rules: &Rules) -> Result<Self, ControlError> {
        Ok(Self::new(AnalysisControl::for_rules(rules)?))
    }

    /// Replace both compound caches with ones of `capacity` entries. Zero
    /// disables compound memoization.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.stems = LruCache::new(capacity);
        self.decompositions = LruCache::new(capacity);
        self
    }

    pub fn control(&self) -> &AnalysisControl {
        &self.control
    }

    /// Change the options. Cached compound results depend on them, so the
    /// caches are cleared.
    pub fn set_control(&mut self, control: AnalysisControl) {
        if self.control != control {
            self.control = control;
            self.clear();
        }
    }

    /// Drop every cached result and scratch frame.
    pub fn clear(&mut self) {
        self.stems.clear();
        self.decompositions.clear();
        self.free.clear();
    }

    /// Number of cached component stem lists and decomposition lists.
    pub fn cached(&self) -> (usize, usize) {
        (self.stems.len(), self.decompositions.len())
    }

    /// Bind the context to `rules` and `lexicon`, resetting it when it was
    /// last used with others.
    pub(crate) fn follow(&mut self, rules: &Rules, lexicon: &dyn Lexicon) {
        let lexicon_addr = lexicon as *const dyn Lexicon as *const () as usize;
        let binding = (rules.id(), lexicon_addr);
        if self.follows != Some(binding) {
            if self.follows.is_some() {
                tracing::debug!(rules = ?rules.id(), "context reset for new rules or lexicon");
            }
            self.clear();
            self.follows = Some(binding);
            self.condition_sets = rules.condition_set_count();
        }
    }

    /// Take a scratch frame, reusing a released one when possible.
    pub(crate) fn acquire_frame(&mut self) -> AffixCache<'a> {
        self.free
            .pop()
            .unwrap_or_else(|| AffixCache::new(self.condition_sets))
    }

    pub(crate) fn release_frame(&mut self, frame: AffixCache<'a>) {
        self.free.push(frame);
    }
}

impl Default for AnalysisContext<'_> {
    fn default() -> Self {
        Self::new(AnalysisControl::default())
    }
}
