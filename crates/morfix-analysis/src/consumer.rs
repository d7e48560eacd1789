// Acceptance strategies for stems produced by the search

use morfix_core::{AffixEntry, Direction};

use crate::analyser::Search;
use crate::stem::Stem;

/// Whether the search goes on after a stem was handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Receiver of candidate stems.
///
/// Every stage of the search hands the stems it resolves to a consumer,
/// which decides whether they make an analysis, feed a derivation one level
/// up, or are merely collected.
pub(crate) trait Consumer<'a> {
    fn accept(&mut self, search: &mut Search<'_, 'a>, stem: Stem<'a>) -> Flow;

    /// Whether nothing more is wanted from the current search.
    fn done(&self, search: &Search<'_, 'a>) -> bool;

    /// Whether dictionary lookups may relax capitalization.
    fn ignore_case(&self) -> bool {
        false
    }
}

fn top_flow(search: &Search<'_, '_>) -> Flow {
    if search.top_done() {
        Flow::Stop
    } else {
        Flow::Continue
    }
}

/// Records whole words resolved at the top: dictionary entries, words
/// derived through the nested levels, and compounds.
pub(crate) struct TopDict;

impl<'a> Consumer<'a> for TopDict {
    fn accept(&mut self, search: &mut Search<'_, 'a>, stem: Stem<'a>) -> Flow {
        search.record(stem, None, None);
        top_flow(search)
    }

    fn done(&self, search: &Search<'_, 'a>) -> bool {
        search.top_done()
    }
}

/// Records stems that take one top-level affix entry.
pub(crate) struct Inflexion<'a> {
    affix: &'a AffixEntry,
    pub(crate) accepted: bool,
}

impl<'a> Inflexion<'a> {
    pub(crate) fn new(affix: &'a AffixEntry) -> Self {
        Self {
            affix,
            accepted: false,
        }
    }
}

impl<'a> Consumer<'a> for Inflexion<'a> {
    fn accept(&mut self, search: &mut Search<'_, 'a>, stem: Stem<'a>) -> Flow {
        if !stem.has_flag(self.affix) {
            return Flow::Continue;
        }
        self.accepted = true;
        match self.affix.direction() {
            Direction::Prefix => search.record(stem, Some(self.affix), None),
            Direction::Suffix => search.record(stem, None, Some(self.affix)),
        }
        top_flow(search)
    }

    fn done(&self, search: &Search<'_, 'a>) -> bool {
        search.top_done()
    }

    fn ignore_case(&self) -> bool {
        self.affix.ignore_case()
    }
}

/// Records stems that take a crossable prefix and a crossable suffix
/// together.
pub(crate) struct Cross<'a> {
    prefix: &'a AffixEntry,
    suffix: &'a AffixEntry,
}

impl<'a> Cross<'a> {
    pub(crate) fn new(prefix: &'a AffixEntry, suffix: &'a AffixEntry) -> Self {
        Self { prefix, suffix }
    }
}

impl<'a> Consumer<'a> for Cross<'a> {
    fn accept(&mut self, search: &mut Search<'_, 'a>, stem: Stem<'a>) -> Flow {
        if stem.has_flag(self.prefix) && stem.has_flag(self.suffix) {
            search.record(stem, Some(self.prefix), Some(self.suffix));
            return top_flow(search);
        }
        Flow::Continue
    }

    fn done(&self, search: &Search<'_, 'a>) -> bool {
        search.top_done()
    }

    fn ignore_case(&self) -> bool {
        self.prefix.ignore_case() || self.suffix.ignore_case()
    }
}

/// Derives a new stem through a nested-level entry and passes it on.
pub(crate) struct Derivation<'p, 'a> {
    affix: &'a AffixEntry,
    parent: &'p mut dyn Consumer<'a>,
    pub(crate) accepted: bool,
}

impl<'p, 'a> Derivation<'p, 'a> {
    pub(crate) fn new(affix: &'a AffixEntry, parent: &'p mut dyn Consumer<'a>) -> Self {
        Self {
            affix,
            parent,
            accepted: false,
        }
    }
}

impl<'a> Consumer<'a> for Derivation<'_, 'a> {
    fn accept(&mut self, search: &mut Search<'_, 'a>, stem: Stem<'a>) -> Flow {
        if !stem.flags().contains(self.affix.flag()) {
            return Flow::Continue;
        }
        self.accepted = true;
        let derived = Stem::derive(self.affix, stem);
        self.parent.accept(search, derived)
    }

    fn done(&self, search: &Search<'_, 'a>) -> bool {
        self.parent.done(search)
    }

    fn ignore_case(&self) -> bool {
        self.affix.ignore_case() || self.parent.ignore_case()
    }
}

/// Gathers every stem it is offered.
pub(crate) struct Collector<'a> {
    pub(crate) stems: Vec<Stem<'a>>,
    ignore_case: bool,
}

impl Collector<'_> {
    pub(crate) fn new(ignore_case: bool) -> Self {
        Self {
            stems: Vec::new(),
            ignore_case,
        }
    }
}

impl<'a> Consumer<'a> for Collector<'a> {
    fn accept(&mut self, _search: &mut Search<'_, 'a>, stem: Stem<'a>) -> Flow {
        self.stems.push(stem);
        Flow::Continue
    }

    fn done(&self, _search: &Search<'_, 'a>) -> bool {
        false
    }

    fn ignore_case(&self) -> bool {
        self.ignore_case
    }
}
