// Analysis driver: dictionary lookup, affix stages, cross stage and recursion

use hashbrown::HashSet;
use morfix_core::character::{is_dash, lower_chars};
use morfix_core::{AffixEntry, Direction, FlagSet, Lexicon, MAX_WORD_LENGTH, Rules};

use crate::ControlError;
use crate::affix_cache::AffixCache;
use crate::analysis::Analysis;
use crate::compound::CompoundState;
use crate::consumer::{Collector, Consumer, Cross, Derivation, Flow, Inflexion, TopDict};
use crate::context::AnalysisContext;
use crate::control::{AffixOrder, Depth};
use crate::controller::CompoundController;
use crate::istem::IStem;
use crate::stem::Stem;

/// Morphological analyser over borrowed rules, lexicon and compound policy.
///
/// The analyser itself is stateless and `Copy`; everything that changes
/// during an analysis lives in the [`AnalysisContext`] passed to each call.
#[derive(Clone, Copy)]
pub struct Analyser<'a> {
    rules: &'a Rules,
    lexicon: &'a dyn Lexicon,
    controller: &'a dyn CompoundController,
}

impl<'a> Analyser<'a> {
    pub fn new(
        rules: &'a Rules,
        lexicon: &'a dyn Lexicon,
        controller: &'a dyn CompoundController,
    ) -> Self {
        Self {
            rules,
            lexicon,
            controller,
        }
    }

    pub fn rules(&self) -> &'a Rules {
        self.rules
    }

    pub fn lexicon(&self) -> &'a dyn Lexicon {
        self.lexicon
    }

    pub fn controller(&self) -> &'a dyn CompoundController {
        self.controller
    }

    /// A fresh context with options derived from the rules.
    pub fn context(&self) -> Result<AnalysisContext<'a>, ControlError> {
        AnalysisContext::for_rules(self.rules)
    }

    /// Every analysis of `word` the options in `ctx` license.
    ///
    /// Empty and over-long words (see [`MAX_WORD_LENGTH`]) have none.
    pub fn analyse(&self, word: &str, ctx: &mut AnalysisContext<'a>) -> Vec<Analysis> {
        let found = self.search(word, ctx);
        let analyses: Vec<Analysis> = found
            .iter()
            .map(|f| Analysis::new(word, &f.stem, f.prefix, f.suffix))
            .collect();
        tracing::debug!(word, analyses = analyses.len(), "word analysed");
        analyses
    }

    /// Stems recorded for `word`, with the top-level affixes they took.
    pub(crate) fn search(&self, word: &str, ctx: &mut AnalysisContext<'a>) -> Vec<Found<'a>> {
        ctx.follow(self.rules, self.lexicon);
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() || chars.len() >= MAX_WORD_LENGTH {
            tracing::debug!(word, len = chars.len(), "word not analysed");
            return Vec::new();
        }
        Search::new(*self, ctx).run(&chars)
    }

    /// Ispell-style verdict on `word`, echoing `offset` when nothing is
    /// found.
    pub fn istem(&self, word: &str, offset: usize, ctx: &mut AnalysisContext<'a>) -> IStem {
        match self.analyse(word, ctx).into_iter().next() {
            Some(analysis) => IStem::of(word, analysis),
            None => IStem::NotFound {
                word: word.to_string(),
                offset,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// A stem recorded as an analysis, with the top-level affixes it took.
pub(crate) struct Found<'a> {
    pub(crate) stem: Stem<'a>,
    pub(crate) prefix: Option<&'a AffixEntry>,
    pub(crate) suffix: Option<&'a AffixEntry>,
}

fn same_entry(a: Option<&AffixEntry>, b: Option<&AffixEntry>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => std::ptr::eq(x, y),
        (None, None) => true,
        _ => false,
    }
}

/// What the dictionary step of the current (sub)search may do.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope {
    /// Try the word as a compound.
    pub(crate) compound: bool,
    /// Look the word up in the lexicon.
    pub(crate) homonyms: bool,
}

/// State of one `analyse` call.
pub(crate) struct Search<'s, 'a> {
    pub(crate) analyser: Analyser<'a>,
    pub(crate) ctx: &'s mut AnalysisContext<'a>,
    found: Vec<Found<'a>>,
    /// Stage the top level is in.
    stage: Depth,
    /// Stage reported to consumers instead of the current one.
    frozen: Option<Depth>,
    pub(crate) scope: Scope,
    pub(crate) compound: CompoundState,
}

impl<'s, 'a> Search<'s, 'a> {
    fn new(analyser: Analyser<'a>, ctx: &'s mut AnalysisContext<'a>) -> Self {
        Self {
            analyser,
            ctx,
            found: Vec::new(),
            stage: Depth::FirstStem,
            frozen: None,
            scope: Scope {
                compound: false,
                homonyms: true,
            },
            compound: CompoundState::default(),
        }
    }

    /// Run the direct stages, then escalate through the compound levels
    /// while nothing satisfies the configured depth.
    fn run(mut self, word: &[char]) -> Vec<Found<'a>> {
        let lower = lower_chars(word);
        let mut top = TopDict;

        self.do_analysis(word, &lower, 0, true, &mut top);
        self.stage = Depth::AllCrosses;

        let control = *self.ctx.control();
        if !top.done(&self) && control.compound.enabled() {
            self.scope = Scope {
                compound: true,
                homonyms: false,
            };
            self.frozen = Some(Depth::FirstCompound);
            for &level in CompoundState::levels(control.all_compounds()) {
                self.compound.level = level;
                if self.do_analysis(word, &lower, 0, true, &mut top) || top.done(&self) {
                    break;
                }
            }
        }
        self.found
    }

    /// Whether the top-level result set satisfies the configured depth.
    pub(crate) fn top_done(&self) -> bool {
        !self.found.is_empty() && self.ctx.control().depth <= self.frozen.unwrap_or(self.stage)
    }

    pub(crate) fn record(
        &mut self,
        stem: Stem<'a>,
        prefix: Option<&'a AffixEntry>,
        suffix: Option<&'a AffixEntry>,
    ) {
        let seen = self.found.iter().any(|f| {
            f.stem.same(&stem) && same_entry(f.prefix, prefix) && same_entry(f.suffix, suffix)
        });
        if !seen {
            self.found.push(Found {
                stem,
                prefix,
                suffix,
            });
        }
    }

    fn set_stage(&mut self, level: usize, stage: Depth) {
        if level == 0 {
            self.stage = stage;
        }
    }

    // -- word analysis -------------------------------------------------------

    /// Analyse `word` at rule level `level`. Returns `true` when the search
    /// should stop.
    fn do_analysis(
        &mut self,
        word: &[char],
        lower: &[char],
        level: usize,
        dict: bool,
        consumer: &mut dyn Consumer<'a>,
    ) -> bool {
        if word.is_empty() || word.len() >= MAX_WORD_LENGTH {
            return false;
        }
        self.set_stage(level, Depth::FirstStem);

        if dict {
            let saved = self.scope;
            if level == 0 && self.ctx.control().affix_first {
                self.scope.compound = false;
            }
            let stop = self.homonyms(word, lower, consumer);
            self.scope = saved;
            if stop || consumer.done(self) {
                return true;
            }
        }

        let mut frame = self.ctx.acquire_frame();
        frame.reset(word, lower);
        let stop = self.affix_stages(word, lower, &mut frame, level, consumer);
        self.ctx.release_frame(frame);
        stop
    }

    fn affix_stages(
        &mut self,
        word: &[char],
        lower: &[char],
        frame: &mut AffixCache<'a>,
        level: usize,
        consumer: &mut dyn Consumer<'a>,
    ) -> bool {
        for (stage, direction) in [
            (Depth::FirstSuffix, Direction::Suffix),
            (Depth::FirstPrefix, Direction::Prefix),
        ] {
            self.set_stage(level, stage);
            if consumer.done(self)
                || self.affix_stage(word, lower, frame, level, direction, consumer)
                || consumer.done(self)
            {
                return true;
            }
        }
        if level > 0 {
            return false;
        }

        self.set_stage(0, Depth::FirstCross);
        if consumer.done(self) || self.cross_stage(word, frame) || consumer.done(self) {
            return true;
        }

        // The literal word through the nested levels: derived words that
        // carry no top-level affix.
        self.set_stage(0, Depth::FirstStem);
        if self.analyser.rules.has_level(1)
            && (self.do_analysis(word, lower, 1, false, consumer) || consumer.done(self))
        {
            return true;
        }

        if self.scope.compound && self.ctx.control().affix_first {
            self.set_stage(0, Depth::FirstCompound);
            return self.compound(word, lower, consumer);
        }
        false
    }

    /// Try every entry of one direction at `level` against `word`.
    fn affix_stage(
        &mut self,
        word: &[char],
        lower: &[char],
        frame: &mut AffixCache<'a>,
        level: usize,
        direction: Direction,
        consumer: &mut dyn Consumer<'a>,
    ) -> bool {
        let rules = self.analyser.rules;
        let Some(index) = rules.level(level).map(|l| l.index(direction)) else {
            return false;
        };
        if index.is_empty() {
            return false;
        }

        // Walk the trie from the outer edge. Each reached node is a candidate
        // append ending at split position `p`; a dash with no edge lets the
        // last node apply across it.
        let n = word.len();
        let mut nodes = Vec::new();
        let mut node = index.root();
        for k in 1..n {
            let (p, c) = match direction {
                Direction::Suffix => (n - k, lower[n - k]),
                Direction::Prefix => (k, lower[k - 1]),
            };
            match index.child(node, c) {
                Some(next) => {
                    node = next;
                    nodes.push((p, next, false));
                }
                None => {
                    if !nodes.is_empty() && is_dash(c) {
                        nodes.push((p, node, true));
                    }
                    break;
                }
            }
        }

        let control = *self.ctx.control();
        if control.order(direction) == AffixOrder::LongestFirst {
            nodes.reverse();
        }

        for (p, node, dash) in nodes {
            let (rem, rem_lower) = match direction {
                Direction::Suffix => (&word[..p], &lower[..p]),
                Direction::Prefix => (&word[p..], &lower[p..]),
            };
            frame.memo().next_round();

            for bucket in index.buckets(node) {
                let multi = bucket.len() > 1;
                let mut seen: HashSet<(&FlagSet, &str)> = HashSet::new();
                let mut stems: Option<Vec<Stem<'a>>> = None;

                for &id in bucket.entries() {
                    let entry: &'a AffixEntry = rules.entry(id);
                    if multi && seen.contains(&control.identifier.key(entry)) {
                        continue;
                    }
                    if !dash && !entry.admit_stem(rem_lower, frame.memo()) {
                        continue;
                    }

                    // Entries of one bucket share the strip, so they share
                    // the stem candidates.
                    if stems.is_none() {
                        let ignore_case = entry.ignore_case() || consumer.ignore_case();
                        stems = Some(if entry.same() {
                            self.collect(word, lower, None, ignore_case)
                        } else if !dash && !entry.strip_chars().is_empty() {
                            let stem = entry.add_strip(rem);
                            let stem_lower = lower_chars(&stem);
                            self.collect(&stem, &stem_lower, Some(level), ignore_case)
                        } else {
                            self.collect(rem, rem_lower, Some(level), ignore_case)
                        });
                    }
                    let candidates = stems.as_deref().unwrap_or_default();

                    let (stop, accepted) = self.feed(level, entry, candidates, consumer);
                    if stop {
                        return true;
                    }
                    if accepted && multi {
                        seen.insert(control.identifier.key(entry));
                    }
                    if level == 0 && entry.crossable() {
                        frame.admit_crossable(p, entry);
                    }
                }
            }
        }
        false
    }

    /// Stems of `word`: its lexicon entries when `level` is `None`, or the
    /// result of analysing it one level below `level`.
    fn collect(
        &mut self,
        word: &[char],
        lower: &[char],
        level: Option<usize>,
        ignore_case: bool,
    ) -> Vec<Stem<'a>> {
        let mut collector = Collector::new(ignore_case);
        // A collector never asks to stop.
        match level {
            None => self.homonyms(word, lower, &mut collector),
            Some(level) => self.subanalyse(word, lower, level, &mut collector),
        };
        collector.stems
    }

    /// Offer `stems` to `entry`: as an inflexion at the top level, as a
    /// derivation feeding `consumer` below it. Returns whether to stop and
    /// whether any stem took the entry.
    fn feed(
        &mut self,
        level: usize,
        entry: &'a AffixEntry,
        stems: &[Stem<'a>],
        consumer: &mut dyn Consumer<'a>,
    ) -> (bool, bool) {
        if level == 0 {
            let mut inflexion = Inflexion::new(entry);
            for stem in stems {
                if inflexion.accept(self, stem.clone()) == Flow::Stop {
                    return (true, true);
                }
            }
            (false, inflexion.accepted)
        } else {
            let mut derivation = Derivation::new(entry, consumer);
            for stem in stems {
                if derivation.accept(self, stem.clone()) == Flow::Stop {
                    return (true, true);
                }
            }
            (false, derivation.accepted)
        }
    }

    /// Circumfixes: a crossable prefix ending at `i` with a crossable suffix
    /// starting at `j >= i`, both taken by one stem.
    fn cross_stage(&mut self, word: &[char], frame: &AffixCache<'a>) -> bool {
        let n = word.len();
        for i in 1..n {
            let prefixes = frame.crossable(Direction::Prefix, i);
            if prefixes.is_empty() {
                continue;
            }
            // `j == i` is allowed: the stem is then made of the strips alone.
            for j in (i..n).rev() {
                let suffixes = frame.crossable(Direction::Suffix, j);
                for &prefix in prefixes {
                    for &suffix in suffixes {
                        let mut stem = prefix.strip_chars().to_vec();
                        stem.extend_from_slice(&word[i..j]);
                        stem.extend_from_slice(suffix.strip_chars());
                        if stem.is_empty() {
                            continue;
                        }
                        let stem_lower = lower_chars(&stem);
                        let mut cross = Cross::new(prefix, suffix);
                        if self.subanalyse(&stem, &stem_lower, 0, &mut cross) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Resolve a stem candidate found at `level`: analyse it one level down
    /// when there is one, else look it up.
    pub(crate) fn subanalyse(
        &mut self,
        word: &[char],
        lower: &[char],
        level: usize,
        consumer: &mut dyn Consumer<'a>,
    ) -> bool {
        if self.analyser.rules.has_level(level + 1) {
            self.do_analysis(word, lower, level + 1, true, consumer)
        } else {
            self.homonyms(word, lower, consumer)
        }
    }

    /// Offer the lexicon entries of `word`, then its compound decompositions
    /// when the scope allows.
    pub(crate) fn homonyms(
        &mut self,
        word: &[char],
        lower: &[char],
        consumer: &mut dyn Consumer<'a>,
    ) -> bool {
        if self.scope.homonyms {
            self.ctx.key.clear();
            self.ctx.key.extend(lower.iter());
            let lexicon = self.analyser.lexicon;
            if let Some(raw) = lexicon.raw_get(&self.ctx.key) {
                let relaxed = consumer.ignore_case();
                for head in raw.heads() {
                    let class = head.capitalization();
                    let admitted = class.admits(head.word(), word)
                        || (relaxed && class.admits_lower(head.word(), word));
                    if !admitted {
                        continue;
                    }
                    for entry in std::iter::once(head).chain(head.homonyms()) {
                        if consumer.accept(self, Stem::Dict(entry)) == Flow::Stop {
                            return true;
                        }
                    }
                }
            }
        }
        if self.scope.compound {
            return self.compound(word, lower, consumer);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::AnalysisControl;
    use crate::controller::FlagController;
    use morfix_core::{Dictionary, EntrySpec, MorphTag, parse_conditions};

    struct Fixture {
        rules: Rules,
        dict: Dictionary,
        controller: FlagController,
    }

    impl Fixture {
        fn analyser(&self) -> Analyser<'_> {
            Analyser::new(&self.rules, &self.dict, &self.controller)
        }
    }

    fn fixture() -> Fixture {
        let mut b = Rules::builder().recursion_depth(1);
        b.add_affix('S', Direction::Suffix, true).unwrap();
        b.add_affix('U', Direction::Prefix, true).unwrap();
        b.add_affix('N', Direction::Suffix, false).unwrap();
        b.add_entry('S', EntrySpec::new("", "s", vec![]).with_morph("+PL"))
            .unwrap();
        b.add_entry(
            'S',
            EntrySpec::new("y", "ies", parse_conditions("[^aeiou]y").unwrap()).with_morph("+PL"),
        )
        .unwrap();
        b.add_entry('U', EntrySpec::new("", "un", vec![]).with_morph("NEG"))
            .unwrap();
        b.add_entry(
            'N',
            EntrySpec::new("", "ness", vec![])
                .with_flags(FlagSet::new("S"))
                .with_tag(MorphTag {
                    pos: Some("NOUN".into()),
                    morph: "[ADJ>NOUN]".into(),
                    derivator: true,
                    ..Default::default()
                }),
        )
        .unwrap();
        let rules = b.build();

        let mut dict = Dictionary::new();
        dict.add("cat", "S");
        dict.add("fly", "S");
        dict.add("tie", "US");
        dict.add("kind", "UN");
        dict.add("Paris", "");
        let controller = FlagController::from_rules(&rules);
        Fixture {
            rules,
            dict,
            controller,
        }
    }

    fn control(rules: &Rules, depth: Depth) -> AnalysisControl {
        let mut control = AnalysisControl::for_rules(rules).unwrap();
        control.depth = depth;
        control
    }

    #[test]
    fn dictionary_word() {
        let f = fixture();
        let a = f.analyser();
        let mut ctx = a.context().unwrap();
        let found = a.analyse("cat", &mut ctx);
        assert_eq!(found.len(), 1);
        assert!(found[0].is_plain());
    }

    #[test]
    fn suffix_with_strip() {
        let f = fixture();
        let a = f.analyser();
        let mut ctx = a.context().unwrap();
        let found = a.analyse("flies", &mut ctx);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stem, "fly");
        assert_eq!(found[0].suffix.as_ref().map(|s| s.append.as_str()), Some("ies"));
        assert_eq!(found[0].inflected_word, "flies");
    }

    #[test]
    fn capitalization_is_respected() {
        let f = fixture();
        let a = f.analyser();
        let mut ctx = a.context().unwrap();
        assert_eq!(a.analyse("CAT", &mut ctx).len(), 1);
        assert_eq!(a.analyse("Paris", &mut ctx).len(), 1);
        assert!(a.analyse("paris", &mut ctx).is_empty());
    }

    #[test]
    fn derived_word_through_nested_level() {
        let f = fixture();
        let a = f.analyser();
        let mut ctx = a.context().unwrap();
        let found = a.analyse("kindness", &mut ctx);
        assert_eq!(found.len(), 1);
        assert!(found[0].derived);
        assert_eq!(found[0].dictionary_root, "kind");
        assert_eq!(found[0].pos.as_deref(), Some("NOUN"));

        // The derived word takes the plural through its granted flag.
        let found = a.analyse("kindnesss", &mut ctx);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stem, "kindness");
        assert_eq!(found[0].absolute_root, "kind");
    }

    #[test]
    fn cross_needs_both_flags() {
        let f = fixture();
        let a = f.analyser();
        let mut ctx = AnalysisContext::new(control(&f.rules, Depth::AllCompounds));
        let found = a.analyse("unties", &mut ctx);
        assert_eq!(found.len(), 1);
        let cross = &found[0];
        assert_eq!(cross.stem, "tie");
        assert!(cross.prefix.is_some() && cross.suffix.is_some());

        // "cat" has no prefix flag.
        assert!(a.analyse("uncats", &mut ctx).is_empty());
    }

    #[test]
    fn cross_with_meeting_boundaries() {
        let mut b = Rules::builder();
        b.add_affix('U', Direction::Prefix, true).unwrap();
        b.add_affix('S', Direction::Suffix, true).unwrap();
        b.add_entry('U', EntrySpec::new("", "un", vec![])).unwrap();
        b.add_entry('S', EntrySpec::new("e", "s", parse_conditions("e").unwrap()))
            .unwrap();
        let rules = b.build();
        let mut dict = Dictionary::new();
        dict.add("e", "US");
        let controller = FlagController::from_rules(&rules);

        // Nothing of "uns" lies between the prefix and the suffix.
        let a = Analyser::new(&rules, &dict, &controller);
        let mut ctx = AnalysisContext::new(control(&rules, Depth::AllCompounds));
        let found = a.analyse("uns", &mut ctx);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stem, "e");
        assert_eq!(found[0].prefix.as_ref().map(|p| p.append.as_str()), Some("un"));
        assert_eq!(found[0].suffix.as_ref().map(|s| s.append.as_str()), Some("s"));
    }

    #[test]
    fn depth_limits_results() {
        let mut f = fixture();
        f.dict.add("cats", "");
        let a = f.analyser();
        let mut first = AnalysisContext::new(control(&f.rules, Depth::FirstStem));
        assert_eq!(a.analyse("cats", &mut first).len(), 1);
        let mut every = AnalysisContext::new(control(&f.rules, Depth::AllCompounds));
        assert_eq!(a.analyse("cats", &mut every).len(), 2);
    }

    #[test]
    fn over_long_and_empty_words() {
        let f = fixture();
        let a = f.analyser();
        let mut ctx = a.context().unwrap();
        assert!(a.analyse("", &mut ctx).is_empty());
        let long = "c".repeat(MAX_WORD_LENGTH);
        assert!(a.analyse(&long, &mut ctx).is_empty());
    }

    #[test]
    fn istem_verdicts() {
        let f = fixture();
        let a = f.analyser();
        let mut ctx = a.context().unwrap();
        assert_eq!(a.istem("cat", 0, &mut ctx).to_string(), "*");
        assert_eq!(a.istem("cats", 0, &mut ctx).to_string(), "+ cats");
        assert_eq!(a.istem("dogs", 7, &mut ctx).to_string(), "# dogs 7");
    }
}
