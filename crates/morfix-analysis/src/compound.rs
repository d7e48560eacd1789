// Compound decomposition with memoized component stems

use std::rc::Rc;

use morfix_core::character::is_dash;

use crate::analyser::{Scope, Search};
use crate::consumer::{Collector, Consumer, Flow};
use crate::stem::Stem;

/// Where compounding may recurse inside the components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompoundLevel {
    /// Components are simple words.
    #[default]
    Top,
    /// The left component may itself be a compound.
    Left,
    /// Both components may be compounds.
    All,
}

/// Compound recursion state of a search.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CompoundState {
    pub(crate) level: CompoundLevel,
    /// Components still available to the word being split.
    pub(crate) budget: usize,
    /// Depth of nested decompositions; 1 while splitting the whole word.
    pub(crate) nesting: usize,
}

impl CompoundState {
    /// Levels to try in order: all of them, or only the most permissive when
    /// every decomposition is wanted anyway.
    pub(crate) fn levels(all: bool) -> &'static [CompoundLevel] {
        if all {
            &[CompoundLevel::All]
        } else {
            &[CompoundLevel::Top, CompoundLevel::Left, CompoundLevel::All]
        }
    }
}

/// Key of the compound caches: the substring, the compound level, the
/// component budget, and one more switch. For component stems the switch is
/// whether the component may compound; for decompositions it is whether the
/// substring ends the word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PartKey {
    level: CompoundLevel,
    budget: usize,
    switch: bool,
    word: Box<[char]>,
}

impl PartKey {
    fn new(level: CompoundLevel, budget: usize, switch: bool, word: &[char]) -> Self {
        Self {
            level,
            budget,
            switch,
            word: word.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn probe(word: &str) -> Self {
        let chars: Vec<char> = word.chars().collect();
        Self::new(CompoundLevel::Top, 1, false, &chars)
    }
}

impl<'a> Search<'_, 'a> {
    /// Offer every decomposition of `word` into two components to
    /// `consumer`. Returns `true` when the consumer asked to stop.
    pub(crate) fn compound(
        &mut self,
        word: &[char],
        lower: &[char],
        consumer: &mut dyn Consumer<'a>,
    ) -> bool {
        if self.compound.nesting == 0 {
            self.compound.budget = self.ctx.control().compound.max();
        }
        self.decompose(word, lower, consumer)
    }

    fn decompose(
        &mut self,
        word: &[char],
        lower: &[char],
        consumer: &mut dyn Consumer<'a>,
    ) -> bool {
        let control = *self.ctx.control();
        let min = control.compound.min();
        let budget = self.compound.budget;
        let n = word.len();
        if budget < 2 || n < 2 * min {
            return false;
        }

        self.compound.nesting += 1;
        let last = self.compound.nesting == 1;
        let level = self.compound.level;
        let key = PartKey::new(level, budget, last, word);

        if let Some(made) = self.ctx.decompositions.get(&key).cloned() {
            tracing::trace!(word = %String::from_iter(word), ?level, budget, "compound cache hit");
            let mut stop = false;
            for stem in made.iter() {
                if consumer.accept(self, stem.clone()) == Flow::Stop {
                    stop = true;
                    break;
                }
            }
            self.compound.nesting -= 1;
            return stop;
        }

        let controller = self.analyser.controller();
        let rules = self.analyser.rules();
        let mut made = Vec::new();
        let mut stop = false;

        'split: for at in control.compound.hint().positions(min, n - min) {
            let dash = is_dash(word[at]);
            let right_start = if dash { at + 1 } else { at };
            if n - right_start < min {
                continue;
            }
            tracing::trace!(
                word = %String::from_iter(word),
                at,
                dash,
                ?level,
                budget,
                "compound split"
            );

            let rights = self.part_stems(
                &word[right_start..],
                &lower[right_start..],
                budget - 1,
                level == CompoundLevel::All,
            );
            for right in rights.iter() {
                let fits = if last {
                    controller.compound_last(right)
                } else {
                    controller.compound_inner(right)
                };
                if !fits {
                    continue;
                }
                let lefts = self.part_stems(
                    &word[..at],
                    &lower[..at],
                    budget - right.components(),
                    level > CompoundLevel::Top,
                );
                for left in lefts.iter() {
                    if !controller.compound(left, right) {
                        continue;
                    }
                    let stem = controller.create_compound(rules, left.clone(), right.clone(), dash);
                    made.push(stem.clone());
                    if consumer.accept(self, stem) == Flow::Stop {
                        stop = true;
                        break 'split;
                    }
                }
            }
        }

        self.compound.nesting -= 1;
        self.compound.budget = budget;
        // An interrupted decomposition list is incomplete.
        if !stop {
            self.ctx.decompositions.insert(key, Rc::from(made));
        }
        stop
    }

    /// Every stem of a component, with at most `budget` components of its
    /// own.
    fn part_stems(
        &mut self,
        part: &[char],
        lower: &[char],
        budget: usize,
        compound: bool,
    ) -> Rc<[Stem<'a>]> {
        let key = PartKey::new(self.compound.level, budget, compound, part);
        if let Some(hit) = self.ctx.stems.get(&key) {
            tracing::trace!(part = %String::from_iter(part), budget, "component cache hit");
            return hit.clone();
        }

        let saved = (self.scope, self.compound.budget);
        self.scope = Scope {
            compound,
            homonyms: true,
        };
        self.compound.budget = budget;
        let mut collector = Collector::new(false);
        self.subanalyse(part, lower, 0, &mut collector);
        (self.scope, self.compound.budget) = saved;

        let stems: Rc<[Stem<'a>]> = Rc::from(collector.stems);
        self.ctx.stems.insert(key, stems.clone());
        stems
    }
}
