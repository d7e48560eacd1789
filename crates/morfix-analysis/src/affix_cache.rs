// Per-word scratch space for the affix stages

use morfix_core::{AffixEntry, ConditionMemo, Direction};

fn slot(direction: Direction) -> usize {
    match direction {
        Direction::Prefix => 0,
        Direction::Suffix => 1,
    }
}

/// Scratch state for one word at one recursion level.
///
/// Holds the word and its lowercase form, the condition memo, and the
/// crossable entries admitted at each split position. Position `p` of a suffix is the
/// start of the stripped append (remainder `word[..p]`); position `p` of a
/// prefix is the end of the append (remainder `word[p..]`). Frames are
/// recycled through the context, and [`reset`](Self::reset) drops everything
/// left from the previous word.
#[derive(Debug, Default)]
pub struct AffixCache<'a> {
    word: Vec<char>,
    lower: Vec<char>,
    memo: ConditionMemo,
    crossable: [Vec<Vec<&'a AffixEntry>>; 2],
}

impl<'a> AffixCache<'a> {
    pub fn new(condition_sets: usize) -> Self {
        Self {
            memo: ConditionMemo::new(condition_sets),
            ..Self::default()
        }
    }

    /// Prepare the frame for `word`.
    pub fn reset(&mut self, word: &[char], lower: &[char]) {
        self.word.clear();
        self.word.extend_from_slice(word);
        self.lower.clear();
        self.lower.extend_from_slice(lower);
        self.memo.next_round();
        let positions = word.len() + 1;
        for table in self.crossable.iter_mut() {
            for list in table.iter_mut() {
                list.clear();
            }
            table.resize_with(positions, Vec::new);
        }
    }

    pub fn word(&self) -> &[char] {
        &self.word
    }

    pub fn lower(&self) -> &[char] {
        &self.lower
    }

    pub fn len(&self) -> usize {
        self.word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// Condition memo of the position being tried.
    pub fn memo(&mut self) -> &mut ConditionMemo {
        &mut self.memo
    }

    /// Record a crossable entry admitted at `position`.
    pub fn admit_crossable(&mut self, position: usize, entry: &'a AffixEntry) {
        self.crossable[slot(entry.direction())][position].push(entry);
    }

    pub fn crossable(&self, direction: Direction, position: usize) -> &[&'a AffixEntry] {
        self.crossable[slot(direction)]
            .get(position)
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morfix_core::{EntrySpec, Rules};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn reset_drops_previous_word() {
        let mut b = Rules::builder();
        b.add_affix('S', Direction::Suffix, true).unwrap();
        b.add_affix('P', Direction::Prefix, true).unwrap();
        let s = b.add_entry('S', EntrySpec::new("", "s", vec![])).unwrap();
        let p = b.add_entry('P', EntrySpec::new("", "un", vec![])).unwrap();
        let rules = b.build();

        let mut cache = AffixCache::new(rules.condition_set_count());
        cache.reset(&chars("Cats"), &chars("cats"));
        cache.admit_crossable(3, rules.entry(s));
        cache.admit_crossable(2, rules.entry(p));
        assert_eq!(cache.crossable(Direction::Suffix, 3).len(), 1);
        assert_eq!(cache.crossable(Direction::Prefix, 2).len(), 1);
        assert!(cache.crossable(Direction::Prefix, 3).is_empty());
        assert_eq!(cache.word(), chars("Cats").as_slice());

        cache.reset(&chars("dogs"), &chars("dogs"));
        assert!(cache.admitted(Direction::Suffix, 3).is_empty());
        assert!(cache.crossable(Direction::Suffix, 3).is_empty());
        assert!(cache.crossable(Direction::Prefix, 2).is_empty());
        assert!(cache.crossable(Direction::Suffix, 40).is_empty());
        assert_eq!(cache.lower(), chars("dogs").as_slice());
        assert_eq!(cache.len(), 4);
    }
}
