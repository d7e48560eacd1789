// Affix rules: single strip/append entries and the flag groups they belong to

use std::fmt;
use std::sync::Arc;

use crate::RuleError;
use crate::character::lower_chars;
use crate::condition::{Condition, ConditionMemo, ConditionPool, ConditionSet};
use crate::flags::FlagSet;

/// Which end of the word an affix operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Prefix,
    Suffix,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::Prefix => "PFX",
            Direction::Suffix => "SFX",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Prefix => Direction::Suffix,
            Direction::Suffix => Direction::Prefix,
        }
    }
}

/// Handle of an [`AffixEntry`] in the rule arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AffixEntryId(pub usize);

/// Morphological description attached to an affix entry.
///
/// An entry with a tag produces derived words that carry its part of speech
/// and case ending; without one, derivation only transfers granted flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MorphTag {
    /// Part of speech of the derived word; `None` keeps the root's.
    pub pos: Option<String>,
    /// Case ending of the inflected form, empty when the entry sets none.
    pub case_ending: String,
    /// Morph description, e.g. `+PL` or `[ADJ>NOUN]`.
    pub morph: String,
    /// Whether applying the entry makes a new lexical word rather than an
    /// inflected form of the old one.
    pub derivator: bool,
    /// Whether the derived word keeps the root's flags.
    pub inherit_flags: bool,
}

/// Options applied while building entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Drop a strip that the append starts (suffix) or ends (prefix) with,
    /// keeping only the remaining append.
    pub compress_strip_append: bool,
    /// Lowercase strip and append.
    pub ignore_strip_append_case: bool,
}

/// Raw description of an entry, as a loader would read it from a rule file.
#[derive(Debug, Clone, Default)]
pub struct EntrySpec {
    pub strip: String,
    pub append: String,
    /// Full condition sequence, covering the stem and the stripped span.
    pub conditions: Vec<Condition>,
    /// Flags granted to words derived through this entry.
    pub flags: FlagSet,
    /// Plain morph string, used when no tag is given.
    pub morph: String,
    pub tag: Option<MorphTag>,
    /// Relax capitalization admission for stems reached through this entry.
    pub ignore_case: bool,
}

impl EntrySpec {
    pub fn new(strip: &str, append: &str, conditions: Vec<Condition>) -> Self {
        Self {
            strip: strip.to_string(),
            append: append.to_string(),
            conditions,
            ..Default::default()
        }
    }

    pub fn with_flags(mut self, flags: FlagSet) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_morph(mut self, morph: &str) -> Self {
        self.morph = morph.to_string();
        self
    }

    pub fn with_tag(mut self, tag: MorphTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

// ---------------------------------------------------------------------------
// AffixEntry
// ---------------------------------------------------------------------------

/// One strip/append rule of an affix.
///
/// The rule's conditions are split at construction: the strip conditions cover
/// the span that the reverse transform puts back, and the stem conditions
/// cover the characters next to it. Only the stem conditions are checked
/// during analysis, since the strip itself is fixed and validated here.
#[derive(Debug, Clone)]
pub struct AffixEntry {
    affix: char,
    direction: Direction,
    crossable: bool,
    index: usize,
    strip: Box<[char]>,
    append: Box<[char]>,
    stem_conditions: Arc<ConditionSet>,
    strip_conditions: Box<[Condition]>,
    flags: FlagSet,
    morph: String,
    tag: Option<MorphTag>,
    ignore_case: bool,
}

impl AffixEntry {
    /// Build and validate an entry of `affix`.
    ///
    /// Fails when the strip does not satisfy the conditions covering it.
    pub fn new(
        affix: &Affix,
        index: usize,
        spec: EntrySpec,
        pool: &mut ConditionPool,
        options: LoadOptions,
    ) -> Result<Self, RuleError> {
        let mut strip: Vec<char> = spec.strip.chars().collect();
        let mut append: Vec<char> = spec.append.chars().collect();

        if options.ignore_strip_append_case {
            strip = lower_chars(&strip);
            append = lower_chars(&append);
        }
        if options.compress_strip_append {
            let redundant = match affix.direction {
                Direction::Suffix => append.starts_with(&strip),
                Direction::Prefix => append.ends_with(&strip),
            };
            if !strip.is_empty() && redundant {
                match affix.direction {
                    Direction::Suffix => {
                        append.drain(..strip.len());
                    }
                    Direction::Prefix => append.truncate(append.len() - strip.len()),
                }
                strip.clear();
            }
        }

        let mut conditions = spec.conditions;
        let sl = strip.len();
        if conditions.len() < sl {
            let pad = sl - conditions.len();
            let wildcards = std::iter::repeat_n(Condition::any(), pad);
            match affix.direction {
                Direction::Suffix => {
                    conditions.splice(0..0, wildcards);
                }
                Direction::Prefix => conditions.extend(wildcards),
            }
        }
        let (stem_part, strip_part) = match affix.direction {
            Direction::Suffix => {
                let at = conditions.len() - sl;
                let strip_part = conditions.split_off(at);
                (conditions, strip_part)
            }
            Direction::Prefix => {
                let stem_part = conditions.split_off(sl);
                (stem_part, conditions)
            }
        };

        for (cond, &c) in strip_part.iter().zip(&strip) {
            if !cond.admit(c) {
                return Err(RuleError::StripViolatesConditions {
                    affix: affix.flag,
                    strip: strip.iter().collect(),
                    condition: cond.to_string(),
                });
            }
        }

        Ok(Self {
            affix: affix.flag,
            direction: affix.direction,
            crossable: affix.crossable,
            index,
            strip: strip.into_boxed_slice(),
            append: append.into_boxed_slice(),
            stem_conditions: pool.intern(stem_part),
            strip_conditions: strip_part.into_boxed_slice(),
            flags: spec.flags,
            morph: spec.morph,
            tag: spec.tag,
            ignore_case: spec.ignore_case,
        })
    }

    /// Flag character of the owning affix.
    pub fn flag(&self) -> char {
        self.affix
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn crossable(&self) -> bool {
        self.crossable
    }

    /// Position of the entry within its affix.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn strip_chars(&self) -> &[char] {
        &self.strip
    }

    pub fn append_chars(&self) -> &[char] {
        &self.append
    }

    pub fn stem_conditions(&self) -> &Arc<ConditionSet> {
        &self.stem_conditions
    }

    pub fn strip_conditions(&self) -> &[Condition] {
        &self.strip_conditions
    }

    /// Flags granted to words derived through this entry.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn tag(&self) -> Option<&MorphTag> {
        self.tag.as_ref()
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Whether the entry leaves the word unchanged.
    pub fn same(&self) -> bool {
        self.strip == self.append
    }

    pub fn is_derivator(&self) -> bool {
        self.tag.as_ref().is_some_and(|t| t.derivator)
    }

    pub fn case_ending(&self) -> &str {
        self.tag.as_ref().map_or("", |t| t.case_ending.as_str())
    }

    pub fn pos(&self) -> Option<&str> {
        self.tag.as_ref().and_then(|t| t.pos.as_deref())
    }

    /// Morph description of the entry.
    pub fn morph(&self) -> &str {
        match &self.tag {
            Some(tag) => &tag.morph,
            None => &self.morph,
        }
    }

    /// Morph contribution of the entry when it derives a new word.
    pub fn derivator_string(&self) -> &str {
        if self.is_derivator() { self.morph() } else { "" }
    }

    /// Morph contribution of the entry when it inflects a word.
    pub fn inflexion_string(&self) -> &str {
        if self.is_derivator() { "" } else { self.morph() }
    }

    /// The `k`-th append character counted from the outer edge of the word.
    pub fn edge_char(&self, k: usize) -> char {
        match self.direction {
            Direction::Suffix => self.append[self.append.len() - 1 - k],
            Direction::Prefix => self.append[k],
        }
    }

    // -- string edits --------------------------------------------------------

    /// Put the strip back onto a word that has already lost its append.
    pub fn add_strip(&self, word: &[char]) -> Vec<char> {
        let mut out = Vec::with_capacity(word.len() + self.strip.len());
        match self.direction {
            Direction::Suffix => {
                out.extend_from_slice(word);
                out.extend_from_slice(&self.strip);
            }
            Direction::Prefix => {
                out.extend_from_slice(&self.strip);
                out.extend_from_slice(word);
            }
        }
        out
    }

    /// Remove `strip.len()` characters from the affix end of `word`.
    pub fn strip(&self, word: &[char]) -> Vec<char> {
        let sl = self.strip.len().min(word.len());
        match self.direction {
            Direction::Suffix => word[..word.len() - sl].to_vec(),
            Direction::Prefix => word[sl..].to_vec(),
        }
    }

    /// Add the append material to the affix end of `word`.
    pub fn append(&self, word: &[char]) -> Vec<char> {
        let mut out = Vec::with_capacity(word.len() + self.append.len());
        match self.direction {
            Direction::Suffix => {
                out.extend_from_slice(word);
                out.extend_from_slice(&self.append);
            }
            Direction::Prefix => {
                out.extend_from_slice(&self.append);
                out.extend_from_slice(word);
            }
        }
        out
    }

    /// Inflect a stem: strip, then append.
    pub fn inflex(&self, word: &[char]) -> Vec<char> {
        self.append(&self.strip(word))
    }

    /// Undo [`inflex`](Self::inflex): drop the append, put the strip back.
    pub fn reverse(&self, word: &[char]) -> Vec<char> {
        let al = self.append.len().min(word.len());
        match self.direction {
            Direction::Suffix => self.add_strip(&word[..word.len() - al]),
            Direction::Prefix => self.add_strip(&word[al..]),
        }
    }

    // -- condition checks ----------------------------------------------------

    /// Check the stem conditions against a remainder: the word with the
    /// append removed and the strip not yet restored.
    pub fn check_stem(&self, remainder: &[char]) -> bool {
        match self.direction {
            Direction::Suffix => self.stem_conditions.check_tail(remainder),
            Direction::Prefix => self.stem_conditions.check_head(remainder),
        }
    }

    /// [`check_stem`](Self::check_stem) through the per-round memo, which is
    /// keyed by the interned stem condition set.
    pub fn admit_stem(&self, remainder: &[char], memo: &mut ConditionMemo) -> bool {
        memo.check(self.stem_conditions.id(), || self.check_stem(remainder))
    }

    /// Whether the entry can inflect the full stem `stem`: the stem must end
    /// (or start) with the strip, the stripped span must meet the strip
    /// conditions and the rest must meet the stem conditions.
    pub fn check_for_inflexion(&self, stem: &[char]) -> bool {
        let sl = self.strip.len();
        if stem.len() < sl {
            return false;
        }
        let (rest, span) = match self.direction {
            Direction::Suffix => stem.split_at(stem.len() - sl),
            Direction::Prefix => {
                let (span, rest) = stem.split_at(sl);
                (rest, span)
            }
        };
        span == &*self.strip
            && self
                .strip_conditions
                .iter()
                .zip(span)
                .all(|(cond, &c)| cond.admit(c))
            && self.check_stem(rest)
    }
}

impl fmt::Display for AffixEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strip: String = self.strip.iter().collect();
        let append: String = self.append.iter().collect();
        write!(
            f,
            "{}[{}, {}, -{}, +{}, {}<",
            self.direction.name(),
            self.affix,
            self.index,
            strip,
            append,
            self.stem_conditions,
        )?;
        for cond in self.strip_conditions.iter() {
            write!(f, "{cond}")?;
        }
        f.write_str(">")?;
        if !self.morph().is_empty() {
            write!(f, ", {}", self.morph())?;
        }
        f.write_str("]")
    }
}

// ---------------------------------------------------------------------------
// Affix
// ---------------------------------------------------------------------------

/// A named group of entries sharing a flag character and direction.
#[derive(Debug, Clone)]
pub struct Affix {
    flag: char,
    direction: Direction,
    crossable: bool,
    entries: Vec<AffixEntryId>,
    sealed: bool,
}

impl Affix {
    pub fn new(flag: char, direction: Direction, crossable: bool) -> Self {
        Self {
            flag,
            direction,
            crossable,
            entries: Vec::new(),
            sealed: false,
        }
    }

    pub fn flag(&self) -> char {
        self.flag
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn crossable(&self) -> bool {
        self.crossable
    }

    pub fn entries(&self) -> &[AffixEntryId] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub(crate) fn push(&mut self, id: AffixEntryId) -> Result<(), RuleError> {
        if self.sealed {
            return Err(RuleError::AffixSealed(self.flag));
        }
        self.entries.push(id);
        Ok(())
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::parse_conditions;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn s(v: &[char]) -> String {
        v.iter().collect()
    }

    fn entry(direction: Direction, strip: &str, append: &str, conds: &str) -> AffixEntry {
        let affix = Affix::new('X', direction, true);
        let mut pool = ConditionPool::new();
        let spec = EntrySpec::new(strip, append, parse_conditions(conds).unwrap());
        AffixEntry::new(&affix, 0, spec, &mut pool, LoadOptions::default()).unwrap()
    }

    #[test]
    fn suffix_edits() {
        let e = entry(Direction::Suffix, "y", "ies", "[^aeiou]y");
        assert_eq!(s(&e.inflex(&chars("fly"))), "flies");
        assert_eq!(s(&e.reverse(&chars("flies"))), "fly");
        assert_eq!(s(&e.strip(&chars("fly"))), "fl");
        assert_eq!(s(&e.add_strip(&chars("fl"))), "fly");
        assert_eq!(e.edge_char(0), 's');
        assert_eq!(e.edge_char(2), 'i');
    }

    #[test]
    fn prefix_edits() {
        let e = entry(Direction::Prefix, "", "un", ".");
        assert_eq!(s(&e.inflex(&chars("do"))), "undo");
        assert_eq!(s(&e.reverse(&chars("undo"))), "do");
        assert_eq!(e.edge_char(0), 'u');
        assert_eq!(e.edge_char(1), 'n');
    }

    #[test]
    fn split_conditions_by_direction() {
        let sfx = entry(Direction::Suffix, "y", "ies", "[^aeiou]y");
        assert_eq!(sfx.stem_conditions().len(), 1);
        assert_eq!(sfx.strip_conditions(), &[Condition::literal('y')]);

        let pfx = entry(Direction::Prefix, "e", "in", "e[^x]");
        assert_eq!(pfx.strip_conditions(), &[Condition::literal('e')]);
        assert_eq!(pfx.stem_conditions().len(), 1);
    }

    #[test]
    fn strip_must_meet_its_conditions() {
        let affix = Affix::new('S', Direction::Suffix, false);
        let mut pool = ConditionPool::new();
        let spec = EntrySpec::new("y", "ies", parse_conditions("[^aeiou]x").unwrap());
        let err = AffixEntry::new(&affix, 0, spec, &mut pool, LoadOptions::default());
        assert!(matches!(
            err,
            Err(RuleError::StripViolatesConditions { affix: 'S', .. })
        ));
    }

    #[test]
    fn short_condition_list_is_padded() {
        let e = entry(Direction::Suffix, "um", "a", "");
        assert_eq!(e.strip_conditions().len(), 2);
        assert!(e.stem_conditions().is_empty());
        assert!(e.check_for_inflexion(&chars("datum")));
    }

    #[test]
    fn stem_checks() {
        let e = entry(Direction::Suffix, "y", "ies", "[^aeiou]y");
        assert!(e.check_stem(&chars("fl")));
        assert!(!e.check_stem(&chars("da")));
        assert!(e.check_for_inflexion(&chars("fly")));
        assert!(!e.check_for_inflexion(&chars("day")));
        assert!(!e.check_for_inflexion(&chars("flu")));

        let mut memo = ConditionMemo::new(1);
        assert!(e.admit_stem(&chars("fl"), &mut memo));
        // same round: memoized by condition set, whatever the remainder
        assert!(e.admit_stem(&chars("da"), &mut memo));
        memo.next_round();
        assert!(!e.admit_stem(&chars("da"), &mut memo));
    }

    #[test]
    fn same_transform() {
        assert!(entry(Direction::Suffix, "", "", ".").same());
        assert!(!entry(Direction::Suffix, "", "s", ".").same());
    }

    #[test]
    fn load_options() {
        let affix = Affix::new('P', Direction::Suffix, false);
        let mut pool = ConditionPool::new();
        let options = LoadOptions {
            compress_strip_append: true,
            ignore_strip_append_case: true,
        };
        let spec = EntrySpec::new("B", "BAL", parse_conditions("b").unwrap());
        let e = AffixEntry::new(&affix, 0, spec, &mut pool, options).unwrap();
        assert!(e.strip_chars().is_empty());
        assert_eq!(s(e.append_chars()), "al");
    }

    #[test]
    fn morph_strings() {
        let affix = Affix::new('N', Direction::Suffix, false);
        let mut pool = ConditionPool::new();
        let tag = MorphTag {
            pos: Some("NOUN".into()),
            morph: "[ADJ>NOUN]".into(),
            derivator: true,
            ..Default::default()
        };
        let spec = EntrySpec::new("", "ness", vec![]).with_tag(tag);
        let e = AffixEntry::new(&affix, 0, spec, &mut pool, LoadOptions::default()).unwrap();
        assert_eq!(e.derivator_string(), "[ADJ>NOUN]");
        assert_eq!(e.inflexion_string(), "");
        assert_eq!(e.pos(), Some("NOUN"));

        let plain = EntrySpec::new("", "s", vec![]).with_morph("+PL");
        let p = AffixEntry::new(&affix, 1, plain, &mut pool, LoadOptions::default()).unwrap();
        assert_eq!(p.inflexion_string(), "+PL");
        assert_eq!(p.derivator_string(), "");
        assert_eq!(p.to_string(), "SFX[N, 1, -, +s, <>, +PL]");
    }
}
