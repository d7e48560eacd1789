// Compiled affix rules: entry arena, per-level indices and compound flags

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;

use crate::RuleError;
use crate::affix::{Affix, AffixEntry, AffixEntryId, Direction, EntrySpec, LoadOptions};
use crate::condition::ConditionPool;
use crate::flags::{FlagPool, FlagSet};
use crate::trie::AffixIndex;

static NEXT_RULES_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a built [`Rules`] value; contexts use it to detect that
/// they are being reused with different rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RulesId(u64);

/// Flags with a role in compounding. Unset roles are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompoundFlags {
    /// Word may appear anywhere in a compound.
    pub compound: Option<char>,
    /// Word may only start a compound.
    pub first: Option<char>,
    /// Word may only end a compound.
    pub last: Option<char>,
    /// Word must never be part of a compound.
    pub forbidden: Option<char>,
    /// Marks compound words, together with their minimum component length.
    pub compound_word: Option<char>,
    pub min_word: usize,
}

impl CompoundFlags {
    pub fn is_compound_flag(&self, c: char) -> bool {
        [self.compound, self.first, self.last, self.forbidden].contains(&Some(c))
    }
}

/// Decides where an entry goes in the level chain.
///
/// The builder offers each entry to level 0. A level passes it on to the
/// next level when [`descend`](Placement::descend) says so and keeps it when
/// [`keep`](Placement::keep) says so; the last level keeps everything it is
/// offered.
pub trait Placement: Send + Sync {
    fn descend(&self, level: usize, entry: &AffixEntry) -> bool;
    fn keep(&self, level: usize, entry: &AffixEntry) -> bool;
}

/// Default placement: derivators live on the nested levels only, plain
/// inflexions on the top level only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivatorPlacement;

impl Placement for DerivatorPlacement {
    fn descend(&self, _level: usize, entry: &AffixEntry) -> bool {
        entry.is_derivator()
    }

    fn keep(&self, level: usize, entry: &AffixEntry) -> bool {
        level > 0 || !entry.is_derivator()
    }
}

/// One level of the derivation chain.
#[derive(Debug, Clone)]
pub struct Level {
    prefixes: AffixIndex,
    suffixes: AffixIndex,
    prefix_flags: BTreeSet<char>,
    suffix_flags: BTreeSet<char>,
}

impl Level {
    fn new() -> Self {
        Self {
            prefixes: AffixIndex::new(Direction::Prefix),
            suffixes: AffixIndex::new(Direction::Suffix),
            prefix_flags: BTreeSet::new(),
            suffix_flags: BTreeSet::new(),
        }
    }

    pub fn index(&self, direction: Direction) -> &AffixIndex {
        match direction {
            Direction::Prefix => &self.prefixes,
            Direction::Suffix => &self.suffixes,
        }
    }

    pub fn prefixes(&self) -> &AffixIndex {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &AffixIndex {
        &self.suffixes
    }

    pub fn entry_count(&self) -> usize {
        self.prefixes.len() + self.suffixes.len()
    }

    fn add(&mut self, entry: &AffixEntry, id: AffixEntryId) {
        match entry.direction() {
            Direction::Prefix => {
                self.prefixes.insert(entry, id);
                self.prefix_flags.insert(entry.flag());
            }
            Direction::Suffix => {
                self.suffixes.insert(entry, id);
                self.suffix_flags.insert(entry.flag());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A sealed rule set.
///
/// Level 0 is the top level, used for inflexion; every further level is one
/// more step of derivation. All levels index into one entry arena and share
/// one condition pool, so condition set ids are comparable across the chain.
#[derive(Debug)]
pub struct Rules {
    id: RulesId,
    entries: Vec<AffixEntry>,
    affixes: HashMap<char, Affix>,
    levels: Vec<Level>,
    conditions: ConditionPool,
    compound: CompoundFlags,
    prefix_pattern: FlagSet,
    suffix_pattern: FlagSet,
}

impl Rules {
    pub fn builder() -> RulesBuilder {
        RulesBuilder::new()
    }

    pub fn id(&self) -> RulesId {
        self.id
    }

    pub fn entry(&self, id: AffixEntryId) -> &AffixEntry {
        &self.entries[id.0]
    }

    pub fn entries(&self) -> &[AffixEntry] {
        &self.entries
    }

    pub fn affix(&self, flag: char) -> Option<&Affix> {
        self.affixes.get(&flag)
    }

    pub fn affixes(&self) -> impl Iterator<Item = &Affix> {
        self.affixes.values()
    }

    pub fn level(&self, level: usize) -> Option<&Level> {
        self.levels.get(level)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn has_level(&self, level: usize) -> bool {
        level < self.levels.len()
    }

    /// Number of distinct stem condition sets, the size of a memo table.
    pub fn condition_set_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn compound_flags(&self) -> &CompoundFlags {
        &self.compound
    }

    /// Flags a compound's left part cannot pass on: every prefix flag of any
    /// level, and the compound flag.
    pub fn prefix_pattern(&self) -> &FlagSet {
        &self.prefix_pattern
    }

    /// Flags a compound's right part cannot pass on: every suffix flag.
    pub fn suffix_pattern(&self) -> &FlagSet {
        &self.suffix_pattern
    }
}

// ---------------------------------------------------------------------------
// RulesBuilder
// ---------------------------------------------------------------------------

/// Load-time assembly of a [`Rules`] value.
pub struct RulesBuilder {
    levels: usize,
    placement: Box<dyn Placement>,
    options: LoadOptions,
    conditions: ConditionPool,
    flags: FlagPool,
    affixes: HashMap<char, Affix>,
    entries: Vec<AffixEntry>,
    compound: CompoundFlags,
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesBuilder {
    pub fn new() -> Self {
        Self {
            levels: 1,
            placement: Box::new(DerivatorPlacement),
            options: LoadOptions::default(),
            conditions: ConditionPool::new(),
            flags: FlagPool::new(),
            affixes: HashMap::new(),
            entries: Vec::new(),
            compound: CompoundFlags::default(),
        }
    }

    /// Number of derivation levels below the top level.
    pub fn recursion_depth(mut self, depth: usize) -> Self {
        self.levels = depth + 1;
        self
    }

    pub fn placement(mut self, placement: impl Placement + 'static) -> Self {
        self.placement = Box::new(placement);
        self
    }

    pub fn options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn compound_flags(mut self, compound: CompoundFlags) -> Self {
        self.compound = compound;
        self
    }

    /// Pool for the flag sets granted by entries, so equal grants share one
    /// allocation.
    pub fn flag_pool(&mut self) -> &mut FlagPool {
        &mut self.flags
    }

    /// Declare an affix. Declaring the same flag again is allowed as long as
    /// the direction matches.
    pub fn add_affix(
        &mut self,
        flag: char,
        direction: Direction,
        crossable: bool,
    ) -> Result<(), RuleError> {
        match self.affixes.get(&flag) {
            Some(existing) if existing.direction() != direction => {
                Err(RuleError::AffixDirectionConflict(flag))
            }
            Some(_) => Ok(()),
            None => {
                self.affixes
                    .insert(flag, Affix::new(flag, direction, crossable));
                Ok(())
            }
        }
    }

    /// Build and append an entry to the affix `flag`.
    pub fn add_entry(
        &mut self,
        flag: char,
        mut spec: EntrySpec,
    ) -> Result<AffixEntryId, RuleError> {
        let affix = self
            .affixes
            .get_mut(&flag)
            .ok_or(RuleError::UnknownAffix(flag))?;
        spec.flags = self.flags.canonical(spec.flags);
        let entry = AffixEntry::new(affix, affix.len(), spec, &mut self.conditions, self.options)?;
        let id = AffixEntryId(self.entries.len());
        affix.push(id)?;
        self.entries.push(entry);
        Ok(id)
    }

    /// Seal every affix and index the entries level by level.
    pub fn build(self) -> Rules {
        let mut affixes = self.affixes;
        for affix in affixes.values_mut() {
            affix.seal();
        }

        let mut levels: Vec<Level> = (0..self.levels).map(|_| Level::new()).collect();
        let last = self.levels - 1;
        for (i, entry) in self.entries.iter().enumerate() {
            let id = AffixEntryId(i);
            for (n, level) in levels.iter_mut().enumerate() {
                let descend = n < last && self.placement.descend(n, entry);
                if n == last || self.placement.keep(n, entry) {
                    level.add(entry, id);
                }
                if !descend {
                    break;
                }
            }
        }

        let mut prefix_flags = BTreeSet::new();
        let mut suffix_flags = BTreeSet::new();
        for level in &levels {
            prefix_flags.extend(level.prefix_flags.iter().copied());
            suffix_flags.extend(level.suffix_flags.iter().copied());
        }
        let mut flags = self.flags;
        let prefix_flags = prefix_flags.into_iter().chain(self.compound.compound);
        let prefix_pattern = flags.canonical(FlagSet::from_chars(prefix_flags));
        let suffix_pattern = flags.canonical(FlagSet::from_chars(suffix_flags));

        for (n, level) in levels.iter().enumerate() {
            tracing::debug!(
                level = n,
                prefixes = level.prefixes.len(),
                suffixes = level.suffixes.len(),
                nodes = level.prefixes.node_count() + level.suffixes.node_count(),
                "rules level sealed"
            );
        }
        tracing::debug!(
            entries = self.entries.len(),
            affixes = affixes.len(),
            condition_sets = self.conditions.len(),
            "rules sealed"
        );

        Rules {
            id: RulesId(NEXT_RULES_ID.fetch_add(1, Ordering::Relaxed)),
            entries: self.entries,
            affixes,
            levels,
            conditions: self.conditions,
            compound: self.compound,
            prefix_pattern,
            suffix_pattern,
        }
    }
}
