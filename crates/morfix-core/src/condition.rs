// Single-character conditions, interned condition sequences and the
// per-round memo of stem checks

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::RuleError;

/// Code points below this bound are looked up in a bitmap; above it a
/// character set falls back to binary search over its sorted members.
const BITMAP_LIMIT: u32 = 0x1_0000;

// ---------------------------------------------------------------------------
// CharSet
// ---------------------------------------------------------------------------

/// A set of characters with O(1) membership for the Basic Multilingual Plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharSet {
    /// Sorted, unique members.
    chars: Box<[char]>,
    /// Membership bitmap over `0..=max`, empty when a member is outside the BMP.
    bits: Box<[u64]>,
}

impl CharSet {
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        let mut chars: Vec<char> = chars.into_iter().collect();
        chars.sort_unstable();
        chars.dedup();

        let max = chars.last().map_or(0, |&c| c as u32);
        let bits = if max < BITMAP_LIMIT && !chars.is_empty() {
            let mut bits = vec![0u64; (max / 64 + 1) as usize];
            for &c in &chars {
                let cp = c as u32;
                bits[(cp / 64) as usize] |= 1 << (cp % 64);
            }
            bits
        } else {
            Vec::new()
        };

        Self {
            chars: chars.into_boxed_slice(),
            bits: bits.into_boxed_slice(),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        if self.bits.is_empty() {
            return self.chars.binary_search(&c).is_ok();
        }
        let cp = c as u32;
        match self.bits.get((cp / 64) as usize) {
            Some(word) => word & (1 << (cp % 64)) != 0,
            None => false,
        }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// A predicate over one character of a stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Exact character match.
    Literal { ch: char, negated: bool },
    /// Membership in a character set.
    Range { set: CharSet, negated: bool },
    /// Matches everything; negated it matches nothing.
    Wildcard { negated: bool },
}

impl Condition {
    pub fn literal(ch: char) -> Self {
        Condition::Literal { ch, negated: false }
    }

    pub fn range(chars: impl IntoIterator<Item = char>, negated: bool) -> Self {
        Condition::Range {
            set: CharSet::new(chars),
            negated,
        }
    }

    pub fn any() -> Self {
        Condition::Wildcard { negated: false }
    }

    pub fn admit(&self, c: char) -> bool {
        match self {
            Condition::Literal { ch, negated } => *negated ^ (c == *ch),
            Condition::Range { set, negated } => *negated ^ set.contains(c),
            Condition::Wildcard { negated } => !*negated,
        }
    }

    pub fn is_negated(&self) -> bool {
        match self {
            Condition::Literal { negated, .. }
            | Condition::Range { negated, .. }
            | Condition::Wildcard { negated } => *negated,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal { ch, negated: false } => write!(f, "{ch}"),
            Condition::Literal { ch, negated: true } => write!(f, "[^{ch}]"),
            Condition::Range { set, negated } => {
                f.write_str(if *negated { "[^" } else { "[" })?;
                for c in set.chars() {
                    write!(f, "{c}")?;
                }
                f.write_str("]")
            }
            Condition::Wildcard { negated: false } => f.write_str("."),
            Condition::Wildcard { negated: true } => f.write_str("[^]"),
        }
    }
}

/// Parse a condition string in affix-file notation: `.` is a wildcard,
/// `[abc]` a set, `[^abc]` a negated set, anything else a literal.
///
/// `[^]` is the impossible position. An empty string yields no conditions.
pub fn parse_conditions(text: &str) -> Result<Vec<Condition>, RuleError> {
    let mut out = Vec::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => out.push(Condition::any()),
            '[' => {
                let mut negated = false;
                let mut members = Vec::new();
                let mut closed = false;
                for (i, m) in chars.by_ref().enumerate() {
                    if m == ']' {
                        closed = true;
                        break;
                    }
                    if i == 0 && m == '^' {
                        negated = true;
                    } else {
                        members.push(m);
                    }
                }
                if !closed {
                    return Err(RuleError::InvalidCondition(text.to_string()));
                }
                if members.is_empty() {
                    out.push(Condition::Wildcard { negated: !negated });
                } else if members.len() == 1 {
                    out.push(Condition::Literal {
                        ch: members[0],
                        negated,
                    });
                } else {
                    out.push(Condition::range(members, negated));
                }
            }
            ']' => return Err(RuleError::InvalidCondition(text.to_string())),
            _ => out.push(Condition::literal(c)),
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// ConditionSet and its interning pool
// ---------------------------------------------------------------------------

/// Dense index of an interned [`ConditionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionSetId(pub usize);

/// An interned, ordered sequence of conditions.
///
/// Sets are only created through a [`ConditionPool`]; two sets with the same
/// content are the same `Arc` and carry the same id.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ConditionSet {
    id: ConditionSetId,
    conditions: Box<[Condition]>,
}

impl ConditionSet {
    pub fn id(&self) -> ConditionSetId {
        self.id
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check the conditions against the last `len()` characters of `word`.
    pub fn check_tail(&self, word: &[char]) -> bool {
        let Some(start) = word.len().checked_sub(self.conditions.len()) else {
            return false;
        };
        self.conditions
            .iter()
            .zip(&word[start..])
            .all(|(cond, &c)| cond.admit(c))
    }

    /// Check the conditions against the first `len()` characters of `word`.
    pub fn check_head(&self, word: &[char]) -> bool {
        if word.len() < self.conditions.len() {
            return false;
        }
        self.conditions
            .iter()
            .zip(word)
            .all(|(cond, &c)| cond.admit(c))
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cond in self.conditions.iter() {
            write!(f, "{cond}")?;
        }
        Ok(())
    }
}

/// Interning arena for condition sequences.
///
/// A rule set and all its nested levels share one pool, so ids stay
/// comparable across the whole chain and a single memo table covers them.
#[derive(Debug, Default)]
pub struct ConditionPool {
    by_content: HashMap<Box<[Condition]>, Arc<ConditionSet>>,
}

impl ConditionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared set for `conditions`, creating it on first sight.
    pub fn intern(&mut self, conditions: Vec<Condition>) -> Arc<ConditionSet> {
        let key = conditions.into_boxed_slice();
        if let Some(set) = self.by_content.get(&key) {
            return Arc::clone(set);
        }
        let set = Arc::new(ConditionSet {
            id: ConditionSetId(self.by_content.len()),
            conditions: key.clone(),
        });
        self.by_content.insert(key, Arc::clone(&set));
        set
    }

    /// Number of distinct sets interned so far.
    pub fn len(&self) -> usize {
        self.by_content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_content.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ConditionMemo
// ---------------------------------------------------------------------------

/// Per-round memo of condition-set checks.
///
/// A round covers one remainder string: every affix entry tried against the
/// same remainder whose stem conditions intern to the same set reuses the
/// first result. Starting a new round is O(1); stale slots are recognised by
/// their round stamp.
#[derive(Debug, Clone, Default)]
pub struct ConditionMemo {
    round: u32,
    slots: Vec<(u32, bool)>,
}

impl ConditionMemo {
    pub fn new(size: usize) -> Self {
        Self {
            round: 1,
            slots: vec![(0, false); size],
        }
    }

    /// Invalidate every memoized result.
    pub fn next_round(&mut self) {
        self.round = self.round.wrapping_add(1);
        if self.round == 0 {
            self.slots.fill((0, false));
            self.round = 1;
        }
    }

    /// Return the memoized result for `id` in this round, computing it with
    /// `check` on a miss.
    pub fn check(&mut self, id: ConditionSetId, check: impl FnOnce() -> bool) -> bool {
        if id.0 >= self.slots.len() {
            self.slots.resize(id.0 + 1, (0, false));
        }
        let (stamp, value) = self.slots[id.0];
        if stamp == self.round {
            return value;
        }
        let value = check();
        self.slots[id.0] = (self.round, value);
        value
    }
}
