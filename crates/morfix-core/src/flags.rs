// Flag sets and their interning pool

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use hashbrown::HashMap;

/// Highest flag code point covered by the membership bitmap.
const BITMAP_LIMIT: u32 = 0x1_0000;

#[derive(Debug)]
struct FlagData {
    /// Canonical form: sorted, unique flag characters.
    text: Box<str>,
    chars: Box<[char]>,
    /// Bitmap over `0..=max`, empty when a flag lies outside the BMP.
    bits: Box<[u64]>,
}

/// An immutable set of flag characters.
///
/// The empty set carries no allocation, so every "no flags" value is the same
/// instance. Non-empty sets are reference counted; sets produced by a
/// [`FlagPool`] share one allocation per canonical string, and [`FlagSet::same`]
/// compares that identity. Equality and hashing are by content.
#[derive(Clone, Default)]
pub struct FlagSet(Option<Arc<FlagData>>);

impl FlagSet {
    /// The shared empty set.
    pub const fn empty() -> Self {
        FlagSet(None)
    }

    /// Build a set from a string of flag characters. Order and repetition
    /// are irrelevant.
    pub fn new(flags: &str) -> Self {
        Self::from_chars(flags.chars())
    }

    pub fn from_chars(flags: impl IntoIterator<Item = char>) -> Self {
        let mut chars: Vec<char> = flags.into_iter().collect();
        chars.sort_unstable();
        chars.dedup();
        Self::from_sorted(chars)
    }

    fn from_sorted(chars: Vec<char>) -> Self {
        if chars.is_empty() {
            return FlagSet(None);
        }
        let max = chars.last().map_or(0, |&c| c as u32);
        let bits = if max < BITMAP_LIMIT {
            let mut bits = vec![0u64; (max / 64 + 1) as usize];
            for &c in &chars {
                let cp = c as u32;
                bits[(cp / 64) as usize] |= 1 << (cp % 64);
            }
            bits
        } else {
            Vec::new()
        };
        let text: String = chars.iter().collect();
        FlagSet(Some(Arc::new(FlagData {
            text: text.into_boxed_str(),
            chars: chars.into_boxed_slice(),
            bits: bits.into_boxed_slice(),
        })))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn len(&self) -> usize {
        self.chars().len()
    }

    /// Sorted member characters.
    pub fn chars(&self) -> &[char] {
        match &self.0 {
            Some(data) => &data.chars,
            None => &[],
        }
    }

    /// Canonical sorted string form.
    pub fn as_str(&self) -> &str {
        match &self.0 {
            Some(data) => &data.text,
            None => "",
        }
    }

    pub fn contains(&self, flag: char) -> bool {
        let Some(data) = &self.0 else {
            return false;
        };
        if data.bits.is_empty() {
            return data.chars.binary_search(&flag).is_ok();
        }
        let cp = flag as u32;
        match data.bits.get((cp / 64) as usize) {
            Some(word) => word & (1 << (cp % 64)) != 0,
            None => false,
        }
    }

    /// Whether every flag of `other` is in this set.
    pub fn contains_all(&self, other: &FlagSet) -> bool {
        other.chars().iter().all(|&c| self.contains(c))
    }

    /// Whether the two sets share a flag.
    pub fn intersects(&self, other: &FlagSet) -> bool {
        other.chars().iter().any(|&c| self.contains(c))
    }

    pub fn union(&self, other: &FlagSet) -> FlagSet {
        if other.is_empty() || self.contains_all(other) {
            return self.clone();
        }
        if self.is_empty() || other.contains_all(self) {
            return other.clone();
        }
        let mut merged = Vec::with_capacity(self.len() + other.len());
        let (mut a, mut b) = (self.chars().iter().peekable(), other.chars().iter().peekable());
        loop {
            match (a.peek(), b.peek()) {
                (Some(&&x), Some(&&y)) => {
                    if x <= y {
                        merged.push(x);
                        a.next();
                        if x == y {
                            b.next();
                        }
                    } else {
                        merged.push(y);
                        b.next();
                    }
                }
                (Some(&&x), None) => {
                    merged.push(x);
                    a.next();
                }
                (None, Some(&&y)) => {
                    merged.push(y);
                    b.next();
                }
                (None, None) => break,
            }
        }
        Self::from_sorted(merged)
    }

    pub fn difference(&self, other: &FlagSet) -> FlagSet {
        if self.is_empty() || !self.intersects(other) {
            return self.clone();
        }
        Self::from_sorted(
            self.chars()
                .iter()
                .copied()
                .filter(|&c| !other.contains(c))
                .collect(),
        )
    }

    pub fn add(&self, flag: char) -> FlagSet {
        if self.contains(flag) {
            return self.clone();
        }
        let mut chars = self.chars().to_vec();
        let at = chars.partition_point(|&c| c < flag);
        chars.insert(at, flag);
        Self::from_sorted(chars)
    }

    pub fn remove(&self, flag: char) -> FlagSet {
        if !self.contains(flag) {
            return self.clone();
        }
        Self::from_sorted(self.chars().iter().copied().filter(|&c| c != flag).collect())
    }

    /// Identity comparison: both empty, or both backed by the same allocation.
    pub fn same(a: &FlagSet, b: &FlagSet) -> bool {
        match (&a.0, &b.0) {
            (None, None) => true,
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }
}

impl PartialEq for FlagSet {
    fn eq(&self, other: &Self) -> bool {
        FlagSet::same(self, other) || self.chars() == other.chars()
    }
}

impl Eq for FlagSet {}

impl Hash for FlagSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chars().hash(state);
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagSet({:?})", self.as_str())
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FlagPool
// ---------------------------------------------------------------------------

/// Interning arena for flag sets, keyed by canonical string.
#[derive(Debug, Default)]
pub struct FlagPool {
    by_text: HashMap<Box<str>, FlagSet>,
}

impl FlagPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared set for a string of flag characters.
    pub fn intern(&mut self, flags: &str) -> FlagSet {
        self.canonical(FlagSet::new(flags))
    }

    /// Return the shared instance equal to `set`, registering `set` itself on
    /// first sight.
    pub fn canonical(&mut self, set: FlagSet) -> FlagSet {
        if set.is_empty() {
            return FlagSet::empty();
        }
        if let Some(shared) = self.by_text.get(set.as_str()) {
            return shared.clone();
        }
        self.by_text.insert(set.as_str().into(), set.clone());
        set
    }

    /// Number of distinct non-empty sets.
    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }
}
