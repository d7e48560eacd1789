// Analysis policy: search depth, compound limits, affix identifier and order

use std::fmt;
use std::str::FromStr;

use morfix_core::{AffixEntry, FlagSet, Rules};

use crate::ControlError;

// ---------------------------------------------------------------------------
// Depth
// ---------------------------------------------------------------------------

/// Search stages in the order they run.
///
/// A configured depth lets the search stop early: once the current stage is
/// at or past the depth and at least one analysis exists, nothing further is
/// tried. `FirstStem` therefore returns the first analysis found by any
/// stage, while `AllCompounds` explores everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Depth {
    #[default]
    FirstStem,
    AllStems,
    FirstSuffix,
    AllSuffixes,
    FirstPrefix,
    AllPrefixes,
    FirstCross,
    AllCrosses,
    FirstCompound,
    AllCompounds,
}

impl Depth {
    pub const ALL: [Depth; 10] = [
        Depth::FirstStem,
        Depth::AllStems,
        Depth::FirstSuffix,
        Depth::AllSuffixes,
        Depth::FirstPrefix,
        Depth::AllPrefixes,
        Depth::FirstCross,
        Depth::AllCrosses,
        Depth::FirstCompound,
        Depth::AllCompounds,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Depth::FirstStem => "first-stem",
            Depth::AllStems => "all-stems",
            Depth::FirstSuffix => "first-suffix",
            Depth::AllSuffixes => "all-suffixes",
            Depth::FirstPrefix => "first-prefix",
            Depth::AllPrefixes => "all-prefixes",
            Depth::FirstCross => "first-cross",
            Depth::AllCrosses => "all-crosses",
            Depth::FirstCompound => "first-compound",
            Depth::AllCompounds => "all-compounds",
        }
    }
}

impl FromStr for Depth {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Depth::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| ControlError::UnknownDepth(s.to_string()))
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CompoundControl
// ---------------------------------------------------------------------------

/// Order in which split points of a compound candidate are tried.
///
/// Only [`Shortest`](CompoundHint::Shortest) is the classic left-to-right
/// scan; the other two are orders this crate adds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompoundHint {
    /// Shortest left component first, scanning the word left to right.
    #[default]
    Shortest,
    /// Longest left component first. An extension of this crate.
    Longest,
    /// Alternate from both ends towards the middle. An extension of this
    /// crate.
    Both,
}

impl CompoundHint {
    pub fn name(self) -> &'static str {
        match self {
            CompoundHint::Shortest => "shortest",
            CompoundHint::Longest => "longest",
            CompoundHint::Both => "both",
        }
    }

    /// Split positions `from..=to` in trial order.
    pub(crate) fn positions(self, from: usize, to: usize) -> Vec<usize> {
        if from > to {
            return Vec::new();
        }
        match self {
            CompoundHint::Shortest => (from..=to).collect(),
            CompoundHint::Longest => (from..=to).rev().collect(),
            CompoundHint::Both => {
                let mut out = Vec::with_capacity(to - from + 1);
                let (mut lo, mut hi) = (from, to);
                while lo < hi {
                    out.push(lo);
                    out.push(hi);
                    lo += 1;
                    hi -= 1;
                }
                if lo == hi {
                    out.push(lo);
                }
                out
            }
        }
    }
}

impl FromStr for CompoundHint {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [CompoundHint::Shortest, CompoundHint::Longest, CompoundHint::Both]
            .into_iter()
            .find(|h| h.name() == s)
            .ok_or_else(|| ControlError::UnknownHint(s.to_string()))
    }
}

/// Limits of compound decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundControl {
    enabled: bool,
    min: usize,
    max: usize,
    hint: CompoundHint,
}

impl CompoundControl {
    pub const DEFAULT_MIN: usize = 2;
    pub const DEFAULT_MAX: usize = 3;
    /// Largest accepted minimum component length.
    pub const MAX_MIN: usize = 6;
    /// Largest accepted component count.
    pub const MAX_MAX: usize = 32;

    pub fn new(min: usize, max: usize) -> Result<Self, ControlError> {
        let mut control = Self::default();
        control.set_min(min)?;
        control.set_max(max)?;
        Ok(control)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Minimum length of a component, in characters.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Maximum number of components.
    pub fn max(&self) -> usize {
        self.max
    }

    pub fn hint(&self) -> CompoundHint {
        self.hint
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_min(&mut self, min: usize) -> Result<(), ControlError> {
        if !(1..=Self::MAX_MIN).contains(&min) {
            return Err(ControlError::CompoundMin(min));
        }
        self.min = min;
        Ok(())
    }

    pub fn set_max(&mut self, max: usize) -> Result<(), ControlError> {
        if !(2..=Self::MAX_MAX).contains(&max) {
            return Err(ControlError::CompoundMax(max));
        }
        self.max = max;
        Ok(())
    }

    pub fn set_hint(&mut self, hint: CompoundHint) {
        self.hint = hint;
    }
}

impl Default for CompoundControl {
    fn default() -> Self {
        Self {
            enabled: true,
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
            hint: CompoundHint::Shortest,
        }
    }
}

impl fmt::Display for CompoundControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return f.write_str("compound[disabled]");
        }
        write!(f, "compound[{}, {}, {}]", self.min, self.max, self.hint.name())
    }
}

// ---------------------------------------------------------------------------
// Affix policy
// ---------------------------------------------------------------------------

/// How entries sharing a strip bucket are told apart.
///
/// Once an entry of a bucket yields an analysis, later entries of the same
/// bucket with an equal identifier are skipped, as they could only repeat it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AffixIdentifier {
    /// Granted flags only.
    Flag,
    /// Granted flags and case ending.
    #[default]
    FlagAndCase,
}

impl AffixIdentifier {
    pub fn name(self) -> &'static str {
        match self {
            AffixIdentifier::Flag => "flag",
            AffixIdentifier::FlagAndCase => "flag&case",
        }
    }

    pub(crate) fn key<'r>(self, entry: &'r AffixEntry) -> (&'r FlagSet, &'r str) {
        match self {
            AffixIdentifier::Flag => (entry.flags(), ""),
            AffixIdentifier::FlagAndCase => (entry.flags(), entry.case_ending()),
        }
    }
}

impl FromStr for AffixIdentifier {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flag" => Ok(AffixIdentifier::Flag),
            "flag&case" => Ok(AffixIdentifier::FlagAndCase),
            _ => Err(ControlError::UnknownIdentifier(s.to_string())),
        }
    }
}

impl fmt::Display for AffixIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Order in which matching appends of one direction are tried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AffixOrder {
    #[default]
    LongestFirst,
    ShortestFirst,
}

// ---------------------------------------------------------------------------
// AnalysisControl
// ---------------------------------------------------------------------------

/// Options for an analysis context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisControl {
    pub depth: Depth,
    pub compound: CompoundControl,
    pub identifier: AffixIdentifier,
    pub suffix_order: AffixOrder,
    pub prefix_order: AffixOrder,
    /// Try the whole word as a compound only after the affix stages, instead
    /// of together with the dictionary lookup.
    pub affix_first: bool,
}

impl AnalysisControl {
    pub fn with_depth(depth: Depth) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// Options matching `rules`: compounding is enabled exactly when the
    /// rules define a compound flag, and the minimum component length comes
    /// from the compound-word setting when one is given.
    pub fn for_rules(rules: &Rules) -> Result<Self, ControlError> {
        let mut control = Self::default();
        let flags = rules.compound_flags();
        control.compound.set_enabled(flags.compound.is_some());
        if flags.compound.is_some() && flags.min_word > 0 {
            control.compound.set_min(flags.min_word)?;
        }
        Ok(control)
    }

    pub(crate) fn order(&self, direction: morfix_core::Direction) -> AffixOrder {
        match direction {
            morfix_core::Direction::Suffix => self.suffix_order,
            morfix_core::Direction::Prefix => self.prefix_order,
        }
    }

    /// Whether compounding explores every decomposition.
    pub(crate) fn all_compounds(&self) -> bool {
        self.depth >= Depth::AllCompounds
    }
}

impl fmt::Display for AnalysisControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control[{}, {}, {}]", self.depth, self.compound, self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morfix_core::{CompoundFlags, Direction, EntrySpec, MorphTag};

    #[test]
    fn depth_names_round_trip() {
        for d in Depth::ALL {
            assert_eq!(d.name().parse::<Depth>().unwrap(), d);
        }
        assert!(matches!(
            "deepest".parse::<Depth>(),
            Err(ControlError::UnknownDepth(_))
        ));
        assert!(Depth::FirstCross < Depth::AllCrosses);
        assert_eq!(Depth::default(), Depth::FirstStem);
    }

    #[test]
    fn compound_limits_are_validated() {
        let mut c = CompoundControl::default();
        assert!(c.enabled());
        assert_eq!((c.min(), c.max()), (2, 3));
        assert!(matches!(c.set_min(0), Err(ControlError::CompoundMin(0))));
        assert!(matches!(c.set_min(7), Err(ControlError::CompoundMin(7))));
        assert!(matches!(c.set_max(1), Err(ControlError::CompoundMax(1))));
        assert!(matches!(c.set_max(33), Err(ControlError::CompoundMax(33))));
        c.set_min(6).unwrap();
        c.set_max(32).unwrap();
        assert_eq!((c.min(), c.max()), (6, 32));
        assert!(CompoundControl::new(3, 4).is_ok());
    }

    #[test]
    fn hint_positions() {
        assert_eq!(CompoundHint::Shortest.positions(2, 5), vec![2, 3, 4, 5]);
        assert_eq!(CompoundHint::Longest.positions(2, 5), vec![5, 4, 3, 2]);
        assert_eq!(CompoundHint::Both.positions(2, 6), vec![2, 6, 3, 5, 4]);
        assert!(CompoundHint::Both.positions(4, 3).is_empty());
        assert_eq!("longest".parse::<CompoundHint>().unwrap(), CompoundHint::Longest);
    }

    #[test]
    fn identifier_keys() {
        let mut b = Rules::builder();
        b.add_affix('S', Direction::Suffix, false).unwrap();
        let tag = |case: &str| MorphTag {
            case_ending: case.to_string(),
            ..Default::default()
        };
        let x = b
            .add_entry('S', EntrySpec::new("", "s", vec![]).with_tag(tag("NOM")))
            .unwrap();
        let y = b
            .add_entry('S', EntrySpec::new("", "s", vec![]).with_tag(tag("ACC")))
            .unwrap();
        let rules = b.build();
        let (x, y) = (rules.entry(x), rules.entry(y));
        assert_eq!(AffixIdentifier::Flag.key(x), AffixIdentifier::Flag.key(y));
        assert_ne!(
            AffixIdentifier::FlagAndCase.key(x),
            AffixIdentifier::FlagAndCase.key(y)
        );
        assert_eq!("flag&case".parse::<AffixIdentifier>().unwrap(), AffixIdentifier::FlagAndCase);
        assert!("case".parse::<AffixIdentifier>().is_err());
    }

    #[test]
    fn control_follows_compound_flags() {
        let plain = Rules::builder().build();
        assert!(!AnalysisControl::for_rules(&plain).unwrap().compound.enabled());

        let rules = Rules::builder()
            .compound_flags(CompoundFlags {
                compound: Some('C'),
                min_word: 3,
                ..Default::default()
            })
            .build();
        let control = AnalysisControl::for_rules(&rules).unwrap();
        assert!(control.compound.enabled());
        assert_eq!(control.compound.min(), 3);

        let bad = Rules::builder()
            .compound_flags(CompoundFlags {
                compound: Some('C'),
                min_word: 9,
                ..Default::default()
            })
            .build();
        assert!(matches!(
            AnalysisControl::for_rules(&bad),
            Err(ControlError::CompoundMin(9))
        ));
    }
}
