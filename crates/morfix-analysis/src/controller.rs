// Compound legality policies

use hashbrown::{HashMap, HashSet};
use morfix_core::{FlagSet, Rules};

use crate::stem::Stem;

/// Decides which component pairs may form a compound.
///
/// The analyser asks [`compound_last`](Self::compound_last) or
/// [`compound_inner`](Self::compound_inner) about a right part first, and
/// only then [`compound`](Self::compound) about each left part paired with
/// it. Accepted pairs are built with
/// [`create_compound`](Self::create_compound).
pub trait CompoundController: Send + Sync {
    fn compound(&self, left: &Stem<'_>, right: &Stem<'_>) -> bool;

    /// Whether `right` may be a right part that is not the end of the word.
    fn compound_inner(&self, right: &Stem<'_>) -> bool;

    /// Whether `right` may end the word.
    fn compound_last(&self, right: &Stem<'_>) -> bool;

    fn create_compound<'a>(
        &self,
        rules: &Rules,
        left: Stem<'a>,
        right: Stem<'a>,
        dash: bool,
    ) -> Stem<'a> {
        Stem::compound(rules, left, right, dash)
    }
}

// ---------------------------------------------------------------------------
// FlagController
// ---------------------------------------------------------------------------

/// Legality from the compound flags of the rules.
///
/// A left part needs the compound or compound-first flag, an inner right part
/// the compound flag, and a last part the compound or compound-last flag.
/// The forbidden flag vetoes a part in every position.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagController {
    compound: Option<char>,
    first: Option<char>,
    last: Option<char>,
    forbidden: Option<char>,
}

fn has(stem: &Stem<'_>, flag: Option<char>) -> bool {
    flag.is_some_and(|f| stem.flags().contains(f))
}

impl FlagController {
    pub fn from_rules(rules: &Rules) -> Self {
        let flags = rules.compound_flags();
        Self {
            compound: flags.compound,
            first: flags.first,
            last: flags.last,
            forbidden: flags.forbidden,
        }
    }

    fn allowed(&self, stem: &Stem<'_>) -> bool {
        !has(stem, self.forbidden)
    }
}

impl CompoundController for FlagController {
    fn compound(&self, left: &Stem<'_>, _right: &Stem<'_>) -> bool {
        (has(left, self.compound) || has(left, self.first)) && self.allowed(left)
    }

    fn compound_inner(&self, right: &Stem<'_>) -> bool {
        has(right, self.compound) && self.allowed(right)
    }

    fn compound_last(&self, right: &Stem<'_>) -> bool {
        (has(right, self.compound) || has(right, self.last)) && self.allowed(right)
    }
}

// ---------------------------------------------------------------------------
// PosController
// ---------------------------------------------------------------------------

/// Flag legality extended by part-of-speech pairs.
///
/// Each registered pair `(left, right)` licenses joining words of those parts
/// of speech, and may add and remove flags on the result.
#[derive(Debug, Clone, Default)]
pub struct PosController {
    flags: FlagController,
    pairs: HashMap<(String, String), (FlagSet, FlagSet)>,
    inner: HashSet<String>,
    last: HashSet<String>,
}

impl PosController {
    pub fn new(flags: FlagController) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    /// Register a pair. The left part of speech becomes acceptable for inner
    /// right parts and the right one for last parts.
    pub fn add_pair(&mut self, left: &str, right: &str, add: FlagSet, remove: FlagSet) {
        self.pairs
            .insert((left.to_string(), right.to_string()), (add, remove));
        self.inner.insert(left.to_string());
        self.last.insert(right.to_string());
    }

    fn pair(&self, left: &Stem<'_>, right: &Stem<'_>) -> Option<&(FlagSet, FlagSet)> {
        let key = (
            left.pos().unwrap_or("").to_string(),
            right.pos().unwrap_or("").to_string(),
        );
        self.pairs.get(&key)
    }

    fn pos_in(set: &HashSet<String>, stem: &Stem<'_>) -> bool {
        set.contains(stem.pos().unwrap_or(""))
    }
}

impl CompoundController for PosController {
    fn compound(&self, left: &Stem<'_>, right: &Stem<'_>) -> bool {
        self.flags.compound(left, right) || self.pair(left, right).is_some()
    }

    fn compound_inner(&self, right: &Stem<'_>) -> bool {
        self.flags.compound_inner(right) || Self::pos_in(&self.inner, right)
    }

    fn compound_last(&self, right: &Stem<'_>) -> bool {
        self.flags.compound_last(right) || Self::pos_in(&self.last, right)
    }

    fn create_compound<'a>(
        &self,
        rules: &Rules,
        left: Stem<'a>,
        right: Stem<'a>,
        dash: bool,
    ) -> Stem<'a> {
        let adjust = self.pair(&left, &right).cloned();
        let stem = Stem::compound(rules, left, right, dash);
        match adjust {
            Some((add, remove)) => stem.adjusted(&add, &remove),
            None => stem,
        }
    }
}

// ---------------------------------------------------------------------------
// AnyController
// ---------------------------------------------------------------------------

/// Accepts every pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyController;

impl CompoundController for AnyController {
    fn compound(&self, _left: &Stem<'_>, _right: &Stem<'_>) -> bool {
        true
    }

    fn compound_inner(&self, _right: &Stem<'_>) -> bool {
        true
    }

    fn compound_last(&self, _right: &Stem<'_>) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morfix_core::{CompoundFlags, Dictionary, MorphTag};

    fn rules() -> Rules {
        Rules::builder()
            .compound_flags(CompoundFlags {
                compound: Some('C'),
                first: Some('F'),
                last: Some('L'),
                forbidden: Some('X'),
                ..Default::default()
            })
            .build()
    }

    fn noun() -> MorphTag {
        MorphTag {
            pos: Some("NOUN".into()),
            ..Default::default()
        }
    }

    #[test]
    fn flag_positions() {
        let rules = rules();
        let c = FlagController::from_rules(&rules);
        let mut d = Dictionary::new();
        d.add("any", "C");
        d.add("first", "F");
        d.add("last", "L");
        d.add("banned", "CX");
        let get = |w: &str| Stem::Dict(d.get(w).unwrap());

        assert!(c.compound(&get("any"), &get("last")));
        assert!(c.compound(&get("first"), &get("last")));
        assert!(!c.compound(&get("last"), &get("any")));
        assert!(!c.compound(&get("banned"), &get("any")));

        assert!(c.compound_inner(&get("any")));
        assert!(!c.compound_inner(&get("last")));
        assert!(c.compound_last(&get("last")));
        assert!(c.compound_last(&get("any")));
        assert!(!c.compound_last(&get("first")));
        assert!(!c.compound_last(&get("banned")));
    }

    #[test]
    fn pos_pairs_adjust_flags() {
        let rules = rules();
        let mut c = PosController::new(FlagController::from_rules(&rules));
        c.add_pair("NOUN", "NOUN", FlagSet::new("Z"), FlagSet::new("S"));
        let mut d = Dictionary::new();
        d.add_tagged("bird", "S", noun());
        d.add_tagged("house", "S", noun());
        d.add("tiny", "");
        let get = |w: &str| Stem::Dict(d.get(w).unwrap());

        assert!(c.compound(&get("bird"), &get("house")));
        assert!(!c.compound(&get("tiny"), &get("house")));
        assert!(c.compound_last(&get("house")));
        assert!(c.compound_inner(&get("bird")));
        assert!(!c.compound_last(&get("tiny")));

        let made = c.create_compound(&rules, get("bird"), get("house"), false);
        assert_eq!(made.text(), "birdhouse");
        assert_eq!(made.flags().as_str(), "Z");
    }

    #[test]
    fn any_accepts_everything() {
        let mut d = Dictionary::new();
        d.add("a", "");
        let a = Stem::Dict(d.get("a").unwrap());
        assert!(AnyController.compound(&a, &a));
        assert!(AnyController.compound_inner(&a));
        assert!(AnyController.compound_last(&a));
    }
}
