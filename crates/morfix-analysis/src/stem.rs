// Resolved stems: dictionary entries, derived words and compounds

use std::fmt;
use std::rc::Rc;

use morfix_core::{AffixEntry, Direction, EntryRef, FlagSet, Rules};

/// A word the search has resolved.
///
/// Dictionary entries are borrowed from the lexicon. Derived words and
/// compounds only exist for the duration of an analysis (or in a context's
/// compound caches) and are shared through `Rc`.
#[derive(Clone)]
pub enum Stem<'a> {
    Dict(EntryRef<'a>),
    Derived(Rc<Derived<'a>>),
    Compound(Rc<Compound<'a>>),
}

/// A word produced by applying an affix entry to a root.
pub struct Derived<'a> {
    word: Vec<char>,
    root: Stem<'a>,
    affix: &'a AffixEntry,
    flags: FlagSet,
}

impl<'a> Derived<'a> {
    pub fn root(&self) -> &Stem<'a> {
        &self.root
    }

    pub fn affix(&self) -> &'a AffixEntry {
        self.affix
    }

    /// Whether the deriving entry carries a morphological tag, which makes
    /// the result a word of its own rather than a plain form of the root.
    fn tagged(&self) -> bool {
        self.affix.tag().is_some()
    }
}

/// Two components joined into one word.
pub struct Compound<'a> {
    word: Vec<char>,
    left: Stem<'a>,
    right: Stem<'a>,
    flags: FlagSet,
    dash: bool,
    /// Same compound over the right part's root, when the right part is an
    /// inflected form.
    root: Option<Stem<'a>>,
}

impl<'a> Compound<'a> {
    pub fn left(&self) -> &Stem<'a> {
        &self.left
    }

    pub fn right(&self) -> &Stem<'a> {
        &self.right
    }

    /// Whether the components are separated by a dash in the word.
    pub fn dash(&self) -> bool {
        self.dash
    }
}

impl<'a> Stem<'a> {
    // -- construction --------------------------------------------------------

    /// Apply `affix` to `root`.
    ///
    /// A tagged entry makes a new word: it grants its own flags (plus the
    /// root's, minus its own flag, when the tag inherits flags). An untagged
    /// entry makes a plain form carrying the granted flags.
    pub fn derive(affix: &'a AffixEntry, root: Stem<'a>) -> Stem<'a> {
        let flags = match affix.tag() {
            Some(tag) if tag.inherit_flags => {
                affix.flags().union(root.flags()).remove(affix.flag())
            }
            _ => affix.flags().clone(),
        };
        Stem::Derived(Rc::new(Derived {
            word: affix.inflex(root.word()),
            root,
            affix,
            flags,
        }))
    }

    /// Join two components.
    ///
    /// The compound keeps the flags of its leftmost component that a suffix
    /// cannot claim, and those of its rightmost component that a prefix
    /// cannot claim.
    pub fn compound(rules: &Rules, left: Stem<'a>, right: Stem<'a>, dash: bool) -> Stem<'a> {
        let leftmost = left.leftmost().flags().difference(rules.suffix_pattern());
        let rightmost = right.rightmost().flags().difference(rules.prefix_pattern());
        let flags = leftmost.union(&rightmost);

        let mut word = left.word().to_vec();
        if dash {
            word.push('-');
        }
        word.extend_from_slice(right.word());

        let root = if right.inflexed() {
            right
                .root()
                .map(|r| Stem::compound(rules, left.clone(), r, dash))
        } else {
            None
        };
        Stem::Compound(Rc::new(Compound {
            word,
            left,
            right,
            flags,
            dash,
            root,
        }))
    }

    /// Copy of a compound with flags added and removed. Other stems are
    /// returned unchanged.
    pub fn adjusted(self, add: &FlagSet, remove: &FlagSet) -> Stem<'a> {
        match self {
            Stem::Compound(c) => Stem::Compound(Rc::new(Compound {
                word: c.word.clone(),
                left: c.left.clone(),
                right: c.right.clone(),
                flags: c.flags.union(add).difference(remove),
                dash: c.dash,
                root: c.root.clone(),
            })),
            other => other,
        }
    }

    // -- identity and surface ------------------------------------------------

    pub fn word(&self) -> &[char] {
        match self {
            Stem::Dict(e) => e.word(),
            Stem::Derived(d) => &d.word,
            Stem::Compound(c) => &c.word,
        }
    }

    pub fn text(&self) -> String {
        self.word().iter().collect()
    }

    pub fn entry(&self) -> Option<EntryRef<'a>> {
        match self {
            Stem::Dict(e) => Some(*e),
            _ => None,
        }
    }

    /// The entry that derived this stem, if any.
    pub fn deriver(&self) -> Option<&'a AffixEntry> {
        match self {
            Stem::Derived(d) => Some(d.affix),
            _ => None,
        }
    }

    /// Same stem: the same dictionary entry, the same derivation object, or
    /// compounds of the same components.
    pub fn same(&self, other: &Stem<'a>) -> bool {
        match (self, other) {
            (Stem::Dict(a), Stem::Dict(b)) => a == b,
            (Stem::Derived(a), Stem::Derived(b)) => Rc::ptr_eq(a, b),
            (Stem::Compound(a), Stem::Compound(b)) => {
                Rc::ptr_eq(a, b) || (a.left.same(&b.left) && a.right.same(&b.right))
            }
            _ => false,
        }
    }

    pub fn flags(&self) -> &FlagSet {
        match self {
            Stem::Dict(e) => e.flags(),
            Stem::Derived(d) => &d.flags,
            Stem::Compound(c) => &c.flags,
        }
    }

    /// Number of compound components.
    pub fn components(&self) -> usize {
        match self {
            Stem::Compound(c) => c.left.components() + c.right.components(),
            _ => 1,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Stem::Compound(_))
    }

    /// Leaf components, left to right.
    pub fn parts(&self) -> Vec<Stem<'a>> {
        let mut out = Vec::new();
        self.collect_parts(&mut out);
        out
    }

    fn collect_parts(&self, out: &mut Vec<Stem<'a>>) {
        match self {
            Stem::Compound(c) => {
                c.left.collect_parts(out);
                c.right.collect_parts(out);
            }
            other => out.push(other.clone()),
        }
    }

    fn leftmost(&self) -> &Stem<'a> {
        match self {
            Stem::Compound(c) => c.left.leftmost(),
            other => other,
        }
    }

    fn rightmost(&self) -> &Stem<'a> {
        match self {
            Stem::Compound(c) => c.right.rightmost(),
            other => other,
        }
    }

    // -- morphology ----------------------------------------------------------

    pub fn pos(&self) -> Option<&'a str> {
        match self {
            Stem::Dict(e) => e.pos(),
            Stem::Derived(d) if d.tagged() => d.affix.pos().or_else(|| d.root.pos()),
            Stem::Derived(_) => None,
            Stem::Compound(c) => c.right.pos(),
        }
    }

    pub fn case_ending(&self) -> &'a str {
        match self {
            Stem::Dict(e) => e.case_ending(),
            Stem::Derived(d) if d.tagged() => match d.affix.direction() {
                Direction::Prefix => d.root.case_ending(),
                Direction::Suffix => d.affix.case_ending(),
            },
            Stem::Derived(_) => "",
            Stem::Compound(c) => c.right.case_ending(),
        }
    }

    pub fn derivator_string(&self) -> &'a str {
        match self {
            Stem::Dict(e) => e.derivator_string(),
            Stem::Derived(d) if d.tagged() => d.affix.derivator_string(),
            _ => "",
        }
    }

    pub fn inflexion_string(&self) -> &'a str {
        match self {
            Stem::Dict(e) => e.inflexion_string(),
            Stem::Derived(d) if d.tagged() => d.affix.inflexion_string(),
            Stem::Derived(_) => "",
            Stem::Compound(c) => c.right.inflexion_string(),
        }
    }

    // -- root chain ----------------------------------------------------------

    pub fn root(&self) -> Option<Stem<'a>> {
        match self {
            Stem::Dict(e) => e.root().map(Stem::Dict),
            Stem::Derived(d) => Some(d.root.clone()),
            Stem::Compound(c) => c.root.clone(),
        }
    }

    /// Made by a derivation rather than an inflexion.
    pub fn derived(&self) -> bool {
        match self {
            Stem::Dict(e) => e.derived(),
            Stem::Derived(d) => d.tagged(),
            Stem::Compound(_) => false,
        }
    }

    /// A form of another word that is not a derivation of it.
    pub fn inflexed(&self) -> bool {
        match self {
            Stem::Dict(e) => e.inflexed() && !e.derived(),
            Stem::Derived(d) => !d.tagged(),
            Stem::Compound(c) => c.root.is_some(),
        }
    }

    /// Whether the stem stands for a word as listed, as opposed to one built
    /// during analysis.
    pub fn dictionary_word(&self) -> bool {
        match self {
            Stem::Dict(_) => true,
            Stem::Derived(d) => !d.tagged(),
            Stem::Compound(_) => false,
        }
    }

    /// Nearest root that is not an inflected form.
    pub fn relative_root(&self) -> Stem<'a> {
        match self.root() {
            Some(root) if self.inflexed() => root.relative_root(),
            _ => self.clone(),
        }
    }

    /// Nearest root taken from the dictionary.
    pub fn dictionary_root(&self) -> Stem<'a> {
        match self.root() {
            Some(root) if !self.dictionary_word() => root.dictionary_root(),
            _ => self.relative_root(),
        }
    }

    /// End of the root chain.
    pub fn absolute_root(&self) -> Stem<'a> {
        match self.root() {
            Some(root) => root.absolute_root(),
            None => self.clone(),
        }
    }

    /// Derivator morph strings along the root chain, from `until` (exclusive)
    /// up to this stem, space separated.
    pub fn derivator_path(&self, until: &Stem<'a>) -> String {
        let root = match self.root() {
            Some(root) if !self.same(until) => root,
            _ => return String::new(),
        };
        let below = root.derivator_path(until);
        let own = self.derivator_string();
        match (below.is_empty(), own.is_empty()) {
            (_, true) => below,
            (true, false) => own.to_string(),
            (false, false) => format!("{below} {own}"),
        }
    }

    // -- flag checks ---------------------------------------------------------

    /// Whether the stem accepts `affix`.
    ///
    /// Beyond its own flags, a tagged derivation accepts what its root
    /// accepts when the affix is a plain inflexion and the derivation kept
    /// the root's part of speech and case ending, or when the affix works on
    /// the opposite end of the word from the deriving entry.
    pub fn has_flag(&self, affix: &AffixEntry) -> bool {
        if self.flags().contains(affix.flag()) {
            return true;
        }
        match self {
            Stem::Derived(d) if d.tagged() => {
                if !affix.is_derivator() && self.keeps_root_class(d) {
                    d.root.has_flag(affix)
                } else if affix.direction() != d.affix.direction() {
                    d.root.has_flag(affix)
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Flags available to the stem, including those inherited along a chain
    /// of derivations that kept part of speech and case ending.
    pub fn accumulated_flags(&self) -> FlagSet {
        match self {
            Stem::Derived(d) if d.tagged() && self.keeps_root_class(d) => d
                .flags
                .union(&d.root.accumulated_flags())
                .union(d.affix.flags()),
            other => other.flags().clone(),
        }
    }

    fn keeps_root_class(&self, d: &Derived<'a>) -> bool {
        d.root.pos() == self.pos() && d.root.case_ending() == self.case_ending()
    }
}

impl fmt::Debug for Stem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stem::Dict(e) => write!(f, "Dict({e:?})"),
            Stem::Derived(d) => write!(f, "Derived({:?} <= {:?})", self.text(), d.root),
            Stem::Compound(c) => write!(f, "Compound({:?} + {:?})", c.left, c.right),
        }
    }
}

impl fmt::Display for Stem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stem::Dict(e) => write!(f, "{e}"),
            Stem::Derived(d) => write!(f, "{}<={}", self.text(), d.root),
            Stem::Compound(c) => write!(f, "{}, {} + {}", self.components(), c.left, c.right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morfix_core::{AffixEntryId, CompoundFlags, Dictionary, EntrySpec, MorphTag};

    fn tag(pos: Option<&str>, case: &str, morph: &str, derivator: bool) -> MorphTag {
        MorphTag {
            pos: pos.map(str::to_string),
            case_ending: case.to_string(),
            morph: morph.to_string(),
            derivator,
            inherit_flags: false,
        }
    }

    struct Fixture {
        rules: Rules,
        ness: AffixEntryId,
        plural: AffixEntryId,
        un: AffixEntryId,
        plain: AffixEntryId,
    }

    fn fixture() -> Fixture {
        let mut b = Rules::builder()
            .recursion_depth(1)
            .compound_flags(CompoundFlags {
                compound: Some('C'),
                ..Default::default()
            });
        b.add_affix('N', Direction::Suffix, false).unwrap();
        b.add_affix('S', Direction::Suffix, true).unwrap();
        b.add_affix('U', Direction::Prefix, true).unwrap();
        b.add_affix('P', Direction::Suffix, false).unwrap();
        let ness = b
            .add_entry(
                'N',
                EntrySpec::new("y", "iness", vec![])
                    .with_flags(FlagSet::new("S"))
                    .with_tag(tag(Some("NOUN"), "", "[ADJ>NOUN]", true)),
            )
            .unwrap();
        let plural = b
            .add_entry(
                'S',
                EntrySpec::new("", "es", vec![]).with_tag(tag(None, "PL", "+PL", false)),
            )
            .unwrap();
        let un = b
            .add_entry('U', EntrySpec::new("", "un", vec![]).with_tag(tag(None, "", "[NEG]", true)))
            .unwrap();
        let plain = b
            .add_entry('P', EntrySpec::new("", "s", vec![]).with_flags(FlagSet::new("Q")))
            .unwrap();
        Fixture {
            rules: b.build(),
            ness,
            plural,
            un,
            plain,
        }
    }

    fn dict() -> Dictionary {
        let mut d = Dictionary::new();
        d.add_tagged("happy", "NU", tag(Some("ADJ"), "", "", false));
        d.add("sun", "C");
        d.add("flower", "CS");
        d
    }

    fn lookup<'d>(d: &'d Dictionary, w: &str) -> Stem<'d> {
        Stem::Dict(d.get(w).unwrap())
    }

    #[test]
    fn derived_words_carry_the_tag() {
        let f = fixture();
        let d = dict();
        let happy = lookup(&d, "happy");
        let ness = Stem::derive(f.rules.entry(f.ness), happy.clone());
        assert_eq!(ness.text(), "happiness");
        assert_eq!(ness.pos(), Some("NOUN"));
        assert!(ness.derived());
        assert!(!ness.inflexed());
        assert!(!ness.dictionary_word());
        assert!(ness.flags().contains('S'));
        assert!(ness.root().unwrap().same(&happy));
        assert_eq!(ness.relative_root().text(), "happiness");
        assert_eq!(ness.dictionary_root().text(), "happy");
        assert_eq!(ness.absolute_root().text(), "happy");
        assert_eq!(ness.derivator_path(&happy), "[ADJ>NOUN]");
        assert_eq!(ness.derivator_path(&ness), "");
    }

    #[test]
    fn plain_derivation_is_an_inflected_form() {
        let f = fixture();
        let d = dict();
        let sun = lookup(&d, "sun");
        let suns = Stem::derive(f.rules.entry(f.plain), sun);
        assert_eq!(suns.text(), "suns");
        assert!(suns.inflexed());
        assert!(!suns.derived());
        assert_eq!(suns.pos(), None);
        assert_eq!(suns.flags().as_str(), "Q");
        assert_eq!(suns.relative_root().text(), "sun");
    }

    #[test]
    fn opposite_direction_flags_pass_through_derivation() {
        let f = fixture();
        let d = dict();
        let happy = lookup(&d, "happy");
        let ness = Stem::derive(f.rules.entry(f.ness), happy);
        // The prefix flag U lives on "happy"; the deriver is a suffix.
        assert!(ness.has_flag(f.rules.entry(f.un)));
        // Own flag S.
        assert!(ness.has_flag(f.rules.entry(f.plural)));
        // A suffix derivator never passes through a suffix derivation.
        assert!(!ness.has_flag(f.rules.entry(f.ness)));
        assert_eq!(ness.accumulated_flags().as_str(), "S");
    }

    #[test]
    fn class_preserving_derivation_inherits_inflexions() {
        let f = fixture();
        let mut d = Dictionary::new();
        d.add("kind", "US");
        let kind = lookup(&d, "kind");
        let unkind = Stem::derive(f.rules.entry(f.un), kind);
        assert_eq!(unkind.text(), "unkind");
        assert_eq!(unkind.case_ending(), "");
        assert!(unkind.has_flag(f.rules.entry(f.plural)));
        assert!(unkind.accumulated_flags().contains('S'));
    }

    #[test]
    fn compounds_merge_outer_flags() {
        let f = fixture();
        let d = dict();
        let sun = lookup(&d, "sun");
        let flower = lookup(&d, "flower");
        let c = Stem::compound(&f.rules, sun.clone(), flower.clone(), false);
        assert_eq!(c.text(), "sunflower");
        assert_eq!(c.components(), 2);
        assert!(c.is_compound());
        // Compound flag C is stripped from the right part by the prefix
        // pattern but kept from the left part.
        assert_eq!(c.flags().as_str(), "CS");
        assert_eq!(
            c.parts().iter().map(Stem::text).collect::<Vec<_>>(),
            vec!["sun", "flower"]
        );
        let again = Stem::compound(&f.rules, sun, flower, false);
        assert!(c.same(&again));

        let dashed = Stem::compound(&f.rules, lookup(&d, "sun"), c.clone(), true);
        assert_eq!(dashed.text(), "sun-sunflower");
        assert_eq!(dashed.components(), 3);

        let adjusted = c.adjusted(&FlagSet::new("Z"), &FlagSet::new("S"));
        assert_eq!(adjusted.flags().as_str(), "CZ");
    }

    #[test]
    fn compound_over_inflected_right_part() {
        let f = fixture();
        let d = dict();
        let flowers = Stem::derive(f.rules.entry(f.plain), lookup(&d, "flower"));
        let c = Stem::compound(&f.rules, lookup(&d, "sun"), flowers, false);
        assert_eq!(c.text(), "sunflowers");
        assert!(c.inflexed());
        assert_eq!(c.relative_root().text(), "sunflower");
        assert_eq!(c.absolute_root().text(), "sunflower");
    }
}
