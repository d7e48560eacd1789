// Dictionary arena, entry handles and the lexicon lookup interface

use std::fmt;
use std::hash::{Hash, Hasher};

use hashbrown::HashMap;

use crate::RuleError;
use crate::affix::MorphTag;
use crate::case::Capitalization;
use crate::character::lower_str;
use crate::flags::{FlagPool, FlagSet};

/// Handle of an entry within one [`Dictionary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub usize);

/// A dictionary record.
#[derive(Debug, Clone)]
pub struct DictEntry {
    text: Box<str>,
    word: Box<[char]>,
    capitalization: Capitalization,
    flags: FlagSet,
    /// Dictionary word this one is an inflected or derived form of.
    root: Option<EntryId>,
    /// Further entries with the same exact spelling.
    homonyms: Vec<EntryId>,
    tag: MorphTag,
}

impl DictEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word(&self) -> &[char] {
        &self.word
    }

    pub fn capitalization(&self) -> Capitalization {
        self.capitalization
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn tag(&self) -> &MorphTag {
        &self.tag
    }
}

// ---------------------------------------------------------------------------
// Dictionary
// ---------------------------------------------------------------------------

/// A word list with homonym and root links between its entries.
///
/// Entries are keyed by their lowercase form. Entries with the same exact
/// spelling are homonyms: the first one is found by lookup and lists the
/// others. Entries whose spellings differ only in case are kept apart as
/// casing variants of the same key.
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: Vec<DictEntry>,
    /// Lowercase word to the first entry of each distinct spelling.
    by_lower: HashMap<Box<str>, Vec<EntryId>>,
    reverse_roots: HashMap<EntryId, Vec<EntryId>>,
    flags: FlagPool,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a plain word with a string of flag characters.
    pub fn add(&mut self, word: &str, flags: &str) -> EntryId {
        let flags = self.flags.intern(flags);
        self.insert(word, flags, MorphTag::default())
    }

    /// Add a word with a morphological tag.
    pub fn add_tagged(&mut self, word: &str, flags: &str, tag: MorphTag) -> EntryId {
        let flags = self.flags.intern(flags);
        self.insert(word, flags, tag)
    }

    fn insert(&mut self, word: &str, flags: FlagSet, tag: MorphTag) -> EntryId {
        let id = EntryId(self.entries.len());
        let chars: Vec<char> = word.chars().collect();
        self.entries.push(DictEntry {
            text: word.into(),
            capitalization: Capitalization::of(&chars),
            word: chars.into_boxed_slice(),
            flags,
            root: None,
            homonyms: Vec::new(),
            tag,
        });

        let heads = self.by_lower.entry(lower_str(word).into_boxed_str()).or_default();
        let same = heads
            .iter()
            .copied()
            .find(|head| &*self.entries[head.0].text == word);
        match same {
            Some(head) => self.entries[head.0].homonyms.push(id),
            None => heads.push(id),
        }
        id
    }

    /// Link `entry` to the dictionary word it is a form of.
    ///
    /// Rejects a link to itself and any link that would close a cycle.
    pub fn set_root(&mut self, entry: EntryId, root: EntryId) -> Result<(), RuleError> {
        for id in [entry, root] {
            if id.0 >= self.entries.len() {
                return Err(RuleError::UnknownEntry(id.0));
            }
        }
        if entry == root {
            return Err(RuleError::SelfRoot(self.entries[entry.0].text.to_string()));
        }
        let mut cursor = Some(root);
        while let Some(id) = cursor {
            if id == entry {
                return Err(RuleError::RootCycle(self.entries[entry.0].text.to_string()));
            }
            cursor = self.entries[id.0].root;
        }

        if let Some(old) = self.entries[entry.0].root.replace(root) {
            if let Some(list) = self.reverse_roots.get_mut(&old) {
                list.retain(|&id| id != entry);
            }
        }
        self.reverse_roots.entry(root).or_default().push(entry);
        Ok(())
    }

    pub fn entry(&self, id: EntryId) -> EntryRef<'_> {
        EntryRef { dict: self, id }
    }

    pub fn entries(&self) -> impl Iterator<Item = EntryRef<'_>> {
        (0..self.entries.len()).map(|i| self.entry(EntryId(i)))
    }

    /// Best entry for a literal word: among the entries whose capitalization
    /// admits `word`, the one with the most specific class.
    pub fn get(&self, word: &str) -> Option<EntryRef<'_>> {
        let input: Vec<char> = word.chars().collect();
        let heads = self.by_lower.get(lower_str(word).as_str())?;
        heads
            .iter()
            .map(|&id| self.entry(id))
            .filter(|e| e.capitalization().admits(e.word(), &input))
            .max_by_key(|e| e.capitalization() as u8)
    }

    fn raw(&self, lower: &str) -> Option<RawEntry<'_>> {
        let heads = self.by_lower.get(lower)?;
        match heads.as_slice() {
            [] => None,
            [single] => Some(RawEntry::Single(self.entry(*single))),
            ids => Some(RawEntry::ByCasing { dict: self, ids }),
        }
    }

    fn reverse(&self, id: EntryId) -> &[EntryId] {
        self.reverse_roots.get(&id).map_or(&[], Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// EntryRef
// ---------------------------------------------------------------------------

/// Borrowed handle of a dictionary entry.
#[derive(Clone, Copy)]
pub struct EntryRef<'a> {
    dict: &'a Dictionary,
    id: EntryId,
}

impl<'a> EntryRef<'a> {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dict
    }

    fn data(&self) -> &'a DictEntry {
        &self.dict.entries[self.id.0]
    }

    pub fn text(&self) -> &'a str {
        &self.data().text
    }

    pub fn word(&self) -> &'a [char] {
        &self.data().word
    }

    pub fn capitalization(&self) -> Capitalization {
        self.data().capitalization
    }

    pub fn flags(&self) -> &'a FlagSet {
        &self.data().flags
    }

    pub fn tag(&self) -> &'a MorphTag {
        &self.data().tag
    }

    pub fn pos(&self) -> Option<&'a str> {
        self.data().tag.pos.as_deref()
    }

    pub fn case_ending(&self) -> &'a str {
        &self.data().tag.case_ending
    }

    pub fn root(&self) -> Option<EntryRef<'a>> {
        self.data().root.map(|id| self.dict.entry(id))
    }

    /// Whether the entry is listed as a form of another word.
    pub fn inflexed(&self) -> bool {
        self.data().root.is_some()
    }

    pub fn derived(&self) -> bool {
        self.inflexed() && self.data().tag.derivator
    }

    /// Root of the root chain.
    pub fn absolute_root(&self) -> EntryRef<'a> {
        let mut cursor = *self;
        while let Some(root) = cursor.root() {
            cursor = root;
        }
        cursor
    }

    pub fn homonyms(&self) -> impl Iterator<Item = EntryRef<'a>> + 'a {
        let dict = self.dict;
        self.data().homonyms.iter().map(move |&id| dict.entry(id))
    }

    /// Morph string describing how the entry inflects its root.
    pub fn inflexion_string(&self) -> &'a str {
        let tag = &self.data().tag;
        if self.inflexed() && !tag.derivator { &tag.morph } else { "" }
    }

    /// Morph string describing how the entry derives from its root.
    pub fn derivator_string(&self) -> &'a str {
        let tag = &self.data().tag;
        if self.inflexed() && tag.derivator { &tag.morph } else { "" }
    }
}

impl PartialEq for EntryRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dict, other.dict) && self.id == other.id
    }
}

impl Eq for EntryRef<'_> {}

impl Hash for EntryRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.dict, state);
        self.id.hash(state);
    }
}

impl fmt::Debug for EntryRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryRef({:?}, {}/{})", self.text(), self.flags(), self.id.0)
    }
}

impl fmt::Display for EntryRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())?;
        if !self.flags().is_empty() {
            write!(f, "/{}", self.flags())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

/// Result of a lowercase lookup.
#[derive(Debug, Clone, Copy)]
pub enum RawEntry<'a> {
    /// One spelling; its homonyms hang off the entry.
    Single(EntryRef<'a>),
    /// Several spellings differing in case, e.g. "polish" and "Polish".
    ByCasing {
        dict: &'a Dictionary,
        ids: &'a [EntryId],
    },
}

impl<'a> RawEntry<'a> {
    /// The first entry of each spelling.
    pub fn heads(&self) -> impl Iterator<Item = EntryRef<'a>> + 'a {
        let (single, many) = match *self {
            RawEntry::Single(entry) => (Some(entry), None),
            RawEntry::ByCasing { dict, ids } => {
                (None, Some(ids.iter().map(move |&id| dict.entry(id))))
            }
        };
        single.into_iter().chain(many.into_iter().flatten())
    }
}

/// Word lookup used by the analyser.
pub trait Lexicon: Send + Sync {
    /// Look up a lowercase word.
    fn raw_get(&self, lower: &str) -> Option<RawEntry<'_>>;

    /// Entries listing `entry` as their root.
    fn reverse_roots<'a>(&'a self, entry: EntryRef<'a>) -> Vec<EntryRef<'a>>;
}

impl Lexicon for Dictionary {
    fn raw_get(&self, lower: &str) -> Option<RawEntry<'_>> {
        self.raw(lower)
    }

    fn reverse_roots<'a>(&'a self, entry: EntryRef<'a>) -> Vec<EntryRef<'a>> {
        if !std::ptr::eq(entry.dict, self) {
            return Vec::new();
        }
        self.reverse(entry.id)
            .iter()
            .map(|&id| self.entry(id))
            .collect()
    }
}

/// Several dictionaries searched in order; the first one that knows a word
/// answers for it.
#[derive(Debug, Default)]
pub struct Dictionaries {
    dicts: Vec<Dictionary>,
}

impl Dictionaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dict: Dictionary) {
        self.dicts.push(dict);
    }

    pub fn len(&self) -> usize {
        self.dicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dicts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dictionary> {
        self.dicts.iter()
    }

    pub fn get(&self, word: &str) -> Option<EntryRef<'_>> {
        self.dicts.iter().find_map(|d| d.get(word))
    }
}

impl From<Vec<Dictionary>> for Dictionaries {
    fn from(dicts: Vec<Dictionary>) -> Self {
        Self { dicts }
    }
}

impl Lexicon for Dictionaries {
    fn raw_get(&self, lower: &str) -> Option<RawEntry<'_>> {
        self.dicts.iter().find_map(|d| d.raw(lower))
    }

    fn reverse_roots<'a>(&'a self, entry: EntryRef<'a>) -> Vec<EntryRef<'a>> {
        self.dicts
            .iter()
            .map(|d| d.reverse_roots(entry))
            .find(|roots| !roots.is_empty())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(it: impl Iterator<Item = EntryRef<'a>>) -> Vec<&'a str> {
        it.map(|e| e.text()).collect()
    }

    #[test]
    fn single_lookup() {
        let mut d = Dictionary::new();
        let cat = d.add("cat", "PS");
        match d.raw_get("cat") {
            Some(RawEntry::Single(e)) => {
                assert_eq!(e.id(), cat);
                assert!(e.flags().contains('P'));
                assert_eq!(e.capitalization(), Capitalization::AllLower);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(d.raw_get("dog").is_none());
    }

    #[test]
    fn homonyms_exclude_self() {
        let mut d = Dictionary::new();
        let first = d.add("saw", "N");
        let second = d.add("saw", "V");
        let e = d.entry(first);
        assert_eq!(e.homonyms().map(|h| h.id()).collect::<Vec<_>>(), vec![second]);
        assert_eq!(d.entry(second).homonyms().count(), 0);
    }

    #[test]
    fn casing_variants() {
        let mut d = Dictionary::new();
        d.add("polish", "V");
        d.add("Polish", "A");
        let raw = d.raw_get("polish").unwrap();
        assert!(matches!(raw, RawEntry::ByCasing { .. }));
        assert_eq!(texts(raw.heads()), vec!["polish", "Polish"]);
        assert_eq!(d.get("Polish").unwrap().text(), "Polish");
        assert_eq!(d.get("polish").unwrap().text(), "polish");
    }

    #[test]
    fn root_links_and_reverse_roots() {
        let mut d = Dictionary::new();
        let go = d.add("go", "");
        let went = d.add("went", "");
        let gone = d.add("gone", "");
        d.set_root(went, go).unwrap();
        d.set_root(gone, go).unwrap();
        let e = d.entry(went);
        assert!(e.inflexed());
        assert_eq!(e.root().unwrap().text(), "go");
        assert_eq!(e.absolute_root().text(), "go");
        assert_eq!(texts(d.reverse_roots(d.entry(go)).into_iter()), vec!["went", "gone"]);
    }

    #[test]
    fn root_links_reject_self_and_cycles() {
        let mut d = Dictionary::new();
        let a = d.add("a", "");
        let b = d.add("b", "");
        let c = d.add("c", "");
        assert!(matches!(d.set_root(a, a), Err(RuleError::SelfRoot(_))));
        d.set_root(b, a).unwrap();
        d.set_root(c, b).unwrap();
        assert!(matches!(d.set_root(a, c), Err(RuleError::RootCycle(_))));
        assert!(matches!(
            d.set_root(a, EntryId(9)),
            Err(RuleError::UnknownEntry(9))
        ));
    }

    #[test]
    fn first_dictionary_wins() {
        let mut main = Dictionary::new();
        main.add("cat", "P");
        let mut extra = Dictionary::new();
        extra.add("cat", "Q");
        extra.add("dog", "");
        let dicts = Dictionaries::from(vec![main, extra]);
        let Some(RawEntry::Single(cat)) = dicts.raw_get("cat") else {
            panic!("cat missing");
        };
        assert!(cat.flags().contains('P'));
        assert!(dicts.raw_get("dog").is_some());
        assert_eq!(dicts.get("Dog").unwrap().text(), "dog");
    }

    #[test]
    fn tagged_morph_strings() {
        let mut d = Dictionary::new();
        let go = d.add("go", "");
        let went = d.add_tagged(
            "went",
            "",
            MorphTag {
                morph: "+PAST".into(),
                ..Default::default()
            },
        );
        d.set_root(went, go).unwrap();
        let e = d.entry(went);
        assert_eq!(e.inflexion_string(), "+PAST");
        assert_eq!(e.derivator_string(), "");
        assert!(!e.derived());
    }
}
