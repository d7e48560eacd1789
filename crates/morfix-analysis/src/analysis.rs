// Owned analysis results

use std::fmt;

use morfix_core::{AffixEntry, FlagSet};

use crate::stem::Stem;

/// An affix entry applied to the stem of an analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedAffix {
    pub flag: char,
    pub strip: String,
    pub append: String,
    pub morph: String,
}

impl AppliedAffix {
    fn of(entry: &AffixEntry) -> Self {
        Self {
            flag: entry.flag(),
            strip: entry.strip_chars().iter().collect(),
            append: entry.append_chars().iter().collect(),
            morph: entry.morph().to_string(),
        }
    }
}

/// One explanation of an input word.
///
/// Results own their strings so they outlive the lexicon borrow and the
/// analysis context that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analysis {
    /// The analysed input.
    pub word: String,
    /// Stem regenerated with the applied affixes, in dictionary spelling.
    pub inflected_word: String,
    /// The resolved stem.
    pub stem: String,
    pub relative_root: String,
    pub dictionary_root: String,
    pub absolute_root: String,
    pub prefix: Option<AppliedAffix>,
    pub suffix: Option<AppliedAffix>,
    pub inflexed: bool,
    pub derived: bool,
    pub compound: bool,
    /// Leaf components of a compound, or the stem alone.
    pub components: Vec<String>,
    pub pos: Option<String>,
    pub case_ending: String,
    pub relative_morph: String,
    pub dictionary_morph: String,
    pub absolute_morph: String,
    /// Flags available on the stem, inherited ones included.
    pub flags: String,
}

impl Analysis {
    pub(crate) fn new(
        word: &str,
        stem: &Stem<'_>,
        prefix: Option<&AffixEntry>,
        suffix: Option<&AffixEntry>,
    ) -> Self {
        let mut inflected = stem.word().to_vec();
        if let Some(s) = suffix {
            inflected = s.inflex(&inflected);
        }
        if let Some(p) = prefix {
            inflected = p.inflex(&inflected);
        }

        let relative = stem.relative_root();
        let dictionary = stem.dictionary_root();
        let absolute = stem.absolute_root();
        let ending = match suffix {
            Some(s) if !s.case_ending().is_empty() => s.case_ending(),
            _ => stem.case_ending(),
        };
        let accumulated: FlagSet = stem.accumulated_flags();

        Self {
            word: word.to_string(),
            inflected_word: inflected.into_iter().collect(),
            stem: stem.text(),
            relative_root: relative.text(),
            dictionary_root: dictionary.text(),
            absolute_root: absolute.text(),
            prefix: prefix.map(AppliedAffix::of),
            suffix: suffix.map(AppliedAffix::of),
            inflexed: prefix.is_some() || suffix.is_some() || stem.inflexed(),
            derived: stem.derived(),
            compound: stem.components() > 1,
            components: stem.parts().iter().map(Stem::text).collect(),
            pos: stem.pos().map(str::to_string),
            case_ending: ending.to_string(),
            relative_morph: morph(stem, &relative, suffix),
            dictionary_morph: morph(stem, &dictionary, suffix),
            absolute_morph: morph(stem, &absolute, suffix),
            flags: accumulated.as_str().to_string(),
        }
    }

    /// Whether the input is a dictionary word as is.
    pub fn is_plain(&self) -> bool {
        !self.inflexed && !self.compound && self.prefix.is_none() && self.suffix.is_none()
    }

    pub fn root(&self, granularity: RootLevel) -> &str {
        match granularity {
            RootLevel::Relative => &self.relative_root,
            RootLevel::Dictionary => &self.dictionary_root,
            RootLevel::Absolute => &self.absolute_root,
        }
    }

    pub fn morph(&self, granularity: RootLevel) -> &str {
        match granularity {
            RootLevel::Relative => &self.relative_morph,
            RootLevel::Dictionary => &self.dictionary_morph,
            RootLevel::Absolute => &self.absolute_morph,
        }
    }
}

/// How far down the root chain a root or morph string reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootLevel {
    /// Nearest root that is not an inflected form.
    Relative,
    /// Nearest root listed in the dictionary.
    Dictionary,
    /// End of the root chain.
    Absolute,
}

/// Part of speech, derivations from `root` up to the stem, and the
/// inflexion, space separated.
fn morph(stem: &Stem<'_>, root: &Stem<'_>, suffix: Option<&AffixEntry>) -> String {
    let path = stem.derivator_path(root);
    let inflexion = match suffix {
        Some(s) if !s.morph().is_empty() => s.morph(),
        _ => stem.inflexion_string(),
    };
    [stem.pos().unwrap_or(""), path.as_str(), inflexion]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= {}", self.word, self.dictionary_root)?;
        if let Some(p) = &self.prefix {
            write!(f, " PFX[{}: -{} +{}]", p.flag, p.strip, p.append)?;
        }
        if let Some(s) = &self.suffix {
            write!(f, " SFX[{}: -{} +{}]", s.flag, s.strip, s.append)?;
        }
        if self.compound {
            write!(f, " ({})", self.components.join(" + "))?;
        }
        if !self.dictionary_morph.is_empty() {
            write!(f, " {{{}}}", self.dictionary_morph)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morfix_core::{Dictionary, Direction, EntrySpec, MorphTag, Rules};

    #[test]
    fn inflected_analysis() {
        let mut b = Rules::builder();
        b.add_affix('S', Direction::Suffix, false).unwrap();
        let tag = MorphTag {
            case_ending: "PL".into(),
            morph: "+PL".into(),
            ..Default::default()
        };
        let id = b
            .add_entry('S', EntrySpec::new("", "s", vec![]).with_tag(tag))
            .unwrap();
        let rules = b.build();
        let mut d = Dictionary::new();
        d.add_tagged(
            "cat",
            "S",
            MorphTag {
                pos: Some("NOUN".into()),
                ..Default::default()
            },
        );
        let cat = Stem::Dict(d.get("cat").unwrap());

        let a = Analysis::new("Cats", &cat, None, Some(rules.entry(id)));
        assert_eq!(a.inflected_word, "cats");
        assert_eq!(a.stem, "cat");
        assert_eq!(a.root(RootLevel::Dictionary), "cat");
        assert!(a.inflexed);
        assert!(!a.compound);
        assert!(!a.is_plain());
        assert_eq!(a.components, vec!["cat"]);
        assert_eq!(a.pos.as_deref(), Some("NOUN"));
        assert_eq!(a.case_ending, "PL");
        assert_eq!(a.morph(RootLevel::Relative), "NOUN +PL");
        assert_eq!(a.flags, "S");
        assert_eq!(a.to_string(), "Cats <= cat SFX[S: - +s] {NOUN +PL}");
    }

    #[test]
    fn plain_analysis() {
        let mut d = Dictionary::new();
        d.add("dog", "");
        let dog = Stem::Dict(d.get("dog").unwrap());
        let a = Analysis::new("dog", &dog, None, None);
        assert!(a.is_plain());
        assert_eq!(a.inflected_word, "dog");
        assert_eq!(a.absolute_morph, "");
        assert_eq!(a.to_string(), "dog <= dog");
    }
}
