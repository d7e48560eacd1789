// Lemmatization: the base words behind the analyses of a word

use hashbrown::HashSet;

use crate::analyser::Analyser;
use crate::context::AnalysisContext;
use crate::stem::Stem;

/// A base word and its part of speech.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lemma {
    pub word: String,
    pub pos: Option<String>,
}

impl Lemma {
    fn of(stem: &Stem<'_>) -> Self {
        Self {
            word: stem.text(),
            pos: stem.pos().map(str::to_string),
        }
    }
}

/// The stem that stands for the lemma of an analysis.
///
/// A stem without a root is its own lemma, and so is one whose root is
/// itself an inflected form. A derived word is kept unless derivations are
/// stripped; anything else resolves to its root.
fn lemma_stem<'a>(stem: &Stem<'a>, strip_derivatives: bool) -> Stem<'a> {
    match stem.root() {
        None => stem.clone(),
        Some(root) if root.inflexed() => stem.clone(),
        Some(_) if stem.derived() && !strip_derivatives => stem.clone(),
        Some(root) => root,
    }
}

impl<'a> Analyser<'a> {
    /// Lemmas of `word`, one per distinct word and part of speech, in the
    /// order the analyses produced them.
    ///
    /// With `strip_derivatives` a derived word is replaced by the word it
    /// was derived from.
    pub fn lemmatize(
        &self,
        word: &str,
        strip_derivatives: bool,
        ctx: &mut AnalysisContext<'a>,
    ) -> Vec<Lemma> {
        let mut seen = HashSet::new();
        let mut lemmas = Vec::new();
        for found in self.search(word, ctx) {
            let lemma = Lemma::of(&lemma_stem(&found.stem, strip_derivatives));
            if seen.insert(lemma.clone()) {
                lemmas.push(lemma);
            }
        }
        tracing::debug!(word, strip_derivatives, lemmas = lemmas.len(), "word lemmatized");
        lemmas
    }
}
