// Morphology: owning facade over rules, lexicon and compound policy.
//
// The facade owns its collaborators and builds a borrowing `Analyser` on
// each call, so callers never juggle the lifetimes of the search. Contexts
// are cheap to create; `analyse` and `istem` use a fresh one per call,
// `analyse_all` shares one across a batch so the compound caches stay warm.

use std::sync::Arc;

use morfix_core::{Lexicon, RuleError, Rules};

use crate::ControlError;
use crate::analyser::Analyser;
use crate::analysis::Analysis;
use crate::context::AnalysisContext;
use crate::control::{AnalysisControl, Depth};
use crate::controller::{CompoundController, FlagController};
use crate::istem::IStem;
use crate::lemma::Lemma;

/// Error type for [`Morphology`] construction and configuration.
#[derive(Debug, thiserror::Error)]
pub enum MorfixError {
    /// Rules or dictionaries could not be built.
    #[error("invalid rules: {0}")]
    Rules(#[from] RuleError),

    /// Analysis options were rejected.
    #[error("invalid analysis options: {0}")]
    Control(#[from] ControlError),
}

/// Owns everything an analysis needs.
///
/// `Morphology` is `Send + Sync`; share it behind an `Arc` and give each
/// thread its own [`AnalysisContext`] from [`context`](Self::context).
pub struct Morphology {
    rules: Arc<Rules>,
    lexicon: Box<dyn Lexicon>,
    controller: Box<dyn CompoundController>,
    control: AnalysisControl,
}

impl Morphology {
    /// A facade with the flag-based compound policy of `rules` and options
    /// derived from them.
    pub fn new(rules: Arc<Rules>, lexicon: impl Lexicon + 'static) -> Result<Self, MorfixError> {
        let control = AnalysisControl::for_rules(&rules)?;
        let controller = FlagController::from_rules(&rules);
        tracing::debug!(%control, "morphology ready");
        Ok(Self {
            rules,
            lexicon: Box::new(lexicon),
            controller: Box::new(controller),
            control,
        })
    }

    pub fn with_controller(mut self, controller: impl CompoundController + 'static) -> Self {
        self.controller = Box::new(controller);
        self
    }

    pub fn with_control(mut self, control: AnalysisControl) -> Self {
        self.control = control;
        self
    }

    pub fn rules(&self) -> &Arc<Rules> {
        &self.rules
    }

    pub fn lexicon(&self) -> &dyn Lexicon {
        self.lexicon.as_ref()
    }

    pub fn control(&self) -> &AnalysisControl {
        &self.control
    }

    pub fn set_control(&mut self, control: AnalysisControl) {
        self.control = control;
    }

    /// A borrowing analyser over the owned collaborators.
    pub fn analyser(&self) -> Analyser<'_> {
        Analyser::new(&self.rules, self.lexicon.as_ref(), self.controller.as_ref())
    }

    /// A fresh context carrying the facade's options.
    pub fn context(&self) -> AnalysisContext<'_> {
        AnalysisContext::new(self.control)
    }

    pub fn analyse(&self, word: &str) -> Vec<Analysis> {
        let mut ctx = self.context();
        self.analyser().analyse(word, &mut ctx)
    }

    pub fn istem(&self, word: &str, offset: usize) -> IStem {
        let mut ctx = self.context();
        self.analyser().istem(word, offset, &mut ctx)
    }

    /// Lemmas of `word`, looked up through every analysis whatever the
    /// configured depth.
    pub fn lemmatize(&self, word: &str, strip_derivatives: bool) -> Vec<Lemma> {
        let control = AnalysisControl {
            depth: Depth::AllCompounds,
            ..self.control
        };
        let mut ctx = AnalysisContext::new(control);
        self.analyser().lemmatize(word, strip_derivatives, &mut ctx)
    }

    /// Analyse a batch of words through one shared context.
    pub fn analyse_all<'w, I>(&self, words: I) -> Vec<Vec<Analysis>>
    where
        I: IntoIterator<Item = &'w str>,
    {
        let analyser = self.analyser();
        let mut ctx = self.context();
        words
            .into_iter()
            .map(|word| analyser.analyse(word, &mut ctx))
            .collect()
    }
}
