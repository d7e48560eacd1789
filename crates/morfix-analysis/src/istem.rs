// Ispell-style single-word verdicts

use std::fmt;

use crate::analysis::Analysis;

/// Ispell-style verdict on one word, built from its first analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IStem {
    /// Dictionary word as is: `*`.
    Found(Analysis),
    /// Compound: `-`.
    Compound(Analysis),
    /// Inflected or derived form: `+ word`.
    Inflexed { word: String, analysis: Analysis },
    /// No analysis: `# word offset`.
    NotFound { word: String, offset: usize },
}

impl IStem {
    pub(crate) fn of(word: &str, analysis: Analysis) -> Self {
        if analysis.compound {
            IStem::Compound(analysis)
        } else if analysis.inflexed || analysis.derived {
            IStem::Inflexed {
                word: word.to_string(),
                analysis,
            }
        } else {
            IStem::Found(analysis)
        }
    }

    /// Verdict character.
    pub fn kind(&self) -> char {
        match self {
            IStem::Found(_) => '*',
            IStem::Compound(_) => '-',
            IStem::Inflexed { .. } => '+',
            IStem::NotFound { .. } => '#',
        }
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            IStem::Found(a) | IStem::Compound(a) | IStem::Inflexed { analysis: a, .. } => Some(a),
            IStem::NotFound { .. } => None,
        }
    }

    pub fn pos(&self) -> Option<&str> {
        self.analysis().and_then(|a| a.pos.as_deref())
    }
}

impl fmt::Display for IStem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IStem::Found(_) | IStem::Compound(_) => write!(f, "{}", self.kind()),
            IStem::Inflexed { word, .. } => write!(f, "+ {word}"),
            IStem::NotFound { word, offset } => write!(f, "# {word} {offset}"),
        }
    }
}
