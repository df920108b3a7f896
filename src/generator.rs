//! Composing phrases out of two dictionary words.
//!
//! A phrase is an adjective followed by a noun. A prefix constrains the
//! adjective, a suffix constrains the noun; the other word is free.

use tracing::debug;

use crate::dictionary::WordSource;
use crate::error::{JrpError, Result};
use crate::models::{GenerationRequest, LemmaFilter, NewPhrase, PartOfSpeech, Word};
use crate::validation::InputValidator;

/// One half of a phrase: which part of speech to draw, and how to filter it
#[derive(Debug, Clone, PartialEq, Eq)]
struct Half {
    pos: PartOfSpeech,
    filter: Option<LemmaFilter>,
}

impl Half {
    const fn free(pos: PartOfSpeech) -> Self {
        Self { pos, filter: None }
    }
}

/// Which halves to draw, in the order their lemmas are concatenated
fn plan(request: &GenerationRequest) -> [Half; 2] {
    if let Some(prefix) = &request.prefix {
        [
            Half {
                pos: PartOfSpeech::Adjective,
                filter: Some(LemmaFilter::StartsWith(prefix.clone())),
            },
            Half::free(PartOfSpeech::Noun),
        ]
    } else if let Some(suffix) = &request.suffix {
        [
            Half::free(PartOfSpeech::Adjective),
            Half {
                pos: PartOfSpeech::Noun,
                filter: Some(LemmaFilter::EndsWith(suffix.clone())),
            },
        ]
    } else {
        [Half::free(PartOfSpeech::Adjective), Half::free(PartOfSpeech::Noun)]
    }
}

/// Random phrase generator
#[derive(Debug)]
pub struct Generator<W> {
    source: W,
}

impl<W: WordSource> Generator<W> {
    /// Create a generator drawing words from `source`
    pub const fn new(source: W) -> Self {
        Self { source }
    }

    /// Generate `request.count` phrases.
    ///
    /// Matching uses the trimmed, NFC-normalized affix, but the phrases carry
    /// the prefix/suffix exactly as the caller wrote it. A blank affix is
    /// treated as absent. Returned phrases have not been persisted.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Vec<NewPhrase>> {
        let normalized = InputValidator::validate_request(request)?;
        let [first, second] = plan(&normalized);

        let first_words = self.draw(&first, normalized.count)?;
        let second_words = self.draw(&second, normalized.count)?;

        let prefix = normalized.prefix.as_ref().and(request.prefix.clone());
        let suffix = normalized.suffix.as_ref().and(request.suffix.clone());

        let phrases: Vec<NewPhrase> = first_words
            .iter()
            .zip(second_words.iter())
            .map(|(a, b)| NewPhrase {
                phrase: format!("{}{}", a.lemma, b.lemma),
                prefix: prefix.clone(),
                suffix: suffix.clone(),
            })
            .collect();

        debug!(count = phrases.len(), prefix = ?prefix, suffix = ?suffix, "Generated phrases");
        Ok(phrases)
    }

    fn draw(&self, half: &Half, count: usize) -> Result<Vec<Word>> {
        let words = match self.source.draw_words(half.pos, half.filter.as_ref(), count) {
            Err(JrpError::DictionaryEmpty { constraint, .. }) => {
                return Err(JrpError::NoMatch { constraint });
            },
            other => other?,
        };

        if words.len() < count {
            // A source that under-delivers is treated like one with no candidates
            return Err(JrpError::NoMatch {
                constraint: half.filter.as_ref().map(|f| f.needle().to_string()),
            });
        }
        Ok(words)
    }
}
