//! Data models for phrase generation and history storage
//!
//! This module contains the data structures shared between the dictionary,
//! the generator, the history database and the renderer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Part of speech as encoded by the WordNet Japanese `word.pos` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    /// `a`
    Adjective,
    /// `n`
    Noun,
    /// `v`
    Verb,
    /// `r`
    Adverb,
}

impl PartOfSpeech {
    /// Single-letter code used by the upstream WordNet schema
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Adjective => "a",
            Self::Noun => "n",
            Self::Verb => "v",
            Self::Adverb => "r",
        }
    }

    /// Parse a WordNet part-of-speech code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Self::Adjective),
            "n" => Some(Self::Noun),
            "v" => Some(Self::Verb),
            "r" => Some(Self::Adverb),
            _ => None,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Adjective => "adjective",
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adverb => "adverb",
        };
        f.write_str(name)
    }
}

/// A word record read from the WordNet dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// WordNet `wordid`
    pub word_id: i64,
    /// Dictionary form of the word
    pub lemma: String,
    /// Part of speech
    pub part_of_speech: PartOfSpeech,
}

/// How a lemma has to relate to a user-supplied string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LemmaFilter {
    /// Lemma must begin with the string
    StartsWith(String),
    /// Lemma must end with the string
    EndsWith(String),
}

impl LemmaFilter {
    /// The user-supplied string
    #[must_use]
    pub fn needle(&self) -> &str {
        match self {
            Self::StartsWith(s) | Self::EndsWith(s) => s,
        }
    }

    /// Check a lemma against the filter
    #[must_use]
    pub fn matches(&self, lemma: &str) -> bool {
        match self {
            Self::StartsWith(s) => lemma.starts_with(s.as_str()),
            Self::EndsWith(s) => lemma.ends_with(s.as_str()),
        }
    }
}

/// A generated phrase that has not been written to history yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhrase {
    /// Concatenated lemmas
    pub phrase: String,
    /// Prefix the phrase was generated with
    pub prefix: Option<String>,
    /// Suffix the phrase was generated with
    pub suffix: Option<String>,
}

impl NewPhrase {
    /// Build a new phrase record
    #[must_use]
    pub fn new(phrase: &str, prefix: Option<&str>, suffix: Option<&str>) -> Self {
        Self {
            phrase: phrase.to_string(),
            prefix: prefix.map(ToString::to_string),
            suffix: suffix.map(ToString::to_string),
        }
    }

    /// View this phrase as a history row that was never persisted.
    ///
    /// The id is zero and both timestamps are the Unix epoch.
    #[must_use]
    pub fn into_unsaved(self) -> Phrase {
        Phrase {
            id: 0,
            phrase: self.phrase,
            prefix: self.prefix,
            suffix: self.suffix,
            is_favorited: false,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Database representation of a phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    /// Database primary key
    pub id: i64,
    /// Concatenated lemmas
    pub phrase: String,
    /// Prefix the phrase was generated with
    pub prefix: Option<String>,
    /// Suffix the phrase was generated with
    pub suffix: Option<String>,
    /// True if the phrase is protected from non-forced deletion
    pub is_favorited: bool,
    /// Insertion timestamp
    pub created_at: DateTime<Utc>,
    /// Last favorite-state transition (or insertion)
    pub updated_at: DateTime<Utc>,
}

impl Phrase {
    /// True if this row came out of the history database
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

/// Input to the generator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Number of phrases to generate
    pub count: usize,
    /// Adjective prefix constraint
    pub prefix: Option<String>,
    /// Noun suffix constraint
    pub suffix: Option<String>,
}

impl GenerationRequest {
    /// Request `count` unconstrained phrases
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Constrain the adjective to start with `prefix`
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Constrain the noun to end with `suffix`
    #[must_use]
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }
}

/// Keyword combination for searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Every keyword must appear
    And,
    /// Any keyword may appear
    #[default]
    Or,
}

/// Result of promoting rows to favorites
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteOutcome {
    /// Ids that were promoted
    pub added: Vec<i64>,
    /// Ids that were already favorites or do not exist
    pub not_added: Vec<i64>,
}

/// Result of demoting favorites
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnfavoriteOutcome {
    /// Ids that were demoted
    pub removed: Vec<i64>,
    /// Ids that were not favorites or do not exist
    pub not_removed: Vec<i64>,
}

/// Result of deleting rows by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Ids that were deleted
    pub removed: Vec<i64>,
    /// Ids that were kept because they are favorites
    pub skipped_favorite: Vec<i64>,
    /// Ids that did not exist
    pub not_found: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_of_speech_codes_round_trip() {
        for pos in [
            PartOfSpeech::Adjective,
            PartOfSpeech::Noun,
            PartOfSpeech::Verb,
            PartOfSpeech::Adverb,
        ] {
            assert_eq!(PartOfSpeech::from_code(pos.code()), Some(pos));
        }
        assert_eq!(PartOfSpeech::from_code("x"), None);
    }

    #[test]
    fn lemma_filter_is_anchored() {
        let prefix = LemmaFilter::StartsWith("赤".to_string());
        assert!(prefix.matches("赤い"));
        assert!(!prefix.matches("真っ赤"));

        let suffix = LemmaFilter::EndsWith("車".to_string());
        assert!(suffix.matches("自動車"));
        assert!(!suffix.matches("車庫"));
    }

    #[test]
    fn unsaved_phrase_has_zero_id() {
        let row = NewPhrase::new("赤い車", Some("赤"), None).into_unsaved();
        assert_eq!(row.id, 0);
        assert!(!row.is_persisted());
        assert_eq!(row.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(row.prefix.as_deref(), Some("赤"));
    }
}
