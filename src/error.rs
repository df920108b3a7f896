//! Error types for the jrp library.
//!
//! This module provides custom error types using `thiserror`. Every variant
//! maps onto an [`ErrorKind`] tag so the CLI can decide how to talk about a
//! failure without matching on the full error.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{NewPhrase, PartOfSpeech};

/// Coarse classification of a [`JrpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The current user (and therefore the home directory) could not be determined
    UserLookupFailed,
    /// The WordNet dictionary file is absent or unreadable
    DictionaryMissing,
    /// The WordNet dictionary has no candidate words for a query
    DictionaryEmpty,
    /// Any underlying storage, filesystem or terminal failure
    IoFailure,
    /// A generation request violated its invariants
    InvalidRequest,
    /// The generator could not find candidates for one half of the phrase
    NoMatch,
    /// Phrases were generated but could not be written to history
    PersistFailed,
    /// A search was requested without any keyword
    NoKeywords,
    /// Configuration could not be loaded or failed validation
    Config,
}

/// Errors that can occur in the jrp application.
#[derive(Error, Debug)]
pub enum JrpError {
    /// The OS would not tell us who the current user is
    #[error("failed to look up the current user's home directory")]
    UserLookupFailed,

    /// WordNet database not found at the expected location
    #[error("WordNet dictionary not found at {0} (run `jrp download` first)")]
    DictionaryMissing(PathBuf),

    /// No word matched the part of speech and lemma constraint
    #[error("no {pos} found in the dictionary{}", constraint_suffix(.constraint))]
    DictionaryEmpty {
        /// Part of speech that was queried
        pos: PartOfSpeech,
        /// Lemma constraint that was applied, if any
        constraint: Option<String>,
    },

    /// SQLite errors
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal could not be switched into or out of raw mode
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid generation request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// One half of the phrase had no candidates
    #[error("no words matched{}", constraint_suffix(.constraint))]
    NoMatch {
        /// Lemma constraint that produced no candidates
        constraint: Option<String>,
    },

    /// Generated phrases could not be saved; they are still handed back
    #[error("failed to save {} generated phrase(s): {source}", .generated.len())]
    PersistFailed {
        /// Phrases that were generated before the write failed
        generated: Vec<NewPhrase>,
        /// The storage failure
        #[source]
        source: Box<JrpError>,
    },

    /// Search without keywords
    #[error("at least one keyword is required")]
    NoKeywords,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl JrpError {
    /// Return the kind tag for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UserLookupFailed => ErrorKind::UserLookupFailed,
            Self::DictionaryMissing(_) => ErrorKind::DictionaryMissing,
            Self::DictionaryEmpty { .. } => ErrorKind::DictionaryEmpty,
            Self::Storage(_) | Self::Io(_) | Self::Terminal(_) => ErrorKind::IoFailure,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::NoMatch { .. } => ErrorKind::NoMatch,
            Self::PersistFailed { .. } => ErrorKind::PersistFailed,
            Self::NoKeywords => ErrorKind::NoKeywords,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

fn constraint_suffix(constraint: &Option<String>) -> String {
    constraint
        .as_deref()
        .map(|c| format!(" matching \"{c}\""))
        .unwrap_or_default()
}

/// Convenience type alias for Result with JrpError
pub type Result<T> = std::result::Result<T, JrpError>;
