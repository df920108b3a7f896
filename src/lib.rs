//! jrp - Japanese Random Phrase generator
//!
//! Composes random Japanese phrases (an adjective followed by a noun) from the
//! WordNet Japanese lexicon and keeps a local, searchable history of them.
//!
//! # Features
//!
//! - Random phrases with optional prefix/suffix constraints
//! - History with favorites that survive non-forced deletion
//! - AND/OR keyword search over history and favorites
//! - Interactive mode deciding per phrase with a single key press

/// Time source for history timestamps
pub mod clock;
/// Configuration management
pub mod config;
/// History database operations
pub mod db;
/// Read-only WordNet dictionary access
pub mod dictionary;
/// WordNet database bootstrap
pub mod download;
/// Error types
pub mod error;
/// Phrase composition
pub mod generator;
/// Interactive generation loop
pub mod interactive;
/// Logging setup and utilities
pub mod logging;
/// Data models and structures
pub mod models;
/// Database file locations
pub mod paths;
/// Table output
pub mod render;
/// Database schema definitions
pub mod schema;
/// Generator and history orchestration
pub mod service;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::HistoryStore;
pub use dictionary::{Dictionary, WordSource};
pub use error::{ErrorKind, JrpError, Result};
pub use generator::Generator;
pub use models::{GenerationRequest, NewPhrase, Phrase, SearchMode};
pub use service::HistoryService;
