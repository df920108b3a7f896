//! Database schema definitions
//!
//! Constants for table and column names used with rusqlite, for both the
//! history database we own and the WordNet database we only read.

/// File name of the history database
pub const HISTORY_DB_FILE: &str = "jrp.sqlite";

/// File name of the WordNet Japanese database
pub const DICTIONARY_DB_FILE: &str = "wnjpn.db";

/// Phrase history table schema
pub mod phrase {
    /// Table name
    pub const TABLE: &str = "phrase";
    /// Primary key column
    pub const ID: &str = "id";
    /// Generated phrase column
    pub const PHRASE: &str = "phrase";
    /// Prefix constraint column
    pub const PREFIX: &str = "prefix";
    /// Suffix constraint column
    pub const SUFFIX: &str = "suffix";
    /// Favorite flag column
    pub const IS_FAVORITED: &str = "is_favorited";
    /// Insertion timestamp column
    pub const CREATED_AT: &str = "created_at";
    /// Last update timestamp column
    pub const UPDATED_AT: &str = "updated_at";

    /// DDL for the table; idempotent
    pub const CREATE: &str = "CREATE TABLE IF NOT EXISTS phrase (
  id           INTEGER PRIMARY KEY AUTOINCREMENT,
  phrase       TEXT    NOT NULL,
  prefix       TEXT,
  suffix       TEXT,
  is_favorited INTEGER NOT NULL DEFAULT 0,
  created_at   DATETIME NOT NULL,
  updated_at   DATETIME NOT NULL
);";

    /// Column list in the order `map_phrase` reads it
    pub const COLUMNS: &str = "id, phrase, prefix, suffix, is_favorited, created_at, updated_at";
}

/// SQLite's AUTOINCREMENT bookkeeping table
pub mod sqlite_sequence {
    /// Table name
    pub const TABLE: &str = "sqlite_sequence";
    /// Name of the table a counter belongs to
    pub const NAME: &str = "name";
}

/// WordNet Japanese `word` table (read-only)
pub mod word {
    /// Table name
    pub const TABLE: &str = "word";
    /// Primary key column
    pub const WORD_ID: &str = "wordid";
    /// Language column (`jpn` or `eng`)
    pub const LANG: &str = "lang";
    /// Dictionary form column
    pub const LEMMA: &str = "lemma";
    /// Part-of-speech code column
    pub const POS: &str = "pos";
    /// Language code of Japanese rows
    pub const LANG_JAPANESE: &str = "jpn";
}
