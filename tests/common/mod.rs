#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tempfile::TempDir;

use jrp::db::HistoryStore;
use jrp::dictionary::Dictionary;
use jrp::generator::Generator;
use jrp::service::HistoryService;

/// Adjectives in the fixture dictionary
pub const ADJECTIVES: [&str; 2] = ["赤い", "青い"];
/// Nouns in the fixture dictionary
pub const NOUNS: [&str; 2] = ["車", "船"];

/// Write a small WordNet-shaped `wnjpn.db` into `dir`
pub fn write_dictionary(dir: &Path) -> PathBuf {
    let path = dir.join("wnjpn.db");
    let conn = Connection::open(&path).expect("Failed to create dictionary");
    conn.execute_batch(
        "CREATE TABLE word (
            wordid INTEGER PRIMARY KEY,
            lang TEXT,
            lemma TEXT,
            pron TEXT,
            pos TEXT
        );",
    )
    .expect("Failed to create word table");

    let rows: [(i64, &str, &str, &str); 7] = [
        (1, "jpn", ADJECTIVES[0], "a"),
        (2, "jpn", ADJECTIVES[1], "a"),
        (3, "jpn", NOUNS[0], "n"),
        (4, "jpn", NOUNS[1], "n"),
        // Rows that must never be picked
        (5, "eng", "red", "a"),
        (6, "eng", "car", "n"),
        (7, "jpn", "走る", "v"),
    ];
    for (id, lang, lemma, pos) in rows {
        conn.execute(
            "INSERT INTO word (wordid, lang, lemma, pron, pos) VALUES (?, ?, ?, NULL, ?)",
            params![id, lang, lemma, pos],
        )
        .expect("Failed to insert word");
    }
    path
}

/// Temporary directory holding a fixture dictionary and an empty history
pub struct Fixture {
    pub dir: TempDir,
    pub dictionary_path: PathBuf,
    pub history_path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dictionary_path = write_dictionary(dir.path());
        let history_path = dir.path().join("jrp.sqlite");
        Self {
            dir,
            dictionary_path,
            history_path,
        }
    }

    pub fn store(&self) -> HistoryStore {
        HistoryStore::new(&self.history_path).expect("Failed to open history")
    }

    pub fn service(&self) -> HistoryService<Dictionary> {
        let dictionary = Dictionary::open(&self.dictionary_path).expect("Failed to open dictionary");
        HistoryService::new(Generator::new(dictionary), self.store())
    }
}
