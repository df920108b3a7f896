//! Read-only access to the WordNet Japanese database.
//!
//! Every query opens its own read-only handle and drops it before returning.
//! Randomness normally comes from SQL (`ORDER BY RANDOM()`); a dictionary
//! built with [`Dictionary::with_seed`] instead pulls the whole candidate list
//! and picks from it with a seeded RNG, which makes generation repeatable.
//!
//! [`WordSource::sample_words`] avoids repeats while it can.
//! [`WordSource::draw_words`] makes every pick independently, so words repeat
//! freely; the generator uses it.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, ToSql};
use tracing::{debug, warn};

use crate::error::{JrpError, Result};
use crate::logging::OperationTimer;
use crate::models::{LemmaFilter, PartOfSpeech, Word};
use crate::schema::word;

/// Anything that can hand out random words
pub trait WordSource {
    /// Return `n` words with the given part of speech.
    ///
    /// When `filter` is set every lemma satisfies it. Words are distinct when
    /// `n` does not exceed the number of candidates and repeat otherwise.
    fn sample_words(
        &self,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        n: usize,
    ) -> Result<Vec<Word>>;

    /// Return `n` independent uniform draws, with replacement.
    ///
    /// The default asks [`WordSource::sample_words`] for one word at a time.
    fn draw_words(
        &self,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        n: usize,
    ) -> Result<Vec<Word>> {
        let mut words = Vec::with_capacity(n);
        for _ in 0..n {
            words.extend(self.sample_words(pos, filter, 1)?);
        }
        Ok(words)
    }
}

/// The WordNet Japanese SQLite file
#[derive(Debug)]
pub struct Dictionary {
    path: PathBuf,
    rng: Option<Mutex<StdRng>>,
}

impl Dictionary {
    /// Point at an existing `wnjpn.db`; randomness comes from SQLite.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(JrpError::DictionaryMissing(path));
        }
        Ok(Self { path, rng: None })
    }

    /// Point at an existing `wnjpn.db`; randomness comes from a seeded RNG.
    pub fn with_seed(path: impl AsRef<Path>, seed: u64) -> Result<Self> {
        let mut dictionary = Self::open(path)?;
        dictionary.rng = Some(Mutex::new(StdRng::seed_from_u64(seed)));
        Ok(dictionary)
    }

    /// Location of the database file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Failed to open dictionary");
            JrpError::DictionaryMissing(self.path.clone())
        })
    }

    /// Build the candidate query. `limit` appends `ORDER BY RANDOM() LIMIT n`;
    /// without it every candidate comes back in id order.
    fn candidate_query(
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        limit: Option<usize>,
    ) -> (String, Vec<Box<dyn ToSql>>) {
        let mut query = format!(
            "SELECT {}, {}, {} FROM {} WHERE {} = ? AND {} = ?",
            word::WORD_ID,
            word::LEMMA,
            word::POS,
            word::TABLE,
            word::LANG,
            word::POS
        );
        let mut params: Vec<Box<dyn ToSql>> = vec![
            Box::new(word::LANG_JAPANESE),
            Box::new(pos.code()),
        ];

        match filter {
            Some(LemmaFilter::StartsWith(needle)) => {
                query.push_str(&format!(" AND substr({0}, 1, length(?)) = ?", word::LEMMA));
                params.push(Box::new(needle.clone()));
                params.push(Box::new(needle.clone()));
            },
            Some(LemmaFilter::EndsWith(needle)) => {
                query.push_str(&format!(" AND substr({0}, -length(?)) = ?", word::LEMMA));
                params.push(Box::new(needle.clone()));
                params.push(Box::new(needle.clone()));
            },
            None => {},
        }

        match limit {
            Some(n) => {
                query.push_str(" ORDER BY RANDOM() LIMIT ?");
                params.push(Box::new(i64::try_from(n).unwrap_or(i64::MAX)));
            },
            None => query.push_str(&format!(" ORDER BY {}", word::WORD_ID)),
        }

        (query, params)
    }

    fn query_words(
        &self,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Word>> {
        let conn = self.connect()?;
        let (query, params) = Self::candidate_query(pos, filter, limit);

        let mut stmt = conn.prepare(&query)?;
        let word_iter = stmt.query_map(rusqlite::params_from_iter(params.iter()), map_word)?;

        let mut results = Vec::new();
        for word in word_iter {
            if let Some(word) = word? {
                results.push(word);
            }
        }

        Ok(results)
    }

    fn sample_in_sql(
        &self,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        n: usize,
    ) -> Result<Vec<Word>> {
        let mut words = self.query_words(pos, filter, Some(n))?;
        if words.is_empty() || words.len() >= n {
            return Ok(words);
        }

        // Fewer candidates than requested: top up with replacement
        let mut rng = rand::thread_rng();
        let distinct = words.len();
        while words.len() < n {
            let pick = words[rng.gen_range(0..distinct)].clone();
            words.push(pick);
        }
        Ok(words)
    }

    /// `n` runs of `ORDER BY RANDOM() LIMIT 1` on one prepared statement
    fn draw_in_sql(
        &self,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        n: usize,
    ) -> Result<Vec<Word>> {
        let conn = self.connect()?;
        let (query, params) = Self::candidate_query(pos, filter, Some(1));
        let mut stmt = conn.prepare(&query)?;

        let mut words = Vec::with_capacity(n);
        for _ in 0..n {
            let drawn = stmt
                .query_row(rusqlite::params_from_iter(params.iter()), map_word)
                .optional()?
                .flatten();
            let Some(word) = drawn else {
                // Nothing to draw from
                return Ok(Vec::new());
            };
            words.push(word);
        }
        Ok(words)
    }

    fn sample_seeded(
        &self,
        rng: &Mutex<StdRng>,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        n: usize,
        replace: bool,
    ) -> Result<Vec<Word>> {
        let candidates = self.query_words(pos, filter, None)?;
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
        let picked = if !replace && n <= candidates.len() {
            index::sample(&mut *rng, candidates.len(), n)
                .into_iter()
                .map(|i| candidates[i].clone())
                .collect()
        } else {
            (0..n)
                .map(|_| candidates[rng.gen_range(0..candidates.len())].clone())
                .collect()
        };
        Ok(picked)
    }

    fn checked(
        words: Vec<Word>,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        n: usize,
    ) -> Result<Vec<Word>> {
        if words.is_empty() {
            return Err(JrpError::DictionaryEmpty {
                pos,
                constraint: filter.map(|f| f.needle().to_string()),
            });
        }

        debug!(pos = %pos, requested = n, returned = words.len(), "Sampled words");
        Ok(words)
    }
}

impl WordSource for Dictionary {
    fn sample_words(
        &self,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        n: usize,
    ) -> Result<Vec<Word>> {
        let _timer = OperationTimer::new("dictionary.sample_words");
        if n == 0 {
            return Ok(Vec::new());
        }

        let words = match &self.rng {
            Some(rng) => self.sample_seeded(rng, pos, filter, n, false)?,
            None => self.sample_in_sql(pos, filter, n)?,
        };
        Self::checked(words, pos, filter, n)
    }

    fn draw_words(
        &self,
        pos: PartOfSpeech,
        filter: Option<&LemmaFilter>,
        n: usize,
    ) -> Result<Vec<Word>> {
        let _timer = OperationTimer::new("dictionary.draw_words");
        if n == 0 {
            return Ok(Vec::new());
        }

        let words = match &self.rng {
            Some(rng) => self.sample_seeded(rng, pos, filter, n, true)?,
            None => self.draw_in_sql(pos, filter, n)?,
        };
        Self::checked(words, pos, filter, n)
    }
}

/// Map a `word` row; rows with an unknown part-of-speech code are skipped.
fn map_word(row: &Row) -> rusqlite::Result<Option<Word>> {
    let code: String = row.get(2)?;
    let Some(part_of_speech) = PartOfSpeech::from_code(&code) else {
        return Ok(None);
    };
    Ok(Some(Word {
        word_id: row.get(0)?,
        lemma: row.get(1)?,
        part_of_speech,
    }))
}
