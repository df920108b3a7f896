//! The phrase history database.
//!
//! [`HistoryStore`] owns `jrp.sqlite`. It does not keep a connection around:
//! each public operation opens the file, does its work inside a single
//! transaction when it writes, and drops the handle on every exit path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension, Row, ToSql, Transaction};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::{JrpError, Result};
use crate::logging::OperationTimer;
use crate::models::{
    FavoriteOutcome, NewPhrase, Phrase, RemoveOutcome, SearchMode, UnfavoriteOutcome,
};
use crate::schema::{phrase, sqlite_sequence};

/// Read/write accessor for the phrase history
#[derive(Clone)]
pub struct HistoryStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").field("path", &self.path).finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Open (or create) the history database at `path` using wall-clock time.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    /// Open (or create) the history database at `path` with a custom clock.
    pub fn with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self { path, clock };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Location of the database file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Create the `phrase` table if it is missing
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(phrase::CREATE)?;
        Ok(())
    }

    /// Insert phrases and return them with their new ids and timestamps.
    ///
    /// Rows are inserted in order inside one transaction, so ids ascend with
    /// the input sequence.
    pub fn save(&self, rows: &[NewPhrase]) -> Result<Vec<Phrase>> {
        let _timer = OperationTimer::new("history.save");
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let now = self.clock.now();

        let mut saved = Vec::with_capacity(rows.len());
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?)",
                phrase::TABLE,
                phrase::PHRASE,
                phrase::PREFIX,
                phrase::SUFFIX,
                phrase::IS_FAVORITED,
                phrase::CREATED_AT,
                phrase::UPDATED_AT
            ))?;

            for row in rows {
                stmt.execute(params![row.phrase, row.prefix, row.suffix, false, now, now])?;
                saved.push(Phrase {
                    id: tx.last_insert_rowid(),
                    phrase: row.phrase.clone(),
                    prefix: row.prefix.clone(),
                    suffix: row.suffix.clone(),
                    is_favorited: false,
                    created_at: now,
                    updated_at: now,
                });
            }
        }

        tx.commit()?;
        info!(count = saved.len(), "Saved phrases");
        Ok(saved)
    }

    /// Most recent phrases first; `n = 0` returns everything
    pub fn get_recent(&self, n: usize) -> Result<Vec<Phrase>> {
        self.select_phrases(false, &[], SearchMode::Or, n)
    }

    /// Phrases containing the keywords
    pub fn search(&self, keywords: &[String], mode: SearchMode, n: usize) -> Result<Vec<Phrase>> {
        if keywords.is_empty() {
            return Err(JrpError::NoKeywords);
        }
        self.select_phrases(false, keywords, mode, n)
    }

    /// Favorited phrases, most recent first
    pub fn get_favorites(&self, n: usize) -> Result<Vec<Phrase>> {
        self.select_phrases(true, &[], SearchMode::Or, n)
    }

    /// Favorited phrases containing the keywords
    pub fn search_favorites(&self, keywords: &[String], mode: SearchMode, n: usize) -> Result<Vec<Phrase>> {
        if keywords.is_empty() {
            return Err(JrpError::NoKeywords);
        }
        self.select_phrases(true, keywords, mode, n)
    }

    /// Rows with the given ids, most recent first; unknown ids are ignored
    pub fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Phrase>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connect()?;
        let query = format!(
            "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {} DESC, {} DESC",
            phrase::COLUMNS,
            phrase::TABLE,
            phrase::ID,
            placeholders(ids.len()),
            phrase::CREATED_AT,
            phrase::ID
        );
        let mut stmt = conn.prepare(&query)?;
        let phrase_iter = stmt.query_map(rusqlite::params_from_iter(ids.iter()), map_phrase)?;

        let mut results = Vec::new();
        for row in phrase_iter {
            results.push(row?);
        }
        Ok(results)
    }

    fn select_phrases(
        &self,
        favorites_only: bool,
        keywords: &[String],
        mode: SearchMode,
        n: usize,
    ) -> Result<Vec<Phrase>> {
        let _timer = OperationTimer::new("history.select");
        let conn = self.connect()?;

        let mut query = format!("SELECT {} FROM {}", phrase::COLUMNS, phrase::TABLE);
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if favorites_only {
            conditions.push(format!("{} = 1", phrase::IS_FAVORITED));
        }

        if !keywords.is_empty() {
            let like = format!("{} LIKE ? ESCAPE '\\'", phrase::PHRASE);
            let joiner = match mode {
                SearchMode::And => " AND ",
                SearchMode::Or => " OR ",
            };
            let clause = vec![like; keywords.len()].join(joiner);
            conditions.push(format!("({clause})"));
            params.extend(
                keywords
                    .iter()
                    .map(|k| Box::new(format!("%{}%", escape_like(k))) as Box<dyn ToSql>),
            );
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(&format!(" ORDER BY {} DESC, {} DESC", phrase::CREATED_AT, phrase::ID));

        if n > 0 {
            query.push_str(" LIMIT ?");
            params.push(Box::new(i64::try_from(n).unwrap_or(i64::MAX)));
        }

        let mut stmt = conn.prepare(&query)?;
        let phrase_iter = stmt.query_map(rusqlite::params_from_iter(params.iter()), map_phrase)?;

        let mut results = Vec::new();
        for row in phrase_iter {
            results.push(row?);
        }

        debug!(count = results.len(), favorites_only, keywords = keywords.len(), "Selected phrases");
        Ok(results)
    }

    /// Mark rows as favorites.
    ///
    /// Rows that are already favorites, or that do not exist, end up in
    /// `not_added`.
    pub fn favorite_ids(&self, ids: &[i64]) -> Result<FavoriteOutcome> {
        let (changed, unchanged) = self.set_favorited(ids, true)?;
        Ok(FavoriteOutcome {
            added: changed,
            not_added: unchanged,
        })
    }

    /// Clear the favorite flag on rows.
    pub fn unfavorite_ids(&self, ids: &[i64]) -> Result<UnfavoriteOutcome> {
        let (changed, unchanged) = self.set_favorited(ids, false)?;
        Ok(UnfavoriteOutcome {
            removed: changed,
            not_removed: unchanged,
        })
    }

    fn set_favorited(&self, ids: &[i64], favorited: bool) -> Result<(Vec<i64>, Vec<i64>)> {
        let _timer = OperationTimer::new("history.set_favorited");
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let now = self.clock.now();

        let mut changed = Vec::new();
        let mut unchanged = Vec::new();
        {
            let mut stmt = tx.prepare(&format!(
                "UPDATE {} SET {} = ?, {} = ? WHERE {} = ? AND {} = ?",
                phrase::TABLE,
                phrase::IS_FAVORITED,
                phrase::UPDATED_AT,
                phrase::ID,
                phrase::IS_FAVORITED
            ))?;

            for &id in ids {
                let updated = stmt.execute(params![favorited, now, id, !favorited])?;
                if updated == 1 {
                    changed.push(id);
                } else {
                    unchanged.push(id);
                }
            }
        }

        tx.commit()?;
        debug!(favorited, changed = changed.len(), unchanged = unchanged.len(), "Toggled favorites");
        Ok((changed, unchanged))
    }

    /// Clear the favorite flag on every row; returns how many changed
    pub fn unfavorite_all(&self) -> Result<usize> {
        let conn = self.connect()?;
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET {} = 0, {} = ? WHERE {} = 1",
                phrase::TABLE,
                phrase::IS_FAVORITED,
                phrase::UPDATED_AT,
                phrase::IS_FAVORITED
            ),
            params![self.clock.now()],
        )?;
        Ok(updated)
    }

    /// Delete rows by id.
    ///
    /// Without `force`, favorited rows are kept and reported in
    /// `skipped_favorite`.
    pub fn remove_ids(&self, ids: &[i64], force: bool) -> Result<RemoveOutcome> {
        let _timer = OperationTimer::new("history.remove_ids");
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let mut outcome = RemoveOutcome::default();
        {
            let mut lookup = tx.prepare(&format!(
                "SELECT {} FROM {} WHERE {} = ?",
                phrase::IS_FAVORITED,
                phrase::TABLE,
                phrase::ID
            ))?;
            let mut delete = tx.prepare(&format!("DELETE FROM {} WHERE {} = ?", phrase::TABLE, phrase::ID))?;

            for &id in ids {
                let favorited: Option<bool> = lookup.query_row(params![id], |row| row.get(0)).optional()?;

                match favorited {
                    None => outcome.not_found.push(id),
                    Some(true) if !force => outcome.skipped_favorite.push(id),
                    Some(_) => {
                        delete.execute(params![id])?;
                        outcome.removed.push(id);
                    },
                }
            }
        }

        reset_sequence_if_empty(&tx)?;
        tx.commit()?;

        info!(
            removed = outcome.removed.len(),
            skipped_favorite = outcome.skipped_favorite.len(),
            not_found = outcome.not_found.len(),
            "Removed phrases"
        );
        Ok(outcome)
    }

    /// Delete every row (every non-favorite row unless `force`)
    pub fn remove_all(&self, force: bool) -> Result<usize> {
        let _timer = OperationTimer::new("history.remove_all");
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let removed = if force {
            tx.execute(&format!("DELETE FROM {}", phrase::TABLE), [])?
        } else {
            tx.execute(
                &format!("DELETE FROM {} WHERE {} = 0", phrase::TABLE, phrase::IS_FAVORITED),
                [],
            )?
        };

        reset_sequence_if_empty(&tx)?;
        tx.commit()?;

        info!(removed, force, "Cleared history");
        Ok(removed)
    }

    /// Reset the AUTOINCREMENT counter when the table holds no rows.
    ///
    /// Returns true if the counter was reset.
    pub fn reset_sequence_if_empty(&self) -> Result<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let reset = reset_sequence_if_empty(&tx)?;
        tx.commit()?;
        Ok(reset)
    }

    /// Number of rows in the history
    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        count_rows(&conn)
    }
}

fn count_rows(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", phrase::TABLE), [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

fn reset_sequence_if_empty(tx: &Transaction<'_>) -> Result<bool> {
    if count_rows(tx)? > 0 {
        return Ok(false);
    }

    tx.execute(
        &format!("DELETE FROM {} WHERE {} = ?", sqlite_sequence::TABLE, sqlite_sequence::NAME),
        params![phrase::TABLE],
    )?;
    debug!("Reset phrase id sequence");
    Ok(true)
}

/// Map a database row to a Phrase
fn map_phrase(row: &Row) -> rusqlite::Result<Phrase> {
    Ok(Phrase {
        id: row.get(phrase::ID)?,
        phrase: row.get(phrase::PHRASE)?,
        prefix: row.get(phrase::PREFIX)?,
        suffix: row.get(phrase::SUFFIX)?,
        is_favorited: row.get(phrase::IS_FAVORITED)?,
        created_at: row.get(phrase::CREATED_AT)?,
        updated_at: row.get(phrase::UPDATED_AT)?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
