//! Generation and history behind one handle.
//!
//! The CLI and the interactive loop talk to [`HistoryService`]; it owns the
//! generator and the store, and reports a failed write as
//! [`JrpError::PersistFailed`] carrying the generated phrases.

use tracing::{error, info};

use crate::db::HistoryStore;
use crate::dictionary::WordSource;
use crate::error::{JrpError, Result};
use crate::generator::Generator;
use crate::logging::OperationTimer;
use crate::models::{
    FavoriteOutcome, GenerationRequest, NewPhrase, Phrase, RemoveOutcome, SearchMode, UnfavoriteOutcome,
};

/// Binds the phrase generator to the history database
#[derive(Debug)]
pub struct HistoryService<W> {
    generator: Generator<W>,
    store: HistoryStore,
}

impl<W: WordSource> HistoryService<W> {
    /// Pair a generator with the history it saves into
    pub const fn new(generator: Generator<W>, store: HistoryStore) -> Self {
        Self { generator, store }
    }

    /// Generate phrases without touching history
    pub fn generate(&self, request: &GenerationRequest) -> Result<Vec<NewPhrase>> {
        self.generator.generate(request)
    }

    /// Generate phrases and, unless `dry_run`, save them.
    ///
    /// Dry-run rows have id 0. If saving fails the error is
    /// [`JrpError::PersistFailed`], which still carries the generated phrases.
    pub fn generate_and_save(&self, request: &GenerationRequest, dry_run: bool) -> Result<Vec<Phrase>> {
        let timer = OperationTimer::new("service.generate_and_save");
        let generated = self.generator.generate(request)?;

        if dry_run {
            return Ok(generated.into_iter().map(NewPhrase::into_unsaved).collect());
        }

        let saved = self.save(generated)?;
        info!(count = saved.len(), duration_ms = timer.finish() as u64, "Generated and saved phrases");
        Ok(saved)
    }

    /// Save already-generated phrases, keeping them on failure
    pub fn save(&self, generated: Vec<NewPhrase>) -> Result<Vec<Phrase>> {
        match self.store.save(&generated) {
            Ok(saved) => Ok(saved),
            Err(e) => {
                error!(error = %e, count = generated.len(), "Failed to save generated phrases");
                Err(JrpError::PersistFailed {
                    generated,
                    source: Box::new(e),
                })
            },
        }
    }

    /// Most recent phrases first; `n = 0` returns everything
    pub fn get_recent(&self, n: usize) -> Result<Vec<Phrase>> {
        self.store.get_recent(n)
    }

    /// Keyword search over the whole history
    pub fn search(&self, keywords: &[String], mode: SearchMode, n: usize) -> Result<Vec<Phrase>> {
        self.store.search(keywords, mode, n)
    }

    /// Most recent favorites first
    pub fn get_favorites(&self, n: usize) -> Result<Vec<Phrase>> {
        self.store.get_favorites(n)
    }

    /// Keyword search restricted to favorites
    pub fn search_favorites(&self, keywords: &[String], mode: SearchMode, n: usize) -> Result<Vec<Phrase>> {
        self.store.search_favorites(keywords, mode, n)
    }

    /// Rows with the given ids; missing ids are ignored
    pub fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Phrase>> {
        self.store.get_by_ids(ids)
    }

    /// Mark rows as favorites
    pub fn favorite_ids(&self, ids: &[i64]) -> Result<FavoriteOutcome> {
        self.store.favorite_ids(ids)
    }

    /// Clear the favorite flag on rows
    pub fn unfavorite_ids(&self, ids: &[i64]) -> Result<UnfavoriteOutcome> {
        self.store.unfavorite_ids(ids)
    }

    /// Clear every favorite; returns how many changed
    pub fn unfavorite_all(&self) -> Result<usize> {
        self.store.unfavorite_all()
    }

    /// Delete rows by id, keeping favorites unless `force`
    pub fn remove_ids(&self, ids: &[i64], force: bool) -> Result<RemoveOutcome> {
        self.store.remove_ids(ids, force)
    }

    /// Delete every row (favorites only with `force`)
    pub fn remove_all(&self, force: bool) -> Result<usize> {
        self.store.remove_all(force)
    }

    /// Number of rows in the history
    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }
}
