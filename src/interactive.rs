//! Interactive generation: one phrase per round, one key per phrase.
//!
//! | key | effect |
//! |-----|--------|
//! | `u` | favorite, continue |
//! | `i` | favorite, exit |
//! | `j` | save, continue |
//! | `k` | save, exit |
//! | `m` | skip, continue |
//! | anything else or timeout | skip, exit |
//!
//! Favoriting implies saving. Decisions are buffered and written in batches;
//! whatever is still pending is written when the session ends.

use std::io::Write;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, error, warn};

use crate::dictionary::WordSource;
use crate::error::{JrpError, Result};
use crate::models::{GenerationRequest, NewPhrase, Phrase};
use crate::service::HistoryService;

/// Legend printed before the first round
pub const KEY_LEGEND: &str =
    "u: favorite & continue, i: favorite & exit, j: save & continue, k: save & exit, m: skip & continue, other: exit";

/// Source of single key presses
pub trait KeySource {
    /// Wait at most `timeout` for one key; `None` means the wait timed out.
    fn read_key(&mut self, timeout: Duration) -> Result<Option<char>>;
}

/// Keeps the terminal in raw mode while alive
#[derive(Debug)]
pub struct RawModeGuard(());

impl RawModeGuard {
    /// Switch the terminal into raw mode until the guard is dropped
    pub fn acquire() -> Result<Self> {
        enable_raw_mode().map_err(|e| JrpError::Terminal(e.to_string()))?;
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "Failed to restore terminal mode");
        }
    }
}

/// Reads keys from the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn read_key(&mut self, timeout: Duration) -> Result<Option<char>> {
        let _guard = RawModeGuard::acquire()?;
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !event::poll(remaining)? {
                return Ok(None);
            }

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Ctrl-C and non-character keys all end the session
                let c = match key.code {
                    KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == event::KeyModifiers::SHIFT => c,
                    _ => '\0',
                };
                return Ok(Some(c));
            }
        }
    }
}

/// What to do with the phrase of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// `u`: save as a favorite and keep going
    FavoriteAndContinue,
    /// `i`: save as a favorite and stop
    FavoriteAndExit,
    /// `j`: save and keep going
    SaveAndContinue,
    /// `k`: save and stop
    SaveAndExit,
    /// `m`: drop the phrase and keep going
    SkipAndContinue,
    /// Any other key, or no key before the timeout
    SkipAndExit,
}

impl Decision {
    /// Interpret a key press; `None` is a timeout
    #[must_use]
    pub const fn from_key(key: Option<char>) -> Self {
        match key {
            Some('u') => Self::FavoriteAndContinue,
            Some('i') => Self::FavoriteAndExit,
            Some('j') => Self::SaveAndContinue,
            Some('k') => Self::SaveAndExit,
            Some('m') => Self::SkipAndContinue,
            _ => Self::SkipAndExit,
        }
    }

    /// True if the phrase is written to history
    #[must_use]
    pub const fn saves(self) -> bool {
        !matches!(self, Self::SkipAndContinue | Self::SkipAndExit)
    }

    /// True if the saved phrase is also favorited
    #[must_use]
    pub const fn favorites(self) -> bool {
        matches!(self, Self::FavoriteAndContinue | Self::FavoriteAndExit)
    }

    /// True if another round follows
    #[must_use]
    pub const fn continues(self) -> bool {
        matches!(self, Self::FavoriteAndContinue | Self::SaveAndContinue | Self::SkipAndContinue)
    }

    const fn label(self) -> &'static str {
        match self {
            Self::FavoriteAndContinue | Self::FavoriteAndExit => "favorited",
            Self::SaveAndContinue | Self::SaveAndExit => "saved",
            Self::SkipAndContinue | Self::SkipAndExit => "skipped",
        }
    }
}

/// Settings for one interactive session
#[derive(Debug, Clone)]
pub struct InteractiveOptions {
    /// How long each prompt waits for a key
    pub timeout: Duration,
    /// Number of pending phrases that triggers a write
    pub batch_size: usize,
    /// Prefix passed to every round
    pub prefix: Option<String>,
    /// Suffix passed to every round
    pub suffix: Option<String>,
}

impl Default for InteractiveOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            batch_size: 1,
            prefix: None,
            suffix: None,
        }
    }
}

/// What happened during a session
#[derive(Debug, Default)]
pub struct InteractiveSummary {
    /// Number of phrases shown
    pub rounds: usize,
    /// Rows written to history, in insertion order
    pub saved: Vec<Phrase>,
    /// Generation failure that ended the session early
    pub error: Option<JrpError>,
}

#[derive(Debug, Default)]
struct Pending {
    rows: Vec<NewPhrase>,
    favorite: Vec<bool>,
}

impl Pending {
    fn push(&mut self, row: NewPhrase, favorite: bool) {
        self.rows.push(row);
        self.favorite.push(favorite);
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    /// One save followed by one favorite call for the ids it returned
    fn flush<W: WordSource>(&mut self, service: &HistoryService<W>) -> Result<Vec<Phrase>> {
        if self.rows.is_empty() {
            return Ok(Vec::new());
        }

        let rows = std::mem::take(&mut self.rows);
        let favorite = std::mem::take(&mut self.favorite);
        let mut saved = service.save(rows)?;

        let favorite_ids: Vec<i64> = saved
            .iter()
            .zip(&favorite)
            .filter(|(_, &fav)| fav)
            .map(|(row, _)| row.id)
            .collect();

        if !favorite_ids.is_empty() {
            service.favorite_ids(&favorite_ids)?;
            let ids: Vec<i64> = saved.iter().map(|row| row.id).collect();
            saved = service.get_by_ids(&ids)?;
            saved.sort_by_key(|row| row.id);
        }

        debug!(saved = saved.len(), favorited = favorite_ids.len(), "Flushed interactive batch");
        Ok(saved)
    }
}

/// Run rounds until a decision, a timeout or a generation error ends the session.
pub fn run<W, K, O>(
    service: &HistoryService<W>,
    keys: &mut K,
    out: &mut O,
    options: &InteractiveOptions,
) -> Result<InteractiveSummary>
where
    W: WordSource,
    K: KeySource,
    O: Write,
{
    let request = GenerationRequest {
        count: 1,
        prefix: options.prefix.clone(),
        suffix: options.suffix.clone(),
    };
    let batch_size = options.batch_size.max(1);

    let mut summary = InteractiveSummary::default();
    let mut pending = Pending::default();

    let outcome = loop {
        let phrase = match service.generate(&request).map(|mut rows| rows.pop()) {
            Ok(Some(phrase)) => phrase,
            Ok(None) => break Ok(()),
            Err(e) => {
                error!(error = %e, "Generation failed during interactive session");
                writeln!(out, "{e}")?;
                summary.error = Some(e);
                break Ok(());
            },
        };

        summary.rounds += 1;
        write!(out, "{}: {} ", summary.rounds, phrase.phrase)?;
        out.flush()?;

        let key = match keys.read_key(options.timeout) {
            Ok(key) => key,
            Err(e) => break Err(e),
        };
        let decision = Decision::from_key(key);
        if key.is_none() {
            writeln!(out, "(timeout)")?;
        } else {
            writeln!(out, "({})", decision.label())?;
        }
        debug!(round = summary.rounds, ?decision, "Interactive decision");

        if decision.saves() {
            pending.push(phrase, decision.favorites());
        }

        if pending.len() >= batch_size {
            summary.saved.extend(pending.flush(service)?);
        }

        if !decision.continues() {
            break Ok(());
        }
    };

    // Write whatever is left even when the key source failed
    summary.saved.extend(pending.flush(service)?);
    outcome.map(|()| summary)
}
