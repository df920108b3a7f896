//! Locating the two SQLite files.
//!
//! Each database directory can be overridden through its own environment
//! variable. Otherwise both live under `$XDG_DATA_HOME/jrp`, falling back to
//! `~/.local/share/jrp`.

use std::path::PathBuf;

use directories::BaseDirs;
use tracing::debug;

use crate::error::{JrpError, Result};
use crate::schema::{DICTIONARY_DB_FILE, HISTORY_DB_FILE};

/// Override for the history database directory
pub const HISTORY_DIR_ENV: &str = "JRP_DB_FILE_DIR";
/// Override for the WordNet database directory
pub const DICTIONARY_DIR_ENV: &str = "JRP_WNJPN_DB_FILE_DIR";
/// XDG data root
pub const XDG_DATA_HOME_ENV: &str = "XDG_DATA_HOME";

const APP_DIR: &str = "jrp";

/// Which database a directory is wanted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    /// `jrp.sqlite`
    History,
    /// `wnjpn.db`
    Dictionary,
}

impl DbKind {
    /// Environment variable that overrides this kind's directory
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::History => HISTORY_DIR_ENV,
            Self::Dictionary => DICTIONARY_DIR_ENV,
        }
    }

    /// Fixed file name inside the resolved directory
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::History => HISTORY_DB_FILE,
            Self::Dictionary => DICTIONARY_DB_FILE,
        }
    }
}

/// Resolve the directory for `kind` from the process environment.
pub fn resolve(kind: DbKind) -> Result<PathBuf> {
    resolve_with(
        kind,
        |name| std::env::var(name).ok(),
        || BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
    )
}

/// Resolve the full path of the database file for `kind`.
pub fn resolve_file(kind: DbKind) -> Result<PathBuf> {
    Ok(resolve(kind)?.join(kind.file_name()))
}

/// Resolve the directory for `kind` with explicit environment and home lookups.
pub fn resolve_with<E, H>(kind: DbKind, env: E, home: H) -> Result<PathBuf>
where
    E: Fn(&str) -> Option<String>,
    H: FnOnce() -> Option<PathBuf>,
{
    let non_empty = |name: &str| env(name).filter(|value| !value.is_empty());

    if let Some(dir) = non_empty(kind.env_var()) {
        debug!(kind = ?kind, dir = %dir, "Using directory override");
        return Ok(PathBuf::from(dir));
    }

    if let Some(data_home) = non_empty(XDG_DATA_HOME_ENV) {
        return Ok(PathBuf::from(data_home).join(APP_DIR));
    }

    let home = home().ok_or(JrpError::UserLookupFailed)?;
    Ok(home.join(".local").join("share").join(APP_DIR))
}
