//! Fetching the WordNet Japanese database on first use.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::schema::DICTIONARY_DB_FILE;

/// Where the WordNet Japanese archive is published
pub const DEFAULT_DICTIONARY_URL: &str = "https://github.com/bond-lab/wnja/releases/download/v1.1/wnjpn.db.gz";

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Animated stderr spinner; stops and clears its line when dropped
struct Spinner {
    handle: JoinHandle<()>,
}

impl Spinner {
    fn start(message: &'static str) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(100));
            for frame in SPINNER_FRAMES.iter().cycle() {
                interval.tick().await;
                {
                    let mut stderr = io::stderr().lock();
                    let _ = write!(stderr, "\r{frame} {message}");
                    let _ = stderr.flush();
                }
            }
        });
        Self { handle }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.handle.abort();
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r\x1b[2K");
        let _ = stderr.flush();
    }
}

/// Download and unpack `wnjpn.db` into `dir` unless it is already there.
///
/// Returns the path of the database file. The archive is decompressed into a
/// `.part` file first and renamed once complete, so an interrupted download
/// never leaves a truncated database behind.
pub async fn download_dictionary(url: &str, dir: &Path, timeout: Duration) -> Result<PathBuf> {
    let target = dir.join(DICTIONARY_DB_FILE);
    if target.is_file() {
        info!(path = %target.display(), "Dictionary already present");
        return Ok(target);
    }

    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;

    let archive = {
        let _spinner = Spinner::start("Downloading WordNet Japanese...");
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("download failed with HTTP status {status}");
        }

        response.bytes().await.context("reading response body")?
    };
    debug!(bytes = archive.len(), "Downloaded dictionary archive");

    let partial = dir.join(format!("{DICTIONARY_DB_FILE}.part"));
    let unpacked = unpack(&archive, &partial);
    if let Err(e) = unpacked {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, &target)
        .with_context(|| format!("moving {} into place", partial.display()))?;

    info!(path = %target.display(), "Dictionary downloaded");
    Ok(target)
}

fn unpack(archive: &[u8], destination: &Path) -> Result<()> {
    let mut decoder = GzDecoder::new(archive);
    let file = File::create(destination).with_context(|| format!("creating {}", destination.display()))?;
    let mut writer = BufWriter::new(file);
    io::copy(&mut decoder, &mut writer).context("decompressing dictionary archive")?;
    writer.flush()?;
    Ok(())
}
