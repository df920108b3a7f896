//! Turning phrase rows into terminal output.
//!
//! The library hands out [`Phrase`] records; this module projects them into
//! display cells and lays them out in aligned columns.

use std::io::{self, Write};

use chrono::Local;

use crate::models::Phrase;

/// Marker shown in the favorite column
pub const FAVORITE_MARKER: &str = "○";

const HEADERS: [&str; 6] = ["ID", "PHRASE", "PREFIX", "SUFFIX", "FAV", "CREATED AT"];

/// Display cells for one phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseRow {
    pub id: String,
    pub phrase: String,
    pub prefix: String,
    pub suffix: String,
    pub favorite: String,
    pub created_at: String,
}

impl From<&Phrase> for PhraseRow {
    fn from(phrase: &Phrase) -> Self {
        Self {
            id: phrase.id.to_string(),
            phrase: phrase.phrase.clone(),
            prefix: phrase.prefix.clone().unwrap_or_default(),
            suffix: phrase.suffix.clone().unwrap_or_default(),
            favorite: if phrase.is_favorited { FAVORITE_MARKER.to_string() } else { String::new() },
            created_at: phrase
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}

impl PhraseRow {
    fn cells(&self) -> [&str; 6] {
        [
            &self.id,
            &self.phrase,
            &self.prefix,
            &self.suffix,
            &self.favorite,
            &self.created_at,
        ]
    }
}

/// Write rows as an aligned table; nothing is written for an empty slice.
///
/// Rows that were never saved (dry run) are printed as bare phrases.
pub fn write_phrases<W: Write>(out: &mut W, phrases: &[Phrase]) -> io::Result<()> {
    if phrases.is_empty() {
        return Ok(());
    }

    if phrases.iter().all(|p| !p.is_persisted()) {
        for phrase in phrases {
            writeln!(out, "{}", phrase.phrase)?;
        }
        return Ok(());
    }

    let rows: Vec<PhraseRow> = phrases.iter().map(PhraseRow::from).collect();

    let mut widths = HEADERS.map(display_width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(display_width(cell));
        }
    }

    write_line(out, &HEADERS, &widths)?;
    for row in &rows {
        write_line(out, &row.cells(), &widths)?;
    }
    Ok(())
}

fn write_line<W: Write>(out: &mut W, cells: &[&str; 6], widths: &[usize; 6]) -> io::Result<()> {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        line.push_str(cell);
        if i + 1 < cells.len() {
            line.push_str(&" ".repeat(width - display_width(cell) + 2));
        }
    }
    writeln!(out, "{}", line.trim_end())
}

/// Terminal column width, counting East Asian wide characters as two
#[must_use]
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

const fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD
    )
}
