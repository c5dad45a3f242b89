//! CSV journal of generated lines and one-off line exports.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{GameType, GeneratedLine, Strategy};

pub const JOURNAL_FILE: &str = "generations.csv";

/// One journal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: String,
    pub app_version: String,
    pub game: GameType,
    pub method: String,
    pub line: String,
}

/// Append-only log of every generated line.
#[derive(Debug, Clone)]
pub struct GenerationJournal {
    path: PathBuf,
}

impl GenerationJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Journal at the default file name inside `storage_dir`.
    pub fn in_dir(storage_dir: impl AsRef<Path>) -> Self {
        Self::new(storage_dir.as_ref().join(JOURNAL_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per line, writing the header when the file is new.
    ///
    /// Rows carry `method` (`Quick Pick` or `Smart:<weighting>`); the
    /// top-probability line keeps its own label.
    pub fn append(&self, game: GameType, method: &str, lines: &[GeneratedLine]) -> Result<usize> {
        if lines.is_empty() {
            return Ok(0);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        for line in lines {
            writer.serialize(JournalEntry {
                timestamp: timestamp.clone(),
                app_version: env!("CARGO_PKG_VERSION").to_string(),
                game,
                method: match line.strategy() {
                    Strategy::BonusTopProbability => line.label().to_string(),
                    _ => method.to_string(),
                },
                line: line.to_plain_text(),
            })?;
        }
        writer.flush()?;

        log::debug!("Journaled {} lines to {}", lines.len(), self.path.display());
        Ok(lines.len())
    }

    /// Most recent `limit` rows, oldest first. Empty when the file is missing.
    pub fn recent(&self, limit: usize) -> Result<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut entries = reader
            .deserialize::<JournalEntry>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        Ok(entries)
    }
}

/// Write a generated set as `row,numbers` CSV.
///
/// Rows are named `Line N`; the top-probability line keeps its label.
pub fn export_lines(path: impl AsRef<Path>, lines: &[GeneratedLine]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(["row", "numbers"])?;

    let mut index = 0;
    for line in lines {
        let row = match line.strategy() {
            Strategy::BonusTopProbability => line.label().to_string(),
            _ => {
                index += 1;
                format!("Line {index}")
            }
        };
        writer.write_record([row, line.to_plain_text()])?;
    }
    writer.flush()?;
    Ok(lines.len())
}
