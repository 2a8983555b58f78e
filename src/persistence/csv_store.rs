//! CSV implementation of the persistence layer.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::Participant;
use crate::error::{RaffleError, RecordError};

/// Suffix appended to the participant file stem to name the winner file.
pub const WINNER_SUFFIX: &str = "_win";

/// Derives the winner file path from the participant source path.
///
/// The suffix goes between the file stem and the extension:
/// `event.csv` becomes `event_win.csv`, `event` becomes `event_win`.
#[must_use]
pub fn winner_path_for(participants: &Path) -> PathBuf {
    let stem = participants
        .file_stem()
        .map_or_else(OsString::new, ToOwned::to_owned);
    let mut name = stem;
    name.push(WINNER_SUFFIX);
    if let Some(ext) = participants.extension() {
        name.push(".");
        name.push(ext);
    }
    participants.with_file_name(name)
}

/// Reads every row of a CSV file and parses it with `parse`.
///
/// When `has_header` is set, exactly one leading row is skipped; a file
/// without even that row is reported as [`RaffleError::SourceUnavailable`].
/// Rows may differ in length, so short rows reach `parse` and come back
/// as [`RaffleError::MalformedRecord`] with their line number.
///
/// # Errors
///
/// Returns [`RaffleError::SourceUnavailable`] if the file cannot be opened
/// or read, and [`RaffleError::MalformedRecord`] on the first row `parse`
/// rejects.
pub fn read_records<T, F>(path: &Path, has_header: bool, parse: F) -> Result<Vec<T>, RaffleError>
where
    F: Fn(&[&str]) -> Result<T, RecordError>,
{
    let unavailable = |source: csv::Error| RaffleError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_path(path)
        .map_err(unavailable)?;

    if has_header && reader.headers().map_err(unavailable)?.is_empty() {
        return Err(unavailable(csv::Error::from(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "missing header row",
        ))));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(unavailable)?;
        let line = row.position().map_or(0, csv::Position::line);
        let fields: Vec<&str> = row.iter().collect();
        let record = parse(&fields).map_err(|source| RaffleError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            source,
        })?;
        records.push(record);
    }

    tracing::trace!(path = %path.display(), rows = records.len(), "csv source read");
    Ok(records)
}

/// Winner file: headerless participant rows in draw order.
///
/// The whole set is rewritten on every save. Rows are written to a sibling
/// `.tmp` file, synced, and renamed over the winner file. The containing
/// directory is synced after the rename so the new directory entry is
/// durable too. A crash leaves either the old set or the new set on disk
/// and never a truncated one.
#[derive(Debug, Clone)]
pub struct WinnerStore {
    path: PathBuf,
}

impl WinnerStore {
    /// Creates a store writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the store that belongs to a participant source.
    #[must_use]
    pub fn for_participants(participants: &Path) -> Self {
        Self::new(winner_path_for(participants))
    }

    /// Path of the winner file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted winners, or an empty list if the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::SourceUnavailable`] if the file exists but
    /// cannot be read, and [`RaffleError::MalformedRecord`] on a bad row.
    pub fn load(&self) -> Result<Vec<Participant>, RaffleError> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }
        read_records(&self.path, false, |row| Participant::from_row(row))
    }

    /// Replaces the winner file with `winners`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::Persistence`] if any step of the write fails.
    /// The previous winner file is left untouched in that case.
    pub fn save(&self, winners: &[Participant]) -> Result<(), RaffleError> {
        let tmp = self.tmp_path();
        write_atomically(&tmp, &self.path, winners).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            RaffleError::Persistence {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("winners"), ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_atomically(tmp: &Path, target: &Path, winners: &[Participant]) -> io::Result<()> {
    let file = File::create(tmp)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    for winner in winners {
        writer.write_record(winner.to_row())?;
    }
    let file = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    file.sync_all()?;
    fs::rename(tmp, target)?;
    sync_parent_dir(target)
}

/// Flushes the directory entry of `path` to disk.
///
/// A bare file name has an empty parent, which means the current directory.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    File::open(dir)?.sync_all()
}

// Directories cannot be opened as files here; the rename is as far as it goes.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
