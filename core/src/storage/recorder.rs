use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::prelude::StorageError;
use crate::storage::record::{ScanRecord, COLUMNS};

/// Append-only sink for scan records.
pub trait ScanRecorder: Send {
    /// Called when a sweep is about to produce records.
    fn begin(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Durably appends one record; earlier records stay valid if this fails.
    fn append(&mut self, record: &ScanRecord) -> Result<(), StorageError>;

    /// Called when the sweep ends, on success or abort.
    fn finish(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Comma-separated table on disk, opened in append mode and never truncated.
///
/// Each record is written as one complete line and synced before `append`
/// returns, so a process killed mid-sweep leaves every earlier row readable.
pub struct CsvScanRecorder {
    path: PathBuf,
    file: Option<File>,
}

impl CsvScanRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> Result<&mut File, StorageError> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut file = OpenOptions::new()
                .create(true)
                .read(true)
                .append(true)
                .open(&self.path)?;
            terminate_torn_row(&mut file, &self.path)?;
            info!("recording scan data to {}", self.path.display());
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| StorageError::Io(std::io::Error::other("recorder file unavailable")))
    }
}

/// Ends an unterminated last line left by an interrupted write, so the next
/// row starts on a line of its own.
fn terminate_torn_row(file: &mut File, path: &Path) -> Result<(), StorageError> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        warn!("{} ends in a partial row; starting a new line", path.display());
        file.write_all(b"\n")?;
        file.sync_data()?;
    }
    Ok(())
}

impl ScanRecorder for CsvScanRecorder {
    fn begin(&mut self) -> Result<(), StorageError> {
        self.file().map(|_| ())
    }

    fn append(&mut self, record: &ScanRecord) -> Result<(), StorageError> {
        let row = record.to_row();
        let file = self.file()?;
        file.write_all(row.as_bytes())?;
        file.flush()?;
        file.sync_data()?;
        debug!("appended {}", row.trim_end());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StorageError> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// Reads back every complete record in `path`.
///
/// An unterminated final line (a write cut short) is ignored, as is a header
/// row naming the columns. Earlier lines with fewer fields than a record are
/// fragments of interrupted writes that a later run terminated; they are
/// skipped too. Any other unparsable line is an error.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<ScanRecord>, StorageError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let complete = match contents.rfind('\n') {
        Some(idx) => &contents[..idx],
        None => "",
    };

    let mut records = Vec::new();
    for (idx, line) in complete.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COLUMNS[0]) {
            continue;
        }
        if line.split(',').count() < COLUMNS.len() {
            warn!("skipping partial row at line {}", idx + 1);
            continue;
        }
        let record = ScanRecord::from_row(line).map_err(|reason| StorageError::Malformed {
            line: idx + 1,
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}
