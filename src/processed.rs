//! Append-only record of paths that a run has already handled.
//!
//! The log is plain UTF-8 text with one path per line, no header and no
//! escaping. Lines are never rewritten, so the file only grows and may hold
//! duplicates. Each append is flushed before returning: an interrupted run
//! loses at most the entry it was working on.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{MirrorError, Result};

/// Membership and append operations over a set of handled paths
pub trait ProcessedSet {
    /// Whether `item` was appended by this or any earlier run
    fn contains(&mut self, item: &str) -> Result<bool>;

    /// Durably record `item` as handled
    fn append(&mut self, item: &str) -> Result<()>;
}

/// Log that re-reads the file on every membership check
///
/// No state is kept between calls; every operation opens the file (creating
/// it when absent) and closes it before returning.
#[derive(Debug, Clone)]
pub struct ProcessedLog {
    path: PathBuf,
}

impl ProcessedLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_for_read(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| MirrorError::log_io(&self.path, e))
    }

    /// Read every line of the log, trailing newline stripped
    pub fn read_all(&self) -> Result<Vec<String>> {
        let reader = BufReader::new(self.open_for_read()?);
        reader
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| MirrorError::log_io(&self.path, e))
    }
}

impl ProcessedSet for ProcessedLog {
    fn contains(&mut self, item: &str) -> Result<bool> {
        let reader = BufReader::new(self.open_for_read()?);

        for line in reader.lines() {
            let line = line.map_err(|e| MirrorError::log_io(&self.path, e))?;
            if line == item {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn append(&mut self, item: &str) -> Result<()> {
        append_line(&self.path, item)
    }
}

/// Log loaded once into memory and extended incrementally
///
/// Appends still go to disk one line at a time, so the crash behaviour matches
/// [`ProcessedLog`]; only the membership checks are served from memory.
#[derive(Debug)]
pub struct PreloadedLog {
    path: PathBuf,
    seen: HashSet<String>,
}

impl PreloadedLog {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let seen = ProcessedLog::new(&path).read_all()?.into_iter().collect();
        Ok(Self { path, seen })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct paths recorded
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl ProcessedSet for PreloadedLog {
    fn contains(&mut self, item: &str) -> Result<bool> {
        Ok(self.seen.contains(item))
    }

    fn append(&mut self, item: &str) -> Result<()> {
        append_line(&self.path, item)?;
        self.seen.insert(item.to_string());
        Ok(())
    }
}

fn append_line(path: &Path, item: &str) -> Result<()> {
    if item.contains('\n') {
        log::warn!("Logged path contains a newline and will not match on later runs: {item:?}");
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| MirrorError::log_io(path, e))?;

    let mut writer = BufWriter::new(file);
    writeln!(writer, "{item}").map_err(|e| MirrorError::log_io(path, e))?;
    writer.flush().map_err(|e| MirrorError::log_io(path, e))?;

    Ok(())
}
