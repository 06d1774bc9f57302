//! Append-only JSON Lines progress logs.
//!
//! The first line is a header naming the entry kind and format version, plus
//! an optional fingerprint of whatever produced the entries. Each following line is one entry keyed by [`RecordKey`]. Loading keeps the first
//! entry per key, so replaying or re-appending an entry is a no-op. A torn
//! final line (crash mid-append) is dropped and truncated away before new
//! entries are appended.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{ProgressError, ProgressResult};
use crate::constants::DEFAULT_FLUSH_EVERY;
use crate::record::RecordKey;

pub const PROGRESS_FORMAT: &str = "litscreen-progress";
pub const PROGRESS_VERSION: u32 = 1;

/// Entries stored in a [`ProgressLog`].
pub trait Keyed {
    /// Written to the header and checked on load.
    const KIND: &'static str;

    fn key(&self) -> &RecordKey;
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    format: String,
    kind: String,
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
}

pub struct ProgressLog<T> {
    path: PathBuf,
    file: File,
    flush_every: usize,
    unsynced: usize,
    _entry: PhantomData<fn() -> T>,
}

impl<T> ProgressLog<T>
where
    T: Keyed + Serialize + DeserializeOwned,
{
    /// Opens (or creates) the log and returns the entries already in it.
    pub fn open(path: &Path) -> ProgressResult<(Self, Vec<T>)> {
        Self::open_with_flush(path, DEFAULT_FLUSH_EVERY)
    }

    pub fn open_with_flush(path: &Path, flush_every: usize) -> ProgressResult<(Self, Vec<T>)> {
        Self::open_scoped(path, flush_every, None)
    }

    /// Like [`ProgressLog::open_with_flush`], but ties the log to
    /// `fingerprint`. Entries written under another fingerprint are refused
    /// with [`ProgressError::FingerprintMismatch`]; a log with a header and no
    /// entries is re-headed instead.
    pub fn open_scoped(
        path: &Path,
        flush_every: usize,
        fingerprint: Option<&str>,
    ) -> ProgressResult<(Self, Vec<T>)> {
        let io_err = |source| ProgressError::Io {
            path: path.to_path_buf(),
            source,
        };

        let (entries, mut valid_len, found) = match std::fs::read_to_string(path) {
            Ok(text) if !text.is_empty() => parse_log::<T>(path, &text)?,
            Ok(_) => (Vec::new(), 0, None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Vec::new(), 0, None),
            Err(e) => return Err(io_err(e)),
        };

        if let Some(expected) = fingerprint
            && valid_len > 0
            && found.as_deref() != Some(expected)
        {
            if !entries.is_empty() {
                return Err(ProgressError::FingerprintMismatch {
                    path: path.to_path_buf(),
                    expected: expected.to_string(),
                    found: found.unwrap_or_else(|| "none".to_string()),
                });
            }
            debug!(path = %path.display(), "Re-heading empty progress log");
            valid_len = 0;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        let current_len = file.metadata().map_err(io_err)?.len();
        if valid_len > 0 && current_len > valid_len as u64 {
            warn!(path = %path.display(), "Dropping torn final progress entry");
            file.set_len(valid_len as u64).map_err(io_err)?;
        }

        if valid_len == 0 {
            if current_len > 0 {
                file.set_len(0).map_err(io_err)?;
            }
            let header = Header {
                format: PROGRESS_FORMAT.to_string(),
                kind: T::KIND.to_string(),
                version: PROGRESS_VERSION,
                fingerprint: fingerprint.map(str::to_string),
            };
            let mut line = serde_json::to_string(&header).map_err(ProgressError::Serialize)?;
            line.push('\n');
            file.write_all(line.as_bytes()).map_err(io_err)?;
            file.sync_data().map_err(io_err)?;
        }

        debug!(path = %path.display(), entries = entries.len(), kind = T::KIND, "Opened progress log");

        Ok((
            Self {
                path: path.to_path_buf(),
                file,
                flush_every: flush_every.max(1),
                unsynced: 0,
                _entry: PhantomData,
            },
            entries,
        ))
    }

    /// Reads a log without opening it for writing. A missing file is empty.
    pub fn load(path: &Path) -> ProgressResult<Vec<T>> {
        match std::fs::read_to_string(path) {
            Ok(text) if text.is_empty() => Ok(Vec::new()),
            Ok(text) => parse_log::<T>(path, &text).map(|(entries, _, _)| entries),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(ProgressError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Appends one entry as a single write. Syncs every `flush_every` appends.
    pub fn append(&mut self, entry: &T) -> ProgressResult<()> {
        let mut line = serde_json::to_string(entry).map_err(ProgressError::Serialize)?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .map_err(|source| ProgressError::Io {
                path: self.path.clone(),
                source,
            })?;

        self.unsynced += 1;
        if self.unsynced >= self.flush_every {
            self.sync()?;
        }
        Ok(())
    }

    pub fn sync(&mut self) -> ProgressResult<()> {
        if self.unsynced == 0 {
            return Ok(());
        }
        self.file.sync_data().map_err(|source| ProgressError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.unsynced = 0;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses header and entries. Returns the entries (first per key), the byte
/// length of the valid prefix and the header fingerprint.
fn parse_log<T>(path: &Path, text: &str) -> ProgressResult<(Vec<T>, usize, Option<String>)>
where
    T: Keyed + DeserializeOwned,
{
    let mut offset = 0usize;
    let mut lines = text.split_inclusive('\n').enumerate().peekable();

    let Some((_, header_line)) = lines.next() else {
        return Err(ProgressError::MissingHeader {
            path: path.to_path_buf(),
        });
    };
    let header: Header = serde_json::from_str(header_line.trim()).map_err(|_| {
        ProgressError::MissingHeader {
            path: path.to_path_buf(),
        }
    })?;
    if header.format != PROGRESS_FORMAT {
        return Err(ProgressError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    if header.kind != T::KIND {
        return Err(ProgressError::KindMismatch {
            path: path.to_path_buf(),
            expected: T::KIND,
            found: header.kind,
        });
    }
    if header.version != PROGRESS_VERSION {
        return Err(ProgressError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: header.version,
        });
    }
    if !header_line.ends_with('\n') {
        // header written but never terminated
        return Ok((Vec::new(), 0, None));
    }
    offset += header_line.len();

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    while let Some((index, line)) = lines.next() {
        let is_last = lines.peek().is_none();
        let trimmed = line.trim();

        if trimmed.is_empty() {
            offset += line.len();
            continue;
        }

        match serde_json::from_str::<T>(trimmed) {
            Ok(entry) if line.ends_with('\n') => {
                offset += line.len();
                if seen.insert(entry.key().clone()) {
                    entries.push(entry);
                } else {
                    debug!(key = %entry.key(), "Ignoring repeated progress entry");
                }
            }
            Err(source) if !is_last => {
                return Err(ProgressError::Corrupt {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                });
            }
            // unparseable, or complete JSON missing its newline
            _ => {
                warn!(path = %path.display(), line = index + 1, "Ignoring torn final progress line");
                break;
            }
        }
    }

    Ok((entries, offset, header.fingerprint))
}
