//! Append-only signal store
//!
//! One JSON object per line. Appends take an exclusive advisory lock and
//! write the whole line in a single call; reads take a shared lock and skip
//! anything that does not parse, so a torn trailing line from a crashed
//! writer costs one record and nothing else.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs4::fs_std::FileExt;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::types::{SignalRecord, StoreStats};

/// Result of a full read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreScan {
    /// Parsed records in append order
    pub records: Vec<SignalRecord>,
    /// Blank lines are ignored; this counts malformed ones
    pub skipped: usize,
}

/// JSONL-backed signal store
#[derive(Debug, Clone)]
pub struct SignalStore {
    path: PathBuf,
}

impl SignalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line
    pub fn append(&self, record: &SignalRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        FileExt::lock_exclusive(&file).map_err(|e| self.lock_error(e))?;
        let written = self.write_line(&mut file, &line);
        let unlocked = FileExt::unlock(&file).map_err(|e| self.lock_error(e));
        written?;
        unlocked?;

        debug!(sample_id = %record.sample_id, risks = record.risks.len(), "signal record appended");
        Ok(())
    }

    fn write_line(&self, file: &mut File, line: &str) -> Result<(), StoreError> {
        let len = file.metadata().map_err(|e| self.io_error(e))?.len();

        let mut buf = String::with_capacity(line.len() + 2);
        if len > 0 {
            // Terminate a torn trailing line so this record starts clean
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1)).map_err(|e| self.io_error(e))?;
            file.read_exact(&mut last).map_err(|e| self.io_error(e))?;
            if last[0] != b'\n' {
                buf.push('\n');
            }
        }
        buf.push_str(line);
        buf.push('\n');

        file.write_all(buf.as_bytes()).map_err(|e| self.io_error(e))?;
        file.flush().map_err(|e| self.io_error(e))
    }

    /// Read every parseable record; a missing file reads as empty
    pub fn read_all(&self) -> Result<StoreScan, StoreError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "signal store missing, reading as empty");
                return Ok(StoreScan::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        FileExt::lock_shared(&file).map_err(|e| self.lock_error(e))?;
        let mut bytes = Vec::new();
        let read = file.read_to_end(&mut bytes).map_err(|e| self.io_error(e));
        let unlocked = FileExt::unlock(&file).map_err(|e| self.lock_error(e));
        read?;
        unlocked?;

        let mut scan = StoreScan::default();
        for line in bytes.split(|b| *b == b'\n') {
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<SignalRecord>(line) {
                Ok(record) => scan.records.push(record),
                Err(_) => scan.skipped += 1,
            }
        }

        if scan.skipped > 0 {
            warn!(skipped = scan.skipped, path = %self.path.display(), "skipped malformed signal lines");
        }
        debug!(records = scan.records.len(), "signal store read");

        Ok(scan)
    }

    /// Records from the last `days` days, oldest first
    pub fn read_window(&self, days: u32) -> Result<Vec<SignalRecord>, StoreError> {
        self.read_window_at(days, Utc::now())
    }

    /// Records with timestamp in [now - days, now], oldest first; equal
    /// timestamps keep append order
    pub fn read_window_at(&self, days: u32, now: DateTime<Utc>) -> Result<Vec<SignalRecord>, StoreError> {
        let from = window_start(now, days);
        let mut records: Vec<SignalRecord> = self.read_all()?
            .records
            .into_iter()
            .filter(|r| r.timestamp >= from && r.timestamp <= now)
            .collect();
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    /// Counts over the whole store
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let scan = self.read_all()?;

        let mut stats = StoreStats {
            path: self.path.clone(),
            total_records: scan.records.len(),
            skipped_lines: scan.skipped,
            ..StoreStats::default()
        };

        for record in &scan.records {
            if record.has_risk() {
                stats.records_with_risk += 1;
            }
            for risk in &record.risks {
                *stats.risks_by_kind.entry(risk.kind).or_insert(0) += 1;
            }
            stats.earliest = Some(stats.earliest.map_or(record.timestamp, |t| t.min(record.timestamp)));
            stats.latest = Some(stats.latest.map_or(record.timestamp, |t| t.max(record.timestamp)));
        }

        Ok(stats)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn lock_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Lock {
            path: self.path.clone(),
            source,
        }
    }
}

/// Start of a `days`-long window ending at `now`; saturates at the earliest
/// representable instant
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// =============================================================================
// TESTS
// =============================================================================
