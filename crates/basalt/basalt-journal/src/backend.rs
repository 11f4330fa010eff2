//! Journal backends: where drained record batches land.
//!
//! The RT domain never sees these types. Batches arrive from the drain side
//! of the dispatcher, already sealed; a backend's only job is to append them
//! according to its IO policy.

use basalt_wal::{LogRecord, RECORD_BYTES};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Backend failure. Only raised from the non-RT drain path.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("journal io failed on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Sink for drained record batches.
pub trait Backend {
    fn submit_batch(&mut self, batch: &[LogRecord]) -> Result<(), BackendError>;

    /// Forces buffered records to the medium.
    fn flush(&mut self) -> Result<(), BackendError>;
}

/// File backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Directory holding the journal segments.
    pub dir: PathBuf,
    /// fsync after every committed batch.
    pub fsync_on_commit: bool,
    /// Upper bound on the bytes handed to the backend per batch.
    pub max_batch_bytes: usize,
    /// Segment size threshold; the next batch after crossing it opens a new
    /// segment file.
    pub rotate_bytes: u64,
}

impl BackendConfig {
    /// Records per batch implied by `max_batch_bytes`, at least one.
    pub fn max_batch_records(&self) -> usize {
        (self.max_batch_bytes / RECORD_BYTES).max(1)
    }
}

/// Appends sealed records to size-rotated segment files.
pub struct FileBackend {
    config: BackendConfig,
    file: File,
    path: PathBuf,
    segment_index: u32,
    segment_bytes: u64,
    degraded: bool,
    dropped_batches: u64,
}

/// Segment file name for a given index.
pub fn segment_file_name(index: u32) -> String {
    format!("journal-{index:06}.wal")
}

impl FileBackend {
    /// Creates the journal directory if needed and opens the first segment.
    pub fn open(config: BackendConfig) -> Result<Self, BackendError> {
        fs::create_dir_all(&config.dir).map_err(|source| BackendError::Io {
            path: config.dir.clone(),
            source,
        })?;
        let (file, path) = Self::open_segment(&config.dir, 0)?;
        info!(path = %path.display(), "journal backend started");
        Ok(Self {
            config,
            file,
            path,
            segment_index: 0,
            segment_bytes: 0,
            degraded: false,
            dropped_batches: 0,
        })
    }

    fn open_segment(dir: &Path, index: u32) -> Result<(File, PathBuf), BackendError> {
        let path = dir.join(segment_file_name(index));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| BackendError::Io {
                path: path.clone(),
                source,
            })?;
        Ok((file, path))
    }

    /// Degraded mode: batches are counted and dropped instead of written.
    /// The drain loop keeps running so the RT side never feels back-pressure.
    pub fn set_degraded(&mut self, degraded: bool) {
        if degraded && !self.degraded {
            warn!("journal backend degraded, dropping batches");
        }
        self.degraded = degraded;
    }

    pub fn degraded(&self) -> bool {
        self.degraded
    }

    pub fn dropped_batches(&self) -> u64 {
        self.dropped_batches
    }

    /// Path of the segment currently being appended.
    pub fn current_segment(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> BackendError {
        BackendError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn rotate_if_needed(&mut self) -> Result<(), BackendError> {
        if self.segment_bytes < self.config.rotate_bytes {
            return Ok(());
        }
        self.file.sync_data().map_err(|e| self.io_err(e))?;
        self.segment_index += 1;
        let (file, path) = Self::open_segment(&self.config.dir, self.segment_index)?;
        info!(
            from = %self.path.display(),
            to = %path.display(),
            "rotating journal segment"
        );
        self.file = file;
        self.path = path;
        self.segment_bytes = 0;
        Ok(())
    }
}

impl Backend for FileBackend {
    fn submit_batch(&mut self, batch: &[LogRecord]) -> Result<(), BackendError> {
        if batch.is_empty() {
            return Ok(());
        }
        if self.degraded {
            self.dropped_batches += 1;
            return Ok(());
        }

        self.rotate_if_needed()?;

        let mut buf = Vec::with_capacity(batch.len() * RECORD_BYTES);
        for rec in batch {
            buf.extend_from_slice(&rec.to_bytes());
        }
        self.file.write_all(&buf).map_err(|e| self.io_err(e))?;
        self.segment_bytes += buf.len() as u64;

        if self.config.fsync_on_commit {
            self.file.sync_data().map_err(|e| self.io_err(e))?;
        }

        debug!(records = batch.len(), segment = self.segment_index, "batch committed");
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BackendError> {
        self.file.sync_data().map_err(|e| self.io_err(e))
    }
}

/// In-memory backend. Used by tests and as the null IO policy.
#[derive(Default)]
pub struct MemBackend {
    pub records: Vec<LogRecord>,
}

impl Backend for MemBackend {
    fn submit_batch(&mut self, batch: &[LogRecord]) -> Result<(), BackendError> {
        self.records.extend_from_slice(batch);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}
