//! Journal recovery: read segments back, stopping at the first record that
//! fails verification.
//!
//! A torn tail write, a truncated segment, or a version from a newer format
//! all terminate the scan at that point; everything before it is trusted.
//! Recovery therefore returns the longest verified prefix, never an error
//! for corruption.

use crate::backend::{BackendError, segment_file_name};
use basalt_wal::{LogRecord, RECORD_BYTES};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reads one segment file, yielding records until the first CRC mismatch,
/// unsupported version, or partial trailing record.
pub fn recover_segment(path: &Path) -> Result<Vec<LogRecord>, BackendError> {
    let bytes = fs::read(path).map_err(|source| BackendError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::with_capacity(bytes.len() / RECORD_BYTES);
    for chunk in bytes.chunks(RECORD_BYTES) {
        let Ok(raw) = <&[u8; RECORD_BYTES]>::try_from(chunk) else {
            warn!(path = %path.display(), "partial trailing record, stopping scan");
            break;
        };
        let rec = LogRecord::from_bytes(raw);
        if let Err(reason) = rec.verify() {
            warn!(
                path = %path.display(),
                offset = records.len() * RECORD_BYTES,
                %reason,
                "unverifiable record, stopping scan"
            );
            break;
        }
        records.push(rec);
    }
    Ok(records)
}

/// Recovers a whole journal directory in segment order.
///
/// Scanning stops at the first segment that ends early (its successor can
/// only hold data written after the corruption point).
pub fn recover_dir(dir: &Path) -> Result<Vec<LogRecord>, BackendError> {
    let mut records = Vec::new();
    for index in 0u32.. {
        let path: PathBuf = dir.join(segment_file_name(index));
        if !path.exists() {
            break;
        }
        let len = fs::metadata(&path)
            .map_err(|source| BackendError::Io {
                path: path.clone(),
                source,
            })?
            .len();
        let segment = recover_segment(&path)?;
        let complete = segment.len() as u64 * RECORD_BYTES as u64 == len;
        records.extend(segment);
        if !complete {
            break;
        }
    }
    info!(records = records.len(), dir = %dir.display(), "journal recovered");
    Ok(records)
}
