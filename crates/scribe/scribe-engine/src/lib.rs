//! `scribe-engine`: wires the demo pipeline together.
//!
//! Three contexts, one hand-off boundary each:
//!
//! ```text
//! ┌─────────────────┐  SPSC ring   ┌────────────────┐        ┌─────────┐
//! │ producer thread │ ───────────► │  drain thread  │ ─────► │ backend │
//! │  (RT domain)    │              │ (non-RT, IO)   │        │ (files) │
//! └─────────────────┘              └────────────────┘        └─────────┘
//!          │ ping-pong status snapshot
//!          ▼
//! ┌─────────────────┐
//! │   supervisor    │  (heartbeat + status polling)
//! └─────────────────┘
//! ```
//!
//! The producer never blocks: a full ring costs it one counted drop. The
//! drain thread owns every byte of IO.

pub mod clock;
pub mod producer;
pub mod task;

use crate::clock::now_ticks;
use crate::producer::{ProducerStatus, RecordProducer};
use crate::task::TaskWrapper;
use basalt_journal::{BackendConfig, BackendError, FileBackend, dispatcher};
use basalt_sync::SnapBuffer;
use basalt_wal::tick_elapsed;
use scribe_config::ScribeConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Slots in the dispatcher ring (usable capacity is one less).
pub const JOURNAL_RING_SLOTS: usize = 1024;

/// Counters reported after a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub submitted: u64,
    pub dropped: u64,
    pub drained: u64,
}

pub struct ScribeEngine {
    config: ScribeConfig,
}

impl ScribeEngine {
    pub fn new(config: ScribeConfig) -> Self {
        Self { config }
    }

    /// Runs the pipeline to completion: `record_count` producer steps,
    /// drained into the file backend, supervised from this thread.
    pub fn run(self) -> Result<RunReport, BackendError> {
        let config = self.config;

        let backend = FileBackend::open(BackendConfig {
            dir: PathBuf::from(&config.journal_dir),
            fsync_on_commit: config.fsync_on_commit,
            max_batch_bytes: config.max_batch_bytes,
            rotate_bytes: config.rotate_bytes,
        })?;
        let max_batch_records = (config.max_batch_bytes / basalt_wal::RECORD_BYTES).max(1);

        let (tx, mut rx) = dispatcher::<JOURNAL_RING_SLOTS>();
        let (status_w, status_r) = SnapBuffer::<ProducerStatus>::new().split();
        let heartbeat = Arc::new(AtomicU32::new(now_ticks()));
        let producer_done = Arc::new(AtomicBool::new(false));

        let producer_thread = {
            let heartbeat = Arc::clone(&heartbeat);
            let done = Arc::clone(&producer_done);
            let period = Duration::from_micros(config.producer_period_ticks as u64 * 100);
            let count = config.record_count;
            thread::spawn(move || {
                let mut task =
                    TaskWrapper::new(RecordProducer::new(tx, status_w, 1), heartbeat);
                task.init();
                for _ in 0..count {
                    task.step(now_ticks());
                    if !period.is_zero() {
                        thread::sleep(period);
                    }
                }
                let payload = task.done();
                done.store(true, Ordering::Release);
                (payload.submitted(), payload.dropped())
            })
        };

        let drain_thread = {
            let done = Arc::clone(&producer_done);
            let mut backend = backend;
            thread::spawn(move || -> Result<u64, BackendError> {
                loop {
                    let n = rx.drain_into(&mut backend, max_batch_records)?;
                    if n == 0 {
                        if done.load(Ordering::Acquire) {
                            rx.flush(&mut backend, max_batch_records)?;
                            return Ok(rx.drained());
                        }
                        thread::sleep(Duration::from_micros(500));
                    }
                }
            })
        };

        // Supervision loop: poll the status snapshot and watch the heartbeat
        // until the producer reports completion.
        while !producer_done.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(50));

            let status = status_r.read();
            if status.seq != 0 {
                debug!(
                    seq = status.seq,
                    submitted = status.submitted,
                    dropped = status.dropped,
                    "producer status"
                );
            }

            let stale = tick_elapsed(now_ticks(), heartbeat.load(Ordering::Acquire));
            if stale > config.heartbeat_stale_ticks as i32 {
                warn!(stale_ticks = stale, "producer heartbeat is stale");
            }
        }

        let (submitted, dropped) = producer_thread.join().expect("producer thread panicked");
        let drained = drain_thread.join().expect("drain thread panicked")?;

        let report = RunReport {
            submitted,
            dropped,
            drained,
        };
        info!(?report, "pipeline run complete");
        Ok(report)
    }
}
