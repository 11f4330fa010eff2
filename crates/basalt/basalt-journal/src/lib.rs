//! `basalt-journal`: plumbing from the hand-off primitives to durable
//! storage.
//!
//! The [`dispatcher`] pair is the seam: its submit half is RT-safe and its
//! drain half owns all IO. Backends and recovery never run in the producer
//! domain.

pub mod backend;
pub mod dispatcher;
pub mod recover;

pub use backend::{Backend, BackendConfig, BackendError, FileBackend, MemBackend};
pub use dispatcher::{JournalDrainer, JournalSubmitter, dispatcher};
pub use recover::{recover_dir, recover_segment};
