//! `basalt-sync`: wait-free hand-off primitives between a real-time producer
//! domain and a non-real-time consumer domain.
//!
//! Every primitive here is bounded, allocation-free on the hot path, and
//! wait-free: each operation completes in a compile-time-constant number of
//! atomic operations plus one copy of the payload. They are the only
//! synchronization boundary in the journaling pipeline.
//!
//! # Primitives
//!
//! | Type | Roles | Semantics |
//! |---|---|---|
//! | [`SnapBuffer`]  | 1P / 1C | latest-wins snapshot, read always succeeds |
//! | [`Mailbox`]     | 1P / 1C | latest-wins snapshot, read may miss on a race |
//! | [`SnapChannel`] | 1P / N C | latest-wins snapshot for N concurrent readers |
//! | [`SpscRing`]    | 1P / 1C | FIFO, no overwrite, refuses when full |
//!
//! # Contract
//!
//! Payloads are plain `Copy` values with no interior synchronization. Each
//! primitive is consumed by `split()`, which yields move-only producer and
//! consumer handles; holding a handle *is* holding the role, and each role
//! must be driven from a single serialized context (one thread, one task).
//! Operations never block, never loop, and never retry: a miss or a full
//! ring is reported to the caller, who decides what the current tick does
//! with it.

pub mod channel;
pub mod layout;
pub mod mailbox;
pub mod ring;
pub mod snap;

pub use channel::{ChannelReader, ChannelWriter, SnapChannel};
pub use layout::{CACHE_LINE_BYTES, CacheAligned};
pub use mailbox::{Mailbox, MailboxReader, MailboxWriter};
pub use ring::{RingReader, RingWriter, SpscRing};
pub use snap::{SnapBuffer, SnapReader, SnapWriter};
