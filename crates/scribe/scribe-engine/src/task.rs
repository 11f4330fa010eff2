//! Heartbeat-carrying task wrapper for the producer and consumer loops.
//!
//! Every periodic task in the pipeline is a [`Steppable`] payload driven by
//! some scheduler (here, a plain thread loop). The wrapper publishes the
//! tick of the last completed step into a shared heartbeat word, release
//! ordered, so a supervisor on another thread can detect a stalled task
//! with one acquire load.

use basalt_wal::Tick;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// A periodic task payload.
pub trait Steppable {
    /// One bounded unit of work at tick `now`.
    fn step(&mut self, now: Tick);

    /// Called once before the first step.
    fn init(&mut self) {}

    /// Called when the supervisor flags this task as stalled.
    fn alarm(&mut self) {}

    /// Called once after the last step.
    fn done(&mut self) {}
}

/// Wraps a payload and stamps the heartbeat after every step.
pub struct TaskWrapper<P: Steppable> {
    payload: P,
    heartbeat: Arc<AtomicU32>,
}

impl<P: Steppable> TaskWrapper<P> {
    pub fn new(payload: P, heartbeat: Arc<AtomicU32>) -> Self {
        Self { payload, heartbeat }
    }

    #[inline]
    pub fn step(&mut self, now: Tick) {
        self.payload.step(now);
        self.heartbeat.store(now, Ordering::Release);
    }

    pub fn init(&mut self) {
        self.payload.init();
    }

    pub fn alarm(&mut self) {
        self.payload.alarm();
    }

    /// Finishes the task and hands the payload back.
    pub fn done(mut self) -> P {
        self.payload.done();
        self.payload
    }
}
