//! Shutdown signalling between the signal handler and the display loop.
//!
//! Similar to Golang's Context: cloneable, cancel-once, and waitable with a
//! timeout so the loop's sleeps end early on shutdown.

use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard},
    time::Duration,
};

#[derive(Clone, Debug, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Why the context was cancelled; `None` while running.
    reason: Mutex<Option<String>>,
    cv: Condvar,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    fn reason_guard(&self) -> MutexGuard<'_, Option<String>> {
        // Only ever held for a read or a single store.
        self.inner
            .reason
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cancel the context. The first reason given is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut g = self.reason_guard();
        if g.is_none() {
            *g = Some(reason.into());
        }
        self.inner.cv.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason_guard().is_some()
    }

    /// Why the context was cancelled, if it was.
    pub fn reason(&self) -> Option<String> {
        self.reason_guard().clone()
    }

    /// Wait until the duration expires or the context is cancelled.
    /// Returns true if the context has been cancelled.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let g = self.reason_guard();
        let (g, _) = self
            .inner
            .cv
            .wait_timeout_while(g, duration, |r| r.is_none())
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        g.is_some()
    }
}
