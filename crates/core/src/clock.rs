// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source for build lifecycle records.
//!
//! Everything the engine stamps (`start_ms`/`end_ms` on a build's
//! lifecycle record) is epoch milliseconds, so the clock surface is
//! exactly that one reading. Tests swap in a [`FakeClock`] to pin
//! timestamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of epoch-millisecond timestamps.
pub trait Clock: Clone + Send + Sync {
    fn epoch_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Settable clock for tests. Clones share the same underlying time, so
/// a test can hold one handle while the code under test reads another.
#[derive(Clone, Default)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicU64>,
}

impl FakeClock {
    /// A fake clock starting at the given epoch milliseconds.
    pub fn at(epoch_ms: u64) -> Self {
        Self { epoch_ms: Arc::new(AtomicU64::new(epoch_ms)) }
    }

    /// Move the clock forward.
    pub fn advance_ms(&self, ms: u64) {
        self.epoch_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute reading.
    pub fn set_epoch_ms(&self, ms: u64) {
        self.epoch_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
