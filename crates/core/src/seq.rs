// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide monotonic sequence source.

use std::sync::atomic::{AtomicU64, Ordering};

static SEQ: AtomicU64 = AtomicU64::new(1);

/// Next value of the process-wide monotonic counter.
///
/// Used to mint build ids, sub-build ids, and container names. Unlike a
/// wall-clock nanosecond stamp this never collides, even when two builds
/// start inside the same timer tick.
pub fn next_seq() -> u64 {
    SEQ.fetch_add(1, Ordering::Relaxed)
}
