// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by a sensor's run loop.
#[derive(Debug, Default)]
pub struct SensorStats {
    ticks: AtomicU64,
    invocations: AtomicU64,
    produced: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`SensorStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Ticks received from the generator
    pub ticks: u64,
    /// Invocation attempts
    pub invocations: u64,
    /// Samples enqueued
    pub produced: u64,
    /// Failed invocations, skipped or escalated
    pub failures: u64,
}

impl SensorStats {
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
            produced: self.produced.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
