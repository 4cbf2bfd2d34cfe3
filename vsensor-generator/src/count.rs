// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt::Debug;
use core::ops::RangeInclusive;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vsensor_core::{Result, SensorError};

/// Counts drawn by the default generator: uniform over `0..=10` per slot.
pub const DEFAULT_COUNT_RANGE: RangeInclusive<u32> = 0..=10;

/// Rule deciding how many samples one timeslot asks for.
pub trait SlotCount: Send + Debug + 'static {
    fn next_count(&mut self) -> u32;
}

/// Uniformly distributed count over an inclusive range.
#[derive(Debug, Clone)]
pub struct UniformCount {
    range: RangeInclusive<u32>,
    rng: StdRng,
}

impl UniformCount {
    /// Creates a source seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] when the range is empty.
    pub fn new(range: RangeInclusive<u32>) -> Result<Self> {
        Self::with_rng(range, StdRng::from_os_rng())
    }

    /// Creates a reproducible source from a fixed seed.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] when the range is empty.
    pub fn seeded(range: RangeInclusive<u32>, seed: u64) -> Result<Self> {
        Self::with_rng(range, StdRng::seed_from_u64(seed))
    }

    fn with_rng(range: RangeInclusive<u32>, rng: StdRng) -> Result<Self> {
        if range.is_empty() {
            return Err(SensorError::config(format!(
                "count range {}..={} is empty",
                range.start(),
                range.end()
            )));
        }
        Ok(Self { range, rng })
    }

    pub fn range(&self) -> &RangeInclusive<u32> {
        &self.range
    }
}

impl Default for UniformCount {
    fn default() -> Self {
        Self {
            range: DEFAULT_COUNT_RANGE,
            rng: StdRng::from_os_rng(),
        }
    }
}

impl SlotCount for UniformCount {
    fn next_count(&mut self) -> u32 {
        self.rng.random_range(self.range.clone())
    }
}

/// The same count every slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantCount(pub u32);

impl SlotCount for ConstantCount {
    fn next_count(&mut self) -> u32 {
        self.0
    }
}
