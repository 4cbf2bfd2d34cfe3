// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::count::{ConstantCount, SlotCount, UniformCount};
use crate::generator::{RateGenerator, TickStream};
use core::future::Future;
use core::ops::RangeInclusive;
use core::pin::Pin;
use core::task::{Context, Poll};
use core::time::Duration;
use futures::Stream;
use pin_project::pin_project;
use vsensor_core::{Result, SensorError};
use vsensor_runtime::{Timer, TokioTimer};

/// Default timeslot length.
pub const DEFAULT_TIMESLOT: Duration = Duration::from_secs(1);

/// Generator emitting one count per fixed timeslot.
#[derive(Debug, Clone)]
pub struct SlotGenerator<C, TM = TokioTimer> {
    timeslot: Duration,
    counts: C,
    timer: TM,
}

/// Uniform count per timeslot; the sensor default.
pub type UniformGenerator<TM = TokioTimer> = SlotGenerator<UniformCount, TM>;

/// Fixed count per timeslot.
pub type ConstantGenerator<TM = TokioTimer> = SlotGenerator<ConstantCount, TM>;

impl<C: SlotCount, TM: Timer> SlotGenerator<C, TM> {
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] for a zero timeslot.
    pub fn with_timer(timeslot: Duration, counts: C, timer: TM) -> Result<Self> {
        if timeslot.is_zero() {
            return Err(SensorError::config("timeslot must be greater than zero"));
        }
        Ok(Self {
            timeslot,
            counts,
            timer,
        })
    }

    /// Starts the tick stream without boxing it.
    pub fn ticks(self) -> Ticks<C, TM> {
        let deadline = self.timer.now() + self.timeslot;
        let sleep = self.timer.sleep_future(self.timeslot);
        Ticks {
            counts: self.counts,
            timer: self.timer,
            timeslot: self.timeslot,
            deadline,
            sleep,
        }
    }
}

impl<C: SlotCount> SlotGenerator<C, TokioTimer> {
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] for a zero timeslot.
    pub fn new(timeslot: Duration, counts: C) -> Result<Self> {
        Self::with_timer(timeslot, counts, TokioTimer)
    }
}

impl SlotGenerator<UniformCount, TokioTimer> {
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] for a zero timeslot or an empty range.
    pub fn uniform(timeslot: Duration, range: RangeInclusive<u32>) -> Result<Self> {
        Self::new(timeslot, UniformCount::new(range)?)
    }
}

impl SlotGenerator<ConstantCount, TokioTimer> {
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] for a zero timeslot.
    pub fn constant(timeslot: Duration, count: u32) -> Result<Self> {
        Self::new(timeslot, ConstantCount(count))
    }
}

impl Default for SlotGenerator<UniformCount, TokioTimer> {
    fn default() -> Self {
        Self {
            timeslot: DEFAULT_TIMESLOT,
            counts: UniformCount::default(),
            timer: TokioTimer,
        }
    }
}

impl<C, TM> RateGenerator for SlotGenerator<C, TM>
where
    C: SlotCount,
    TM: Timer,
{
    fn timeslot(&self) -> Duration {
        self.timeslot
    }

    fn generate(self: Box<Self>) -> TickStream {
        Box::pin(self.ticks())
    }
}

/// Tick stream produced by [`SlotGenerator`].
///
/// Deadlines are absolute (`start + k * timeslot`), so a consumer that falls
/// behind finds the overdue ticks ready immediately instead of losing them.
#[pin_project]
pub struct Ticks<C, TM: Timer> {
    counts: C,
    timer: TM,
    timeslot: Duration,
    deadline: TM::Instant,
    #[pin]
    sleep: TM::Sleep,
}

impl<C, TM> Stream for Ticks<C, TM>
where
    C: SlotCount,
    TM: Timer,
{
    type Item = u32;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if this.sleep.as_mut().poll(cx).is_pending() {
            return Poll::Pending;
        }

        *this.deadline = *this.deadline + *this.timeslot;
        let remaining = this.timer.until(*this.deadline);
        this.sleep.set(this.timer.sleep_future(remaining));

        Poll::Ready(Some(this.counts.next_count()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
