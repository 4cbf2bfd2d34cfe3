// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt::Debug;
use core::pin::Pin;
use core::time::Duration;
use futures::Stream;

/// Boxed tick sequence handed to a sensor's run loop.
pub type TickStream = Pin<Box<dyn Stream<Item = u32> + Send>>;

/// Source of per-timeslot sample counts.
///
/// Implementations only decide how many samples each slot asks for; pacing is
/// left to the consumer, which awaits the stream.
pub trait RateGenerator: Send + Debug {
    /// Length of one timeslot.
    fn timeslot(&self) -> Duration;

    /// Starts the tick sequence.
    ///
    /// The stream is lazy and never ends on its own. Consuming `self` makes the
    /// sequence non-restartable.
    fn generate(self: Box<Self>) -> TickStream;
}
