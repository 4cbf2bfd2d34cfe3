// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use vsensor::{RateGenerator, TickStream};

/// Rate generator driven by the test: every count sent on the paired sender
/// becomes one tick. The stream ends when the sender is dropped.
#[derive(Debug)]
pub struct ChannelGenerator {
    receiver: mpsc::UnboundedReceiver<u32>,
    timeslot: Duration,
}

/// Creates a [`ChannelGenerator`] and the sender feeding it.
///
/// # Example
///
/// ```rust
/// use vsensor_test_utils::tick_channel;
///
/// let (ticks, generator) = tick_channel();
/// ticks.send(3).unwrap();
/// ```
pub fn tick_channel() -> (mpsc::UnboundedSender<u32>, ChannelGenerator) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        sender,
        ChannelGenerator {
            receiver,
            timeslot: Duration::ZERO,
        },
    )
}

impl ChannelGenerator {
    /// Timeslot reported to the sensor; purely informational here.
    #[must_use]
    pub fn with_timeslot(mut self, timeslot: Duration) -> Self {
        self.timeslot = timeslot;
        self
    }
}

impl RateGenerator for ChannelGenerator {
    fn timeslot(&self) -> Duration {
        self.timeslot
    }

    fn generate(self: Box<Self>) -> TickStream {
        Box::pin(UnboundedReceiverStream::new(self.receiver))
    }
}
