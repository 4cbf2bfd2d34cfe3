// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::Sensor;
use crate::config::FailurePolicy;
use tracing::{debug, error, info};
use vsensor_core::{Data, InvocationError, MonotonicClock, Result, SensorError};

/// How a tick's burst of invocations ended.
pub(super) enum Burst {
    Completed,
    QueueClosed,
}

impl Sensor {
    // Invokes the executor `count` times in sequence. Cancellation is not
    // checked here; only a closed queue cuts the burst short.
    pub(super) async fn burst(&self, count: u32, clock: &mut MonotonicClock) -> Result<Burst> {
        for attempt in 0..count {
            self.stats.record_invocation();

            match self.executor.invoke(&self.script).await {
                Ok(value) => {
                    let data = Data::new(clock.now(), value);
                    info!(sensor = %self.name, %data, "produced data");

                    // Waits while the queue is full.
                    if self.sender.send(data).await.is_err() {
                        debug!(
                            sensor = %self.name,
                            skipped = count - attempt - 1,
                            "queue closed during burst, sample dropped"
                        );
                        return Ok(Burst::QueueClosed);
                    }
                    self.stats.record_produced();
                }
                Err(failure) => {
                    self.stats.record_failure();
                    self.handle_failure(failure)?;
                }
            }
        }

        Ok(Burst::Completed)
    }

    fn handle_failure(&self, failure: InvocationError) -> Result<()> {
        if failure.is_classified() {
            error!(sensor = %self.name, error = %failure, "invocation failed, sample skipped");
            return Ok(());
        }

        match self.policy {
            FailurePolicy::Skip => {
                error!(
                    sensor = %self.name,
                    error = %failure,
                    "unclassified invocation failure, sample skipped"
                );
                Ok(())
            }
            FailurePolicy::Escalate => {
                error!(
                    sensor = %self.name,
                    error = %failure,
                    "unclassified invocation failure, leaving run loop"
                );
                Err(SensorError::invocation(self.name.clone(), failure))
            }
        }
    }
}
