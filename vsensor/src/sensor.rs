// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The virtual sensor and its lifecycle.
//!
//! A [`Sensor`] is idle after construction, active while [`Sensor::run`] is
//! polled and terminated after [`Sensor::stop`]:
//!
//! - `run` consumes the rate generator, so it can be started only once.
//! - Cancellation is observed between ticks. A tick's invocations always run
//!   to completion (or until the queue is closed), so a large count or a slow
//!   script delays shutdown accordingly.
//! - `stop` cancels the token and closes the output queue exactly once.
//!   Consumers drain what is buffered and then observe end-of-stream.
//! - `stop` also removes the stored script. Invocations still in flight for
//!   the current tick fail and are skipped.

mod builder;
mod implementation;

pub use builder::SensorBuilder;

use crate::config::FailurePolicy;
use crate::executor::Executor;
use crate::stats::{SensorStats, StatsSnapshot};
use crate::storage::{ScriptHandle, ScriptStore};
use async_channel::{Receiver, Sender};
use futures::StreamExt;
use implementation::Burst;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vsensor_core::{CancellationToken, Data, MonotonicClock, Result, SensorError};
use vsensor_generator::RateGenerator;

/// Output queue capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A virtual sensor.
///
/// Share it behind an [`Arc`] to run it on one task and stop it from another.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use vsensor::Sensor;
///
/// # async fn example() -> vsensor::Result<()> {
/// let sensor = Arc::new(Sensor::create("humidity", b"print(42)")?);
/// let handle = sensor.spawn();
///
/// let samples = sensor.receiver();
/// let first = samples.recv().await;
///
/// sensor.stop()?;
/// handle.await.expect("run loop panicked")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Sensor {
    name: String,
    script: ScriptHandle,
    store: Arc<dyn ScriptStore>,
    executor: Arc<dyn Executor>,
    generator: Mutex<Option<Box<dyn RateGenerator>>>,
    sender: Sender<Data>,
    receiver: Receiver<Data>,
    token: CancellationToken,
    policy: FailurePolicy,
    stats: SensorStats,
}

/// Serializable summary of a sensor.
#[derive(Debug, Clone, Serialize)]
pub struct SensorInfo {
    pub name: String,
    pub script: ScriptHandle,
    pub capacity: usize,
    pub queued: usize,
    pub stopped: bool,
    pub stats: StatsSnapshot,
}

impl Sensor {
    /// Create a sensor with the default configuration: script stored in the
    /// temp dir, run by `runtime.py`, uniform counts per one-second slot and a
    /// queue of [`DEFAULT_CAPACITY`].
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::ScriptStorage`] if the script cannot be written.
    pub fn create(name: impl Into<String>, script: &[u8]) -> Result<Self> {
        Self::builder(name).build(script)
    }

    pub fn builder(name: impl Into<String>) -> SensorBuilder {
        SensorBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: String,
        script: ScriptHandle,
        store: Arc<dyn ScriptStore>,
        executor: Arc<dyn Executor>,
        generator: Box<dyn RateGenerator>,
        capacity: usize,
        policy: FailurePolicy,
    ) -> Self {
        let (sender, receiver) = async_channel::bounded(capacity);
        Self {
            name,
            script,
            store,
            executor,
            generator: Mutex::new(Some(generator)),
            sender,
            receiver,
            token: CancellationToken::new(),
            policy,
            stats: SensorStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script(&self) -> &ScriptHandle {
        &self.script
    }

    /// Read the stored script back through the sensor's store.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::ScriptStorage`] if the script cannot be read,
    /// for instance after [`Sensor::stop`] removed it.
    pub fn script_source(&self) -> Result<Vec<u8>> {
        self.store
            .load(&self.script)
            .map_err(|source| SensorError::script_storage(self.name.as_str(), source))
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Consumer handle on the output queue.
    ///
    /// Receivers are cheap to clone; each sample is delivered to exactly one
    /// of them. After [`Sensor::stop`], `recv` returns the buffered samples
    /// and then an error instead of waiting.
    pub fn receiver(&self) -> Receiver<Data> {
        self.receiver.clone()
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(usize::MAX)
    }

    /// Samples currently waiting in the queue.
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn info(&self) -> SensorInfo {
        SensorInfo {
            name: self.name.clone(),
            script: self.script.clone(),
            capacity: self.capacity(),
            queued: self.len(),
            stopped: self.is_stopped(),
            stats: self.stats(),
        }
    }

    /// Run the generation loop until the sensor is stopped.
    ///
    /// Returns immediately with `Ok(())` when the sensor was already stopped.
    ///
    /// # Errors
    ///
    /// - [`SensorError::AlreadyStarted`] if a previous call took the generator.
    /// - [`SensorError::Invocation`] for an unclassified invocation failure
    ///   under [`FailurePolicy::Escalate`].
    pub async fn run(&self) -> Result<()> {
        if self.token.is_cancelled() {
            debug!(sensor = %self.name, "run requested on a stopped sensor");
            return Ok(());
        }

        let generator = self
            .generator
            .lock()
            .take()
            .ok_or_else(|| SensorError::AlreadyStarted {
                name: self.name.clone(),
            })?;

        info!(
            sensor = %self.name,
            timeslot = ?generator.timeslot(),
            capacity = self.capacity(),
            "sensor started"
        );

        let mut ticks = generator.generate();
        let mut clock = MonotonicClock::new();

        loop {
            let count = tokio::select! {
                biased;
                () = self.token.cancelled() => break,
                tick = ticks.next() => match tick {
                    Some(count) => count,
                    None => {
                        warn!(sensor = %self.name, "rate generator ended");
                        break;
                    }
                },
            };

            self.stats.record_tick();
            debug!(sensor = %self.name, count, "tick");

            if let Burst::QueueClosed = self.burst(count, &mut clock).await? {
                break;
            }
        }

        info!(sensor = %self.name, stats = ?self.stats(), "sensor run loop finished");
        Ok(())
    }

    /// Run the sensor on its own tokio task.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<Result<()>> {
        let sensor = Arc::clone(self);
        tokio::spawn(async move { sensor.run().await })
    }

    /// Cancel the run loop, close the output queue and remove the stored
    /// script. A failed removal is logged and does not fail the stop.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::AlreadyStopped`] on every call after the first;
    /// those calls change nothing.
    pub fn stop(&self) -> Result<()> {
        if !self.token.cancel() {
            warn!(sensor = %self.name, "stop requested twice");
            return Err(SensorError::AlreadyStopped {
                name: self.name.clone(),
            });
        }

        self.sender.close();

        if let Err(source) = self.store.remove(&self.script) {
            error!(
                sensor = %self.name,
                script = %self.script.location().display(),
                error = %source,
                "failed to remove script"
            );
        }

        info!(sensor = %self.name, queued = self.len(), "sensor stopped");
        Ok(())
    }
}
