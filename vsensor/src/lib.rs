// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # vsensor
//!
//! Virtual sensors: entities that periodically run a user-supplied script to
//! synthesize timestamped samples and hand them to a consumer through a
//! bounded queue.
//!
//! ## Overview
//!
//! - [`Sensor`] owns a rate generator, a bounded output queue and a
//!   cancellation token. [`Sensor::run`] paces itself on the generator's ticks
//!   and invokes the script once per unit of each tick's count.
//! - [`ScriptStore`] persists the script; [`TempDirStore`] is the default.
//! - [`Executor`] runs one invocation; [`ProcessExecutor`] spawns the
//!   configured interpreter with the script path as its only argument.
//! - [`SensorConfig`] gathers the tunables and can be read from JSON or the
//!   environment.
//!
//! Failed invocations never stop a sensor: they are logged through `tracing`
//! and the sample is skipped. Only [`Sensor::stop`] ends the run loop (or an
//! unclassified failure under [`FailurePolicy::Escalate`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vsensor::Sensor;
//!
//! #[tokio::main]
//! async fn main() -> vsensor::Result<()> {
//!     let sensor = Arc::new(Sensor::create("thermometer", b"print('{\"v\": 1}')")?);
//!     let samples = sensor.receiver();
//!     let handle = sensor.spawn();
//!
//!     if let Ok(data) = samples.recv().await {
//!         println!("{data}");
//!     }
//!
//!     sensor.stop()?;
//!     let _ = handle.await;
//!     Ok(())
//! }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

pub mod config;
pub mod executor;
pub mod sensor;
pub mod stats;
pub mod storage;

pub use config::{FailurePolicy, SensorConfig};
pub use executor::{Executor, ProcessExecutor, DEFAULT_INTERPRETER};
pub use sensor::{Sensor, SensorBuilder, SensorInfo, DEFAULT_CAPACITY};
pub use stats::{SensorStats, StatsSnapshot};
pub use storage::{ScriptHandle, ScriptStore, TempDirStore};

pub use vsensor_core::{CancellationToken, Data, InvocationError, Result, SensorError};
pub use vsensor_generator::{
    ConstantGenerator, RateGenerator, SlotGenerator, TickStream, UniformGenerator,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Data, Executor, FailurePolicy, RateGenerator, ScriptStore, Sensor, SensorConfig,
        SensorError,
    };
}
