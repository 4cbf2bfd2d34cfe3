// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fakes for virtual sensors.
//!
//! This crate provides deterministic stand-ins for a sensor's collaborators.
//! It is designed for use in development and testing only, not for
//! production code.
//!
//! # Key Types
//!
//! - [`MemoryStore`] / [`FailingStore`] - script storage without a filesystem
//! - [`ScriptedExecutor`] - replays [`Outcome`]s and counts invocations
//! - [`tick_channel`] - a rate generator whose ticks the test sends by hand
//! - [`LogCapture`] - records `tracing` events for assertions
//!
//! # Example
//!
//! ```rust
//! use vsensor::Sensor;
//! use vsensor_test_utils::{reading, tick_channel, MemoryStore, Outcome, ScriptedExecutor};
//!
//! # fn main() -> vsensor::Result<()> {
//! let (ticks, generator) = tick_channel();
//! let executor = ScriptedExecutor::always(Outcome::Value(reading(1)));
//!
//! let sensor = Sensor::builder("fake")
//!     .with_store(MemoryStore::new())
//!     .with_executor(executor.clone())
//!     .with_generator(generator)
//!     .build(b"ignored")?;
//!
//! ticks.send(2).unwrap();
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod executor;
pub mod generator;
pub mod helpers;
pub mod log_capture;
pub mod store;

pub use executor::{Outcome, ScriptedExecutor};
pub use generator::{tick_channel, ChannelGenerator};
pub use helpers::{assert_no_element_emitted, drain, init_tracing, reading, recv_within};
pub use log_capture::{CapturedEvent, LogCapture};
pub use store::{FailingStore, MemoryStore};
