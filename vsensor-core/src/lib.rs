// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core types shared by every virtual sensor crate.
//!
//! - [`Data`] - a sensor-timestamped JSON value produced by one script invocation
//! - [`SensorError`] / [`InvocationError`] - the error taxonomy
//! - [`CancellationToken`] - one-shot, idempotent shutdown signal
//! - [`MonotonicClock`] - wall clock that never goes backwards for one producer

pub mod cancellation_token;
pub mod clock;
pub mod data;
pub mod error;

pub use cancellation_token::{CancellationToken, Cancelled};
pub use clock::MonotonicClock;
pub use data::Data;
pub use error::{InvocationError, Result, SensorError};
