// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for virtual sensors.
//!
//! [`SensorError`] is what sensor operations return to their caller.
//! [`InvocationError`] describes a single failed script invocation; the run
//! loop recovers from most of them locally and only surfaces one through
//! [`SensorError::Invocation`] when the sensor is configured to escalate.
//!
//! # Examples
//!
//! ```
//! use vsensor_core::{Result, SensorError};
//!
//! fn validate(capacity: usize) -> Result<()> {
//!     if capacity == 0 {
//!         return Err(SensorError::config("capacity must be at least 1"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate(0).is_err());
//! ```

use std::time::Duration;

/// Root error type for sensor operations.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// The user script could not be persisted while creating the sensor.
    #[error("failed to store script for sensor `{name}`: {source}")]
    ScriptStorage {
        /// Sensor being created
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// `run` was called after a run loop already took the generator.
    #[error("sensor `{name}` has already been started")]
    AlreadyStarted {
        /// Sensor name
        name: String,
    },

    /// `stop` was called more than once.
    #[error("sensor `{name}` has already been stopped")]
    AlreadyStopped {
        /// Sensor name
        name: String,
    },

    /// An unclassified invocation failure escalated out of the run loop.
    #[error("sensor `{name}` invocation failed: {source}")]
    Invocation {
        /// Sensor name
        name: String,
        #[source]
        source: InvocationError,
    },

    /// Configuration rejected during validation or parsing.
    #[error("invalid sensor configuration: {context}")]
    Config {
        /// What was wrong
        context: String,
    },
}

impl SensorError {
    /// Create a configuration error with the given context
    pub fn config(context: impl Into<String>) -> Self {
        Self::Config {
            context: context.into(),
        }
    }

    /// Wrap a failed script write
    pub fn script_storage(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::ScriptStorage {
            name: name.into(),
            source,
        }
    }

    /// Wrap an escalated invocation failure
    pub fn invocation(name: impl Into<String>, source: InvocationError) -> Self {
        Self::Invocation {
            name: name.into(),
            source,
        }
    }

    /// Lifecycle misuse (second run, second stop) as opposed to an I/O or
    /// configuration problem.
    #[must_use]
    pub const fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::AlreadyStarted { .. } | Self::AlreadyStopped { .. }
        )
    }
}

/// A single failed invocation of the external computation.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The script ran and exited unsuccessfully.
    #[error("script exited with {}: {stderr}", exit_label(.status))]
    Exit {
        /// Exit code, `None` when terminated by a signal
        status: Option<i32>,
        /// Diagnostic output captured from stderr
        stderr: String,
    },

    /// The script succeeded but stdout was not a single JSON value.
    #[error("script output is not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        /// Raw stdout, lossily decoded
        output: String,
    },

    /// The interpreter could not be started or waited on.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// Program that was spawned
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The invocation exceeded the configured time limit.
    #[error("script timed out after {after:?}")]
    TimedOut {
        /// Limit that was exceeded
        after: Duration,
    },
}

impl InvocationError {
    /// Wrap a JSON decoding failure together with the offending output
    pub fn parse(source: serde_json::Error, output: &[u8]) -> Self {
        Self::Parse {
            source,
            output: String::from_utf8_lossy(output).into_owned(),
        }
    }

    /// Failures with a diagnosable cause: a nonzero exit or malformed output.
    ///
    /// These are always skipped by the run loop. Everything else is subject to
    /// the sensor's failure policy.
    #[must_use]
    pub const fn is_classified(&self) -> bool {
        matches!(self, Self::Exit { .. } | Self::Parse { .. })
    }
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Specialized Result type for sensor operations
pub type Result<T> = std::result::Result<T, SensorError>;
