// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sensor configuration.
//!
//! Every field has a default, so a config can be built from `Default`, from a
//! partial JSON document, or from `VSENSOR_*` environment variables.

use crate::executor::{ProcessExecutor, DEFAULT_INTERPRETER};
use crate::sensor::DEFAULT_CAPACITY;
use crate::storage::TempDirStore;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use vsensor_core::{Result, SensorError};
use vsensor_generator::{SlotGenerator, UniformCount, UniformGenerator, DEFAULT_COUNT_RANGE};

/// How the run loop treats invocation failures that are neither a nonzero
/// exit nor malformed output (spawn errors, timeouts).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and skip the sample, like any other failed invocation.
    #[default]
    Skip,
    /// Return the failure from `Sensor::run`, ending the run loop.
    Escalate,
}

impl FromStr for FailurePolicy {
    type Err = SensorError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "escalate" => Ok(Self::Escalate),
            other => Err(SensorError::config(format!(
                "unknown failure policy `{other}` (expected `skip` or `escalate`)"
            ))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Escalate => f.write_str("escalate"),
        }
    }
}

/// Tunables for one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Output queue capacity
    pub capacity: usize,
    /// Timeslot length in milliseconds
    pub timeslot_ms: u64,
    /// Smallest per-slot count of the default uniform generator
    pub min_count: u32,
    /// Largest per-slot count of the default uniform generator
    pub max_count: u32,
    /// Fixed seed for reproducible counts
    pub seed: Option<u64>,
    /// Program invoked with the script path as its only argument
    pub interpreter: PathBuf,
    /// Per-invocation time limit in milliseconds, unlimited when absent
    pub invocation_timeout_ms: Option<u64>,
    /// Handling of spawn failures and timeouts; other failures are always skipped
    pub failure_policy: FailurePolicy,
    /// Directory holding stored scripts, the system temp dir when absent
    pub script_dir: Option<PathBuf>,
    /// Give every sensor its own script file even when names collide
    pub isolate_scripts: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timeslot_ms: 1000,
            min_count: *DEFAULT_COUNT_RANGE.start(),
            max_count: *DEFAULT_COUNT_RANGE.end(),
            seed: None,
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            invocation_timeout_ms: None,
            failure_policy: FailurePolicy::Skip,
            script_dir: None,
            isolate_scripts: true,
        }
    }
}

impl SensorConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] on malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|error| SensorError::config(format!("malformed config: {error}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `VSENSOR_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] when a variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, using the same keys
    /// as [`SensorConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] when a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("VSENSOR_CAPACITY") {
            config.capacity = parse_var("VSENSOR_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("VSENSOR_TIMESLOT_MS") {
            config.timeslot_ms = parse_var("VSENSOR_TIMESLOT_MS", &value)?;
        }
        if let Some(value) = lookup("VSENSOR_MIN_COUNT") {
            config.min_count = parse_var("VSENSOR_MIN_COUNT", &value)?;
        }
        if let Some(value) = lookup("VSENSOR_MAX_COUNT") {
            config.max_count = parse_var("VSENSOR_MAX_COUNT", &value)?;
        }
        if let Some(value) = lookup("VSENSOR_SEED") {
            config.seed = Some(parse_var("VSENSOR_SEED", &value)?);
        }
        if let Some(value) = lookup("VSENSOR_INTERPRETER") {
            config.interpreter = PathBuf::from(value);
        }
        if let Some(value) = lookup("VSENSOR_TIMEOUT_MS") {
            config.invocation_timeout_ms = Some(parse_var("VSENSOR_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = lookup("VSENSOR_FAILURE_POLICY") {
            config.failure_policy = value.parse()?;
        }
        if let Some(value) = lookup("VSENSOR_SCRIPT_DIR") {
            config.script_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("VSENSOR_ISOLATE_SCRIPTS") {
            config.isolate_scripts = parse_var("VSENSOR_ISOLATE_SCRIPTS", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`SensorError::Config`] for a zero capacity, a zero timeslot,
    /// a zero timeout or an empty count range.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SensorError::config("capacity must be at least 1"));
        }
        if self.timeslot_ms == 0 {
            return Err(SensorError::config("timeslot_ms must be greater than zero"));
        }
        if self.min_count > self.max_count {
            return Err(SensorError::config(format!(
                "min_count {} exceeds max_count {}",
                self.min_count, self.max_count
            )));
        }
        if self.invocation_timeout_ms == Some(0) {
            return Err(SensorError::config(
                "invocation_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn timeslot(&self) -> Duration {
        Duration::from_millis(self.timeslot_ms)
    }

    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_ms.map(Duration::from_millis)
    }

    /// Default generator for this config: uniform counts per timeslot.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Config`] for a zero timeslot or an empty range.
    pub fn generator(&self) -> Result<UniformGenerator> {
        let range = self.min_count..=self.max_count;
        let counts = match self.seed {
            Some(seed) => UniformCount::seeded(range, seed)?,
            None => UniformCount::new(range)?,
        };
        SlotGenerator::new(self.timeslot(), counts)
    }

    pub fn executor(&self) -> ProcessExecutor {
        let executor = ProcessExecutor::new(&self.interpreter);
        match self.invocation_timeout() {
            Some(limit) => executor.with_timeout(limit),
            None => executor,
        }
    }

    pub fn store(&self) -> TempDirStore {
        let store = match &self.script_dir {
            Some(dir) => TempDirStore::in_dir(dir),
            None => TempDirStore::new(),
        };
        store.isolated(self.isolate_scripts)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|error| SensorError::config(format!("{key}={value}: {error}")))
}
