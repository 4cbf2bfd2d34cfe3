// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::Sensor;
use crate::config::{FailurePolicy, SensorConfig};
use crate::executor::Executor;
use crate::storage::ScriptStore;
use std::sync::Arc;
use tracing::debug;
use vsensor_core::{Result, SensorError};
use vsensor_generator::RateGenerator;

/// Builder for [`Sensor`] with fluent API.
///
/// Collaborators that are not injected are derived from the config: a
/// [`TempDirStore`](crate::TempDirStore), a
/// [`ProcessExecutor`](crate::ProcessExecutor) and a uniform generator.
#[derive(Debug)]
pub struct SensorBuilder {
    name: String,
    config: SensorConfig,
    store: Option<Arc<dyn ScriptStore>>,
    executor: Option<Arc<dyn Executor>>,
    generator: Option<Box<dyn RateGenerator>>,
}

impl SensorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: SensorConfig::default(),
            store: None,
            executor: None,
            generator: None,
        }
    }

    pub fn with_config(mut self, config: SensorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn with_store(mut self, store: impl ScriptStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn with_executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn with_generator(mut self, generator: impl RateGenerator + 'static) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    /// Validate the config, persist the script and assemble the sensor.
    ///
    /// # Errors
    ///
    /// - [`SensorError::Config`] for an invalid configuration.
    /// - [`SensorError::ScriptStorage`] if the script cannot be written.
    pub fn build(self, script: &[u8]) -> Result<Sensor> {
        let Self {
            name,
            config,
            store,
            executor,
            generator,
        } = self;

        config.validate()?;

        let generator: Box<dyn RateGenerator> = match generator {
            Some(generator) => generator,
            None => Box::new(config.generator()?),
        };
        let executor: Arc<dyn Executor> = match executor {
            Some(executor) => executor,
            None => Arc::new(config.executor()),
        };
        let store: Arc<dyn ScriptStore> = match store {
            Some(store) => store,
            None => Arc::new(config.store()),
        };

        let handle = store
            .store(&name, script)
            .map_err(|source| SensorError::script_storage(name.as_str(), source))?;

        debug!(
            sensor = %name,
            script = %handle.location().display(),
            capacity = config.capacity,
            policy = %config.failure_policy,
            "sensor created"
        );

        Ok(Sensor::from_parts(
            name,
            handle,
            store,
            executor,
            generator,
            config.capacity,
            config.failure_policy,
        ))
    }
}
