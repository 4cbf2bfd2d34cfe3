// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Invocation of the external computation.

use crate::storage::ScriptHandle;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use vsensor_core::InvocationError;

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "runtime.py";

/// Runs a stored script once and decodes its result.
#[async_trait]
pub trait Executor: Send + Sync + Debug {
    /// # Errors
    ///
    /// Returns an [`InvocationError`] describing why no value was produced.
    async fn invoke(&self, script: &ScriptHandle) -> Result<Value, InvocationError>;
}

/// Spawns `interpreter <script path>` and parses stdout as one JSON value.
///
/// A nonzero exit becomes [`InvocationError::Exit`] carrying stderr. The child
/// is killed if the invocation future is dropped, which is what makes the
/// optional timeout effective.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    interpreter: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new(interpreter: impl AsRef<Path>) -> Self {
        Self {
            interpreter: interpreter.as_ref().to_path_buf(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn spawn_error(&self, source: std::io::Error) -> InvocationError {
        InvocationError::Spawn {
            program: self.interpreter.display().to_string(),
            source,
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn invoke(&self, script: &ScriptHandle) -> Result<Value, InvocationError> {
        let mut command = Command::new(&self.interpreter);
        command
            .arg(script.location())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| InvocationError::TimedOut { after: limit })?,
            None => command.output().await,
        }
        .map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(InvocationError::Exit {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|source| InvocationError::parse(source, &output.stdout))
    }
}
