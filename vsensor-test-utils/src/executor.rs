// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vsensor::{Executor, ScriptHandle};
use vsensor_core::InvocationError;

/// What one scripted invocation returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Successful invocation printing this value
    Value(Value),
    /// `{"n": k}` where `k` is the 1-based invocation number
    Counter,
    /// Nonzero exit with a diagnostic
    Exit { status: i32, stderr: String },
    /// Successful exit with output that is not JSON
    Malformed(String),
    /// Interpreter could not be started
    SpawnFailure,
    /// Invocation exceeded its time limit
    Timeout,
}

impl Outcome {
    pub fn exit(status: i32, stderr: impl Into<String>) -> Self {
        Self::Exit {
            status,
            stderr: stderr.into(),
        }
    }

    fn resolve(self, invocation: usize) -> Result<Value, InvocationError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Counter => Ok(json!({ "n": invocation })),
            Self::Exit { status, stderr } => Err(InvocationError::Exit {
                status: Some(status),
                stderr,
            }),
            Self::Malformed(output) => match serde_json::from_str::<Value>(&output) {
                Ok(value) => Ok(value),
                Err(source) => Err(InvocationError::parse(source, output.as_bytes())),
            },
            Self::SpawnFailure => Err(InvocationError::Spawn {
                program: "scripted".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "interpreter missing"),
            }),
            Self::Timeout => Err(InvocationError::TimedOut {
                after: Duration::from_secs(1),
            }),
        }
    }
}

#[derive(Debug)]
struct State {
    queue: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    invocations: AtomicUsize,
    scripts: Mutex<Vec<ScriptHandle>>,
}

/// Executor replaying a fixed list of outcomes, then repeating a fallback.
///
/// Clones share the outcome queue and the invocation counter, so a test can
/// hand one clone to the sensor and inspect another.
#[derive(Debug, Clone)]
pub struct ScriptedExecutor {
    state: Arc<State>,
    delay: Option<Duration>,
}

impl ScriptedExecutor {
    pub fn always(outcome: Outcome) -> Self {
        Self::sequence(Vec::new(), outcome)
    }

    pub fn sequence(outcomes: Vec<Outcome>, fallback: Outcome) -> Self {
        Self {
            state: Arc::new(State {
                queue: Mutex::new(outcomes.into()),
                fallback,
                invocations: AtomicUsize::new(0),
                scripts: Mutex::new(Vec::new()),
            }),
            delay: None,
        }
    }

    /// Every invocation takes `delay` (tokio time, so paused tests stay fast).
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn invocations(&self) -> usize {
        self.state.invocations.load(Ordering::SeqCst)
    }

    /// Handles passed to `invoke`, in call order.
    pub fn scripts(&self) -> Vec<ScriptHandle> {
        self.state.scripts.lock().clone()
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn invoke(&self, script: &ScriptHandle) -> Result<Value, InvocationError> {
        let invocation = self.state.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.scripts.lock().push(script.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .state
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.state.fallback.clone());
        outcome.resolve(invocation)
    }
}
