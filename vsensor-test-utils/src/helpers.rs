// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_channel::Receiver;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;
use vsensor::Data;

/// The `{"v": value}` reading used across tests.
pub fn reading(value: i64) -> Value {
    json!({ "v": value })
}

/// Installs a test-writer subscriber honouring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn assert_no_element_emitted(receiver: &Receiver<Data>, timeout_ms: u64) {
    tokio::select! {
        received = receiver.recv() => {
            panic!("Unexpected sample emitted, expected no output: {received:?}");
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {
        }
    }
}

/// Next sample, or `None` if nothing arrives within `timeout_ms` or the queue
/// is closed and empty.
pub async fn recv_within(receiver: &Receiver<Data>, timeout_ms: u64) -> Option<Data> {
    tokio::select! {
        received = receiver.recv() => received.ok(),
        _ = sleep(Duration::from_millis(timeout_ms)) => None,
    }
}

/// Everything currently buffered, without waiting.
pub fn drain(receiver: &Receiver<Data>) -> Vec<Data> {
    std::iter::from_fn(|| receiver.try_recv().ok()).collect()
}
