// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::error::Error;
use std::io;
use std::time::Duration;
use vsensor_core::{InvocationError, SensorError};

#[test]
fn test_exit_error_carries_diagnostic() {
    let error = InvocationError::Exit {
        status: Some(1),
        stderr: "offline".to_string(),
    };

    assert_eq!(error.to_string(), "script exited with status 1: offline");
    assert!(error.is_classified());
}

#[test]
fn test_exit_by_signal_display() {
    let error = InvocationError::Exit {
        status: None,
        stderr: String::new(),
    };

    assert!(error.to_string().contains("a signal"));
}

#[test]
fn test_parse_error_keeps_output() {
    let source = serde_json::from_slice::<serde_json::Value>(b"not json").unwrap_err();
    let error = InvocationError::parse(source, b"not json");

    assert!(error.is_classified());
    match error {
        InvocationError::Parse { output, .. } => assert_eq!(output, "not json"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_spawn_and_timeout_are_unclassified() {
    let spawn = InvocationError::Spawn {
        program: "runtime.py".to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "missing"),
    };
    let timeout = InvocationError::TimedOut {
        after: Duration::from_secs(2),
    };

    assert!(!spawn.is_classified());
    assert!(!timeout.is_classified());
    assert!(spawn.to_string().contains("runtime.py"));
}

#[test]
fn test_script_storage_error_exposes_source() {
    let error = SensorError::script_storage(
        "thermo",
        io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
    );

    assert!(error.to_string().contains("thermo"));
    assert!(error.source().is_some());
    assert!(!error.is_lifecycle());
}

#[test]
fn test_invocation_error_chains_source() {
    let error = SensorError::invocation(
        "thermo",
        InvocationError::TimedOut {
            after: Duration::from_millis(5),
        },
    );

    let source = error.source().expect("source");
    assert!(source.to_string().contains("timed out"));
}

#[test]
fn test_lifecycle_errors() {
    let running = SensorError::AlreadyStarted {
        name: "a".to_string(),
    };
    let stopped = SensorError::AlreadyStopped {
        name: "a".to_string(),
    };

    assert!(running.is_lifecycle());
    assert!(stopped.is_lifecycle());
    assert!(!SensorError::config("bad").is_lifecycle());
}
