// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use vsensor::{ConstantGenerator, FailurePolicy, InvocationError, Sensor, SensorError};
use vsensor_test_utils::{
    drain, init_tracing, reading, tick_channel, MemoryStore, Outcome, ScriptedExecutor,
};

fn sensor_with(
    executor: &ScriptedExecutor,
    generator: impl vsensor::RateGenerator + 'static,
) -> anyhow::Result<Arc<Sensor>> {
    let sensor = Sensor::builder("run-loop")
        .with_store(MemoryStore::new())
        .with_executor(executor.clone())
        .with_generator(generator)
        .build(b"print('{}')")?;
    Ok(Arc::new(sensor))
}

// Lets the spawned run loop drain all ready work under a paused clock.
async fn settle() {
    sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn test_each_tick_triggers_exactly_count_invocations() -> anyhow::Result<()> {
    // Arrange
    init_tracing();
    let executor = ScriptedExecutor::always(Outcome::Value(reading(1)));
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;
    let handle = sensor.spawn();

    // Act & Assert
    ticks.send(3)?;
    settle().await;
    assert_eq!(executor.invocations(), 3);
    assert_eq!(sensor.stats().ticks, 1);

    ticks.send(0)?;
    settle().await;
    assert_eq!(executor.invocations(), 3);
    assert_eq!(sensor.stats().ticks, 2);

    ticks.send(2)?;
    settle().await;
    assert_eq!(executor.invocations(), 5);
    assert_eq!(sensor.len(), 5);

    sensor.stop()?;
    handle.await??;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_scenario_a_two_per_slot_for_three_slots() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::always(Outcome::Value(reading(1)));
    let generator = ConstantGenerator::constant(Duration::from_secs(1), 2)?;
    let sensor = sensor_with(&executor, generator)?;
    let receiver = sensor.receiver();

    // Act
    let handle = sensor.spawn();
    sleep(Duration::from_millis(3500)).await;

    // Assert
    let samples = drain(&receiver);
    assert_eq!(samples.len(), 6);
    assert!(samples.iter().all(|data| data.value["v"] == 1));
    assert_eq!(sensor.stats().ticks, 3);

    sensor.stop()?;
    handle.await??;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_scenario_b_failing_script_never_enqueues() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::always(Outcome::exit(1, "offline"));
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;
    let handle = sensor.spawn();

    // Act
    for count in [2, 3, 1] {
        ticks.send(count)?;
    }
    settle().await;

    // Assert
    let stats = sensor.stats();
    assert_eq!(sensor.len(), 0);
    assert_eq!(stats.invocations, 6);
    assert_eq!(stats.failures, 6);
    assert_eq!(stats.produced, 0);
    assert!(!handle.is_finished());

    sensor.stop()?;
    handle.await??;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_scenario_c_full_queue_blocks_producer() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::always(Outcome::Counter);
    let (ticks, generator) = tick_channel();
    let sensor = Arc::new(
        Sensor::builder("bounded")
            .with_store(MemoryStore::new())
            .with_executor(executor.clone())
            .with_generator(generator)
            .with_capacity(2)
            .build(b"")?,
    );
    let receiver = sensor.receiver();
    let handle = sensor.spawn();

    // Act
    ticks.send(5)?;
    settle().await;

    // Assert: two queued, the third sample waits for room
    assert_eq!(sensor.len(), 2);
    assert_eq!(executor.invocations(), 3);
    assert_eq!(sensor.stats().produced, 2);

    let first = receiver.recv().await?;
    assert_eq!(first.value["n"], 1);
    settle().await;

    assert_eq!(sensor.len(), 2);
    assert_eq!(executor.invocations(), 4);
    assert_eq!(sensor.stats().produced, 3);

    sensor.stop()?;
    handle.await??;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_scenario_d_stop_between_ticks() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::always(Outcome::Value(reading(7)));
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;
    let receiver = sensor.receiver();
    let handle = sensor.spawn();
    ticks.send(1)?;
    settle().await;

    // Act
    sensor.stop()?;

    // Assert
    tokio::time::timeout(Duration::from_millis(1), handle).await???;
    assert_eq!(receiver.recv().await?.value, reading(7));
    assert!(receiver.recv().await.is_err());
    assert!(receiver.is_closed());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_waits_for_whole_burst() -> anyhow::Result<()> {
    // Arrange: failing invocations never touch the queue, so only the
    // cancellation token can end the loop.
    let executor =
        ScriptedExecutor::always(Outcome::exit(2, "busy")).with_delay(Duration::from_millis(100));
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;
    let handle = sensor.spawn();
    ticks.send(3)?;
    ticks.send(3)?;

    // Act: stop while the second invocation of the first tick is in flight
    sleep(Duration::from_millis(150)).await;
    sensor.stop()?;
    handle.await??;

    // Assert: the first tick finished, the queued second tick never started
    assert_eq!(executor.invocations(), 3);
    assert_eq!(sensor.stats().ticks, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_mid_burst_drops_remaining_samples() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::always(Outcome::Counter).with_delay(Duration::from_millis(100));
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;
    let receiver = sensor.receiver();
    let handle = sensor.spawn();
    ticks.send(4)?;

    // Act
    sleep(Duration::from_millis(150)).await;
    sensor.stop()?;
    handle.await??;

    // Assert: the in-flight invocation finished but could not be enqueued
    assert_eq!(executor.invocations(), 2);
    let samples = drain(&receiver);
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].value["n"], 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_malformed_output_is_skipped() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::sequence(
        vec![
            Outcome::Value(reading(1)),
            Outcome::Malformed("temperature: 21".to_string()),
            Outcome::exit(1, "sensor offline"),
        ],
        Outcome::Value(reading(4)),
    );
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;
    let receiver = sensor.receiver();
    let handle = sensor.spawn();

    // Act
    ticks.send(4)?;
    settle().await;

    // Assert
    let values: Vec<_> = drain(&receiver).into_iter().map(|data| data.value).collect();
    assert_eq!(values, vec![reading(1), reading(4)]);
    assert_eq!(sensor.stats().failures, 2);

    sensor.stop()?;
    handle.await??;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_skip_policy_survives_unclassified_failures() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::sequence(
        vec![Outcome::SpawnFailure, Outcome::Timeout],
        Outcome::Value(reading(3)),
    );
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;
    assert_eq!(sensor.failure_policy(), FailurePolicy::Skip);
    let handle = sensor.spawn();

    // Act
    ticks.send(3)?;
    settle().await;

    // Assert
    assert!(!handle.is_finished());
    assert_eq!(sensor.len(), 1);
    assert_eq!(sensor.stats().failures, 2);

    sensor.stop()?;
    handle.await??;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_escalate_policy_surfaces_unclassified_failure() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::sequence(
        vec![Outcome::exit(1, "offline"), Outcome::SpawnFailure],
        Outcome::Value(reading(1)),
    );
    let (ticks, generator) = tick_channel();
    let sensor = Arc::new(
        Sensor::builder("strict")
            .with_store(MemoryStore::new())
            .with_executor(executor.clone())
            .with_generator(generator)
            .with_failure_policy(FailurePolicy::Escalate)
            .build(b"")?,
    );
    let handle = sensor.spawn();

    // Act
    ticks.send(5)?;
    let result = handle.await?;

    // Assert: the classified exit was skipped, the spawn failure escalated
    match result {
        Err(SensorError::Invocation { name, source }) => {
            assert_eq!(name, "strict");
            assert!(!source.is_classified());
        }
        other => panic!("expected escalated invocation error, got {other:?}"),
    }
    assert_eq!(executor.invocations(), 2);
    assert!(!sensor.is_stopped());
    sensor.stop()?;
    Ok(())
}

fn strict_sensor(
    executor: &ScriptedExecutor,
    generator: impl vsensor::RateGenerator + 'static,
) -> anyhow::Result<Arc<Sensor>> {
    Ok(Arc::new(
        Sensor::builder("strict")
            .with_store(MemoryStore::new())
            .with_executor(executor.clone())
            .with_generator(generator)
            .with_failure_policy(FailurePolicy::Escalate)
            .build(b"")?,
    ))
}

#[tokio::test(start_paused = true)]
async fn test_escalate_policy_surfaces_timeout() -> anyhow::Result<()> {
    // Arrange
    let executor =
        ScriptedExecutor::sequence(vec![Outcome::Timeout], Outcome::Value(reading(1)));
    let (ticks, generator) = tick_channel();
    let sensor = strict_sensor(&executor, generator)?;
    let handle = sensor.spawn();

    // Act
    ticks.send(3)?;
    let result = handle.await?;

    // Assert
    match result {
        Err(SensorError::Invocation { name, source }) => {
            assert_eq!(name, "strict");
            assert!(matches!(source, InvocationError::TimedOut { .. }));
        }
        other => panic!("expected escalated timeout, got {other:?}"),
    }
    assert_eq!(executor.invocations(), 1);
    assert_eq!(sensor.len(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_escalate_policy_still_skips_malformed_output() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::sequence(
        vec![
            Outcome::Malformed("temperature: 21".to_string()),
            Outcome::Malformed("{\"v\":".to_string()),
        ],
        Outcome::Value(reading(2)),
    );
    let (ticks, generator) = tick_channel();
    let sensor = strict_sensor(&executor, generator)?;
    let handle = sensor.spawn();

    // Act
    ticks.send(3)?;
    settle().await;

    // Assert
    assert!(!handle.is_finished());
    assert_eq!(executor.invocations(), 3);
    assert_eq!(sensor.stats().failures, 2);
    let values: Vec<_> = drain(&sensor.receiver())
        .into_iter()
        .map(|data| data.value)
        .collect();
    assert_eq!(values, vec![reading(2)]);

    sensor.stop()?;
    handle.await??;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_samples_keep_invocation_order_and_time() -> anyhow::Result<()> {
    // Arrange
    let executor = ScriptedExecutor::always(Outcome::Counter).with_delay(Duration::from_millis(5));
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;
    let receiver = sensor.receiver();
    let handle = sensor.spawn();

    // Act
    ticks.send(3)?;
    ticks.send(4)?;
    sleep(Duration::from_millis(100)).await;

    // Assert
    let samples = drain(&receiver);
    let order: Vec<_> = samples.iter().map(|data| data.value["n"].clone()).collect();
    assert_eq!(order, (1..=7).map(serde_json::Value::from).collect::<Vec<_>>());
    assert!(samples.windows(2).all(|pair| pair[0].time <= pair[1].time));

    sensor.stop()?;
    handle.await??;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_generator_end_finishes_run() -> anyhow::Result<()> {
    let executor = ScriptedExecutor::always(Outcome::Value(reading(1)));
    let (ticks, generator) = tick_channel();
    let sensor = sensor_with(&executor, generator)?;

    ticks.send(1)?;
    drop(ticks);
    sensor.run().await?;

    assert_eq!(sensor.len(), 1);
    assert!(!sensor.is_stopped());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_sensors_run_independently() -> anyhow::Result<()> {
    // Arrange
    let fast = ScriptedExecutor::always(Outcome::Value(reading(1)));
    let broken = ScriptedExecutor::always(Outcome::exit(1, "offline"));
    let (fast_ticks, fast_generator) = tick_channel();
    let (broken_ticks, broken_generator) = tick_channel();
    let first = sensor_with(&fast, fast_generator)?;
    let second = sensor_with(&broken, broken_generator)?;
    let handles = [first.spawn(), second.spawn()];

    // Act
    fast_ticks.send(2)?;
    broken_ticks.send(2)?;
    settle().await;
    first.stop()?;

    // Assert
    broken_ticks.send(1)?;
    settle().await;
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 0);
    assert_eq!(broken.invocations(), 3);
    assert!(!second.is_stopped());

    second.stop()?;
    for handle in handles {
        handle.await??;
    }
    Ok(())
}
