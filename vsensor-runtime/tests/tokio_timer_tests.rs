// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;
use vsensor_runtime::{Timer, TokioTimer};

#[tokio::test(start_paused = true)]
async fn test_sleep_future_advances_paused_clock() {
    let timer = TokioTimer;
    let start = timer.now();

    timer.sleep_future(Duration::from_secs(1)).await;

    assert_eq!(timer.now() - start, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_until_future_deadline() {
    let timer = TokioTimer;
    let deadline = timer.now() + Duration::from_millis(300);

    assert_eq!(timer.until(deadline), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_until_past_deadline_is_zero() {
    let timer = TokioTimer;
    let deadline = timer.now();

    tokio::time::advance(Duration::from_millis(50)).await;

    assert_eq!(timer.until(deadline), Duration::ZERO);
}
