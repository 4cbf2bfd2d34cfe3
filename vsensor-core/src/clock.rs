// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::{DateTime, Utc};

/// Wall clock whose readings never decrease.
///
/// The system clock can step backwards (NTP corrections, manual changes).
/// A sensor stamps its samples through one `MonotonicClock` so the timestamps
/// in its queue stay non-decreasing in enqueue order.
#[derive(Debug, Default, Clone)]
pub struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wall-clock time, clamped to the previous reading.
    pub fn now(&mut self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    /// Clamp `reading` to the last value handed out and record it.
    pub fn observe(&mut self, reading: DateTime<Utc>) -> DateTime<Utc> {
        let stamped = match self.last {
            Some(last) if last > reading => last,
            _ => reading,
        };
        self.last = Some(stamped);
        stamped
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}
