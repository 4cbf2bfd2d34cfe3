// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One sample produced by a sensor.
///
/// `time` is assigned by the sensor when the invocation completes, never by the
/// script. `value` is whatever JSON the script printed; no schema is enforced.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use serde_json::json;
/// use vsensor_core::Data;
///
/// let data = Data::new(Utc::now(), json!({"v": 1}));
/// assert_eq!(data.value["v"], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub time: DateTime<Utc>,
    pub value: Value,
}

impl Data {
    pub fn new(time: DateTime<Utc>, value: Value) -> Self {
        Self { time, value }
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time.to_rfc3339(), self.value)
    }
}
