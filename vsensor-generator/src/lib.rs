// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Rate generators for virtual sensors.
//!
//! A rate generator turns elapsed time into work: once per timeslot it emits a
//! count meaning "produce this many samples now". Generators are consumed by
//! [`RateGenerator::generate`], which hands back a lazy, infinite stream.
//!
//! # Overview
//!
//! - **`RateGenerator` trait** - the capability a sensor depends on
//! - **`SlotGenerator<C, TM>`** - one tick per timeslot, count drawn from `C`
//! - **`SlotCount` trait** - per-slot count rule (`UniformCount`, `ConstantCount`)
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use std::time::Duration;
//! use vsensor_generator::{ConstantGenerator, RateGenerator};
//!
//! # async fn example() -> vsensor_core::Result<()> {
//! let generator = ConstantGenerator::constant(Duration::from_secs(1), 2)?;
//! let mut ticks = Box::new(generator).generate();
//!
//! // One second later
//! assert_eq!(ticks.next().await, Some(2));
//! # Ok(())
//! # }
//! ```

mod count;
mod generator;
mod slot;

pub use count::{ConstantCount, SlotCount, UniformCount, DEFAULT_COUNT_RANGE};
pub use generator::{RateGenerator, TickStream};
pub use slot::{ConstantGenerator, SlotGenerator, Ticks, UniformGenerator, DEFAULT_TIMESLOT};
