// src/lib.rs
//! In-process buffer of timestamped samples with lazy 60-minute retention
//! and one-pass aggregation over the last 1, 5, 15 and 60 minutes.
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{Duration, Utc};
//! use timed_window_buffer::{ManualClock, TimedBuffer};
//!
//! let clock = Arc::new(ManualClock::new(Utc::now()));
//! let buf = TimedBuffer::with_clock(clock.clone());
//! buf.insert(3);
//! clock.advance(Duration::minutes(2));
//! buf.insert(4);
//!
//! let sums = buf.aggregate(0, |acc, v| acc + v);
//! assert_eq!(*sums.last_1_min(), 4);
//! assert_eq!(*sums.last_5_min(), 7);
//! ```

pub mod aggregation;
pub mod buffer;
pub mod clock;
pub mod config;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::aggregation::{AggregationResult, Window, RETENTION};
pub use crate::buffer::{Sample, TimedBuffer};
pub use crate::clock::{Clock, ManualClock, SystemClock};
