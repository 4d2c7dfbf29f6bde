//! # Timed Buffer
//! Concurrent store of timestamped samples with lazy 60-minute retention and
//! a single-pass aggregator over the 1/5/15/60 minute windows.
//!
//! Samples live newest-first in a deque: inserts push to the front, eviction
//! pops from the back. Nothing runs in the background; every public call
//! evicts whatever has gone stale before doing its own work.
//!
//! Aggregation copies the retained `Arc<Sample<T>>` pointers while holding
//! the lock and runs the caller's accumulator after releasing it, so a slow
//! or panicking fold never blocks producers or leaves the store half-updated.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::aggregation::{AggregationResult, Window, RETENTION};
use crate::clock::{Clock, SystemClock};
use crate::metrics as buffer_metrics;

const DEFAULT_NAME: &str = "default";

/// One timestamped value. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    timestamp: DateTime<Utc>,
    value: T,
}

impl<T> Sample<T> {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

/// Thread-safe, time-bounded buffer of samples.
pub struct TimedBuffer<T> {
    /// Front = newest, back = oldest.
    samples: Mutex<VecDeque<Arc<Sample<T>>>>,
    clock: Arc<dyn Clock>,
    name: String,
}

impl<T> TimedBuffer<T> {
    /// Buffer driven by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Buffer driven by an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::named(DEFAULT_NAME, clock)
    }

    /// Named buffer; the name becomes the `buffer` label on emitted metrics.
    pub fn named(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        buffer_metrics::ensure_metrics_described();
        Self {
            samples: Mutex::new(VecDeque::new()),
            clock,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evict stale samples, then record `value` at the current instant.
    pub fn insert(&self, value: T) {
        let len = {
            let mut samples = self.samples.lock();
            // Read under the lock so position order and timestamp order agree.
            let now = self.clock.now();
            self.evict(&mut samples, now);
            samples.push_front(Arc::new(Sample {
                timestamp: now,
                value,
            }));
            samples.len()
        };

        buffer_metrics::record_insert(&self.name, len);
        tracing::trace!(target: "timed_buffer", buffer = %self.name, len, "sample inserted");
    }

    /// Number of samples younger than the retention horizon.
    ///
    /// Two calls with no insert in between can differ only because time
    /// passed; the count never grows on its own.
    pub fn size(&self) -> usize {
        let len = {
            let mut samples = self.samples.lock();
            let now = self.clock.now();
            self.evict(&mut samples, now);
            samples.len()
        };
        buffer_metrics::record_len(&self.name, len);
        len
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Fold every retained sample into four windowed aggregates.
    ///
    /// Values are visited oldest first. A sample joins the 15/5/1 minute
    /// aggregates only when its timestamp is strictly after `now - window`;
    /// every retained sample joins the 60 minute aggregate. `now` is read
    /// once and reused for eviction and windowing.
    ///
    /// A panic inside `accumulate` propagates to the caller; the buffer
    /// itself is unaffected because eviction finished and the lock was
    /// released before the fold started.
    pub fn aggregate<A, F>(&self, seed: A, mut accumulate: F) -> AggregationResult<A>
    where
        A: Clone,
        F: FnMut(A, &T) -> A,
    {
        let (now, snapshot) = {
            let mut samples = self.samples.lock();
            let now = self.clock.now();
            self.evict(&mut samples, now);
            // Oldest first.
            let snapshot: Vec<Arc<Sample<T>>> = samples.iter().rev().cloned().collect();
            (now, snapshot)
        };
        buffer_metrics::record_len(&self.name, snapshot.len());

        let started = Instant::now();
        let cut_1 = now - Window::OneMinute.duration();
        let cut_5 = now - Window::FiveMinutes.duration();
        let cut_15 = now - Window::FifteenMinutes.duration();

        let mut agg_1 = seed.clone();
        let mut agg_5 = seed.clone();
        let mut agg_15 = seed.clone();
        let mut agg_60 = seed;

        for sample in &snapshot {
            let ts = sample.timestamp;
            let value = &sample.value;
            agg_60 = accumulate(agg_60, value);
            if ts > cut_15 {
                agg_15 = accumulate(agg_15, value);
            }
            if ts > cut_5 {
                agg_5 = accumulate(agg_5, value);
            }
            if ts > cut_1 {
                agg_1 = accumulate(agg_1, value);
            }
        }

        buffer_metrics::record_aggregation(&self.name, started.elapsed());
        tracing::trace!(
            target: "timed_buffer",
            buffer = %self.name,
            samples = snapshot.len(),
            "aggregated windows"
        );

        AggregationResult::new(now, agg_1, agg_5, agg_15, agg_60)
    }

    /// Sample counts per window.
    pub fn count_by_window(&self) -> AggregationResult<usize> {
        self.aggregate(0usize, |n, _| n + 1)
    }

    /// Pop samples from the back while they are at least `RETENTION` old.
    fn evict(&self, samples: &mut VecDeque<Arc<Sample<T>>>, now: DateTime<Utc>) {
        let mut evicted = 0u64;
        while let Some(oldest) = samples.back() {
            if now - oldest.timestamp >= RETENTION {
                samples.pop_back();
                evicted += 1;
            } else {
                break;
            }
        }

        if evicted > 0 {
            buffer_metrics::record_evicted(&self.name, evicted);
            tracing::debug!(
                target: "timed_buffer",
                buffer = %self.name,
                evicted,
                remaining = samples.len(),
                "evicted stale samples"
            );
        }
    }
}

impl<T> Default for TimedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TimedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedBuffer")
            .field("name", &self.name)
            .field("len", &self.samples.lock().len())
            .finish_non_exhaustive()
    }
}
