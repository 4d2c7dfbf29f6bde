//! # Aggregation
//! The four fixed windows and the per-call result produced by
//! [`TimedBuffer::aggregate`](crate::buffer::TimedBuffer::aggregate).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Samples at least this old are evicted.
pub const RETENTION: Duration = Duration::minutes(60);

/// One of the fixed aggregation intervals, measured back from the evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Window {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    SixtyMinutes,
}

impl Window {
    /// Narrowest first.
    pub const ALL: [Window; 4] = [
        Window::OneMinute,
        Window::FiveMinutes,
        Window::FifteenMinutes,
        Window::SixtyMinutes,
    ];

    pub fn duration(self) -> Duration {
        match self {
            Window::OneMinute => Duration::minutes(1),
            Window::FiveMinutes => Duration::minutes(5),
            Window::FifteenMinutes => Duration::minutes(15),
            Window::SixtyMinutes => RETENTION,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Window::OneMinute => "1m",
            Window::FiveMinutes => "5m",
            Window::FifteenMinutes => "15m",
            Window::SixtyMinutes => "60m",
        }
    }
}

/// Four partial aggregates computed in one pass at `evaluation_time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult<A> {
    evaluation_time: DateTime<Utc>,
    last_1_min: A,
    last_5_min: A,
    last_15_min: A,
    last_60_min: A,
}

impl<A> AggregationResult<A> {
    pub(crate) fn new(
        evaluation_time: DateTime<Utc>,
        last_1_min: A,
        last_5_min: A,
        last_15_min: A,
        last_60_min: A,
    ) -> Self {
        Self {
            evaluation_time,
            last_1_min,
            last_5_min,
            last_15_min,
            last_60_min,
        }
    }

    /// The single `now` used for both eviction and windowing.
    pub fn evaluation_time(&self) -> DateTime<Utc> {
        self.evaluation_time
    }

    pub fn last_1_min(&self) -> &A {
        &self.last_1_min
    }

    pub fn last_5_min(&self) -> &A {
        &self.last_5_min
    }

    pub fn last_15_min(&self) -> &A {
        &self.last_15_min
    }

    pub fn last_60_min(&self) -> &A {
        &self.last_60_min
    }

    pub fn get(&self, window: Window) -> &A {
        match window {
            Window::OneMinute => &self.last_1_min,
            Window::FiveMinutes => &self.last_5_min,
            Window::FifteenMinutes => &self.last_15_min,
            Window::SixtyMinutes => &self.last_60_min,
        }
    }

    /// `(window, aggregate)` pairs, narrowest window first.
    pub fn iter(&self) -> impl Iterator<Item = (Window, &A)> + '_ {
        Window::ALL.into_iter().map(move |w| (w, self.get(w)))
    }

    /// Transform every window's aggregate, keeping the evaluation time.
    ///
    /// Handy for finishing a fold, e.g. `(sum, count)` into a mean.
    pub fn map<B, F>(self, mut f: F) -> AggregationResult<B>
    where
        F: FnMut(A) -> B,
    {
        AggregationResult {
            evaluation_time: self.evaluation_time,
            last_1_min: f(self.last_1_min),
            last_5_min: f(self.last_5_min),
            last_15_min: f(self.last_15_min),
            last_60_min: f(self.last_60_min),
        }
    }
}
