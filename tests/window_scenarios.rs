// tests/window_scenarios.rs
//
// Time-driven scenarios for the windowed aggregator on a manual clock.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;
use timed_window_buffer::{
    AggregationResult, Clock, ManualClock, TimedBuffer, Window, RETENTION,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap()
}

fn setup<T>() -> (Arc<ManualClock>, TimedBuffer<T>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let buf = TimedBuffer::with_clock(clock.clone());
    (clock, buf)
}

fn as_list<T: Clone>(buf: &TimedBuffer<T>) -> AggregationResult<Vec<T>> {
    buf.aggregate(Vec::new(), |mut acc, v| {
        acc.push(v.clone());
        acc
    })
}

#[test]
fn three_inserts_spread_over_six_minutes() {
    let (clock, buf) = setup();
    buf.insert("a");
    clock.advance(Duration::minutes(2));
    buf.insert("b");
    clock.advance(Duration::minutes(4));
    buf.insert("c");

    let r = as_list(&buf);
    assert_eq!(r.last_1_min(), &vec!["c"]);
    assert_eq!(r.last_5_min(), &vec!["b", "c"]);
    assert_eq!(r.last_15_min(), &vec!["a", "b", "c"]);
    assert_eq!(r.last_60_min(), &vec!["a", "b", "c"]);
    assert_eq!(r.evaluation_time(), t0() + Duration::minutes(6));
}

#[test]
fn sample_outside_fifteen_minutes_only_counts_for_the_hour() {
    let (clock, buf) = setup();
    buf.insert("a");
    clock.advance(Duration::minutes(16));
    buf.insert("c");

    let r = as_list(&buf);
    assert_eq!(r.last_1_min(), &vec!["c"]);
    assert_eq!(r.last_5_min(), &vec!["c"]);
    assert_eq!(r.last_15_min(), &vec!["c"]);
    assert_eq!(r.last_60_min(), &vec!["a", "c"]);
}

#[test]
fn everything_expires_after_an_hour() {
    let (clock, buf) = setup();
    buf.insert("a");
    clock.advance(Duration::minutes(61));

    assert_eq!(buf.size(), 0);
    let r = buf.aggregate(String::from("seed"), |acc, v: &&str| acc + *v);
    for w in Window::ALL {
        assert_eq!(r.get(w), "seed", "window {}", w.label());
    }
}

#[test]
fn empty_buffer_never_calls_accumulator() {
    let (_clock, buf) = setup::<u32>();
    let r = buf.aggregate(5u32, |_, _| panic!("accumulator must not run"));
    assert_eq!(r.iter().filter(|(_, v)| **v == 5).count(), 4);
}

#[test]
fn folds_run_oldest_to_newest() {
    let (clock, buf) = setup();
    for i in 0..30u32 {
        buf.insert(i);
        clock.advance(Duration::seconds(7));
    }
    let r = as_list(&buf);
    for (w, list) in r.iter() {
        assert!(
            list.windows(2).all(|p| p[0] < p[1]),
            "window {} out of order: {list:?}",
            w.label()
        );
    }
    assert_eq!(r.last_60_min().len(), 30);
}

#[test]
fn repeated_size_without_time_passing_is_stable() {
    let (clock, buf) = setup();
    buf.insert(1);
    clock.advance(Duration::minutes(30));
    buf.insert(2);
    assert_eq!(buf.size(), 2);
    assert_eq!(buf.size(), 2);
}

#[test]
fn size_shrinks_as_time_passes() {
    let (clock, buf) = setup();
    buf.insert(1);
    clock.advance(Duration::minutes(30));
    buf.insert(2);
    clock.advance(Duration::minutes(31));
    assert_eq!(buf.size(), 1);
    clock.advance(Duration::minutes(30));
    assert_eq!(buf.size(), 0);
}

#[test]
fn count_by_window_matches_list_lengths() {
    let (clock, buf) = setup();
    for step in [0, 3, 9, 40, 55, 58] {
        clock.set(t0() + Duration::minutes(step));
        buf.insert(step);
    }
    // The sample from minute 0 is 60.5 minutes old here and gets evicted.
    clock.set(t0() + Duration::minutes(60) + Duration::seconds(30));

    let lists = as_list(&buf);
    let counts = buf.count_by_window();
    for w in Window::ALL {
        assert_eq!(*counts.get(w), lists.get(w).len());
    }
    assert_eq!(*counts.last_1_min(), 0);
    assert_eq!(*counts.last_5_min(), 1);
    assert_eq!(*counts.last_15_min(), 2);
    assert_eq!(*counts.last_60_min(), 5);
}

#[test]
fn panicking_accumulator_leaves_buffer_intact() {
    let (clock, buf) = setup();
    buf.insert(1);
    buf.insert(2);
    clock.advance(Duration::minutes(2));
    buf.insert(3);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        buf.aggregate(0, |acc, v| if *v == 2 { panic!("bad sample") } else { acc + v })
    }));
    assert!(outcome.is_err());

    assert_eq!(buf.size(), 3);
    buf.insert(4);
    let sums = buf.aggregate(0, |acc, v| acc + v);
    assert_eq!(*sums.last_60_min(), 10);
    assert_eq!(*sums.last_1_min(), 7);
}

/// Random inserts and clock jumps; after each read every retained sample is
/// younger than the horizon and windows nest.
#[test]
fn randomized_retention_and_nesting() {
    let mut rng = rand::rng();
    let (clock, buf) = setup::<DateTime<Utc>>();

    for _ in 0..500 {
        if rng.random_bool(0.7) {
            buf.insert(clock.now());
        }
        clock.advance(Duration::seconds(rng.random_range(0..=240)));

        if rng.random_bool(0.2) {
            let r = as_list(&buf);
            let now = r.evaluation_time();
            assert!(r.last_60_min().iter().all(|ts| now - *ts < RETENTION));

            let mut prev: Option<&Vec<DateTime<Utc>>> = None;
            for (w, list) in r.iter() {
                assert!(list.iter().all(|ts| *ts > now - w.duration()));
                if let Some(narrower) = prev {
                    assert!(narrower.iter().all(|ts| list.contains(ts)));
                }
                prev = Some(list);
            }
            assert_eq!(buf.size(), r.last_60_min().len());
        }
    }
}
