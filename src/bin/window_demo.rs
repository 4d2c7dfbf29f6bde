//! Demo: several producers feed one buffer on a simulated clock while the
//! main task advances time and prints windowed count/sum/mean as JSON.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use serde_json::json;
use timed_window_buffer::config::DemoConfig;
use timed_window_buffer::{ManualClock, TimedBuffer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("timed_buffer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .init();
}

fn report(buf: &TimedBuffer<f64>, tick: u64) -> anyhow::Result<()> {
    let stats = buf
        .aggregate((0usize, 0.0f64), |(n, sum), v| (n + 1, sum + v))
        .map(|(n, sum)| {
            let mean = if n > 0 { sum / n as f64 } else { 0.0 };
            json!({ "count": n, "sum": sum, "mean": mean })
        });
    let line = serde_json::to_string(&stats).context("serialize aggregation")?;
    println!("tick {tick}: {line}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = DemoConfig::load_default().context("load demo config")?;
    let prom = timed_window_buffer::metrics::install_prometheus()?;
    tracing::info!(?cfg, "window demo starting");

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let buf = Arc::new(TimedBuffer::<f64>::named("demo", clock.clone()));
    let running = Arc::new(AtomicBool::new(true));

    let mut producers = Vec::with_capacity(cfg.producers);
    for id in 0..cfg.producers {
        let buf = buf.clone();
        let running = running.clone();
        let tick_ms = cfg.tick_ms.max(1);
        producers.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_millis(tick_ms));
            let mut seq = 0u64;
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                buf.insert((id as f64 + 1.0) * ((seq % 10) as f64));
                seq += 1;
            }
            seq
        }));
    }

    for tick in 1..=cfg.ticks {
        tokio::time::sleep(std::time::Duration::from_millis(cfg.tick_ms)).await;
        clock.advance(Duration::seconds(cfg.step_secs));
        if tick % cfg.report_every == 0 {
            report(&buf, tick)?;
        }
    }

    running.store(false, Ordering::Relaxed);
    let mut inserted = 0u64;
    for p in producers {
        inserted += p.await.context("producer task")?;
    }
    tracing::info!(inserted, retained = buf.size(), "window demo finished");

    if std::env::var("DEMO_PRINT_METRICS").is_ok_and(|v| v == "1") {
        println!("{}", prom.render());
    }
    Ok(())
}
