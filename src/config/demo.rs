// src/config/demo.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_DEMO_CONFIG_PATH: &str = "TIMED_BUFFER_DEMO_CONFIG";

fn default_producers() -> usize {
    4
}
fn default_ticks() -> u64 {
    90
}
fn default_step_secs() -> i64 {
    60
}
fn default_tick_ms() -> u64 {
    20
}
fn default_report_every() -> u64 {
    15
}

/// Settings for the `window_demo` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Concurrent producer tasks.
    #[serde(default = "default_producers")]
    pub producers: usize,
    /// Number of simulated clock steps.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Simulated seconds per tick.
    #[serde(default = "default_step_secs")]
    pub step_secs: i64,
    /// Real milliseconds slept per tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Print an aggregation every N ticks.
    #[serde(default = "default_report_every")]
    pub report_every: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            producers: default_producers(),
            ticks: default_ticks(),
            step_secs: default_step_secs(),
            tick_ms: default_tick_ms(),
            report_every: default_report_every(),
        }
    }
}

impl DemoConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading demo config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse(&content, ext.as_str())
            .with_context(|| format!("parsing demo config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $TIMED_BUFFER_DEMO_CONFIG
    /// 2) config/window_demo.toml
    /// 3) config/window_demo.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_DEMO_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!(
                    "{ENV_DEMO_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
        }
        for candidate in ["config/window_demo.toml", "config/window_demo.json"] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Ok(Self::default())
    }

    /// Zero producers/ticks/steps would make the demo do nothing.
    fn sanitized(mut self) -> Self {
        self.producers = self.producers.max(1);
        self.ticks = self.ticks.max(1);
        self.step_secs = self.step_secs.max(1);
        self.report_every = self.report_every.max(1);
        self
    }
}

fn parse(s: &str, hint_ext: &str) -> Result<DemoConfig> {
    if hint_ext == "json" {
        return Ok(serde_json::from_str(s)?);
    }
    match toml::from_str::<DemoConfig>(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported demo config format: {toml_err}")),
    }
}
