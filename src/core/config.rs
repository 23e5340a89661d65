/*!
 * Runtime Configuration
 *
 * Environment-driven configuration for the timer, ready structure and
 * reporting. Every value has a default in `core::limits`.
 */

use super::errors::ConfigError;
use super::limits::{
    DEFAULT_MAX_LEVELS, DEFAULT_SUBMIT_DELAY, DEFAULT_TICK_INTERVAL, MIN_LEVELS, MIN_TICK_INTERVAL,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_TICK_MS: &str = "DQSCHED_TICK_MS";
pub const ENV_MAX_LEVELS: &str = "DQSCHED_MAX_LEVELS";
pub const ENV_REPORT: &str = "DQSCHED_REPORT";
pub const ENV_SUBMIT_DELAY_MS: &str = "DQSCHED_SUBMIT_DELAY_MS";
pub const ENV_TRACE_JSON: &str = "DQSCHED_TRACE_JSON";

/// Where periodic snapshots go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Human-readable report on stdout
    Stdout,
    /// Structured snapshot in the tracing log
    Log,
    /// No periodic reports
    Off,
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdout" | "console" => Ok(Self::Stdout),
            "log" | "tracing" => Ok(Self::Log),
            "off" | "none" => Ok(Self::Off),
            _ => Err("expected one of stdout, log, off".to_string()),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Wall-clock period of one logical tick
    pub tick_interval: Duration,
    /// Cap on the number of ready levels
    pub max_levels: usize,
    /// Periodic report destination
    pub report: ReportMode,
    /// Pause between script lines fed to the dispatcher
    pub submit_delay: Duration,
    /// Emit JSON-formatted logs
    pub trace_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_levels: DEFAULT_MAX_LEVELS,
            report: ReportMode::Stdout,
            submit_delay: DEFAULT_SUBMIT_DELAY,
            trace_json: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_TICK_MS) {
            let interval = Duration::from_millis(parse_number(ENV_TICK_MS, &raw)?);
            if interval < MIN_TICK_INTERVAL {
                return Err(invalid(ENV_TICK_MS, &raw, "tick interval must be at least 1ms"));
            }
            config.tick_interval = interval;
        }

        if let Some(raw) = lookup(ENV_MAX_LEVELS) {
            let levels = parse_number(ENV_MAX_LEVELS, &raw)? as usize;
            if levels < MIN_LEVELS {
                return Err(invalid(ENV_MAX_LEVELS, &raw, "at least one level is required"));
            }
            config.max_levels = levels;
        }

        if let Some(raw) = lookup(ENV_REPORT) {
            config.report = raw
                .trim()
                .parse()
                .map_err(|reason: String| invalid(ENV_REPORT, &raw, &reason))?;
        }

        if let Some(raw) = lookup(ENV_SUBMIT_DELAY_MS) {
            config.submit_delay = Duration::from_millis(parse_number(ENV_SUBMIT_DELAY_MS, &raw)?);
        }

        if let Some(raw) = lookup(ENV_TRACE_JSON) {
            config.trace_json = matches!(raw.trim(), "1" | "true");
        }

        Ok(config)
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(MIN_TICK_INTERVAL);
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels.max(MIN_LEVELS);
        self
    }

    pub fn with_report(mut self, report: ReportMode) -> Self {
        self.report = report;
        self
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| invalid(key, raw, &e.to_string()))
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
