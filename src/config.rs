use std::path::PathBuf;
use std::time::Duration;

use crate::runtime::{FixedTicker, DEFAULT_TICK_RATE_MS};

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings for one run of the app; built from command line flags only
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tick_rate_ms: u64,
    /// Show the results popup after a run is finalized
    pub show_summary: bool,
    /// Print a JSON report of the last run on exit
    pub json_report: bool,
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            show_summary: true,
            json_report: false,
            log_file: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn ticker(&self) -> FixedTicker {
        FixedTicker::new(self.tick_rate())
    }
}
