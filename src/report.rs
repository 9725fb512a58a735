use chrono::{DateTime, Local};
use serde::Serialize;

use crate::session::SessionResult;

/// Summary of a finalized run, printed with `--json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub sample: String,
    pub typed: String,
    #[serde(flatten)]
    pub result: SessionResult,
    pub finished_at: DateTime<Local>,
}

impl SessionReport {
    pub fn new(sample: &str, typed: &str, result: SessionResult) -> Self {
        Self {
            sample: sample.to_string(),
            typed: typed.to_string(),
            result,
            finished_at: Local::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The text shown in the results popup
pub fn format_summary(result: &SessionResult) -> String {
    format!(
        "Time: {:.2} s\nWPM: {:.2}\nAccuracy: {:.2}%",
        result.elapsed_secs, result.wpm, result.accuracy
    )
}
