use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Characters per "word" when converting correct characters to WPM
pub const CHARS_PER_WORD: f64 = 5.0;

/// Stand-in for a zero elapsed time so WPM stays finite
pub const MIN_MINUTES: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("start typing first (press any key in the input box) to begin test")]
    NotStarted,
}

/// What the caller should do after reporting a keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionSignal {
    NoOp,
    Started,
    Continue,
    AutoFinish,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    Running {
        started_at: SystemTime,
    },
    Finalized {
        started_at: SystemTime,
        finished_at: SystemTime,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionResult {
    pub elapsed_secs: f64,
    pub correct_chars: usize,
    pub typed_chars: usize,
    pub wpm: f64,
    pub accuracy: f64,
}

impl SessionResult {
    pub fn compute(sample: &str, typed: &str, elapsed_secs: f64) -> Self {
        let elapsed_secs = elapsed_secs.max(0.0);
        let correct_chars = correct_chars(sample, typed);
        let typed_chars = typed.chars().count();

        Self {
            elapsed_secs,
            correct_chars,
            typed_chars,
            wpm: words_per_minute(correct_chars, elapsed_secs),
            accuracy: accuracy(correct_chars, typed_chars),
        }
    }
}

/// Number of positions where `typed` and `sample` hold the same character.
///
/// The comparison is strictly positional: an inserted or dropped character
/// shifts every following position.
pub fn correct_chars(sample: &str, typed: &str) -> usize {
    typed
        .chars()
        .zip(sample.chars())
        .filter(|(t, s)| t == s)
        .count()
}

pub fn words_per_minute(correct_chars: usize, elapsed_secs: f64) -> f64 {
    let minutes = if elapsed_secs > 0.0 {
        elapsed_secs / 60.0
    } else {
        MIN_MINUTES
    };

    (correct_chars as f64 / CHARS_PER_WORD) / minutes
}

pub fn accuracy(correct_chars: usize, typed_chars: usize) -> f64 {
    match typed_chars {
        0 => 0.0,
        n => correct_chars as f64 / n as f64 * 100.0,
    }
}

fn secs_between(start: SystemTime, end: SystemTime) -> f64 {
    end.duration_since(start)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// One attempt at typing a fixed sample passage
#[derive(Debug, Clone)]
pub struct TypingSession {
    sample: String,
    state: SessionState,
}

impl TypingSession {
    pub fn new(sample: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
            state: SessionState::Idle,
        }
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn sample_len(&self) -> usize {
        self.sample.chars().count()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running { .. })
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, SessionState::Finalized { .. })
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        match self.state {
            SessionState::Idle => None,
            SessionState::Running { started_at } | SessionState::Finalized { started_at, .. } => {
                Some(started_at)
            }
        }
    }

    pub fn finished_at(&self) -> Option<SystemTime> {
        match self.state {
            SessionState::Finalized { finished_at, .. } => Some(finished_at),
            _ => None,
        }
    }

    /// Seconds since the run started, frozen at `finished_at` once finalized
    pub fn elapsed_secs_at(&self, now: SystemTime) -> f64 {
        match self.state {
            SessionState::Idle => 0.0,
            SessionState::Running { started_at } => secs_between(started_at, now),
            SessionState::Finalized {
                started_at,
                finished_at,
            } => secs_between(started_at, finished_at),
        }
    }

    pub fn on_keystroke(&mut self, key: Option<char>, typed: &str) -> SessionSignal {
        self.on_keystroke_at(key, typed, SystemTime::now())
    }

    /// Registers a keystroke; `key` is `None` for keys that produce no visible character.
    ///
    /// `typed` is the full input text after the key has been applied.
    pub fn on_keystroke_at(
        &mut self,
        key: Option<char>,
        typed: &str,
        now: SystemTime,
    ) -> SessionSignal {
        if !self.is_running() {
            if key.is_none() {
                return SessionSignal::NoOp;
            }

            self.state = SessionState::Running { started_at: now };
            debug!(sample_len = self.sample_len(), "typing session started");

            // a single keystroke can already cover a one-character passage
            return if self.reached_end(typed) {
                SessionSignal::AutoFinish
            } else {
                SessionSignal::Started
            };
        }

        if self.reached_end(typed) {
            SessionSignal::AutoFinish
        } else {
            SessionSignal::Continue
        }
    }

    fn reached_end(&self, typed: &str) -> bool {
        typed.chars().count() >= self.sample_len()
    }

    pub fn finalize(&mut self, typed: &str) -> Result<SessionResult, SessionError> {
        self.finalize_at(typed, SystemTime::now())
    }

    /// Stops the clock and scores `typed` against the sample.
    ///
    /// Calling this again on a finalized session recomputes from the same
    /// start time with the new text and `now`.
    pub fn finalize_at(
        &mut self,
        typed: &str,
        now: SystemTime,
    ) -> Result<SessionResult, SessionError> {
        let started_at = self.started_at().ok_or(SessionError::NotStarted)?;

        // keep finished_at >= started_at even if the wall clock stepped back
        let finished_at = now.max(started_at);
        self.state = SessionState::Finalized {
            started_at,
            finished_at,
        };

        let result =
            SessionResult::compute(&self.sample, typed, secs_between(started_at, finished_at));
        info!(
            elapsed_secs = result.elapsed_secs,
            wpm = result.wpm,
            accuracy = result.accuracy,
            "typing session finalized"
        );

        Ok(result)
    }

    /// Back to idle with the same sample
    pub fn reset(&mut self) {
        debug!("typing session reset");
        self.state = SessionState::Idle;
    }
}
