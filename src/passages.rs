use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

use crate::session::TypingSession;

pub const SAMPLE_TEXTS: [&str; 6] = [
    "The quick brown fox jumps over the lazy dog.",
    "Typing is a skill that improves with practice and patience.",
    "Practice makes perfect, so keep typing and track your progress.",
    "Rust is a great language for building small tools and utilities.",
    "A journey of a thousand miles begins with a single step.",
    "Consistency and focus help you improve your typing speed and accuracy.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PassageError {
    #[error("passage pool must contain at least one passage")]
    EmptyPool,
}

/// Fixed, non-empty list of passages a session can be built from
#[derive(Debug, Clone, PartialEq)]
pub struct PassagePool {
    passages: Vec<String>,
}

impl PassagePool {
    pub fn new<I, S>(passages: I) -> Result<Self, PassageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let passages: Vec<String> = passages.into_iter().map(Into::into).collect();
        if passages.is_empty() {
            return Err(PassageError::EmptyPool);
        }
        Ok(Self { passages })
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    /// Uniform pick, independent of whatever was picked before
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // the constructor guarantees at least one passage
        self.passages
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn new_session<R: Rng + ?Sized>(&self, rng: &mut R) -> TypingSession {
        TypingSession::new(self.choose(rng))
    }
}

impl Default for PassagePool {
    fn default() -> Self {
        Self {
            passages: SAMPLE_TEXTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
