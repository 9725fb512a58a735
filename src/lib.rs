// Library surface shared by the binary and the headless integration tests.
pub mod config;
pub mod input;
pub mod logging;
pub mod passages;
pub mod report;
pub mod runtime;
pub mod session;

pub use passages::PassagePool;
pub use session::{SessionError, SessionResult, SessionSignal, SessionState, TypingSession};
