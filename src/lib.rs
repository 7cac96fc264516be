// Library interface for chatterdle
// This allows integration tests to access internal modules

pub mod chat;
pub mod cli;
pub mod feedback;
pub mod logging;
pub mod pool;
pub mod session;
pub mod settings;
pub mod tui;

// Re-export commonly used types for easier testing
pub use chat::{ChatEvent, ChatLine, parse_line, spawn_reader};
pub use feedback::{Feedback, KeyState, score};
pub use pool::{CandidatePool, ChatterMeta, PoolFilter};
pub use session::{EmptyPoolError, GameSession, InputMode, MAX_GUESSES, RoundStatus};
pub use settings::Settings;
