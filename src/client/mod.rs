//! Trivia client module.
//!
//! Provides the WebSocket connection to the game server and the state derived
//! from what it sends.

mod client;
mod state;
mod timing;

pub use client::{ConnectionStatus, SessionId, TriviaClient};
pub use state::{GameSummary, Score, SessionState};
pub use timing::QuestionTimer;
