//! # trivia-client
//!
//! Network client for a multiplayer trivia server.
//!
//! The server runs the game. This crate keeps one WebSocket session open,
//! turns the JSON messages it receives into observable [`SessionState`], and
//! sends game requests and answers back.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trivia_client::protocol::{Category, CreateTrivia, Difficulty, GameMode, TurnMode};
//! use trivia_client::{ClientConfig, TriviaClient};
//!
//! # async fn demo() -> Result<(), trivia_client::ClientError> {
//! let client = TriviaClient::new();
//! client.connect_to(&ClientConfig::default()).await?;
//!
//! client
//!     .create_trivia(CreateTrivia {
//!         mode: GameMode::Pve,
//!         questions: 5,
//!         categories: vec![Category::Science, Category::History],
//!         difficulty: Difficulty::Mixed,
//!         time_limit: 0,
//!         turn_mode: TurnMode::Timed,
//!         player_name: "Player1".to_string(),
//!     })
//!     .await?;
//!
//! let mut state = client.state();
//! let question = state
//!     .wait_for(|s| s.current_question().is_some())
//!     .await
//!     .ok()
//!     .and_then(|s| s.current_question().cloned());
//!
//! if let Some(question) = question {
//!     client.answer(&question.id, 0).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
mod config;
mod error;
pub mod protocol;

pub use client::{ConnectionStatus, GameSummary, Score, SessionId, SessionState, TriviaClient};
pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT};
pub use error::{ClientError, ProtocolError};
