//! Strategist - The collaborator that thinks for an agent

use async_trait::async_trait;
use rules::{BoardSnapshot, Evaluation};
use shared::{GameId, Side};
use thiserror::Error;

/// Input for one strategist call
#[derive(Debug, Clone)]
pub struct StrategistRequest {
    pub game_id: GameId,
    pub player_name: String,
    pub side: Side,
    pub fen: String,
    pub move_number: u32,
    pub legal_moves: Vec<String>,
    pub transcript: Vec<String>,
    pub board: BoardSnapshot,
    pub evaluation: Evaluation,
    /// Prior memory, or the template on the first turn
    pub memory: String,
}

/// Output of one strategist call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategistReply {
    /// Reasoning followed by the chosen move
    pub text: String,
    /// Updated memory; `None` keeps the previous content
    pub memory: Option<String>,
}

/// Errors from a strategist backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategistError {
    #[error("API key not found in environment variable {var}")]
    MissingApiKey { var: String },

    #[error("Request failed: {message}")]
    Http { message: String },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Internal(String),
}

/// Strategist Trait
///
/// Selected by configuration; the orchestrator never knows which one it
/// talks to. Implementations enforce their own timeouts.
#[async_trait]
pub trait Strategist: Send + Sync {
    /// Model or strategy identifier recorded with the game
    fn identifier(&self) -> String;

    async fn generate(&self, request: &StrategistRequest) -> Result<StrategistReply, StrategistError>;
}
