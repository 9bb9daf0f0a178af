//! Player Abstraction - One interface for every kind of side
//!
//! A `Player` is asked for a move once per turn. Humans answer with the
//! move itself; agents answer with free text that the resolver has to pick
//! apart. Only agents carry a memory handle.

mod agent;
mod human;
mod strategist;

pub use agent::{AgentPlayer, MemoryHandle};
pub use human::{ChannelInput, HumanPlayer, InputEvent, MoveInput, MovePrompt};
pub use strategist::{Strategist, StrategistError, StrategistReply, StrategistRequest};

use async_trait::async_trait;
use memory::MemoryRecord;
use rules::{BoardSnapshot, Evaluation};
use shared::{GameId, PlayerId, PlayerKind, Side};
use thiserror::Error;

/// Who sits on one side of the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub side: Side,
    pub kind: PlayerKind,
    /// Model or strategy identifier (agents only)
    pub model: Option<String>,
}

impl PlayerProfile {
    pub fn human(name: impl Into<String>, side: Side) -> Self {
        let name = name.into();
        Self {
            id: PlayerId::from_name(&name),
            name,
            side,
            kind: PlayerKind::Human,
            model: None,
        }
    }

    pub fn agent(name: impl Into<String>, side: Side, model: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: PlayerId::from_name(&name),
            name,
            side,
            kind: PlayerKind::Agent,
            model: Some(model.into()),
        }
    }

    pub fn is_human(&self) -> bool {
        self.kind == PlayerKind::Human
    }
}

/// Everything a player gets to see when asked for a move
#[derive(Debug, Clone)]
pub struct MoveRequest {
    pub game_id: GameId,
    pub side: Side,
    pub fen: String,
    pub move_number: u32,
    /// Plies already played
    pub ply: u32,
    pub legal_moves: Vec<String>,
    pub transcript: Vec<String>,
    pub board: BoardSnapshot,
    pub evaluation: Evaluation,
    /// The player's memory from its previous turn, if any
    pub prior_memory: Option<MemoryRecord>,
}

/// How the reply text should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIntent {
    /// The text is the move itself
    Exact,
    /// The text is reasoning that ends with a move
    Freeform,
}

/// Answer to a move request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerReply {
    pub text: String,
    /// New memory content to store once the move is committed
    pub updated_memory: Option<String>,
    pub intent: MoveIntent,
}

impl PlayerReply {
    pub fn exact(san: impl Into<String>) -> Self {
        Self {
            text: san.into(),
            updated_memory: None,
            intent: MoveIntent::Exact,
        }
    }

    pub fn freeform(text: impl Into<String>, updated_memory: Option<String>) -> Self {
        Self {
            text: text.into(),
            updated_memory,
            intent: MoveIntent::Freeform,
        }
    }
}

/// Errors a player can surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// The human asked to quit; aborts the session
    #[error("Player cancelled the session")]
    Cancelled,

    /// The strategist behind an agent failed
    #[error("Strategist failed: {0}")]
    Strategist(#[from] StrategistError),
}

/// Player Trait
///
/// `request_move` is the only place a turn suspends. It must not touch the
/// board: the orchestrator applies whatever move it finally resolves.
#[async_trait]
pub trait Player: Send {
    fn profile(&self) -> &PlayerProfile;

    async fn request_move(&mut self, request: &MoveRequest) -> Result<PlayerReply, PlayerError>;

    /// Memory handle, `None` for players without working memory
    fn memory(&self) -> Option<&MemoryHandle> {
        None
    }
}
