//! RulesEngine - The port the orchestrator consults for legality

use shared::{PieceKind, Side, TerminalStatus};
use thiserror::Error;

use crate::snapshot::BoardSnapshot;

/// Errors raised by a rules engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
}

/// Result of `RulesEngine::apply_move`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub applied: bool,
    /// Piece taken by the move, if any
    pub captured: Option<PieceKind>,
}

impl ApplyOutcome {
    pub fn applied(captured: Option<PieceKind>) -> Self {
        Self {
            applied: true,
            captured,
        }
    }

    pub fn rejected() -> Self {
        Self {
            applied: false,
            captured: None,
        }
    }
}

/// Rules Engine Trait
///
/// The orchestrator treats the board as opaque and only ever talks to it
/// through this trait. Moves are exchanged as SAN strings, exactly as
/// reported by `legal_moves`.
pub trait RulesEngine: Send {
    /// All legal moves for the side to move, in SAN
    fn legal_moves(&self) -> Vec<String>;

    /// Apply a move given in SAN
    ///
    /// A rejected move leaves the position untouched.
    fn apply_move(&mut self, san: &str) -> ApplyOutcome;

    /// Current terminal status (`InProgress` while the game goes on)
    fn terminal_status(&self) -> TerminalStatus;

    fn is_terminal(&self) -> bool {
        self.terminal_status().is_terminal()
    }

    fn side_to_move(&self) -> Side;

    /// Full move number as written in FEN (starts at 1)
    fn fullmove_number(&self) -> u32;

    /// Portable encoding of the position (FEN)
    fn serialize(&self) -> String;

    /// Replace the position with a previously serialized one
    fn deserialize(&mut self, encoded: &str) -> Result<(), RulesError>;

    /// Piece-by-square view for evaluation and rendering
    fn snapshot(&self) -> BoardSnapshot;
}
