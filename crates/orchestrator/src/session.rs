//! GameSession - One game, passed explicitly to every turn
//!
//! The session owns its rules engine and is the only place the board
//! changes. Nothing about "the current game" is global, so several sessions
//! can run side by side in one process.

use std::fmt;

use rules::{ApplyOutcome, BoardSnapshot, RulesEngine};
use serde::{Deserialize, Serialize};
use shared::{GameId, Side, TerminalStatus};

const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ============================================================================
// Result
// ============================================================================

/// Who won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl Winner {
    pub fn side(side: Side) -> Self {
        match side {
            Side::White => Winner::White,
            Side::Black => Winner::Black,
        }
    }

    /// PGN result string
    pub fn result_string(self) -> &'static str {
        match self {
            Winner::White => "1-0",
            Winner::Black => "0-1",
            Winner::Draw => "1/2-1/2",
        }
    }
}

/// Why the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameReason {
    Checkmate,
    Stalemate,
    DrawByRepetition,
    DrawByInsufficientMaterial,
    DrawByFiftyMove,
    /// Not produced by the turn loop today; kept so records can carry it
    Resignation,
}

impl GameReason {
    /// Map a terminal status, `None` while the game is in progress
    pub fn from_status(status: TerminalStatus) -> Option<Self> {
        match status {
            TerminalStatus::InProgress => None,
            TerminalStatus::Checkmate => Some(GameReason::Checkmate),
            TerminalStatus::Stalemate => Some(GameReason::Stalemate),
            TerminalStatus::DrawByRepetition => Some(GameReason::DrawByRepetition),
            TerminalStatus::DrawByInsufficientMaterial => {
                Some(GameReason::DrawByInsufficientMaterial)
            }
            TerminalStatus::DrawByFiftyMove => Some(GameReason::DrawByFiftyMove),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameReason::Checkmate => "checkmate",
            GameReason::Stalemate => "stalemate",
            GameReason::DrawByRepetition => "draw-by-repetition",
            GameReason::DrawByInsufficientMaterial => "draw-by-insufficient-material",
            GameReason::DrawByFiftyMove => "draw-by-fifty-move",
            GameReason::Resignation => "resignation",
        }
    }

    /// Human readable wording, used for the PGN Termination header
    pub fn description(self) -> &'static str {
        match self {
            GameReason::Checkmate => "checkmate",
            GameReason::Stalemate => "stalemate",
            GameReason::DrawByRepetition => "threefold repetition",
            GameReason::DrawByInsufficientMaterial => "insufficient material",
            GameReason::DrawByFiftyMove => "fifty-move rule",
            GameReason::Resignation => "resignation",
        }
    }
}

impl fmt::Display for GameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a session
///
/// Created once, when the terminal condition is detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner: Winner,
    pub reason: GameReason,
    /// Plies played in this session
    pub total_moves: u32,
    /// Every move in SAN, in order
    pub transcript: Vec<String>,
}

impl GameResult {
    /// Result for a terminal status reached with `side_to_move` to play
    pub fn from_status(
        status: TerminalStatus,
        side_to_move: Side,
        transcript: Vec<String>,
    ) -> Option<Self> {
        let reason = GameReason::from_status(status)?;
        let winner = match reason {
            // The side to move is the one that got mated
            GameReason::Checkmate => Winner::side(side_to_move.opposite()),
            _ => Winner::Draw,
        };
        Some(Self {
            winner,
            reason,
            total_moves: transcript.len() as u32,
            transcript,
        })
    }

    /// `resigning` gave up
    pub fn resignation(resigning: Side, transcript: Vec<String>) -> Self {
        Self {
            winner: Winner::side(resigning.opposite()),
            reason: GameReason::Resignation,
            total_moves: transcript.len() as u32,
            transcript,
        }
    }

    pub fn result_string(&self) -> &'static str {
        self.winner.result_string()
    }

    /// e.g. `0-1 (checkmate after 4 plies)`
    pub fn summary(&self) -> String {
        format!(
            "{} ({} after {} plies)",
            self.result_string(),
            self.reason.description(),
            self.total_moves
        )
    }
}

// ============================================================================
// Turn state
// ============================================================================

/// What happened to a player's proposed move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptOutcome {
    /// The player's own move was applied
    Applied,
    /// The player proposed an illegal move; a random move was applied instead
    RejectedIllegal,
    /// No move could be found in the output; a random move was applied instead
    Unparseable,
    /// The player failed outright; a random move was forced
    FallbackRandom,
}

impl AttemptOutcome {
    pub fn is_fallback(self) -> bool {
        self != AttemptOutcome::Applied
    }
}

/// One player's attempt at a turn. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAttempt {
    /// Raw text the player produced (empty if the player failed)
    pub raw_output: String,
    /// Move extracted from the output, if any
    pub candidate: Option<String>,
    pub outcome: AttemptOutcome,
}

/// Explicit turn state of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the player of `side` to answer
    AwaitingTurn(Side),
    /// Player answered, reconciling its output with the legal moves
    ResolvingMove { side: Side, raw_output: String },
    /// Committing a resolved move
    Applying { side: Side, san: String },
    /// Absorbing: no further turns
    Terminal(GameResult),
}

impl TurnState {
    /// Side whose turn is in flight, `None` once terminal
    pub fn side(&self) -> Option<Side> {
        match self {
            TurnState::AwaitingTurn(side)
            | TurnState::ResolvingMove { side, .. }
            | TurnState::Applying { side, .. } => Some(*side),
            TurnState::Terminal(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Terminal(_))
    }
}

// ============================================================================
// Session
// ============================================================================

/// A single game
pub struct GameSession {
    id: GameId,
    rules: Box<dyn RulesEngine>,
    start_fen: String,
    start_side: Side,
    start_move: u32,
    transcript: Vec<String>,
    state: TurnState,
    /// Set once the finished game went to the record sink
    recorded: bool,
}

impl GameSession {
    /// New session with a fresh id
    pub fn new(rules: Box<dyn RulesEngine>) -> Self {
        Self::with_id(GameId::generate(), rules)
    }

    /// New session with a given id
    ///
    /// Starts from whatever position the engine holds. An engine that is
    /// already in a terminal position yields a session that is over before
    /// the first turn.
    pub fn with_id(id: GameId, rules: Box<dyn RulesEngine>) -> Self {
        let start_side = rules.side_to_move();
        let state = match GameResult::from_status(rules.terminal_status(), start_side, Vec::new())
        {
            Some(result) => TurnState::Terminal(result),
            None => TurnState::AwaitingTurn(start_side),
        };

        Self {
            id,
            start_fen: rules.serialize(),
            start_side,
            start_move: rules.fullmove_number(),
            rules,
            transcript: Vec::new(),
            state,
            recorded: false,
        }
    }

    // ========== Getters ==========

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn rules(&self) -> &dyn RulesEngine {
        self.rules.as_ref()
    }

    pub fn side_to_move(&self) -> Side {
        self.rules.side_to_move()
    }

    pub fn move_number(&self) -> u32 {
        self.rules.fullmove_number()
    }

    /// Plies applied in this session
    pub fn ply_count(&self) -> u32 {
        self.transcript.len() as u32
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn last_move(&self) -> Option<&str> {
        self.transcript.last().map(String::as_str)
    }

    pub fn fen(&self) -> String {
        self.rules.serialize()
    }

    pub fn legal_moves(&self) -> Vec<String> {
        self.rules.legal_moves()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.rules.snapshot()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn result(&self) -> Option<&GameResult> {
        match &self.state {
            TurnState::Terminal(result) => Some(result),
            _ => None,
        }
    }

    /// Start position, `None` for the standard initial position
    pub fn custom_start(&self) -> Option<&str> {
        (self.start_fen != STANDARD_START_FEN).then_some(self.start_fen.as_str())
    }

    /// Transcript as PGN movetext, without the result token
    pub fn movetext(&self) -> String {
        let mut out = String::new();
        let mut number = self.start_move;
        let mut side = self.start_side;

        for (i, san) in self.transcript.iter().enumerate() {
            match side {
                Side::White => {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(&format!("{number}. {san}"));
                }
                Side::Black => {
                    if i == 0 {
                        out.push_str(&format!("{number}... {san}"));
                    } else {
                        out.push_str(&format!(" {san}"));
                    }
                    number += 1;
                }
            }
            side = side.opposite();
        }
        out
    }

    // ========== State transitions (orchestrator only) ==========

    pub(crate) fn set_state(&mut self, state: TurnState) {
        if !self.state.is_terminal() {
            self.state = state;
        }
    }

    /// Apply a move; the transcript only grows when the engine accepts it
    pub(crate) fn commit(&mut self, san: &str) -> ApplyOutcome {
        let outcome = self.rules.apply_move(san);
        if outcome.applied {
            self.transcript.push(san.to_string());
        }
        outcome
    }

    /// Enter `Terminal` if the position is over
    /// Whether the finished game has been handed to a record sink
    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    /// Claims the one-time record hand-off; false if it already happened
    pub(crate) fn mark_recorded(&mut self) -> bool {
        !std::mem::replace(&mut self.recorded, true)
    }

    pub(crate) fn conclude(&mut self) -> Option<GameResult> {
        let result = GameResult::from_status(
            self.rules.terminal_status(),
            self.rules.side_to_move(),
            self.transcript.clone(),
        )?;
        self.state = TurnState::Terminal(result.clone());
        Some(result)
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("fen", &self.rules.serialize())
            .field("transcript", &self.transcript)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules::ShakmatyRules;

    fn session() -> GameSession {
        GameSession::with_id(GameId::new("g-1"), Box::new(ShakmatyRules::new()))
    }

    #[test]
    fn test_initial_state() {
        let session = session();
        assert_eq!(session.state(), &TurnState::AwaitingTurn(Side::White));
        assert_eq!(session.ply_count(), 0);
        assert!(session.custom_start().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_initial_state_follows_fen() {
        let rules = ShakmatyRules::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        let session = GameSession::new(Box::new(rules));
        assert_eq!(session.state(), &TurnState::AwaitingTurn(Side::Black));
        assert!(session.custom_start().is_some());
    }

    #[test]
    fn test_terminal_start_position() {
        let rules = ShakmatyRules::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let session = GameSession::new(Box::new(rules));

        let result = session.result().unwrap();
        assert_eq!(result.winner, Winner::Draw);
        assert_eq!(result.reason, GameReason::Stalemate);
        assert_eq!(result.total_moves, 0);
    }

    #[test]
    fn test_commit_and_conclude_checkmate() {
        let mut session = session();
        for san in ["f3", "e5", "g4"] {
            assert!(session.commit(san).applied);
            assert!(session.conclude().is_none());
        }
        assert!(session.commit("Qh4#").applied);

        let result = session.conclude().unwrap();
        assert_eq!(result.winner, Winner::Black);
        assert_eq!(result.reason, GameReason::Checkmate);
        assert_eq!(result.total_moves, 4);
        assert_eq!(result.result_string(), "0-1");
        assert!(session.is_terminal());
        assert_eq!(session.result(), Some(&result));
    }

    #[test]
    fn test_rejected_commit_keeps_transcript() {
        let mut session = session();
        assert!(!session.commit("Ke2").applied);
        assert!(session.transcript().is_empty());
        assert_eq!(session.side_to_move(), Side::White);
    }

    #[test]
    fn test_terminal_is_absorbing() {
        let rules = ShakmatyRules::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut session = GameSession::new(Box::new(rules));

        session.set_state(TurnState::AwaitingTurn(Side::Black));
        assert!(session.is_terminal());
    }

    #[test]
    fn test_movetext() {
        let mut session = session();
        for san in ["e4", "e5", "Nf3"] {
            assert!(session.commit(san).applied);
        }
        assert_eq!(session.movetext(), "1. e4 e5 2. Nf3");
        assert_eq!(session.last_move(), Some("Nf3"));
    }

    #[test]
    fn test_movetext_from_black() {
        let rules = ShakmatyRules::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        let mut session = GameSession::new(Box::new(rules));
        for san in ["e5", "Nf3"] {
            assert!(session.commit(san).applied);
        }
        assert_eq!(session.movetext(), "1... e5 2. Nf3");
    }

    #[test]
    fn test_result_summary_and_resignation() {
        let result = GameResult::resignation(Side::White, vec!["e4".into()]);
        assert_eq!(result.winner, Winner::Black);
        assert_eq!(result.summary(), "0-1 (resignation after 1 plies)");
    }
}
