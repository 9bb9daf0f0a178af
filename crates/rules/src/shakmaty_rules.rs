//! ShakmatyRules - RulesEngine backed by the shakmaty crate
//!
//! shakmaty knows checkmate, stalemate and insufficient material. Threefold
//! repetition and the fifty-move rule need history, so they are tracked here
//! and applied automatically (no claim required).

use std::collections::HashMap;

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role, Square};
use shared::{PieceKind, Side, TerminalStatus};
use tracing::debug;

use crate::engine::{ApplyOutcome, RulesEngine, RulesError};
use crate::snapshot::{BoardSnapshot, Piece};

const REPETITION_LIMIT: u32 = 3;
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Standard chess via shakmaty
#[derive(Debug, Clone)]
pub struct ShakmatyRules {
    position: Chess,
    /// Occurrences of each position (FEN without clocks)
    repetitions: HashMap<String, u32>,
}

impl ShakmatyRules {
    /// Standard initial position
    pub fn new() -> Self {
        Self::with_position(Chess::default())
    }

    /// Start from a FEN string
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        Ok(Self::with_position(parse_fen(fen)?))
    }

    fn with_position(position: Chess) -> Self {
        let mut rules = Self {
            position,
            repetitions: HashMap::new(),
        };
        rules.record_position();
        rules
    }

    /// How often the current position has occurred
    pub fn repetition_count(&self) -> u32 {
        self.repetitions
            .get(&self.position_key())
            .copied()
            .unwrap_or(0)
    }

    /// Whether the side to move is in check
    pub fn in_check(&self) -> bool {
        self.position.is_check()
    }

    fn record_position(&mut self) {
        *self.repetitions.entry(self.position_key()).or_insert(0) += 1;
    }

    /// Placement, side to move, castling rights and en passant square
    fn position_key(&self) -> String {
        let fen = self.serialize();
        fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }

    /// SAN including the check or mate suffix
    fn san_for(&self, m: &Move) -> String {
        let san = San::from_move(&self.position, m);
        let mut after = self.position.clone();
        after.play_unchecked(m);

        let suffix = if after.is_checkmate() {
            "#"
        } else if after.is_check() {
            "+"
        } else {
            ""
        };
        format!("{san}{suffix}")
    }
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ShakmatyRules {
    fn legal_moves(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| self.san_for(m))
            .collect()
    }

    fn apply_move(&mut self, san: &str) -> ApplyOutcome {
        let wanted = strip_suffix(san.trim());
        let found = self
            .position
            .legal_moves()
            .iter()
            .find(|m| strip_suffix(&self.san_for(m)) == wanted)
            .cloned();

        match found {
            Some(m) => {
                let captured = m.capture().map(piece_kind);
                self.position.play_unchecked(&m);
                self.record_position();
                debug!(san = %san, "Move applied");
                ApplyOutcome::applied(captured)
            }
            None => {
                debug!(san = %san, "Move rejected");
                ApplyOutcome::rejected()
            }
        }
    }

    fn terminal_status(&self) -> TerminalStatus {
        if self.position.is_checkmate() {
            TerminalStatus::Checkmate
        } else if self.position.is_stalemate() {
            TerminalStatus::Stalemate
        } else if self.position.is_insufficient_material() {
            TerminalStatus::DrawByInsufficientMaterial
        } else if self.position.halfmoves() >= FIFTY_MOVE_HALFMOVES {
            TerminalStatus::DrawByFiftyMove
        } else if self.repetition_count() >= REPETITION_LIMIT {
            TerminalStatus::DrawByRepetition
        } else {
            TerminalStatus::InProgress
        }
    }

    fn side_to_move(&self) -> Side {
        side_of(self.position.turn())
    }

    fn fullmove_number(&self) -> u32 {
        self.position.fullmoves().get()
    }

    fn serialize(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn deserialize(&mut self, encoded: &str) -> Result<(), RulesError> {
        let position = parse_fen(encoded)?;
        *self = Self::with_position(position);
        Ok(())
    }

    fn snapshot(&self) -> BoardSnapshot {
        let mut snapshot = BoardSnapshot::empty(self.side_to_move(), self.fullmove_number())
            .with_check(self.position.is_check());

        let board = self.position.board();
        for index in 0..64u32 {
            if let Some(piece) = board.piece_at(Square::new(index)) {
                snapshot.set(
                    index as usize,
                    Some(Piece::new(piece_kind(piece.role), side_of(piece.color))),
                );
            }
        }
        snapshot
    }
}

fn parse_fen(fen: &str) -> Result<Chess, RulesError> {
    let invalid = |reason: String| RulesError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };

    let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{e}")))
}

fn strip_suffix(san: &str) -> &str {
    san.trim_end_matches(['+', '#'])
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn piece_kind(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}
