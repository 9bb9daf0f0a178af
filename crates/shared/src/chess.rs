//! Chess vocabulary shared by every layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownSideError;

/// One of the two sides of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    /// The side that moves after this one
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Stable index for per-side arrays (white = 0, black = 1)
    pub fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = UnknownSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Side::White),
            "black" | "b" => Ok(Side::Black),
            _ => Err(UnknownSideError {
                input: s.to_string(),
            }),
        }
    }
}

/// Kind of a chess piece, independent of its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Standard material weight (king counts as zero)
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        }
    }

    /// Uppercase letter as used in FEN for white pieces
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal status of a game
///
/// `InProgress` is the only non-terminal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalStatus {
    InProgress,
    Checkmate,
    Stalemate,
    DrawByRepetition,
    DrawByInsufficientMaterial,
    DrawByFiftyMove,
}

impl TerminalStatus {
    pub fn is_terminal(self) -> bool {
        self != TerminalStatus::InProgress
    }

    /// True for every terminal status except checkmate
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            TerminalStatus::Stalemate
                | TerminalStatus::DrawByRepetition
                | TerminalStatus::DrawByInsufficientMaterial
                | TerminalStatus::DrawByFiftyMove
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TerminalStatus::InProgress => "in-progress",
            TerminalStatus::Checkmate => "checkmate",
            TerminalStatus::Stalemate => "stalemate",
            TerminalStatus::DrawByRepetition => "draw-by-repetition",
            TerminalStatus::DrawByInsufficientMaterial => "draw-by-insufficient-material",
            TerminalStatus::DrawByFiftyMove => "draw-by-fifty-move",
        }
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_alternates() {
        assert_eq!(Side::White.opposite(), Side::Black);
        assert_eq!(Side::Black.opposite(), Side::White);
        assert_eq!(Side::White.opposite().opposite(), Side::White);
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("White".parse::<Side>().unwrap(), Side::White);
        assert_eq!(" b ".parse::<Side>().unwrap(), Side::Black);

        let err = "purple".parse::<Side>().unwrap_err();
        assert!(err.to_string().contains("purple"));
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(PieceKind::Pawn.value(), 1);
        assert_eq!(PieceKind::Knight.value(), 3);
        assert_eq!(PieceKind::Bishop.value(), 3);
        assert_eq!(PieceKind::Rook.value(), 5);
        assert_eq!(PieceKind::Queen.value(), 9);
        assert_eq!(PieceKind::King.value(), 0);
    }

    #[test]
    fn test_terminal_status_taxonomy() {
        assert!(!TerminalStatus::InProgress.is_terminal());
        assert!(TerminalStatus::Checkmate.is_terminal());
        assert!(!TerminalStatus::Checkmate.is_draw());
        assert!(TerminalStatus::DrawByFiftyMove.is_draw());
        assert_eq!(
            TerminalStatus::DrawByInsufficientMaterial.to_string(),
            "draw-by-insufficient-material"
        );
    }

    #[test]
    fn test_terminal_status_serde() {
        let json = serde_json::to_string(&TerminalStatus::DrawByRepetition).unwrap();
        assert_eq!(json, "\"draw-by-repetition\"");
    }
}
