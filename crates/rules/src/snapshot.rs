//! BoardSnapshot - A read-only view of one position
//!
//! Squares are indexed a1 = 0, b1 = 1, ... h8 = 63.

use shared::{PieceKind, Side};

pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// A colored piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// FEN letter: uppercase for white, lowercase for black
    pub fn fen_char(self) -> char {
        match self.side {
            Side::White => self.kind.letter(),
            Side::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let kind = match c.to_ascii_uppercase() {
            'P' => PieceKind::Pawn,
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'Q' => PieceKind::Queen,
            'K' => PieceKind::King,
            _ => return None,
        };
        Some(Self { kind, side })
    }
}

/// Piece placement plus the bits of state the evaluator needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    squares: [Option<Piece>; 64],
    side_to_move: Side,
    move_number: u32,
    in_check: bool,
}

impl BoardSnapshot {
    /// Empty board
    pub fn empty(side_to_move: Side, move_number: u32) -> Self {
        Self {
            squares: [None; 64],
            side_to_move,
            move_number,
            in_check: false,
        }
    }

    /// Standard initial position, white to move, move 1
    pub fn starting() -> Self {
        Self::from_placement(STARTING_PLACEMENT, Side::White, 1)
            .unwrap_or_else(|| Self::empty(Side::White, 1))
    }

    /// Parse the piece-placement field of a FEN string
    pub fn from_placement(placement: &str, side_to_move: Side, move_number: u32) -> Option<Self> {
        let mut snapshot = Self::empty(side_to_move, move_number);
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return None;
        }

        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece = Piece::from_fen_char(c)?;
                    if file > 7 {
                        return None;
                    }
                    snapshot.squares[rank * 8 + file] = Some(piece);
                    file += 1;
                }
            }
            if file != 8 {
                return None;
            }
        }

        Some(snapshot)
    }

    /// Builder: put a piece on a named square (ignored if the name is invalid)
    pub fn with_piece(mut self, square: &str, piece: Piece) -> Self {
        if let Some(idx) = square_index(square) {
            self.squares[idx] = Some(piece);
        }
        self
    }

    /// Builder: mark the side to move as being in check
    pub fn with_check(mut self, in_check: bool) -> Self {
        self.in_check = in_check;
        self
    }

    pub fn set(&mut self, index: usize, piece: Option<Piece>) {
        if index < 64 {
            self.squares[index] = piece;
        }
    }

    pub fn piece_at(&self, index: usize) -> Option<Piece> {
        self.squares.get(index).copied().flatten()
    }

    /// Occupied squares as (index, piece)
    pub fn pieces(&self) -> impl Iterator<Item = (usize, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(idx, sq)| sq.map(|p| (idx, p)))
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// The side currently in check, if any
    ///
    /// Only the side to move can be in check in a legal position.
    pub fn side_in_check(&self) -> Option<Side> {
        self.in_check.then_some(self.side_to_move)
    }

    /// Eight-line diagram, white at the bottom
    pub fn render_ascii(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            out.push_str(&format!("{} ", rank + 1));
            for file in 0..8 {
                let c = self
                    .piece_at(rank * 8 + file)
                    .map(Piece::fen_char)
                    .unwrap_or('.');
                out.push(c);
                if file < 7 {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out.push_str("  a b c d e f g h");
        out
    }
}

/// "e4" -> 28
pub fn square_index(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].checked_sub(b'a')? as usize;
    let rank = bytes[1].checked_sub(b'1')? as usize;
    (file < 8 && rank < 8).then_some(rank * 8 + file)
}

/// 28 -> "e4"
pub fn square_name(index: usize) -> String {
    let file = (b'a' + (index % 8) as u8) as char;
    let rank = (b'1' + (index / 8) as u8) as char;
    format!("{file}{rank}")
}

/// Rank 0..=7 from the owner's point of view (0 = own back rank)
pub fn relative_rank(index: usize, side: Side) -> usize {
    let rank = index / 8;
    match side {
        Side::White => rank,
        Side::Black => 7 - rank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_names() {
        assert_eq!(square_index("a1"), Some(0));
        assert_eq!(square_index("h8"), Some(63));
        assert_eq!(square_index("e4"), Some(28));
        assert_eq!(square_index("i1"), None);
        assert_eq!(square_index("a9"), None);
        assert_eq!(square_name(28), "e4");
        assert_eq!(square_name(63), "h8");
    }

    #[test]
    fn test_starting_position() {
        let snap = BoardSnapshot::starting();
        assert_eq!(snap.pieces().count(), 32);
        assert_eq!(
            snap.piece_at(4),
            Some(Piece::new(PieceKind::King, Side::White))
        );
        assert_eq!(
            snap.piece_at(59),
            Some(Piece::new(PieceKind::Queen, Side::Black))
        );
        assert_eq!(snap.side_in_check(), None);
    }

    #[test]
    fn test_invalid_placement() {
        assert!(BoardSnapshot::from_placement("8/8/8", Side::White, 1).is_none());
        assert!(BoardSnapshot::from_placement("9/8/8/8/8/8/8/8", Side::White, 1).is_none());
        assert!(BoardSnapshot::from_placement("x7/8/8/8/8/8/8/8", Side::White, 1).is_none());
    }

    #[test]
    fn test_relative_rank() {
        assert_eq!(relative_rank(square_index("e1").unwrap(), Side::White), 0);
        assert_eq!(relative_rank(square_index("e8").unwrap(), Side::Black), 0);
        assert_eq!(relative_rank(square_index("e7").unwrap(), Side::Black), 1);
    }

    #[test]
    fn test_render_ascii() {
        let text = BoardSnapshot::starting().render_ascii();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[7], "1 R N B Q K B N R");
    }
}
