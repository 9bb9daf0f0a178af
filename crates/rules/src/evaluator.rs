//! Position Evaluator - Lightweight heuristic signals
//!
//! Used for display and as situational context for agents. Nothing here
//! takes part in choosing a move for the orchestrator.

use serde::Serialize;
use shared::{PieceKind, Side};
use std::fmt;

use crate::snapshot::{relative_rank, square_index, BoardSnapshot};

const CENTER: [&str; 4] = ["d4", "e4", "d5", "e5"];
const EXTENDED_CENTER: [&str; 12] = [
    "c3", "d3", "e3", "f3", "c4", "f4", "c5", "f5", "c6", "d6", "e6", "f6",
];

const OPENING_MOVES: u32 = 10;
const ENDGAME_PIECES: usize = 12;
const QUEENLESS_ENDGAME_PIECES: usize = 16;

const KING_SHELTER_BONUS: i32 = 3;
const IN_CHECK_PENALTY: i32 = -5;

/// Broad stage of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Opening => f.write_str("opening"),
            GamePhase::Middlegame => f.write_str("middlegame"),
            GamePhase::Endgame => f.write_str("endgame"),
        }
    }
}

/// A score kept separately for each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SideScores {
    pub white: i32,
    pub black: i32,
}

impl SideScores {
    pub fn get(&self, side: Side) -> i32 {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    fn add(&mut self, side: Side, amount: i32) {
        match side {
            Side::White => self.white += amount,
            Side::Black => self.black += amount,
        }
    }
}

/// Heuristic snapshot of a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// White-positive material difference
    pub material_balance: i32,
    pub center_control: SideScores,
    pub development: SideScores,
    pub king_safety: SideScores,
    pub phase: GamePhase,
    pub piece_count: usize,
}

impl Evaluation {
    /// Material from `side`'s point of view
    pub fn material_for(&self, side: Side) -> i32 {
        match side {
            Side::White => self.material_balance,
            Side::Black => -self.material_balance,
        }
    }

    /// One-line description for humans and prompts
    pub fn summary(&self) -> String {
        let material = match self.material_balance {
            0 => "material even".to_string(),
            m if m > 0 => format!("white +{m}"),
            m => format!("black +{}", -m),
        };
        format!(
            "{} | {} | center {}/{} | development {}/{} | king safety {}/{}",
            self.phase,
            material,
            self.center_control.white,
            self.center_control.black,
            self.development.white,
            self.development.black,
            self.king_safety.white,
            self.king_safety.black,
        )
    }
}

/// Evaluate a snapshot. Pure: same input, same output.
pub fn evaluate(snapshot: &BoardSnapshot) -> Evaluation {
    let mut material_balance = 0;
    let mut center_control = SideScores::default();
    let mut development = SideScores::default();
    let mut king_safety = SideScores::default();
    let mut queens = 0;
    let mut piece_count = 0;

    let center: Vec<usize> = CENTER.iter().filter_map(|s| square_index(s)).collect();
    let extended: Vec<usize> = EXTENDED_CENTER
        .iter()
        .filter_map(|s| square_index(s))
        .collect();

    for (idx, piece) in snapshot.pieces() {
        piece_count += 1;

        let value = piece.kind.value();
        material_balance += match piece.side {
            Side::White => value,
            Side::Black => -value,
        };

        if center.contains(&idx) {
            center_control.add(piece.side, 2);
        } else if extended.contains(&idx) {
            center_control.add(piece.side, 1);
        }

        let rank = relative_rank(idx, piece.side);
        match piece.kind {
            PieceKind::Pawn => {}
            PieceKind::King => {
                if rank <= 1 {
                    king_safety.add(piece.side, KING_SHELTER_BONUS);
                }
            }
            PieceKind::Queen => {
                queens += 1;
                if rank != 0 {
                    development.add(piece.side, 1);
                }
            }
            _ => {
                if rank != 0 {
                    development.add(piece.side, 1);
                }
            }
        }
    }

    if let Some(side) = snapshot.side_in_check() {
        king_safety.add(side, IN_CHECK_PENALTY);
    }

    let phase = if snapshot.move_number() <= OPENING_MOVES {
        GamePhase::Opening
    } else if piece_count <= ENDGAME_PIECES
        || (queens == 0 && piece_count <= QUEENLESS_ENDGAME_PIECES)
    {
        GamePhase::Endgame
    } else {
        GamePhase::Middlegame
    };

    Evaluation {
        material_balance,
        center_control,
        development,
        king_safety,
        phase,
        piece_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Piece;

    fn white(kind: PieceKind) -> Piece {
        Piece::new(kind, Side::White)
    }

    fn black(kind: PieceKind) -> Piece {
        Piece::new(kind, Side::Black)
    }

    #[test]
    fn test_starting_position() {
        let eval = evaluate(&BoardSnapshot::starting());

        assert_eq!(eval.material_balance, 0);
        assert_eq!(eval.center_control, SideScores { white: 0, black: 0 });
        assert_eq!(eval.development, SideScores { white: 0, black: 0 });
        assert_eq!(eval.phase, GamePhase::Opening);
        assert_eq!(eval.piece_count, 32);
        // Both kings sit on their back rank.
        assert_eq!(eval.king_safety, SideScores { white: 3, black: 3 });
    }

    #[test]
    fn test_material_is_white_positive() {
        let snap = BoardSnapshot::empty(Side::White, 30)
            .with_piece("e1", white(PieceKind::King))
            .with_piece("e8", black(PieceKind::King))
            .with_piece("d1", white(PieceKind::Queen))
            .with_piece("a8", black(PieceKind::Rook))
            .with_piece("b7", black(PieceKind::Pawn));

        let eval = evaluate(&snap);
        assert_eq!(eval.material_balance, 9 - 5 - 1);
        assert_eq!(eval.material_for(Side::Black), -3);
    }

    #[test]
    fn test_center_control_weights() {
        let snap = BoardSnapshot::empty(Side::White, 12)
            .with_piece("e4", white(PieceKind::Pawn))
            .with_piece("d4", white(PieceKind::Pawn))
            .with_piece("f3", white(PieceKind::Knight))
            .with_piece("e5", black(PieceKind::Pawn))
            .with_piece("c6", black(PieceKind::Knight))
            .with_piece("h6", black(PieceKind::Pawn));

        let eval = evaluate(&snap);
        assert_eq!(eval.center_control.white, 2 + 2 + 1);
        assert_eq!(eval.center_control.black, 2 + 1);
    }

    #[test]
    fn test_development_ignores_pawns_and_king() {
        let snap = BoardSnapshot::empty(Side::White, 5)
            .with_piece("f3", white(PieceKind::Knight))
            .with_piece("c4", white(PieceKind::Bishop))
            .with_piece("f1", white(PieceKind::Bishop))
            .with_piece("e2", white(PieceKind::King))
            .with_piece("e4", white(PieceKind::Pawn))
            .with_piece("f6", black(PieceKind::Knight))
            .with_piece("d8", black(PieceKind::Queen));

        let eval = evaluate(&snap);
        assert_eq!(eval.development.white, 2);
        assert_eq!(eval.development.black, 1);
    }

    #[test]
    fn test_king_safety() {
        let snap = BoardSnapshot::empty(Side::Black, 25)
            .with_piece("g1", white(PieceKind::King))
            .with_piece("e5", black(PieceKind::King))
            .with_check(true);

        let eval = evaluate(&snap);
        assert_eq!(eval.king_safety.white, 3);
        // Black king left its back two ranks and is in check.
        assert_eq!(eval.king_safety.black, -5);
    }

    #[test]
    fn test_phase_after_opening() {
        let middlegame = BoardSnapshot::from_placement(
            crate::snapshot::STARTING_PLACEMENT,
            Side::White,
            11,
        )
        .unwrap();
        assert_eq!(evaluate(&middlegame).phase, GamePhase::Middlegame);

        let few_pieces = BoardSnapshot::empty(Side::White, 40)
            .with_piece("e1", white(PieceKind::King))
            .with_piece("e8", black(PieceKind::King))
            .with_piece("d1", white(PieceKind::Queen))
            .with_piece("d8", black(PieceKind::Queen));
        assert_eq!(evaluate(&few_pieces).phase, GamePhase::Endgame);
    }

    #[test]
    fn test_queenless_endgame_threshold() {
        // Twenty pieces without queens is still a middlegame
        let queenless = "r3k2r/pppp1ppp/8/8/8/8/PPPP1PPP/R3K2R";
        let snap = BoardSnapshot::from_placement(queenless, Side::White, 20).unwrap();
        let eval = evaluate(&snap);
        assert_eq!(eval.piece_count, 20);
        assert_eq!(eval.phase, GamePhase::Middlegame);

        let thinner = "r3k3/ppppp3/8/8/8/8/PPPPP3/R3K3";
        let snap = BoardSnapshot::from_placement(thinner, Side::White, 20).unwrap();
        let eval = evaluate(&snap);
        assert_eq!(eval.piece_count, 14);
        assert_eq!(eval.phase, GamePhase::Endgame);

        // The same material with queens on the board stays a middlegame
        let with_queens = "q3k3/ppppp3/8/8/8/8/PPPPP3/Q3K3";
        let snap = BoardSnapshot::from_placement(with_queens, Side::White, 20).unwrap();
        let eval = evaluate(&snap);
        assert_eq!(eval.piece_count, 14);
        assert_eq!(eval.phase, GamePhase::Middlegame);
    }

    #[test]
    fn test_summary_mentions_phase_and_material() {
        let snap = BoardSnapshot::empty(Side::White, 3)
            .with_piece("e1", white(PieceKind::King))
            .with_piece("e8", black(PieceKind::King))
            .with_piece("a8", black(PieceKind::Rook));

        let summary = evaluate(&snap).summary();
        assert!(summary.starts_with("opening"));
        assert!(summary.contains("black +5"));
    }
}
