//! HeuristicStrategist - Offline one-ply material search
//!
//! Every legal move is tried on a scratch copy of the position and scored
//! by the material balance that follows. Mates win outright, draws score
//! zero, and ties are broken by a seeded RNG so games are reproducible.

use std::sync::Mutex;

use async_trait::async_trait;
use memory::MemoryRecord;
use orchestrator::{Strategist, StrategistError, StrategistReply, StrategistRequest};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rules::{evaluate, RulesEngine, ShakmatyRules};
use shared::{Side, TerminalStatus};
use tracing::debug;

const MATE_SCORE: i32 = 10_000;
const NONE_YET: &str = "(none yet)";

/// A legal move with the score it earned
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScoredMove {
    san: String,
    score: i32,
    status: TerminalStatus,
}

/// Greedy material strategist
pub struct HeuristicStrategist {
    rng: Mutex<StdRng>,
}

impl HeuristicStrategist {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic tie-breaking
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Score every legal move from `side`'s point of view
    fn score_moves(
        fen: &str,
        side: Side,
        legal_moves: &[String],
    ) -> Result<Vec<ScoredMove>, StrategistError> {
        let root = ShakmatyRules::from_fen(fen)
            .map_err(|e| StrategistError::Internal(e.to_string()))?;

        let mut scored = Vec::with_capacity(legal_moves.len());
        for san in legal_moves {
            let mut scratch = root.clone();
            if !scratch.apply_move(san).applied {
                continue;
            }

            let status = scratch.terminal_status();
            let score = match status {
                TerminalStatus::Checkmate => MATE_SCORE,
                status if status.is_draw() => 0,
                _ => evaluate(&scratch.snapshot()).material_for(side),
            };
            scored.push(ScoredMove {
                san: san.clone(),
                score,
                status,
            });
        }
        Ok(scored)
    }

    fn choose(&self, scored: &[ScoredMove]) -> Result<ScoredMove, StrategistError> {
        let best = scored
            .iter()
            .map(|m| m.score)
            .max()
            .ok_or_else(|| StrategistError::Internal("no legal moves to choose from".into()))?;
        let top: Vec<&ScoredMove> = scored.iter().filter(|m| m.score == best).collect();

        let mut rng = self
            .rng
            .lock()
            .map_err(|e| StrategistError::Internal(format!("rng lock poisoned: {e}")))?;
        top.choose(&mut *rng)
            .map(|m| (*m).clone())
            .ok_or_else(|| StrategistError::Internal("no legal moves to choose from".into()))
    }
}

impl Default for HeuristicStrategist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Strategist for HeuristicStrategist {
    fn identifier(&self) -> String {
        "heuristic".to_string()
    }

    async fn generate(&self, request: &StrategistRequest) -> Result<StrategistReply, StrategistError> {
        let scored = Self::score_moves(&request.fen, request.side, &request.legal_moves)?;
        let chosen = self.choose(&scored)?;

        debug!(
            game_id = %request.game_id,
            side = %request.side,
            san = %chosen.san,
            score = chosen.score,
            candidates = scored.len(),
            "Heuristic move chosen"
        );

        let before = request.evaluation.material_for(request.side);
        Ok(StrategistReply {
            text: reasoning(request, &chosen, before),
            memory: Some(refresh_memory(request, &chosen)),
        })
    }
}

fn reasoning(request: &StrategistRequest, chosen: &ScoredMove, before: i32) -> String {
    let outlook = match chosen.status {
        TerminalStatus::Checkmate => "It delivers mate.".to_string(),
        status if status.is_draw() => format!("It ends the game: {status}."),
        _ if chosen.score > before => {
            format!("It wins material ({before:+} to {:+}).", chosen.score)
        }
        _ if chosen.score < before => {
            format!("Every option concedes material; best is {:+}.", chosen.score)
        }
        _ => format!("It keeps the material balance at {:+}.", chosen.score),
    };

    format!(
        "Position is in the {}. I looked one ply ahead at {} legal moves. {} Move: {}",
        request.evaluation.phase,
        request.legal_moves.len(),
        outlook,
        chosen.san
    )
}

fn refresh_memory(request: &StrategistRequest, chosen: &ScoredMove) -> String {
    let record = MemoryRecord::new(request.memory.clone(), 0);
    let eval = &request.evaluation;

    let phase = format!(
        "Move {}: {}, material {:+} for {}.",
        request.move_number,
        eval.phase,
        eval.material_for(request.side),
        request.side
    );

    // The last ply in the transcript is always the opponent's
    let opponent = match request.transcript.last() {
        Some(last) => {
            let captures = request
                .transcript
                .iter()
                .rev()
                .step_by(2)
                .filter(|san| san.contains('x'))
                .count();
            format!("Last reply {last}. Captures so far: {captures}.")
        }
        None => NONE_YET.to_string(),
    };

    let plan = if chosen.score >= MATE_SCORE {
        "Finish the game.".to_string()
    } else if chosen.score > 0 {
        "Ahead on material: trade down and avoid draws.".to_string()
    } else if chosen.score < 0 {
        "Behind on material: look for tactics and keep pieces on.".to_string()
    } else {
        "Level: grab material whenever it is safe.".to_string()
    };

    let memorable = chosen.san.contains('x') || chosen.san.ends_with(['+', '#']);
    let critical = match record.section("Critical Moments") {
        Some(existing) if existing != NONE_YET && !existing.is_empty() => {
            if memorable {
                format!("{existing}\n- Move {}: {}", request.move_number, chosen.san)
            } else {
                existing.to_string()
            }
        }
        _ if memorable => format!("- Move {}: {}", request.move_number, chosen.san),
        _ => NONE_YET.to_string(),
    };

    let content = record.with_section("Phase Assessment", &phase);
    let content = MemoryRecord::new(content, 0).with_section("Opponent Model", &opponent);
    let content = MemoryRecord::new(content, 0).with_section("Plan", &plan);
    MemoryRecord::new(content, 0).with_section("Critical Moments", &critical)
}
