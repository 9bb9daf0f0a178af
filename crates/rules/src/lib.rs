//! # Chessmind Rules
//!
//! Everything the orchestrator needs to know about chess, behind a narrow
//! interface.
//!
//! ## Components
//!
//! - `RulesEngine` - Legality, move application and terminal detection
//! - `ShakmatyRules` - `RulesEngine` backed by shakmaty
//! - `BoardSnapshot` - Read-only piece-by-square view of a position
//! - `evaluate` - Heuristic signals for display and agent context

pub mod engine;
pub mod evaluator;
pub mod shakmaty_rules;
pub mod snapshot;

pub use engine::{ApplyOutcome, RulesEngine, RulesError};
pub use evaluator::{evaluate, Evaluation, GamePhase, SideScores};
pub use shakmaty_rules::ShakmatyRules;
pub use snapshot::{BoardSnapshot, Piece};
