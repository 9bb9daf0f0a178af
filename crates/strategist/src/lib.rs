//! # Chessmind Strategist
//!
//! Backends that think for agent players. The orchestrator only sees the
//! `Strategist` trait; which backend sits behind it is a configuration
//! choice.
//!
//! ## Components
//!
//! - `HeuristicStrategist` - Offline one-ply material search
//! - `OpenAiStrategist` - Any OpenAI-compatible chat-completions endpoint
//! - `build_strategist` - Picks a backend from `StrategistConfig`

pub mod heuristic;
pub mod openai;

use std::sync::Arc;

use orchestrator::{Strategist, StrategistError};
use shared::{StrategistConfig, StrategistProvider};

pub use heuristic::HeuristicStrategist;
pub use openai::OpenAiStrategist;

/// Build the strategist described by `config`
///
/// `seed` only affects the heuristic backend.
pub fn build_strategist(
    config: &StrategistConfig,
    seed: Option<u64>,
) -> Result<Arc<dyn Strategist>, StrategistError> {
    match config.provider {
        StrategistProvider::Heuristic => {
            let strategist = match seed {
                Some(seed) => HeuristicStrategist::seeded(seed),
                None => HeuristicStrategist::new(),
            };
            Ok(Arc::new(strategist))
        }
        StrategistProvider::OpenAi => Ok(Arc::new(OpenAiStrategist::from_config(config)?)),
    }
}
