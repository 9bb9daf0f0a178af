//! chessmind watch command

use clap::Args;
use shared::GameConfig;

use crate::commands::play::run_and_report;
use crate::session::{self, GlobalArgs};

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Seed for fallback moves and heuristic agents
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use an OpenAI-compatible model for both agents
    #[arg(short, long)]
    pub model: Option<String>,

    /// Start from this FEN instead of the initial position
    #[arg(long)]
    pub fen: Option<String>,

    /// Only print moves, not the board before each one
    #[arg(long)]
    pub quiet: bool,
}

impl WatchCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = self.config(global)?;
        session::block_on(run_and_report(config, !self.quiet))?
    }

    fn config(&self, global: &GlobalArgs) -> anyhow::Result<GameConfig> {
        let mut config = global.config_or(GameConfig::agent_vs_agent())?;
        session::seat_agents(&mut config);
        if let Some(model) = &self.model {
            session::override_model(&mut config, model);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.fen.is_some() {
            config.start_fen = self.fen.clone();
        }
        Ok(config)
    }
}
