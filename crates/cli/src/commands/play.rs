//! chessmind play command

use clap::Args;
use console::style;
use orchestrator::{MoveInput, SessionEnd};
use shared::{GameConfig, Side};

use crate::input::TerminalInput;
use crate::presenter::TerminalPresenter;
use crate::session::{self, GlobalArgs};

#[derive(Debug, Args)]
pub struct PlayCommand {
    /// Side you play
    #[arg(long, default_value = "white")]
    pub color: Side,

    /// Seed for fallback moves and the heuristic opponent
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use an OpenAI-compatible model for the opponent
    #[arg(short, long)]
    pub model: Option<String>,

    /// Start from this FEN instead of the initial position
    #[arg(long)]
    pub fen: Option<String>,
}

impl PlayCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = self.config(global)?;
        session::block_on(run_and_report(config, false))?
    }

    fn config(&self, global: &GlobalArgs) -> anyhow::Result<GameConfig> {
        let mut config = global.config_or(GameConfig::human_vs_agent(self.color))?;
        session::seat_human(&mut config, self.color);
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

/// Play `config` in the terminal and print how it ended
pub(crate) async fn run_and_report(config: GameConfig, boards: bool) -> anyhow::Result<()> {
    println!(
        "{} vs {}  ({})",
        style(&config.white.name).bold(),
        style(&config.black.name).bold(),
        config.mode()
    );

    let presenter = Box::new(TerminalPresenter::new().with_boards(boards));
    let mut inputs = |_side: Side| -> Box<dyn MoveInput> { Box::new(TerminalInput::stdin()) };
    let game = session::prepare(&config, presenter, &mut inputs)?;
    let (end, finished) = session::play(game).await?;

    match end {
        SessionEnd::Finished(_) => {
            if let Some(path) = session::record_path(&config, &finished) {
                println!("Saved to {}", path.display());
            }
        }
        SessionEnd::Abandoned { plies } => {
            println!(
                "{} after {} plies. Nothing was saved.",
                style("Game abandoned").yellow(),
                plies
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        play: PlayCommand,
    }

    #[test]
    fn test_flags_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let harness = Harness::parse_from([
            "play", "--color", "black", "--seed", "9", "--model", "gpt-4o",
        ]);
        let global = GlobalArgs {
            config: None,
            data_dir: Some(dir.path().to_path_buf()),
        };

        let config = harness.play.config(&global).unwrap();
        assert!(config.black.is_human());
        assert_eq!(config.seed, Some(9));
        assert_eq!(
            config.white.strategist.as_ref().unwrap().identifier(),
            "gpt-4o"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_color_is_rejected() {
        assert!(Harness::try_parse_from(["play", "--color", "green"]).is_err());
    }
}
